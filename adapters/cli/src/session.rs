//! Headless campaign loop and the cue sink it plays through.

use std::time::Duration;

use log::debug;
use maze_chase_core::{Command, CueSink, Event, RoundPhase, SoundCue};
use maze_chase_world::{apply, query, World};

use crate::autopilot::Autopilot;

/// Fixed step of the simulation, 60 updates per second.
pub(crate) const TICK: Duration = Duration::from_nanos(16_666_667);

/// Cue sink that writes every cue to the log.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LogCueSink;

impl CueSink for LogCueSink {
    fn play_cue(&mut self, cue: SoundCue) {
        debug!("sound cue: {}", cue.name());
    }
}

/// How a headless campaign ended.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Outcome {
    pub(crate) phase: RoundPhase,
    pub(crate) score: u32,
    pub(crate) ticks: u64,
    pub(crate) maps_cleared: usize,
    pub(crate) fallbacks: usize,
}

/// Starts a campaign and lets the autopilot play it for at most `max_ticks`.
pub(crate) fn play(world: &mut World, autopilot: &Autopilot, max_ticks: u64) -> Outcome {
    let mut events = Vec::new();
    let mut maps_cleared = 0;
    let mut fallbacks = 0;

    apply(world, Command::StartCampaign, &mut events);
    let mut ticks = 0;
    while ticks < max_ticks && !query::phase(world).is_terminal() {
        if let Some(direction) = autopilot.choose(world) {
            apply(world, Command::RequestDirection { direction }, &mut events);
        }
        apply(world, Command::Tick { dt: TICK }, &mut events);
        ticks += 1;

        for event in events.drain(..) {
            match event {
                Event::MapCleared { .. } => maps_cleared += 1,
                Event::FallbackMazeLoaded { .. } => fallbacks += 1,
                _ => {}
            }
        }
    }
    fallbacks += events
        .iter()
        .filter(|event| matches!(event, Event::FallbackMazeLoaded { .. }))
        .count();

    let phase = query::phase(world).clone();
    let banked = query::campaign_total(world);
    let score = match phase {
        RoundPhase::Victory | RoundPhase::Intermission { .. } => banked,
        _ => banked.saturating_add(query::player(world).map_or(0, |player| player.score())),
    };
    Outcome {
        phase,
        score,
        ticks,
        maps_cleared,
        fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{CellCoord, GhostPersonality, Maze, MazeMetadata};
    use maze_chase_world::{Config, MemoryMapProvider, Services};

    fn sealed_corridor() -> Maze {
        let walls = vec![1; 12];
        let middle = vec![1, 0, 2, 2, 2, 0, 1, 1, 1, 0, 0, 1];
        let mut maze = Maze::from_rows(
            &[walls.clone(), middle, walls],
            16.0,
            MazeMetadata::new("corridor", 0, ""),
        )
        .expect("valid corridor")
        .with_spawn("player", CellCoord::new(1, 1));
        for personality in GhostPersonality::ALL {
            maze = maze.with_spawn(personality.spawn_key(), CellCoord::new(9, 1));
        }
        maze
    }

    #[test]
    fn autopilot_clears_a_simple_campaign() {
        let mut world = World::new(
            Config::default(),
            Services::new(
                MemoryMapProvider::new().with_maze("corridor", sealed_corridor()),
                LogCueSink,
            ),
        );
        let outcome = play(&mut world, &Autopilot::new(16.0), 600);

        assert_eq!(outcome.phase, RoundPhase::Victory);
        assert_eq!(outcome.score, 30);
        assert_eq!(outcome.maps_cleared, 1);
        assert_eq!(outcome.fallbacks, 0);
        assert!(outcome.ticks < 600);
    }

    #[test]
    fn tick_budget_bounds_the_run() {
        let mut world = World::new(
            Config::default(),
            Services::new(MemoryMapProvider::new(), LogCueSink),
        );
        let outcome = play(&mut world, &Autopilot::new(16.0), 5);

        assert_eq!(outcome.ticks, 5);
        assert_eq!(outcome.fallbacks, 1);
        assert_eq!(outcome.phase, RoundPhase::Playing);
    }
}
