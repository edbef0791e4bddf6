#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state for the maze-chase simulation.
//!
//! The [`World`] owns the active maze, the player and the ghosts. Adapters
//! drive it exclusively through [`apply`] and read it through [`query`].

mod maps;

use std::{error::Error as _, time::Duration};

use log::{error, info, warn};
use maze_chase_core::{
    Command, Event, GhostPersonality, MapId, MapSummary, Maze, PelletKind, RoundPhase, SoundCue,
};
use maze_chase_system_ghost_behavior::{Ghost, GhostContext, GhostUpdate};
use maze_chase_system_movement::Player;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use maps::{
    fallback_maze, summarize, DirectoryMapProvider, DocumentMetadata, GridPoint, MapError,
    MapProvider, MazeDocument, MemoryMapProvider, DEFAULT_DIFFICULTY, FALLBACK_MAP_ID,
};

const DEFAULT_RNG_SEED: u64 = 0x6d61_7a65_6368_6173;

/// Tunable rules of a campaign.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Player speed in pixels per tick.
    pub player_speed: f32,
    /// Ghost base speed in pixels per tick.
    pub ghost_speed: f32,
    /// Lives the player starts every map with.
    pub starting_lives: u32,
    /// Sprite extent of every entity in pixels; half of it is the collision radius.
    pub entity_size: f32,
    /// Seed of the random source driving ghost decisions.
    pub rng_seed: u64,
    /// Pause after a non-fatal life loss.
    pub stun_duration: Duration,
    /// Pause between a cleared map and the next one.
    pub intermission_duration: Duration,
    /// Vulnerability granted by a power-up before difficulty scaling.
    pub vulnerability_base: Duration,
    /// Points awarded for capturing a vulnerable ghost.
    pub ghost_capture_bonus: u32,
    /// Whether ghosts may steer with A* at all.
    pub astar_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_speed: 2.0,
            ghost_speed: 1.5,
            starting_lives: 20,
            entity_size: 16.0,
            rng_seed: DEFAULT_RNG_SEED,
            stun_duration: Duration::from_millis(1000),
            intermission_duration: Duration::from_millis(3000),
            vulnerability_base: Duration::from_millis(8000),
            ghost_capture_bonus: 200,
            astar_enabled: true,
        }
    }
}

impl Config {
    /// Distance below which the player touches a pellet or a ghost.
    #[must_use]
    pub fn collision_radius(&self) -> f32 {
        (self.entity_size / 2.0).floor()
    }
}

/// Collaborators the world is constructed with.
#[derive(Debug)]
pub struct Services {
    /// Source of the campaign's mazes.
    pub maps: Box<dyn MapProvider>,
    /// Receiver of gameplay sound cues.
    pub cues: Box<dyn maze_chase_core::CueSink>,
}

impl Services {
    /// Bundles the provided collaborators.
    #[must_use]
    pub fn new(
        maps: impl MapProvider + 'static,
        cues: impl maze_chase_core::CueSink + 'static,
    ) -> Self {
        Self {
            maps: Box::new(maps),
            cues: Box::new(cues),
        }
    }
}

/// State of the map currently being played.
#[derive(Debug)]
struct Round {
    summary: MapSummary,
    maze: Maze,
    player: Player,
    ghosts: Vec<Ghost>,
}

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    config: Config,
    services: Services,
    rng: ChaCha8Rng,
    phase: RoundPhase,
    campaign: Vec<MapSummary>,
    map_index: usize,
    campaign_total: u32,
    round: Option<Round>,
    tick_index: u64,
}

impl World {
    /// Creates an idle world; nothing is loaded until [`Command::StartCampaign`].
    #[must_use]
    pub fn new(config: Config, services: Services) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            services,
            phase: RoundPhase::Idle,
            campaign: Vec::new(),
            map_index: 0,
            campaign_total: 0,
            round: None,
            tick_index: 0,
        }
    }

    fn cue(&mut self, cue: SoundCue) {
        self.services.cues.play_cue(cue);
    }

    fn enter(&mut self, phase: RoundPhase, out_events: &mut Vec<Event>) {
        self.phase = phase.clone();
        out_events.push(Event::PhaseChanged { phase });
    }

    fn start_campaign(&mut self, out_events: &mut Vec<Event>) {
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
        self.campaign = self.services.maps.list_maps();
        self.map_index = 0;
        self.campaign_total = 0;
        self.round = None;

        if self.campaign.is_empty() {
            warn!("no maps available, playing the built-in maze");
            out_events.push(Event::FallbackMazeLoaded {
                requested: MapId::new(FALLBACK_MAP_ID),
                reason: "no maps available".to_owned(),
            });
            if let Ok(maze) = fallback_maze() {
                self.campaign
                    .push(summarize(MapId::new(FALLBACK_MAP_ID), &maze));
            }
        }
        info!("campaign started with {} map(s)", self.campaign.len());
        self.begin_map(out_events);
    }

    fn begin_map(&mut self, out_events: &mut Vec<Event>) {
        let Some((summary, maze)) = self.load_maze(out_events) else {
            self.round = None;
            self.enter(RoundPhase::Defeat, out_events);
            return;
        };

        let view = maze.view();
        let player = Player::new(
            view.spawn_position("player"),
            self.config.player_speed,
            self.config.entity_size,
            self.config.starting_lives,
        );
        let difficulty = maze.metadata().difficulty();
        let ghosts = GhostPersonality::ALL
            .iter()
            .map(|&personality| {
                let key = personality.spawn_key();
                let mut ghost = Ghost::new(
                    personality,
                    view.spawn_position(key),
                    self.config.ghost_speed,
                    self.config.entity_size,
                );
                if let Some(route) = maze.patrol_route(key) {
                    ghost = ghost.with_patrol_route(route);
                }
                ghost.set_difficulty(difficulty);
                if !self.config.astar_enabled {
                    ghost.configure_astar(false, ghost.astar_interval());
                }
                ghost
            })
            .collect();

        info!(
            "map {} loaded: '{}' (difficulty {}, {} pellets)",
            self.map_index + 1,
            summary.name,
            difficulty,
            maze.pellet_count()
        );
        out_events.push(Event::MapLoaded {
            summary: summary.clone(),
            pellets: maze.pellet_count(),
        });
        self.round = Some(Round {
            summary,
            maze,
            player,
            ghosts,
        });
        self.enter(RoundPhase::Playing, out_events);
    }

    fn load_maze(&mut self, out_events: &mut Vec<Event>) -> Option<(MapSummary, Maze)> {
        let requested = self.campaign.get(self.map_index)?.id.clone();
        if requested.as_str() != FALLBACK_MAP_ID {
            match self.services.maps.load_map(&requested) {
                Ok(maze) => return Some((summarize(requested, &maze), maze)),
                Err(load_error) => {
                    let reason = error_chain(&load_error);
                    warn!("falling back to the built-in maze: {reason}");
                    out_events.push(Event::FallbackMazeLoaded { requested, reason });
                }
            }
        }

        match fallback_maze() {
            Ok(maze) => Some((summarize(MapId::new(FALLBACK_MAP_ID), &maze), maze)),
            Err(maze_error) => {
                error!("built-in maze is invalid: {maze_error}");
                None
            }
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        match self.phase.clone() {
            RoundPhase::Idle | RoundPhase::Victory | RoundPhase::Defeat => {}
            RoundPhase::Stunned { remaining } => {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    self.enter(RoundPhase::Playing, out_events);
                } else {
                    self.phase = RoundPhase::Stunned { remaining };
                }
            }
            RoundPhase::Intermission { remaining, next } => {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    self.map_index += 1;
                    self.begin_map(out_events);
                } else {
                    self.phase = RoundPhase::Intermission { remaining, next };
                }
            }
            RoundPhase::Playing => self.play(dt, out_events),
        }
    }

    fn play(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(round) = self.round.as_mut() else {
            return;
        };
        let Round {
            maze,
            player,
            ghosts,
            ..
        } = round;

        player.update(dt, maze.view());

        let chaser_position = ghosts
            .iter()
            .find(|ghost| ghost.personality() == GhostPersonality::Chaser && !ghost.in_spawn_delay())
            .map(Ghost::position);
        let context = GhostContext {
            player_position: player.position(),
            player_direction: player.direction(),
            chaser_position,
        };
        for ghost in ghosts.iter_mut() {
            if ghost.update(dt, &context, maze.view(), &mut self.rng) == GhostUpdate::Released {
                out_events.push(Event::GhostReleased {
                    personality: ghost.personality(),
                });
            }
        }

        let radius = self.config.collision_radius();
        let mut cues = Vec::new();
        let touched: Vec<_> = maze
            .pellets()
            .into_iter()
            .filter(|pellet| pellet.position.distance_to(player.position()) < radius)
            .collect();
        for pellet in touched {
            let Some(kind) = maze.remove_pellet_at(pellet.position) else {
                continue;
            };
            player.add_score(pellet.value);
            out_events.push(Event::PelletEaten {
                position: pellet.position,
                kind,
                points: pellet.value,
            });
            if kind == PelletKind::PowerUp {
                player.activate_power_up();
                for ghost in ghosts.iter_mut() {
                    ghost.set_vulnerable(self.config.vulnerability_base);
                }
                out_events.push(Event::PowerUpActivated);
                cues.push(SoundCue::PowerUp);
            } else {
                cues.push(SoundCue::PelletEaten);
            }
        }
        for cue in cues {
            self.cue(cue);
        }

        if self.round.as_ref().is_some_and(|round| round.maze.pellet_count() == 0) {
            self.clear_map(out_events);
            return;
        }
        self.resolve_ghost_collisions(out_events);
    }

    fn clear_map(&mut self, out_events: &mut Vec<Event>) {
        let score = self.round.as_ref().map_or(0, |round| round.player.score());
        self.campaign_total = self.campaign_total.saturating_add(score);
        out_events.push(Event::MapCleared {
            score,
            campaign_total: self.campaign_total,
        });

        if let Some(next) = self.campaign.get(self.map_index + 1).cloned() {
            info!("map {} cleared with {score} points", self.map_index + 1);
            self.cue(SoundCue::MapCleared);
            let remaining = self.config.intermission_duration;
            self.enter(RoundPhase::Intermission { remaining, next }, out_events);
        } else {
            info!("campaign won with {} points", self.campaign_total);
            out_events.push(Event::CampaignWon {
                total_score: self.campaign_total,
            });
            self.cue(SoundCue::Victory);
            self.enter(RoundPhase::Victory, out_events);
        }
    }

    fn resolve_ghost_collisions(&mut self, out_events: &mut Vec<Event>) {
        let radius = self.config.collision_radius();
        let bonus = self.config.ghost_capture_bonus;
        let Some(round) = self.round.as_mut() else {
            return;
        };

        let mut cues = Vec::new();
        let mut caught = None;
        for ghost in round.ghosts.iter_mut() {
            if ghost.in_spawn_delay()
                || ghost.position().distance_to(round.player.position()) >= radius
            {
                continue;
            }
            if ghost.is_vulnerable() {
                ghost.capture();
                round.player.add_score(bonus);
                out_events.push(Event::GhostCaptured {
                    personality: ghost.personality(),
                    bonus,
                });
                cues.push(SoundCue::GhostEaten);
            } else {
                caught = Some(round.player.lose_life());
                break;
            }
        }

        let score = round.player.score();
        if let Some(remaining) = caught {
            out_events.push(Event::LifeLost { remaining });
            cues.push(SoundCue::LifeLost);
            if remaining == 0 {
                info!("campaign lost with {score} points on the current map");
                out_events.push(Event::CampaignLost { score });
                cues.push(SoundCue::GameOver);
            } else {
                round.player.respawn();
                for ghost in round.ghosts.iter_mut() {
                    ghost.reset();
                }
            }
        }
        for cue in cues {
            self.cue(cue);
        }

        match caught {
            Some(0) => self.enter(RoundPhase::Defeat, out_events),
            Some(_) => {
                let remaining = self.config.stun_duration;
                self.enter(RoundPhase::Stunned { remaining }, out_events);
            }
            None => {}
        }
    }
}

fn error_chain(error: &MapError) -> String {
    let mut reason = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    reason
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartCampaign => world.start_campaign(out_events),
        Command::RequestDirection { direction } => {
            if let Some(round) = world.round.as_mut() {
                round.player.request_direction(direction);
            }
        }
        Command::Tick { dt } => world.tick(dt, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Config, World};
    use maze_chase_core::{
        GhostCondition, GhostMode, GhostPersonality, MapSummary, MazeView, Pellet, RoundPhase,
        Vector2D,
    };
    use maze_chase_system_ghost_behavior::Ghost;
    use maze_chase_system_movement::Player;

    /// Current phase of the round state machine.
    #[must_use]
    pub fn phase(world: &World) -> &RoundPhase {
        &world.phase
    }

    /// Player of the active map.
    #[must_use]
    pub fn player(world: &World) -> Option<&Player> {
        world.round.as_ref().map(|round| &round.player)
    }

    /// Ghosts of the active map in personality order.
    #[must_use]
    pub fn ghosts(world: &World) -> &[Ghost] {
        world
            .round
            .as_ref()
            .map_or(&[][..], |round| round.ghosts.as_slice())
    }

    /// Read-only view of the active maze.
    #[must_use]
    pub fn maze(world: &World) -> Option<MazeView<'_>> {
        world.round.as_ref().map(|round| round.maze.view())
    }

    /// Pellets still present on the active maze.
    #[must_use]
    pub fn pellets(world: &World) -> Vec<Pellet> {
        world
            .round
            .as_ref()
            .map_or_else(Vec::new, |round| round.maze.pellets())
    }

    /// Summary of the map being played.
    #[must_use]
    pub fn current_map(world: &World) -> Option<&MapSummary> {
        world.round.as_ref().map(|round| &round.summary)
    }

    /// Ordered maps of the running campaign.
    #[must_use]
    pub fn campaign(world: &World) -> &[MapSummary] {
        &world.campaign
    }

    /// Zero-based index of the map being played within the campaign.
    #[must_use]
    pub fn map_index(world: &World) -> usize {
        world.map_index
    }

    /// Sum of the scores of every cleared map.
    #[must_use]
    pub fn campaign_total(world: &World) -> u32 {
        world.campaign_total
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Rules the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Captures the gameplay-relevant state of the world.
    #[must_use]
    pub fn snapshot(world: &World) -> Snapshot {
        let player = player(world);
        Snapshot {
            tick_index: world.tick_index,
            phase: world.phase.clone(),
            player_position: player.map(Player::position),
            score: player.map_or(0, Player::score),
            lives: player.map_or(0, Player::lives),
            ghosts: ghosts(world)
                .iter()
                .map(|ghost| GhostSnapshot {
                    personality: ghost.personality(),
                    position: ghost.position(),
                    condition: ghost.condition(),
                    mode: ghost.mode(),
                    waiting: ghost.in_spawn_delay(),
                })
                .collect(),
            pellets_remaining: world
                .round
                .as_ref()
                .map_or(0, |round| round.maze.pellet_count()),
            campaign_total: world.campaign_total,
        }
    }

    /// Gameplay-relevant state at one point in time.
    #[derive(Clone, Debug, PartialEq)]
    pub struct Snapshot {
        /// Ticks processed so far.
        pub tick_index: u64,
        /// Round phase.
        pub phase: RoundPhase,
        /// Player position, when a map is active.
        pub player_position: Option<Vector2D>,
        /// Score on the current map.
        pub score: u32,
        /// Lives left.
        pub lives: u32,
        /// Every ghost in personality order.
        pub ghosts: Vec<GhostSnapshot>,
        /// Pellets and power-ups left on the maze.
        pub pellets_remaining: usize,
        /// Score of every cleared map.
        pub campaign_total: u32,
    }

    /// Ghost entry of a [`Snapshot`].
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct GhostSnapshot {
        /// Personality of the ghost.
        pub personality: GhostPersonality,
        /// Pixel-space position.
        pub position: Vector2D,
        /// Normal or vulnerable.
        pub condition: GhostCondition,
        /// Patrol or chase.
        pub mode: GhostMode,
        /// Whether the ghost is waiting out its spawn delay.
        pub waiting: bool,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::SilentCues;

    #[test]
    fn default_config_matches_arcade_rules() {
        let config = Config::default();
        assert!((config.player_speed - 2.0).abs() < f32::EPSILON);
        assert!((config.ghost_speed - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.starting_lives, 20);
        assert!((config.collision_radius() - 8.0).abs() < f32::EPSILON);
        assert_eq!(config.ghost_capture_bonus, 200);
    }

    #[test]
    fn new_world_is_idle_until_a_campaign_starts() {
        let mut world = World::new(
            Config::default(),
            Services::new(MemoryMapProvider::new(), SilentCues),
        );
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );

        assert_eq!(query::phase(&world), &RoundPhase::Idle);
        assert!(query::player(&world).is_none());
        assert!(query::ghosts(&world).is_empty());
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
    }

    #[test]
    fn empty_provider_plays_the_fallback_maze() {
        let mut world = World::new(
            Config::default(),
            Services::new(MemoryMapProvider::new(), SilentCues),
        );
        let mut events = Vec::new();
        apply(&mut world, Command::StartCampaign, &mut events);

        assert!(matches!(
            events.first(),
            Some(Event::FallbackMazeLoaded { reason, .. }) if reason == "no maps available"
        ));
        assert_eq!(query::phase(&world), &RoundPhase::Playing);
        assert_eq!(
            query::current_map(&world).map(|summary| summary.id.as_str()),
            Some(FALLBACK_MAP_ID)
        );
        assert_eq!(query::ghosts(&world).len(), 4);
    }
}
