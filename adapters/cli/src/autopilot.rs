//! Steers the player toward the closest reachable pellet.

use maze_chase_core::{Direction, EntityKind, Pellet, Vector2D};
use maze_chase_system_pathfinding::{AStar, Heuristic};
use maze_chase_world::{query, World};

/// Pellets tried, nearest first, before giving up for the tick.
const CANDIDATE_PELLETS: usize = 8;

#[derive(Debug)]
pub(crate) struct Autopilot {
    search: AStar,
}

impl Autopilot {
    pub(crate) fn new(entity_size: f32) -> Self {
        Self {
            search: AStar::new(Heuristic::Manhattan).for_entity(EntityKind::Player, entity_size),
        }
    }

    /// Direction to request this tick; `None` when there is nothing to chase.
    pub(crate) fn choose(&self, world: &World) -> Option<Direction> {
        let player = query::player(world)?;
        let maze = query::maze(world)?;
        let position = player.position();
        let start = maze.cell_center(maze.maze().cell_at(position)?);

        let mut pellets: Vec<Pellet> = query::pellets(world);
        pellets.sort_by(|a, b| {
            a.position
                .manhattan_distance_to(start)
                .total_cmp(&b.position.manhattan_distance_to(start))
        });

        pellets
            .into_iter()
            .take(CANDIDATE_PELLETS)
            .find_map(|pellet| {
                let path = self.search.find_path(maze, start, pellet.position);
                match path.get(1) {
                    Some(next) => Some(heading(start, *next)),
                    None if path.is_empty() => None,
                    None => Some(heading(position, pellet.position)),
                }
            })
    }
}

fn heading(from: Vector2D, to: Vector2D) -> Direction {
    Direction::dominant_axis(to - from)
}
