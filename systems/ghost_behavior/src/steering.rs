//! Candidate scoring and cached A* path following.

use std::time::Duration;

use maze_chase_core::{Direction, MazeView, Vector2D};
use maze_chase_system_movement::Kinematics;

/// Waypoint distance at which the path cursor moves on.
const WAYPOINT_REACHED: f32 = 12.0;
/// Target drift that invalidates a cached path.
const TARGET_DRIFT: f32 = 32.0;

/// Open direction paired with its distance to the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) direction: Direction,
    pub(crate) cost: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Metric {
    Euclidean,
    Manhattan,
}

/// Scores every open cardinal direction by the distance from the next
/// position to `target`.
pub(crate) fn candidates(
    body: &Kinematics,
    maze: MazeView<'_>,
    target: Vector2D,
    metric: Metric,
) -> Vec<Candidate> {
    Direction::CARDINALS
        .iter()
        .filter(|direction| body.can_move(**direction, maze))
        .map(|&direction| {
            let next = body.peek(direction);
            let cost = match metric {
                Metric::Euclidean => next.distance_to(target),
                Metric::Manhattan => next.manhattan_distance_to(target),
            };
            Candidate { direction, cost }
        })
        .collect()
}

/// First candidate with the smallest (or largest) cost; `None` when empty.
pub(crate) fn first_extreme(candidates: &[Candidate], largest: bool) -> Direction {
    let mut best: Option<Candidate> = None;
    for candidate in candidates {
        let better = match best {
            None => true,
            Some(current) if largest => candidate.cost > current.cost,
            Some(current) => candidate.cost < current.cost,
        };
        if better {
            best = Some(*candidate);
        }
    }
    best.map_or(Direction::None, |candidate| candidate.direction)
}

/// Cached A* path with a cursor and invalidation bookkeeping.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PathFollower {
    path: Vec<Vector2D>,
    cursor: usize,
    age: Duration,
    planned_for: Option<Vector2D>,
}

impl PathFollower {
    pub(crate) fn path(&self) -> &[Vector2D] {
        &self.path
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn age(&mut self, dt: Duration) {
        self.age = self.age.saturating_add(dt);
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Empty or finished paths, stale paths and drifted targets need a new search.
    pub(crate) fn needs_replan(&self, target: Vector2D, interval: Duration) -> bool {
        self.path.is_empty()
            || self.cursor + 1 >= self.path.len()
            || self.age > interval
            || self
                .planned_for
                .is_some_and(|planned| planned.distance_to(target) > TARGET_DRIFT)
    }

    pub(crate) fn replace(&mut self, path: Vec<Vector2D>, target: Vector2D) {
        self.path = path;
        self.cursor = 0;
        self.age = Duration::ZERO;
        self.planned_for = Some(target);
    }

    /// Waypoint to head for from `position`, advancing past reached ones.
    pub(crate) fn next_waypoint(&mut self, position: Vector2D) -> Option<Vector2D> {
        let mut waypoint = *self.path.get(self.cursor + 1)?;
        if position.distance_to(waypoint) < WAYPOINT_REACHED {
            self.cursor += 1;
            waypoint = *self.path.get(self.cursor + 1)?;
        }
        Some(waypoint)
    }
}
