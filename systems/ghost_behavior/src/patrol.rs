//! Fixed waypoint loops walked during patrol windows.

use maze_chase_core::{GhostPersonality, Vector2D};

/// Looping list of waypoints with a cursor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatrolRoute {
    waypoints: Vec<Vector2D>,
    index: usize,
}

impl PatrolRoute {
    /// Creates a route starting at its first waypoint.
    #[must_use]
    pub fn new(waypoints: Vec<Vector2D>) -> Self {
        Self { waypoints, index: 0 }
    }

    /// Built-in route for the provided personality, in pixel space.
    #[must_use]
    pub fn built_in(personality: GhostPersonality) -> Self {
        let points: [(f32, f32); 8] = match personality {
            GhostPersonality::Chaser => [
                (280.0, 100.0),
                (420.0, 130.0),
                (480.0, 180.0),
                (400.0, 220.0),
                (280.0, 200.0),
                (160.0, 220.0),
                (80.0, 180.0),
                (140.0, 130.0),
            ],
            GhostPersonality::Ambusher => [
                (180.0, 140.0),
                (240.0, 120.0),
                (320.0, 140.0),
                (380.0, 180.0),
                (320.0, 220.0),
                (240.0, 240.0),
                (180.0, 220.0),
                (140.0, 180.0),
            ],
            GhostPersonality::Flanker => [
                (300.0, 260.0),
                (450.0, 260.0),
                (480.0, 300.0),
                (480.0, 340.0),
                (400.0, 350.0),
                (280.0, 330.0),
                (150.0, 320.0),
                (120.0, 280.0),
            ],
            GhostPersonality::Opportunist => [
                (140.0, 160.0),
                (220.0, 140.0),
                (300.0, 180.0),
                (380.0, 160.0),
                (420.0, 220.0),
                (340.0, 260.0),
                (240.0, 240.0),
                (160.0, 200.0),
            ],
        };
        Self::new(points.iter().map(|&(x, y)| Vector2D::new(x, y)).collect())
    }

    /// Waypoints in visiting order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vector2D] {
        &self.waypoints
    }

    /// Index of the waypoint currently targeted.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Waypoint currently targeted, or `None` for an empty route.
    #[must_use]
    pub fn current(&self) -> Option<Vector2D> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.waypoints.get(self.index % self.waypoints.len()).copied()
    }

    /// Moves to the next waypoint when `position` is within `tolerance` of the
    /// current one. Returns `true` when the cursor advanced.
    pub fn advance_if_reached(&mut self, position: Vector2D, tolerance: f32) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        if position.distance_to(current) < tolerance {
            self.index = (self.index + 1) % self.waypoints.len();
            return true;
        }
        false
    }

    /// Returns the cursor to the first waypoint.
    pub fn rewind(&mut self) {
        self.index = 0;
    }
}
