#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Discrete-direction movement shared by the player and the ghosts.
//!
//! Entities keep a committed direction they are travelling in and a
//! requested direction queued by input or steering. A requested turn is
//! taken as soon as the way is clear; an entity whose way is blocked stops
//! in place rather than sliding along the wall.

use std::time::Duration;

use maze_chase_core::{Direction, EntityKind, MazeView, Vector2D};

/// How long a power-up keeps the player powered.
pub const POWER_UP_DURATION: Duration = Duration::from_millis(5000);

/// Kinematic state of a moving entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Kinematics {
    position: Vector2D,
    committed: Direction,
    requested: Direction,
    speed: f32,
    kind: EntityKind,
    size: f32,
    animation_frame: u64,
}

impl Kinematics {
    /// Creates a stationary entity at `position`.
    #[must_use]
    pub fn new(position: Vector2D, speed: f32, kind: EntityKind, size: f32) -> Self {
        Self {
            position,
            committed: Direction::None,
            requested: Direction::None,
            speed,
            kind,
            size,
            animation_frame: 0,
        }
    }

    /// Pixel-space position of the entity's centre.
    #[must_use]
    pub fn position(&self) -> Vector2D {
        self.position
    }

    /// Direction the entity is currently travelling in.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.committed
    }

    /// Direction queued for the next opportunity to turn.
    #[must_use]
    pub fn requested_direction(&self) -> Direction {
        self.requested
    }

    /// Pixels travelled per tick.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Entity kind used to pick the wall clearance.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Sprite extent used for wall clearance and collisions.
    #[must_use]
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Cosmetic frame counter.
    #[must_use]
    pub fn animation_frame(&self) -> u64 {
        self.animation_frame
    }

    /// Overrides the per-tick speed.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Queues a turn that is committed once the way is clear.
    pub fn request(&mut self, direction: Direction) {
        self.requested = direction;
    }

    /// Commits to `direction` immediately, bypassing the queue.
    pub fn commit(&mut self, direction: Direction) {
        self.committed = direction;
    }

    /// Moves the entity and clears both directions.
    pub fn teleport(&mut self, position: Vector2D) {
        self.position = position;
        self.committed = Direction::None;
        self.requested = Direction::None;
    }

    /// Position reached after one step in `direction`.
    #[must_use]
    pub fn peek(&self, direction: Direction) -> Vector2D {
        self.position + direction.unit_vector() * self.speed
    }

    /// Reports whether a step in `direction` keeps the entity clear of walls.
    #[must_use]
    pub fn can_move(&self, direction: Direction, maze: MazeView<'_>) -> bool {
        if direction.is_none() {
            return false;
        }
        maze.is_valid_position(self.peek(direction), self.size, self.kind)
    }

    /// Takes one step in the committed direction without any wall check.
    pub fn step(&mut self) {
        self.position = self.peek(self.committed);
    }

    /// Resolves the queued turn against walls and takes at most one step.
    ///
    /// A clear queued turn wins; otherwise the entity keeps going; otherwise it
    /// stops. Returns `true` when the entity moved.
    pub fn advance(&mut self, maze: MazeView<'_>) -> bool {
        if self.requested != self.committed {
            if self.can_move(self.requested, maze) {
                self.committed = self.requested;
            } else if !self.can_move(self.committed, maze) {
                self.committed = Direction::None;
            }
        }

        if self.can_move(self.committed, maze) {
            self.step();
            return true;
        }

        if self.requested != self.committed && self.can_move(self.requested, maze) {
            self.committed = self.requested;
            self.step();
            return true;
        }

        self.committed = Direction::None;
        false
    }

    /// Advances the cosmetic frame counter.
    pub fn animate(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }
}

/// The player-controlled entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    body: Kinematics,
    spawn: Vector2D,
    lives: u32,
    score: u32,
    power_up_remaining: Duration,
}

impl Player {
    /// Creates a player standing at `spawn`.
    #[must_use]
    pub fn new(spawn: Vector2D, speed: f32, size: f32, lives: u32) -> Self {
        Self {
            body: Kinematics::new(spawn, speed, EntityKind::Player, size),
            spawn,
            lives,
            score: 0,
            power_up_remaining: Duration::ZERO,
        }
    }

    /// Kinematic state of the player.
    #[must_use]
    pub fn body(&self) -> &Kinematics {
        &self.body
    }

    /// Pixel-space position of the player.
    #[must_use]
    pub fn position(&self) -> Vector2D {
        self.body.position()
    }

    /// Direction the player is travelling in.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.body.direction()
    }

    /// Lives left.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Points earned on the current map.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Reports whether a power-up is running.
    #[must_use]
    pub fn power_up_active(&self) -> bool {
        !self.power_up_remaining.is_zero()
    }

    /// Time left on the running power-up.
    #[must_use]
    pub fn power_up_remaining(&self) -> Duration {
        self.power_up_remaining
    }

    /// Queues a turn for the player.
    pub fn request_direction(&mut self, direction: Direction) {
        self.body.request(direction);
    }

    /// Adds points to the score.
    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Starts or restarts the power-up timer.
    pub fn activate_power_up(&mut self) {
        self.power_up_remaining = POWER_UP_DURATION;
    }

    /// Removes one life, never going below zero, and returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Returns the player to its spawn point with no pending movement.
    pub fn respawn(&mut self) {
        self.body.teleport(self.spawn);
    }

    /// Runs the power-up timer down and moves one step.
    pub fn update(&mut self, dt: Duration, maze: MazeView<'_>) {
        self.power_up_remaining = self.power_up_remaining.saturating_sub(dt);
        let _ = self.body.advance(maze);
        self.body.animate();
    }
}
