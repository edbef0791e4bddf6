#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ghost behaviour: targeting, steering, timers and the capture lifecycle.
//!
//! Each [`Ghost`] owns its movement state and every timer that drives it.
//! The world hands it a [`GhostContext`] snapshot of the player, a read-only
//! [`MazeView`] and a random number generator once per tick; the ghost never
//! touches anything but itself.

mod difficulty;
mod patrol;
mod personality;
mod steering;

use std::time::Duration;

use log::debug;
use maze_chase_core::{
    CellCoord, Direction, EntityKind, GhostCondition, GhostMode, GhostPersonality, MazeView,
    Vector2D,
};
use maze_chase_system_movement::Kinematics;
use maze_chase_system_pathfinding::{AStar, Heuristic};
use rand::Rng;

pub use difficulty::{Difficulty, DifficultyTier};
pub use patrol::PatrolRoute;
pub use personality::{tuning, Tuning};

use personality::ChaseInputs;
use steering::{Metric, PathFollower};

/// Time a captured ghost waits at its spawn point.
pub const SPAWN_DELAY: Duration = Duration::from_millis(5000);
/// Recompute interval for cached A* paths at difficulty zero.
pub const DEFAULT_ASTAR_INTERVAL: Duration = Duration::from_millis(2000);
/// Shortest recompute interval a ghost accepts.
pub const MIN_ASTAR_INTERVAL: Duration = Duration::from_millis(200);

const ASTAR_STEER_INTERVAL: Duration = Duration::from_millis(100);
const PATROL_CHECK_INTERVAL: Duration = Duration::from_millis(200);
const CONTINUATION_DISCOUNT: f32 = 0.9;

/// Snapshot of the world a ghost needs to pick its target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GhostContext {
    /// Player position at the start of the tick.
    pub player_position: Vector2D,
    /// Direction the player is travelling in.
    pub player_direction: Direction,
    /// Chaser position at the start of the tick, when a chaser is active.
    pub chaser_position: Option<Vector2D>,
}

/// What a call to [`Ghost::update`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostUpdate {
    /// The ghost is still waiting out its spawn delay.
    Waiting,
    /// The spawn delay expired during this tick.
    Released,
    /// The ghost steered and moved normally.
    Active,
}

/// One ghost and all of its behavioural state.
#[derive(Clone, Debug, PartialEq)]
pub struct Ghost {
    personality: GhostPersonality,
    body: Kinematics,
    spawn: Vector2D,
    base_speed: f32,
    condition: GhostCondition,
    vulnerable_remaining: Duration,
    mode: GhostMode,
    mode_elapsed: Duration,
    difficulty: Difficulty,
    patrol: PatrolRoute,
    patrol_elapsed: Duration,
    search: AStar,
    path: PathFollower,
    astar_enabled: bool,
    astar_interval: Duration,
    steer_elapsed: Duration,
    spawn_delay_remaining: Duration,
}

impl Ghost {
    /// Creates a ghost at `spawn` walking its built-in patrol route.
    #[must_use]
    pub fn new(personality: GhostPersonality, spawn: Vector2D, speed: f32, size: f32) -> Self {
        Self {
            personality,
            body: Kinematics::new(spawn, speed, EntityKind::Ghost, size),
            spawn,
            base_speed: speed,
            condition: GhostCondition::Normal,
            vulnerable_remaining: Duration::ZERO,
            mode: GhostMode::Patrol,
            mode_elapsed: Duration::ZERO,
            difficulty: Difficulty::default(),
            patrol: PatrolRoute::built_in(personality),
            patrol_elapsed: Duration::ZERO,
            search: AStar::new(Heuristic::Manhattan).for_entity(EntityKind::Ghost, size),
            path: PathFollower::default(),
            astar_enabled: true,
            astar_interval: DEFAULT_ASTAR_INTERVAL,
            steer_elapsed: Duration::ZERO,
            spawn_delay_remaining: Duration::ZERO,
        }
    }

    /// Replaces the built-in patrol route.
    #[must_use]
    pub fn with_patrol_route(mut self, waypoints: Vec<Vector2D>) -> Self {
        self.patrol = PatrolRoute::new(waypoints);
        self
    }

    /// Personality driving the ghost's targeting.
    #[must_use]
    pub fn personality(&self) -> GhostPersonality {
        self.personality
    }

    /// Kinematic state of the ghost.
    #[must_use]
    pub fn body(&self) -> &Kinematics {
        &self.body
    }

    /// Pixel-space position of the ghost.
    #[must_use]
    pub fn position(&self) -> Vector2D {
        self.body.position()
    }

    /// Direction the ghost is travelling in.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.body.direction()
    }

    /// Current per-tick speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.body.speed()
    }

    /// Spawn point the ghost returns to.
    #[must_use]
    pub fn spawn(&self) -> Vector2D {
        self.spawn
    }

    /// Normal or vulnerable.
    #[must_use]
    pub fn condition(&self) -> GhostCondition {
        self.condition
    }

    /// Reports whether the ghost can currently be captured.
    #[must_use]
    pub fn is_vulnerable(&self) -> bool {
        self.condition == GhostCondition::Vulnerable
    }

    /// Time left in the vulnerable state.
    #[must_use]
    pub fn vulnerable_remaining(&self) -> Duration {
        self.vulnerable_remaining
    }

    /// Patrol or chase.
    #[must_use]
    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    /// Difficulty applied at map load.
    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Patrol route and cursor.
    #[must_use]
    pub fn patrol_route(&self) -> &PatrolRoute {
        &self.patrol
    }

    /// Cached A* waypoints.
    #[must_use]
    pub fn path(&self) -> &[Vector2D] {
        self.path.path()
    }

    /// Index of the last waypoint reached on the cached path.
    #[must_use]
    pub fn path_cursor(&self) -> usize {
        self.path.cursor()
    }

    /// Reports whether search-based steering is enabled.
    #[must_use]
    pub fn astar_enabled(&self) -> bool {
        self.astar_enabled
    }

    /// Interval after which a cached path is recomputed.
    #[must_use]
    pub fn astar_interval(&self) -> Duration {
        self.astar_interval
    }

    /// Reports whether the ghost is waiting at its spawn point after a capture.
    #[must_use]
    pub fn in_spawn_delay(&self) -> bool {
        !self.spawn_delay_remaining.is_zero()
    }

    /// Time left in the spawn delay.
    #[must_use]
    pub fn spawn_delay_remaining(&self) -> Duration {
        self.spawn_delay_remaining
    }

    /// Applies a map difficulty level (0 to 200).
    pub fn set_difficulty(&mut self, level: u8) {
        self.difficulty = Difficulty::from_level(level);
        self.body.set_speed(self.base_speed);
        self.astar_interval = self.difficulty.astar_interval();
    }

    /// Toggles search-based steering and sets the path recompute interval.
    pub fn configure_astar(&mut self, enabled: bool, interval: Duration) {
        self.astar_enabled = enabled;
        self.astar_interval = interval.max(MIN_ASTAR_INTERVAL);
        if !enabled {
            self.path.clear();
        }
    }

    /// Switches tactical mode and restarts the mode timer.
    pub fn set_mode(&mut self, mode: GhostMode) {
        self.mode = mode;
        self.mode_elapsed = Duration::ZERO;
    }

    /// Makes the ghost capturable for a difficulty-scaled share of `base`.
    ///
    /// Ghosts waiting out a spawn delay are unaffected.
    pub fn set_vulnerable(&mut self, base: Duration) {
        if self.in_spawn_delay() {
            return;
        }
        self.condition = GhostCondition::Vulnerable;
        self.vulnerable_remaining = self.difficulty.vulnerable_duration(base);
        self.body.set_speed((self.base_speed - 1.0).max(1.0));
    }

    /// Sends a captured ghost back to its spawn point for [`SPAWN_DELAY`].
    pub fn capture(&mut self) {
        self.reset();
        self.spawn_delay_remaining = SPAWN_DELAY;
        debug!(
            "{} ghost captured, waiting {:?} at spawn",
            self.personality, SPAWN_DELAY
        );
    }

    /// Returns the ghost to its spawn point with every timer cleared.
    pub fn reset(&mut self) {
        self.body.teleport(self.spawn);
        self.body.set_speed(self.base_speed);
        self.condition = GhostCondition::Normal;
        self.vulnerable_remaining = Duration::ZERO;
        self.mode = GhostMode::Patrol;
        self.mode_elapsed = Duration::ZERO;
        self.patrol.rewind();
        self.patrol_elapsed = Duration::ZERO;
        self.path.clear();
        self.steer_elapsed = Duration::ZERO;
        self.spawn_delay_remaining = Duration::ZERO;
    }

    /// Position the ghost is currently steering towards.
    #[must_use]
    pub fn target_position(&self, context: &GhostContext, maze: MazeView<'_>) -> Vector2D {
        match self.mode {
            GhostMode::Patrol => self.patrol.current().unwrap_or(self.spawn),
            GhostMode::Chase => {
                let (_, rows) = maze.dimensions();
                let inputs = ChaseInputs {
                    ghost: self.position(),
                    player: context.player_position,
                    player_direction: context.player_direction,
                    chaser: context.chaser_position,
                    cell_size: maze.cell_size(),
                    flee_corner: maze.cell_center(CellCoord::new(1, rows.saturating_sub(2))),
                };
                personality::chase_target(self.personality, inputs)
            }
        }
    }

    /// Greedy Euclidean steering: the open direction closest to `target`, or
    /// the farthest while vulnerable.
    #[must_use]
    pub fn choose_direction(&self, maze: MazeView<'_>, target: Vector2D) -> Direction {
        let candidates = steering::candidates(&self.body, maze, target, Metric::Euclidean);
        steering::first_extreme(&candidates, self.is_vulnerable())
    }

    /// Manhattan steering with a continuation bias and personality-specific
    /// randomisation. Vulnerable ghosts always take the farthest option.
    pub fn choose_direction_advanced<R>(
        &self,
        maze: MazeView<'_>,
        target: Vector2D,
        rng: &mut R,
    ) -> Direction
    where
        R: Rng + ?Sized,
    {
        let mut candidates = steering::candidates(&self.body, maze, target, Metric::Manhattan);
        if candidates.is_empty() {
            return Direction::None;
        }
        // Fleeing ghosts ignore the continuation bias.
        if self.is_vulnerable() {
            return steering::first_extreme(&candidates, true);
        }

        let current = self.direction();
        if let Some(candidate) = candidates
            .iter_mut()
            .find(|candidate| !current.is_none() && candidate.direction == current)
        {
            candidate.cost *= CONTINUATION_DISCOUNT;
        }
        personality::select(self.personality, candidates, current, rng)
    }

    /// Rolls whether this steering decision uses A*.
    pub fn should_use_astar<R>(&self, target: Vector2D, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        let distance = self.position().distance_to(target);
        let (base, cap) = personality::astar_odds(self.personality, distance);
        let chance = (base + self.difficulty.astar_bonus()).min(cap);
        rng.gen::<f64>() < chance
    }

    /// Advances every timer by `dt`, steers and moves at most one step.
    pub fn update<R>(
        &mut self,
        dt: Duration,
        context: &GhostContext,
        maze: MazeView<'_>,
        rng: &mut R,
    ) -> GhostUpdate
    where
        R: Rng + ?Sized,
    {
        if self.in_spawn_delay() {
            self.spawn_delay_remaining = self.spawn_delay_remaining.saturating_sub(dt);
            self.body.animate();
            if self.in_spawn_delay() {
                return GhostUpdate::Waiting;
            }
            debug!("{} ghost released from spawn", self.personality);
            return GhostUpdate::Released;
        }

        self.tick_vulnerability(dt);
        self.tick_mode(dt);

        if self.mode == GhostMode::Patrol {
            self.patrol_elapsed = self.patrol_elapsed.saturating_add(dt);
            if self.patrol_elapsed > PATROL_CHECK_INTERVAL {
                let tolerance = tuning(self.personality).patrol_tolerance;
                let _ = self.patrol.advance_if_reached(self.position(), tolerance);
                self.patrol_elapsed = Duration::ZERO;
            }
        }

        let target = self.target_position(context, maze);
        self.steer_elapsed = self.steer_elapsed.saturating_add(dt);
        self.path.age(dt);

        // Fleeing ghosts never follow search paths.
        let use_astar =
            self.astar_enabled && !self.is_vulnerable() && self.should_use_astar(target, rng);
        let cadence = if use_astar {
            ASTAR_STEER_INTERVAL
        } else {
            tuning(self.personality).steer_interval
        };
        if self.steer_elapsed > cadence {
            let direction = self.steer(use_astar, maze, target, rng);
            if !direction.is_none() {
                self.body.commit(direction);
            }
            self.steer_elapsed = Duration::ZERO;
        }

        if !self.body.can_move(self.direction(), maze) {
            if use_astar {
                self.path.clear();
            }
            let direction = self.steer(use_astar, maze, target, rng);
            self.body.commit(direction);
        }
        if self.body.can_move(self.direction(), maze) {
            self.body.step();
        }

        self.body.animate();
        GhostUpdate::Active
    }

    fn steer<R>(
        &mut self,
        use_astar: bool,
        maze: MazeView<'_>,
        target: Vector2D,
        rng: &mut R,
    ) -> Direction
    where
        R: Rng + ?Sized,
    {
        if use_astar {
            self.follow_path(maze, target, rng)
        } else {
            self.choose_direction_advanced(maze, target, rng)
        }
    }

    fn follow_path<R>(&mut self, maze: MazeView<'_>, target: Vector2D, rng: &mut R) -> Direction
    where
        R: Rng + ?Sized,
    {
        if self.path.needs_replan(target, self.astar_interval) {
            let path = self.search.find_path(maze, self.position(), target);
            self.path.replace(path, target);
        }

        if let Some(waypoint) = self.path.next_waypoint(self.position()) {
            let direction = Direction::dominant_axis(waypoint - self.position());
            if self.body.can_move(direction, maze) {
                return direction;
            }
        }
        self.choose_direction_advanced(maze, target, rng)
    }

    fn tick_vulnerability(&mut self, dt: Duration) {
        if !self.is_vulnerable() {
            return;
        }
        self.vulnerable_remaining = self.vulnerable_remaining.saturating_sub(dt);
        if self.vulnerable_remaining.is_zero() {
            self.condition = GhostCondition::Normal;
            self.body.set_speed(self.base_speed);
        }
    }

    fn tick_mode(&mut self, dt: Duration) {
        self.mode_elapsed = self.mode_elapsed.saturating_add(dt);
        let (limit, next) = match self.mode {
            GhostMode::Patrol => (self.difficulty.patrol_duration(), GhostMode::Chase),
            GhostMode::Chase => (self.difficulty.chase_duration(), GhostMode::Patrol),
        };
        if self.mode_elapsed > limit {
            self.mode = next;
            self.mode_elapsed = Duration::ZERO;
        }
    }
}
