#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the maze-chase simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened during the tick. Systems read the maze exclusively through
//! [`MazeView`], which offers queries but no mutation.

mod geometry;
mod maze;

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use geometry::{Vector2D, POSITION_EPSILON};
pub use maze::{
    CellCode, CellCoord, Maze, MazeError, MazeMetadata, MazeView, Pellet, PelletKind,
    DEFAULT_CELL_SIZE, MAX_DIFFICULTY,
};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Reloads the ordered map list, resets the campaign and starts its first map.
    StartCampaign,
    /// Queues a turn for the player; it is committed once the way is clear.
    RequestDirection {
        /// Direction the player would like to travel in.
        direction: Direction,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a map finished loading and play is about to begin on it.
    MapLoaded {
        /// Summary of the map that became active.
        summary: MapSummary,
        /// Number of pellets and power-ups placed on the map.
        pellets: usize,
    },
    /// Reports that the requested map failed to load and the built-in maze replaced it.
    FallbackMazeLoaded {
        /// Identifier of the map that could not be loaded.
        requested: MapId,
        /// Human readable reason for the failure.
        reason: String,
    },
    /// Confirms that the player consumed a pellet or power-up.
    PelletEaten {
        /// Pixel-space centre of the consumed pellet.
        position: Vector2D,
        /// Type of pellet that was consumed.
        kind: PelletKind,
        /// Points awarded for the pellet.
        points: u32,
    },
    /// Announces that a power-up turned every ghost vulnerable.
    PowerUpActivated,
    /// Confirms that the player captured a vulnerable ghost.
    GhostCaptured {
        /// Personality of the captured ghost.
        personality: GhostPersonality,
        /// Bonus points awarded for the capture.
        bonus: u32,
    },
    /// Reports that a captured ghost finished its spawn delay.
    GhostReleased {
        /// Personality of the released ghost.
        personality: GhostPersonality,
    },
    /// Reports that a normal ghost caught the player.
    LifeLost {
        /// Lives left after the loss.
        remaining: u32,
    },
    /// Announces that the round entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: RoundPhase,
    },
    /// Reports that every pellet on the current map was consumed.
    MapCleared {
        /// Score earned on the cleared map.
        score: u32,
        /// Campaign total after adding the map score.
        campaign_total: u32,
    },
    /// Reports that the final map of the campaign was cleared.
    CampaignWon {
        /// Total score accumulated across the campaign.
        total_score: u32,
    },
    /// Reports that the player ran out of lives.
    CampaignLost {
        /// Score held by the player when the last life was lost.
        score: u32,
    },
}

/// Discrete movement directions. Screen space: `Up` decreases `y`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing `y`.
    Up,
    /// Movement toward increasing `y`.
    Down,
    /// Movement toward decreasing `x`.
    Left,
    /// Movement toward increasing `x`.
    Right,
    /// No movement.
    #[default]
    None,
}

impl Direction {
    /// The four movement directions in evaluation order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit-step vector associated with the direction.
    #[must_use]
    pub const fn unit_vector(self) -> Vector2D {
        match self {
            Self::Up => Vector2D::new(0.0, -1.0),
            Self::Down => Vector2D::new(0.0, 1.0),
            Self::Left => Vector2D::new(-1.0, 0.0),
            Self::Right => Vector2D::new(1.0, 0.0),
            Self::None => Vector2D::new(0.0, 0.0),
        }
    }

    /// Direction whose unit vector is the negation of this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    /// Reports whether the direction describes no movement.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Picks the direction of the dominant axis of `delta`.
    ///
    /// A strictly larger horizontal magnitude selects `Left`/`Right`; ties and
    /// vertical dominance select `Up`/`Down`.
    #[must_use]
    pub fn dominant_axis(delta: Vector2D) -> Self {
        if delta.x().abs() > delta.y().abs() {
            if delta.x() > 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if delta.y() > 0.0 {
            Self::Down
        } else {
            Self::Up
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
        };
        f.write_str(label)
    }
}

/// Error returned when text does not name a [`Direction`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not a direction (expected up, down, left, right or none)")]
pub struct DirectionParseError(pub String);

impl FromStr for Direction {
    type Err = DirectionParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Self::Up),
            "down" | "d" => Ok(Self::Down),
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            "none" | "n" => Ok(Self::None),
            _ => Err(DirectionParseError(value.to_owned())),
        }
    }
}

/// Entity categories that receive distinct wall clearance margins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player, tested with the widest box for precise cornering.
    Player,
    /// Ghosts, tested with a smaller box so searches do not deadlock.
    Ghost,
    /// Anything else, tested with the smallest box.
    Other,
}

impl EntityKind {
    /// Half-extent of the bounding box tested against walls for an entity of `size` pixels.
    #[must_use]
    pub fn clearance(self, size: f32) -> f32 {
        let divisor = match self {
            Self::Player => 2.125,
            Self::Ghost => 3.0,
            Self::Other => 4.0,
        };
        (size / divisor).floor()
    }
}

/// The four fixed ghost targeting strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GhostPersonality {
    /// Targets the player directly.
    Chaser,
    /// Targets a point ahead of the player.
    Ambusher,
    /// Targets a point mirrored around the chaser.
    Flanker,
    /// Chases from afar and flees up close.
    Opportunist,
}

impl GhostPersonality {
    /// Every personality in spawn order.
    pub const ALL: [GhostPersonality; 4] = [
        GhostPersonality::Chaser,
        GhostPersonality::Ambusher,
        GhostPersonality::Flanker,
        GhostPersonality::Opportunist,
    ];

    /// Name of the spawn point (and patrol route) reserved for this personality in map files.
    #[must_use]
    pub const fn spawn_key(self) -> &'static str {
        match self {
            Self::Chaser => "ghost_red",
            Self::Ambusher => "ghost_pink",
            Self::Flanker => "ghost_cyan",
            Self::Opportunist => "ghost_orange",
        }
    }
}

impl fmt::Display for GhostPersonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Chaser => "chaser",
            Self::Ambusher => "ambusher",
            Self::Flanker => "flanker",
            Self::Opportunist => "opportunist",
        };
        f.write_str(label)
    }
}

/// Tactical phase of a ghost, independent of vulnerability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostMode {
    /// Walks a fixed route of waypoints.
    #[default]
    Patrol,
    /// Pursues its personality-specific target.
    Chase,
}

/// Whether a ghost can currently be captured by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhostCondition {
    /// The ghost costs the player a life on contact.
    #[default]
    Normal,
    /// The ghost flees and can be captured for bonus points.
    Vulnerable,
}

/// Phase of the round state machine owned by the world.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RoundPhase {
    /// No campaign has been started yet.
    #[default]
    Idle,
    /// Entities move and collisions resolve every tick.
    Playing,
    /// Short pause after a non-fatal life loss.
    Stunned {
        /// Time left before play resumes.
        remaining: Duration,
    },
    /// Pause between a cleared map and the next one.
    Intermission {
        /// Time left before the next map loads.
        remaining: Duration,
        /// Map that loads once the intermission ends.
        next: MapSummary,
    },
    /// Every map of the campaign was cleared.
    Victory,
    /// The player ran out of lives.
    Defeat,
}

impl RoundPhase {
    /// Reports whether the round reached victory or defeat.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// Stable identifier a map provider uses to locate a map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapId(String);

impl MapId {
    /// Wraps the provided identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed textual form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Listing entry describing an available map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    /// Identifier used to load the map.
    pub id: MapId,
    /// Display name of the map.
    pub name: String,
    /// Difficulty level in the range 0..=200.
    pub difficulty: u8,
    /// Free-form description.
    pub description: String,
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
}

/// Symbolic sound cues raised by gameplay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// A normal pellet was eaten.
    PelletEaten,
    /// A power-up was eaten and ghosts turned vulnerable.
    PowerUp,
    /// A vulnerable ghost was captured.
    GhostEaten,
    /// The player lost a life.
    LifeLost,
    /// A map was cleared and the next one follows.
    MapCleared,
    /// The campaign was won.
    Victory,
    /// The campaign was lost.
    GameOver,
}

impl SoundCue {
    /// Symbolic name understood by audio back-ends.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PelletEaten => "pellet-eaten",
            Self::PowerUp => "power-up",
            Self::GhostEaten => "ghost-eaten",
            Self::LifeLost => "life-lost",
            Self::MapCleared => "map-cleared",
            Self::Victory => "victory",
            Self::GameOver => "game-over",
        }
    }
}

/// Fire-and-forget receiver for sound cues. Implementations must not block.
pub trait CueSink: fmt::Debug {
    /// Requests playback of the provided cue.
    fn play_cue(&mut self, cue: SoundCue);
}

/// Cue sink that discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentCues;

impl CueSink for SilentCues {
    fn play_cue(&mut self, _cue: SoundCue) {}
}
