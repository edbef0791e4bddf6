//! Map difficulty and the timings derived from it.

use std::{fmt, time::Duration};

const BASE_ASTAR_INTERVAL_MS: f64 = 2000.0;
const MIN_ASTAR_INTERVAL_MS: f64 = 200.0;
const MIN_VULNERABLE_MS: f64 = 1000.0;
const BASE_PATROL_MS: f64 = 10_000.0;
const MIN_PATROL_MS: f64 = 2000.0;
const BASE_CHASE_MS: f64 = 15_000.0;
const MAX_CHASE_MS: f64 = 40_000.0;

/// Difficulty applied uniformly to every ghost when a map loads.
///
/// Levels run from 0 to 200; the derived factor runs from 0 to 2 and the
/// multiplier from 1 to 3.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Difficulty {
    level: u8,
    factor: f64,
}

impl Difficulty {
    /// Difficulty for the provided map level.
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        Self {
            level,
            factor: (f64::from(level) / 100.0).min(2.0),
        }
    }

    /// Map level the difficulty was derived from.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Multiplier in `1.0..=3.0`.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        1.0 + self.factor
    }

    /// Interval after which a cached A* path is recomputed.
    #[must_use]
    pub fn astar_interval(&self) -> Duration {
        let millis = BASE_ASTAR_INTERVAL_MS * (1.0 - self.factor * 0.4);
        millis_to_duration(millis.max(MIN_ASTAR_INTERVAL_MS))
    }

    /// Vulnerability window granted by a power-up with the provided base length.
    #[must_use]
    pub fn vulnerable_duration(&self, base: Duration) -> Duration {
        let millis = base.as_secs_f64() * 1000.0 * (1.0 - self.factor * 0.85);
        millis_to_duration(millis.max(MIN_VULNERABLE_MS))
    }

    /// Length of a patrol window.
    #[must_use]
    pub fn patrol_duration(&self) -> Duration {
        let millis = BASE_PATROL_MS * (1.0 - self.factor * 0.45);
        millis_to_duration(millis.max(MIN_PATROL_MS))
    }

    /// Length of a chase window.
    #[must_use]
    pub fn chase_duration(&self) -> Duration {
        let millis = BASE_CHASE_MS * (1.0 + self.factor * 0.8);
        millis_to_duration(millis.min(MAX_CHASE_MS))
    }

    /// Extra probability of choosing A* over heuristic steering.
    #[must_use]
    pub fn astar_bonus(&self) -> f64 {
        self.factor * 0.6
    }

    /// Human-facing band the level falls into.
    #[must_use]
    pub fn tier(&self) -> DifficultyTier {
        DifficultyTier::from_level(self.level)
    }
}

fn millis_to_duration(millis: f64) -> Duration {
    Duration::from_millis(millis.round() as u64)
}

/// Named difficulty bands shown in map listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DifficultyTier {
    /// Levels 0 to 24.
    VeryEasy,
    /// Levels 25 to 49.
    EasyPlus,
    /// Levels 50 to 74.
    Medium,
    /// Levels 75 to 99.
    MediumPlus,
    /// Levels 100 to 124.
    Hard,
    /// Levels 125 to 149.
    HardPlus,
    /// Levels 150 to 174.
    VeryHard,
    /// Levels 175 and above.
    Extreme,
}

impl DifficultyTier {
    /// Band containing `level`.
    #[must_use]
    pub fn from_level(level: u8) -> Self {
        match level {
            175.. => Self::Extreme,
            150..=174 => Self::VeryHard,
            125..=149 => Self::HardPlus,
            100..=124 => Self::Hard,
            75..=99 => Self::MediumPlus,
            50..=74 => Self::Medium,
            25..=49 => Self::EasyPlus,
            _ => Self::VeryEasy,
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VeryEasy => "very easy",
            Self::EasyPlus => "easy+",
            Self::Medium => "medium",
            Self::MediumPlus => "medium+",
            Self::Hard => "hard",
            Self::HardPlus => "hard+",
            Self::VeryHard => "very hard",
            Self::Extreme => "extreme",
        };
        f.write_str(label)
    }
}
