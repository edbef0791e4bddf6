//! Optional TOML overrides for the campaign rules.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use maze_chase_world::Config;
use serde::Deserialize;

/// Rule overrides read from a TOML file; absent keys keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) player_speed: Option<f32>,
    pub(crate) ghost_speed: Option<f32>,
    pub(crate) starting_lives: Option<u32>,
    pub(crate) entity_size: Option<f32>,
    pub(crate) rng_seed: Option<u64>,
    pub(crate) stun_ms: Option<u64>,
    pub(crate) intermission_ms: Option<u64>,
    pub(crate) vulnerability_ms: Option<u64>,
    pub(crate) ghost_capture_bonus: Option<u32>,
    pub(crate) astar_enabled: Option<bool>,
}

impl GameConfig {
    /// Reads overrides from `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config file at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        for (name, value) in [
            ("player_speed", config.player_speed),
            ("ghost_speed", config.ghost_speed),
            ("entity_size", config.entity_size),
        ] {
            if let Some(value) = value {
                if !(value.is_finite() && value > 0.0) {
                    bail!("{name} must be a positive number, found {value}");
                }
            }
        }
        Ok(config)
    }

    /// Applies the overrides on top of the default rules.
    pub(crate) fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            player_speed: self.player_speed.unwrap_or(defaults.player_speed),
            ghost_speed: self.ghost_speed.unwrap_or(defaults.ghost_speed),
            starting_lives: self.starting_lives.unwrap_or(defaults.starting_lives),
            entity_size: self.entity_size.unwrap_or(defaults.entity_size),
            rng_seed: self.rng_seed.unwrap_or(defaults.rng_seed),
            stun_duration: self
                .stun_ms
                .map_or(defaults.stun_duration, Duration::from_millis),
            intermission_duration: self
                .intermission_ms
                .map_or(defaults.intermission_duration, Duration::from_millis),
            vulnerability_base: self
                .vulnerability_ms
                .map_or(defaults.vulnerability_base, Duration::from_millis),
            ghost_capture_bonus: self
                .ghost_capture_bonus
                .unwrap_or(defaults.ghost_capture_bonus),
            astar_enabled: self.astar_enabled.unwrap_or(defaults.astar_enabled),
        }
    }
}
