//! Per-personality targeting and direction-selection tuning.

use std::time::Duration;

use maze_chase_core::{Direction, GhostPersonality, Vector2D};
use rand::{seq::SliceRandom, Rng};

use crate::steering::{first_extreme, Candidate};

const AMBUSH_LEAD_CELLS: f32 = 4.0;
const FLANK_LEAD_CELLS: f32 = 2.0;
const OPPORTUNIST_COMFORT_DISTANCE: f32 = 80.0;
const OPPORTUNIST_FAR_BAND: f32 = 150.0;

/// Tuning constants attached to a personality.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    /// Distance at which the current patrol waypoint counts as reached.
    pub patrol_tolerance: f32,
    /// Re-steering cadence when steering heuristically.
    pub steer_interval: Duration,
}

/// Tuning table lookup.
#[must_use]
pub fn tuning(personality: GhostPersonality) -> Tuning {
    let (patrol_tolerance, steer_millis) = match personality {
        GhostPersonality::Chaser => (28.0, 250),
        GhostPersonality::Ambusher => (35.0, 400),
        GhostPersonality::Flanker => (30.0, 350),
        GhostPersonality::Opportunist => (40.0, 500),
    };
    Tuning {
        patrol_tolerance,
        steer_interval: Duration::from_millis(steer_millis),
    }
}

/// Chance of steering with A* before the difficulty bonus, and its ceiling.
///
/// `distance` is the ghost's distance to its target; only the opportunist
/// looks at it.
pub(crate) fn astar_odds(personality: GhostPersonality, distance: f32) -> (f64, f64) {
    match personality {
        GhostPersonality::Chaser => (0.9, 1.0),
        GhostPersonality::Ambusher => (0.6, 0.95),
        GhostPersonality::Flanker => (0.85, 1.0),
        GhostPersonality::Opportunist if distance > OPPORTUNIST_FAR_BAND => (0.8, 1.0),
        GhostPersonality::Opportunist if distance > OPPORTUNIST_COMFORT_DISTANCE => (0.5, 0.95),
        GhostPersonality::Opportunist => (0.2, 0.8),
    }
}

/// Inputs to chase-mode targeting.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ChaseInputs {
    pub(crate) ghost: Vector2D,
    pub(crate) player: Vector2D,
    pub(crate) player_direction: Direction,
    pub(crate) chaser: Option<Vector2D>,
    pub(crate) cell_size: f32,
    pub(crate) flee_corner: Vector2D,
}

/// Chase-mode target for the provided personality.
pub(crate) fn chase_target(personality: GhostPersonality, inputs: ChaseInputs) -> Vector2D {
    let ahead = |cells: f32| {
        inputs.player + inputs.player_direction.unit_vector() * (inputs.cell_size * cells)
    };
    match personality {
        GhostPersonality::Chaser => inputs.player,
        GhostPersonality::Ambusher => ahead(AMBUSH_LEAD_CELLS),
        GhostPersonality::Flanker => match inputs.chaser {
            Some(chaser) => ahead(FLANK_LEAD_CELLS).midpoint(chaser),
            None => inputs.player,
        },
        GhostPersonality::Opportunist => {
            if inputs.ghost.distance_to(inputs.player) > OPPORTUNIST_COMFORT_DISTANCE {
                inputs.player
            } else {
                inputs.flee_corner
            }
        }
    }
}

/// Picks among open candidates the way the personality likes to.
///
/// `candidates` must not be empty and must be in [`Direction::CARDINALS`]
/// order.
pub(crate) fn select<R>(
    personality: GhostPersonality,
    mut candidates: Vec<Candidate>,
    current: Direction,
    rng: &mut R,
) -> Direction
where
    R: Rng + ?Sized,
{
    match personality {
        GhostPersonality::Chaser => {
            if rng.gen::<f64>() < 0.05 {
                let leading = &candidates[..candidates.len().min(2)];
                if let Some(pick) = leading.choose(rng) {
                    return pick.direction;
                }
            }
            first_extreme(&candidates, false)
        }
        GhostPersonality::Ambusher => {
            if rng.gen::<f64>() < 0.2 {
                if let Some(pick) = candidates.choose(rng) {
                    return pick.direction;
                }
            }
            if rng.gen::<f64>() < 0.3 && candidates.len() > 1 {
                candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));
                return candidates[1].direction;
            }
            first_extreme(&candidates, false)
        }
        GhostPersonality::Flanker => {
            if !current.is_none() {
                let reverse = current.opposite();
                let forward: Vec<Candidate> = candidates
                    .iter()
                    .copied()
                    .filter(|candidate| candidate.direction != reverse)
                    .collect();
                if !forward.is_empty() && rng.gen::<f64>() < 0.8 {
                    candidates = forward;
                }
            }
            if rng.gen::<f64>() < 0.15 {
                let leading = &candidates[..candidates.len().min(3)];
                return first_extreme(leading, true);
            }
            first_extreme(&candidates, false)
        }
        GhostPersonality::Opportunist => {
            let roll = rng.gen::<f64>();
            if roll < 0.25 {
                if let Some(pick) = candidates.choose(rng) {
                    return pick.direction;
                }
            }
            if roll < 0.4 {
                return first_extreme(&candidates, true);
            }
            if roll < 0.6 && candidates.len() > 2 {
                candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));
                return candidates[candidates.len() / 2].direction;
            }
            first_extreme(&candidates, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn inputs() -> ChaseInputs {
        ChaseInputs {
            ghost: Vector2D::new(300.0, 300.0),
            player: Vector2D::new(100.0, 100.0),
            player_direction: Direction::Right,
            chaser: Some(Vector2D::new(200.0, 60.0)),
            cell_size: 16.0,
            flee_corner: Vector2D::new(24.0, 312.0),
        }
    }

    #[test]
    fn chase_targets_follow_each_personality() {
        let inputs = inputs();
        assert_eq!(chase_target(GhostPersonality::Chaser, inputs), inputs.player);
        assert_eq!(
            chase_target(GhostPersonality::Ambusher, inputs),
            Vector2D::new(164.0, 100.0)
        );
        assert_eq!(
            chase_target(GhostPersonality::Flanker, inputs),
            Vector2D::new(166.0, 80.0)
        );
        assert_eq!(chase_target(GhostPersonality::Opportunist, inputs), inputs.player);
    }

    #[test]
    fn flanker_without_chaser_targets_player() {
        let inputs = ChaseInputs {
            chaser: None,
            ..inputs()
        };
        assert_eq!(chase_target(GhostPersonality::Flanker, inputs), inputs.player);
    }

    #[test]
    fn ambusher_targets_player_when_standing_still() {
        let inputs = ChaseInputs {
            player_direction: Direction::None,
            ..inputs()
        };
        assert_eq!(chase_target(GhostPersonality::Ambusher, inputs), inputs.player);
    }

    #[test]
    fn opportunist_flees_when_close() {
        let inputs = ChaseInputs {
            ghost: Vector2D::new(140.0, 100.0),
            ..inputs()
        };
        assert_eq!(
            chase_target(GhostPersonality::Opportunist, inputs),
            inputs.flee_corner
        );
    }

    #[test]
    fn high_rolls_take_the_cheapest_option() {
        let candidates = vec![
            Candidate {
                direction: Direction::Up,
                cost: 30.0,
            },
            Candidate {
                direction: Direction::Left,
                cost: 10.0,
            },
            Candidate {
                direction: Direction::Right,
                cost: 20.0,
            },
        ];
        for personality in GhostPersonality::ALL {
            let mut rng = StepRng::new(u64::MAX, 0);
            assert_eq!(
                select(personality, candidates.clone(), Direction::None, &mut rng),
                Direction::Left,
                "{personality}"
            );
        }
    }

    #[test]
    fn opportunist_odds_depend_on_distance() {
        assert_eq!(astar_odds(GhostPersonality::Opportunist, 200.0), (0.8, 1.0));
        assert_eq!(astar_odds(GhostPersonality::Opportunist, 100.0), (0.5, 0.95));
        assert_eq!(astar_odds(GhostPersonality::Opportunist, 20.0), (0.2, 0.8));
    }

    #[test]
    fn tuning_table_matches_cadences() {
        assert_eq!(
            tuning(GhostPersonality::Chaser).steer_interval,
            Duration::from_millis(250)
        );
        assert!((tuning(GhostPersonality::Opportunist).patrol_tolerance - 40.0).abs() < f32::EPSILON);
    }
}
