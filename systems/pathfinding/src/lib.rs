#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid-quantized A* search over the maze.
//!
//! Positions stay in pixel space; the search lattice is anchored at the start
//! position and steps one cell size at a time in the four cardinal
//! directions. Equal `f`-costs are resolved first-in first-out so that
//! identical inputs always produce identical paths.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use maze_chase_core::{EntityKind, MazeView, Vector2D, DEFAULT_CELL_SIZE};

/// Distance below which a search node counts as having reached the goal.
pub const GOAL_TOLERANCE: f32 = 8.0;

const NEIGHBOR_OFFSETS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Distance estimate guiding the search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// Sum of absolute axis differences.
    #[default]
    Manhattan,
    /// Straight-line distance.
    Euclidean,
    /// Largest absolute axis difference.
    Chebyshev,
}

impl Heuristic {
    /// Estimated remaining cost from `from` to `to`.
    #[must_use]
    pub fn estimate(self, from: Vector2D, to: Vector2D) -> f32 {
        match self {
            Self::Manhattan => from.manhattan_distance_to(to),
            Self::Euclidean => from.distance_to(to),
            Self::Chebyshev => from.chebyshev_distance_to(to),
        }
    }
}

/// Configured A* search.
///
/// Admissible neighbours are those where an entity of the configured kind
/// and size fits according to [`MazeView::is_valid_position`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AStar {
    heuristic: Heuristic,
    entity_kind: EntityKind,
    entity_size: f32,
}

impl Default for AStar {
    fn default() -> Self {
        Self::new(Heuristic::default())
    }
}

impl AStar {
    /// Creates a search that tests neighbours with ghost clearance.
    #[must_use]
    pub const fn new(heuristic: Heuristic) -> Self {
        Self {
            heuristic,
            entity_kind: EntityKind::Ghost,
            entity_size: DEFAULT_CELL_SIZE,
        }
    }

    /// Tests neighbours with the clearance of a different entity.
    #[must_use]
    pub const fn for_entity(mut self, kind: EntityKind, size: f32) -> Self {
        self.entity_kind = kind;
        self.entity_size = size;
        self
    }

    /// Heuristic guiding the search.
    #[must_use]
    pub const fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Computes a path from `start` to within [`GOAL_TOLERANCE`] of `goal`.
    ///
    /// The returned waypoints begin with `start` and are exactly one cell size
    /// apart. An empty vector means no route exists; callers are expected to
    /// fall back to heuristic steering.
    #[must_use]
    pub fn find_path(&self, maze: MazeView<'_>, start: Vector2D, goal: Vector2D) -> Vec<Vector2D> {
        let step = maze.cell_size();
        let position_of =
            |offset: (i32, i32)| start + Vector2D::new(offset.0 as f32 * step, offset.1 as f32 * step);

        let mut nodes = vec![SearchNode {
            offset: (0, 0),
            steps: 0,
            parent: None,
        }];
        let mut best_steps = HashMap::from([((0, 0), 0_u32)]);
        let mut open = BinaryHeap::new();
        let mut sequence = 0_u64;
        open.push(OpenEntry {
            cost: self.heuristic.estimate(start, goal),
            sequence,
            node: 0,
        });

        while let Some(entry) = open.pop() {
            let current = nodes[entry.node];
            if best_steps
                .get(&current.offset)
                .is_some_and(|&steps| steps < current.steps)
            {
                continue;
            }

            let position = position_of(current.offset);
            if position.distance_to(goal) < GOAL_TOLERANCE {
                return reconstruct(&nodes, entry.node, position_of);
            }

            for (dx, dy) in NEIGHBOR_OFFSETS {
                let offset = (current.offset.0 + dx, current.offset.1 + dy);
                let steps = current.steps + 1;
                if best_steps.get(&offset).is_some_and(|&seen| seen <= steps) {
                    continue;
                }

                let neighbor = position_of(offset);
                if !maze.is_valid_position(neighbor, self.entity_size, self.entity_kind) {
                    continue;
                }

                let _ = best_steps.insert(offset, steps);
                nodes.push(SearchNode {
                    offset,
                    steps,
                    parent: Some(entry.node),
                });
                sequence += 1;
                open.push(OpenEntry {
                    cost: steps as f32 * step + self.heuristic.estimate(neighbor, goal),
                    sequence,
                    node: nodes.len() - 1,
                });
            }
        }

        Vec::new()
    }
}

/// Runs a Manhattan-guided search with ghost clearance.
#[must_use]
pub fn find_path(maze: MazeView<'_>, start: Vector2D, goal: Vector2D) -> Vec<Vector2D> {
    AStar::default().find_path(maze, start, goal)
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    offset: (i32, i32),
    steps: u32,
    parent: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    cost: f32,
    sequence: u64,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // Reversed so the max-heap yields the cheapest, then oldest, entry.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

fn reconstruct<F>(nodes: &[SearchNode], goal: usize, position_of: F) -> Vec<Vector2D>
where
    F: Fn((i32, i32)) -> Vector2D,
{
    let mut path = Vec::new();
    let mut cursor = Some(goal);
    while let Some(index) = cursor {
        let node = nodes[index];
        path.push(position_of(node.offset));
        cursor = node.parent;
    }
    path.reverse();
    path
}
