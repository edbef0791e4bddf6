//! Maze grid, wall queries, and the single pellet-removal mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EntityKind, Vector2D};

/// Edge length of a grid cell when a map does not override it.
pub const DEFAULT_CELL_SIZE: f32 = 16.0;

/// Highest difficulty a map may declare.
pub const MAX_DIFFICULTY: u8 = 200;

const DEFAULT_SPAWNS: [(&str, CellCoord); 5] = [
    ("player", CellCoord::new(1, 1)),
    ("ghost_red", CellCoord::new(17, 9)),
    ("ghost_pink", CellCoord::new(18, 9)),
    ("ghost_cyan", CellCoord::new(17, 10)),
    ("ghost_orange", CellCoord::new(18, 10)),
];

/// Code stored in each grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellCode {
    /// Walkable, nothing to collect.
    Empty,
    /// Impassable.
    Wall,
    /// Walkable cell holding a normal pellet.
    Pellet,
    /// Walkable cell holding a power-up.
    PowerUp,
}

impl CellCode {
    /// Numeric code used by map files.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Wall => 1,
            Self::Pellet => 2,
            Self::PowerUp => 3,
        }
    }

    /// Decodes a numeric map-file code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Wall),
            2 => Some(Self::Pellet),
            3 => Some(Self::PowerUp),
            _ => None,
        }
    }

    const fn pellet_kind(self) -> Option<PelletKind> {
        match self {
            Self::Pellet => Some(PelletKind::Normal),
            Self::PowerUp => Some(PelletKind::PowerUp),
            Self::Empty | Self::Wall => None,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Type of collectible placed on the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PelletKind {
    /// Regular pellet.
    Normal,
    /// Power-up that turns ghosts vulnerable.
    PowerUp,
}

impl PelletKind {
    /// Points awarded when the pellet is consumed.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Normal => 10,
            Self::PowerUp => 50,
        }
    }
}

/// Collectible derived from the maze grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pellet {
    /// Pixel-space centre of the pellet's cell.
    pub position: Vector2D,
    /// Type of the pellet.
    pub kind: PelletKind,
    /// Points awarded on consumption.
    pub value: u32,
}

/// Descriptive data attached to a maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MazeMetadata {
    name: String,
    difficulty: u8,
    description: String,
}

impl MazeMetadata {
    /// Creates metadata, clamping `difficulty` into `0..=200`.
    #[must_use]
    pub fn new(name: impl Into<String>, difficulty: i64, description: impl Into<String>) -> Self {
        let clamped = difficulty.clamp(0, i64::from(MAX_DIFFICULTY));
        Self {
            name: name.into(),
            difficulty: u8::try_from(clamped).unwrap_or(MAX_DIFFICULTY),
            description: description.into(),
        }
    }

    /// Display name of the maze.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Difficulty level in the range 0..=200.
    #[must_use]
    pub const fn difficulty(&self) -> u8 {
        self.difficulty
    }

    /// Free-form description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Reasons a grid cannot become a [`Maze`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MazeError {
    /// The layout contains no rows or no columns.
    #[error("maze layout is empty")]
    EmptyLayout,
    /// A row's length differs from the first row.
    #[error("row {row} has {found} cells but the first row has {expected}")]
    RaggedRow {
        /// Offending row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A cell holds a code outside `0..=3`.
    #[error("cell ({column}, {row}) holds unknown code {code}")]
    InvalidCell {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        column: usize,
        /// Code found in the cell.
        code: u8,
    },
    /// The cell size is not a positive finite number.
    #[error("cell size {0} must be positive")]
    InvalidCellSize(f32),
}

/// Grid-based maze that answers wall queries and owns the pellet layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    columns: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<CellCode>,
    original: Vec<CellCode>,
    metadata: MazeMetadata,
    spawns: BTreeMap<String, CellCoord>,
    patrol_routes: BTreeMap<String, Vec<CellCoord>>,
}

impl Maze {
    /// Builds a maze from numeric map-file rows.
    pub fn from_rows(
        rows: &[Vec<u8>],
        cell_size: f32,
        metadata: MazeMetadata,
    ) -> Result<Self, MazeError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(MazeError::InvalidCellSize(cell_size));
        }
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(MazeError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(expected * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(MazeError::RaggedRow {
                    row: row_index,
                    expected,
                    found: row.len(),
                });
            }
            for (column_index, &code) in row.iter().enumerate() {
                let cell = CellCode::from_code(code).ok_or(MazeError::InvalidCell {
                    row: row_index,
                    column: column_index,
                    code,
                })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            columns: u32::try_from(expected).map_err(|_| MazeError::EmptyLayout)?,
            rows: u32::try_from(rows.len()).map_err(|_| MazeError::EmptyLayout)?,
            cell_size,
            original: cells.clone(),
            cells,
            metadata,
            spawns: BTreeMap::new(),
            patrol_routes: BTreeMap::new(),
        })
    }

    /// Registers a named spawn point expressed in grid space.
    #[must_use]
    pub fn with_spawn(mut self, name: impl Into<String>, cell: CellCoord) -> Self {
        let _ = self.spawns.insert(name.into(), cell);
        self
    }

    /// Registers a named patrol route expressed in grid space.
    #[must_use]
    pub fn with_patrol_route(mut self, name: impl Into<String>, route: Vec<CellCoord>) -> Self {
        let _ = self.patrol_routes.insert(name.into(), route);
        self
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Pixel edge length of one cell.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Total width in pixels.
    #[must_use]
    pub fn pixel_width(&self) -> f32 {
        self.columns as f32 * self.cell_size
    }

    /// Total height in pixels.
    #[must_use]
    pub fn pixel_height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Descriptive metadata.
    #[must_use]
    pub const fn metadata(&self) -> &MazeMetadata {
        &self.metadata
    }

    /// Spawn points declared by the map, in grid space.
    #[must_use]
    pub const fn spawn_cells(&self) -> &BTreeMap<String, CellCoord> {
        &self.spawns
    }

    /// Patrol routes declared by the map, in grid space.
    #[must_use]
    pub const fn patrol_route_cells(&self) -> &BTreeMap<String, Vec<CellCoord>> {
        &self.patrol_routes
    }

    /// Current code of the provided cell.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<CellCode> {
        self.index(cell).and_then(|index| self.cells.get(index).copied())
    }

    /// Current grid as numeric map-file rows.
    #[must_use]
    pub fn layout_rows(&self) -> Vec<Vec<u8>> {
        let width = usize::try_from(self.columns).unwrap_or(0);
        if width == 0 {
            return Vec::new();
        }
        self.cells
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.code()).collect())
            .collect()
    }

    /// Pixel-space centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vector2D {
        let half = (self.cell_size / 2.0).floor();
        Vector2D::new(
            cell.column() as f32 * self.cell_size + half,
            cell.row() as f32 * self.cell_size + half,
        )
    }

    /// Grid cell containing the pixel position, if it lies inside the maze.
    #[must_use]
    pub fn cell_at(&self, position: Vector2D) -> Option<CellCoord> {
        let column = (position.x() / self.cell_size).floor();
        let row = (position.y() / self.cell_size).floor();
        if column < 0.0 || row < 0.0 {
            return None;
        }
        let column = column as u32;
        let row = row as u32;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        Some(CellCoord::new(column, row))
    }

    /// Out-of-bounds positions count as walls.
    #[must_use]
    pub fn is_wall(&self, position: Vector2D) -> bool {
        self.cell_at(position)
            .and_then(|cell| self.cell(cell))
            .map_or(true, |code| code == CellCode::Wall)
    }

    /// Tests the four corners of the entity's clearance box against walls.
    #[must_use]
    pub fn is_valid_position(&self, position: Vector2D, entity_size: f32, kind: EntityKind) -> bool {
        let half = kind.clearance(entity_size);
        let corners = [
            Vector2D::new(position.x() - half, position.y() - half),
            Vector2D::new(position.x() + half, position.y() - half),
            Vector2D::new(position.x() - half, position.y() + half),
            Vector2D::new(position.x() + half, position.y() + half),
        ];
        corners.iter().all(|corner| !self.is_wall(*corner))
    }

    /// Clears the pellet or power-up under `position`.
    ///
    /// Returns the kind of collectible that was removed, or `None` when the
    /// cell held nothing to collect. Calling it twice for the same cell is a
    /// no-op the second time.
    pub fn remove_pellet_at(&mut self, position: Vector2D) -> Option<PelletKind> {
        let index = self.cell_at(position).and_then(|cell| self.index(cell))?;
        let slot = self.cells.get_mut(index)?;
        let kind = slot.pellet_kind()?;
        *slot = CellCode::Empty;
        Some(kind)
    }

    /// Pellets and power-ups still present on the grid, in row-major order.
    #[must_use]
    pub fn pellets(&self) -> Vec<Pellet> {
        let width = usize::try_from(self.columns).unwrap_or(0);
        if width == 0 {
            return Vec::new();
        }
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, code)| {
                let kind = code.pellet_kind()?;
                let cell = CellCoord::new((index % width) as u32, (index / width) as u32);
                Some(Pellet {
                    position: self.cell_center(cell),
                    kind,
                    value: kind.points(),
                })
            })
            .collect()
    }

    /// Number of pellet and power-up cells left.
    #[must_use]
    pub fn pellet_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|code| code.pellet_kind().is_some())
            .count()
    }

    /// Restores every pellet consumed since construction.
    pub fn reset(&mut self) {
        self.cells.clone_from(&self.original);
    }

    /// Pixel-space spawn coordinate for a named entity.
    ///
    /// Maps that declare no spawns use the built-in table; an unknown name
    /// resolves to `(cell_size, cell_size)`.
    #[must_use]
    pub fn spawn_position(&self, name: &str) -> Vector2D {
        let cell = if self.spawns.is_empty() {
            DEFAULT_SPAWNS
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, cell)| *cell)
        } else {
            self.spawns.get(name).copied()
        };
        cell.map_or_else(
            || Vector2D::new(self.cell_size, self.cell_size),
            |cell| self.cell_center(cell),
        )
    }

    /// Pixel-space patrol route registered under `name`, if any.
    #[must_use]
    pub fn patrol_route(&self, name: &str) -> Option<Vec<Vector2D>> {
        self.patrol_routes
            .get(name)
            .map(|route| route.iter().map(|cell| self.cell_center(*cell)).collect())
    }

    /// Read-only handle handed to entities and systems.
    #[must_use]
    pub const fn view(&self) -> MazeView<'_> {
        MazeView { maze: self }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Read-only view into the maze used by movement, pathfinding and ghost AI.
#[derive(Clone, Copy, Debug)]
pub struct MazeView<'a> {
    maze: &'a Maze,
}

impl<'a> MazeView<'a> {
    /// Out-of-bounds positions count as walls.
    #[must_use]
    pub fn is_wall(&self, position: Vector2D) -> bool {
        self.maze.is_wall(position)
    }

    /// Tests the entity's clearance box against walls.
    #[must_use]
    pub fn is_valid_position(&self, position: Vector2D, entity_size: f32, kind: EntityKind) -> bool {
        self.maze.is_valid_position(position, entity_size, kind)
    }

    /// Pixel edge length of one cell.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.maze.cell_size()
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.maze.columns(), self.maze.rows())
    }

    /// Pixel-space centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vector2D {
        self.maze.cell_center(cell)
    }

    /// Pixel-space spawn coordinate for a named entity.
    #[must_use]
    pub fn spawn_position(&self, name: &str) -> Vector2D {
        self.maze.spawn_position(name)
    }

    /// Borrows the underlying maze immutably.
    #[must_use]
    pub fn maze(&self) -> &'a Maze {
        self.maze
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bordered_room() -> Maze {
        let rows = vec![
            vec![1, 1, 1, 1, 1, 1],
            vec![1, 2, 0, 0, 3, 1],
            vec![1, 0, 1, 1, 0, 1],
            vec![1, 0, 1, 1, 0, 1],
            vec![1, 2, 0, 0, 2, 1],
            vec![1, 1, 1, 1, 1, 1],
        ];
        Maze::from_rows(&rows, 16.0, MazeMetadata::new("room", 50, "")).expect("valid maze")
    }

    #[test]
    fn rejects_ragged_rows() {
        let rows = vec![vec![1, 1, 1], vec![1, 0]];
        let error = Maze::from_rows(&rows, 16.0, MazeMetadata::new("bad", 0, ""))
            .expect_err("ragged rows must fail");
        assert_eq!(
            error,
            MazeError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn rejects_unknown_cell_codes() {
        let rows = vec![vec![1, 7]];
        assert!(matches!(
            Maze::from_rows(&rows, 16.0, MazeMetadata::new("bad", 0, "")),
            Err(MazeError::InvalidCell { code: 7, .. })
        ));
    }

    #[test]
    fn metadata_clamps_difficulty() {
        assert_eq!(MazeMetadata::new("a", -5, "").difficulty(), 0);
        assert_eq!(MazeMetadata::new("a", 450, "").difficulty(), MAX_DIFFICULTY);
        assert_eq!(MazeMetadata::new("a", 120, "").difficulty(), 120);
    }

    #[test]
    fn out_of_bounds_counts_as_wall() {
        let maze = bordered_room();
        assert!(maze.is_wall(Vector2D::new(-1.0, 24.0)));
        assert!(maze.is_wall(Vector2D::new(24.0, 200.0)));
        assert!(!maze.is_wall(Vector2D::new(24.0, 24.0)));
        assert!(maze.is_wall(Vector2D::new(8.0, 8.0)));
    }

    #[test]
    fn positions_inside_thick_walls_are_invalid_for_every_kind() {
        let maze = bordered_room();
        let inside_wall_block = [
            Vector2D::new(40.0, 40.0),
            Vector2D::new(48.0, 48.0),
            Vector2D::new(55.0, 52.0),
        ];
        for position in inside_wall_block {
            for kind in [EntityKind::Player, EntityKind::Ghost, EntityKind::Other] {
                assert!(!maze.is_valid_position(position, 16.0, kind));
            }
        }
    }

    #[test]
    fn ghost_clearance_is_more_forgiving_than_player() {
        let maze = bordered_room();
        let off_centre = Vector2D::new(22.0, 24.0);
        assert!(maze.is_valid_position(off_centre, 16.0, EntityKind::Ghost));
        assert!(!maze.is_valid_position(off_centre, 16.0, EntityKind::Player));
    }

    #[test]
    fn pellet_removal_is_idempotent() {
        let mut maze = bordered_room();
        let pellet = maze.cell_center(CellCoord::new(1, 1));
        let power_up = maze.cell_center(CellCoord::new(4, 1));

        assert_eq!(maze.pellet_count(), 4);
        assert_eq!(maze.remove_pellet_at(pellet), Some(PelletKind::Normal));
        assert_eq!(maze.remove_pellet_at(pellet), None);
        assert_eq!(maze.remove_pellet_at(power_up), Some(PelletKind::PowerUp));
        assert_eq!(maze.remove_pellet_at(Vector2D::new(8.0, 8.0)), None);
        assert_eq!(maze.pellet_count(), 2);

        maze.reset();
        assert_eq!(maze.pellet_count(), 4);
    }

    #[test]
    fn pellets_report_points_and_centres() {
        let maze = bordered_room();
        let pellets = maze.pellets();
        assert_eq!(pellets.len(), 4);
        assert_eq!(pellets[0].position, Vector2D::new(24.0, 24.0));
        assert_eq!(pellets[0].value, 10);
        assert_eq!(pellets[1].kind, PelletKind::PowerUp);
        assert_eq!(pellets[1].value, 50);
    }

    #[test]
    fn spawn_lookup_uses_defaults_and_fallback() {
        let maze = bordered_room();
        assert_eq!(maze.spawn_position("player"), Vector2D::new(24.0, 24.0));

        let maze = maze.with_spawn("player", CellCoord::new(4, 4));
        assert_eq!(maze.spawn_position("player"), Vector2D::new(72.0, 72.0));
        assert_eq!(maze.spawn_position("ghost_red"), Vector2D::new(16.0, 16.0));
    }

    #[test]
    fn layout_rows_reflect_consumed_pellets() {
        let mut maze = bordered_room();
        let _ = maze.remove_pellet_at(Vector2D::new(24.0, 24.0));
        let rows = maze.layout_rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1], vec![1, 0, 0, 0, 3, 1]);
    }
}
