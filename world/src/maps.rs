//! Map documents, map providers and the built-in fallback maze.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use log::warn;
use maze_chase_core::{
    CellCoord, MapId, MapSummary, Maze, MazeError, MazeMetadata, DEFAULT_CELL_SIZE,
    MAX_DIFFICULTY,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifier under which the built-in maze is listed.
pub const FALLBACK_MAP_ID: &str = "built-in:fallback";

/// Difficulty assumed when a map document omits it.
pub const DEFAULT_DIFFICULTY: i64 = 50;

const FALLBACK_LAYOUT: [&str; 21] = [
    "11111111111111111111111111111111111",
    "12222222222222222122222222222222221",
    "13111121111121112121112111112111131",
    "12222222222222222222222222222222221",
    "12111121121111111111111112112111121",
    "12222221122222222122222222211222221",
    "11111121111111110101111111111211111",
    "00000121100000000000000000011210000",
    "11111121101111110001111111011211111",
    "10000020001000000000000001000200001",
    "11111121101000000000000001011211111",
    "00000121101111111111111111011210000",
    "11111121100000000000000000011211111",
    "12222222222222222122222222222222221",
    "12111121111121112121112111112111121",
    "13221122222222222222222222222112231",
    "11121121121111111111111112112112111",
    "12222221122222222122222222211222221",
    "12111111111111112121111111111111121",
    "12222222222222222222222222222222221",
    "11111111111111111111111111111111111",
];

/// Failures raised while listing or loading maps.
#[derive(Debug, Error)]
pub enum MapError {
    /// The map file could not be read.
    #[error("failed to read map {id}")]
    Io {
        /// Map that was requested.
        id: MapId,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The map file is not a valid map document.
    #[error("map {id} is not a valid map document")]
    Json {
        /// Map that was requested.
        id: MapId,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The document parsed but its grid is malformed.
    #[error("map {id} has an invalid layout")]
    InvalidMaze {
        /// Map that was requested.
        id: MapId,
        /// Grid validation failure.
        #[source]
        source: MazeError,
    },
    /// The provider does not know the map.
    #[error("unknown map {0}")]
    UnknownMap(MapId),
}

/// Grid-space coordinate as stored in map documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl From<GridPoint> for CellCoord {
    fn from(point: GridPoint) -> Self {
        CellCoord::new(point.x, point.y)
    }
}

impl From<CellCoord> for GridPoint {
    fn from(cell: CellCoord) -> Self {
        Self {
            x: cell.column(),
            y: cell.row(),
        }
    }
}

/// Descriptive block of a map document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Display name.
    #[serde(default = "untitled")]
    pub name: String,
    /// Difficulty; clamped into `0..=200` on load. Values that are not
    /// whole numbers read as 0.
    #[serde(
        default = "default_difficulty",
        deserialize_with = "lenient_difficulty"
    )]
    pub difficulty: i64,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Pixel edge length of one cell; defaults to 16.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_size: Option<f32>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            name: untitled(),
            difficulty: DEFAULT_DIFFICULTY,
            description: String::new(),
            cell_size: None,
        }
    }
}

fn untitled() -> String {
    "Untitled".to_owned()
}

const fn default_difficulty() -> i64 {
    DEFAULT_DIFFICULTY
}

fn lenient_difficulty<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let level = match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|_| i64::MAX))
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    };
    Ok(level)
}

/// On-disk JSON representation of a maze.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MazeDocument {
    /// Descriptive data.
    #[serde(default)]
    pub metadata: DocumentMetadata,
    /// Rows of cell codes: 0 empty, 1 wall, 2 pellet, 3 power-up.
    pub layout: Vec<Vec<u8>>,
    /// Named spawn points in grid space.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub spawn_positions: BTreeMap<String, GridPoint>,
    /// Named patrol routes in grid space, keyed like spawn points.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub patrol_routes: BTreeMap<String, Vec<GridPoint>>,
}

impl MazeDocument {
    /// Parses a JSON document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Renders the document as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Captures the current grid, metadata, spawns and routes of `maze`.
    #[must_use]
    pub fn from_maze(maze: &Maze) -> Self {
        let metadata = maze.metadata();
        Self {
            metadata: DocumentMetadata {
                name: metadata.name().to_owned(),
                difficulty: i64::from(metadata.difficulty()),
                description: metadata.description().to_owned(),
                cell_size: Some(maze.cell_size()),
            },
            layout: maze.layout_rows(),
            spawn_positions: maze
                .spawn_cells()
                .iter()
                .map(|(name, cell)| (name.clone(), GridPoint::from(*cell)))
                .collect(),
            patrol_routes: maze
                .patrol_route_cells()
                .iter()
                .map(|(name, route)| {
                    (
                        name.clone(),
                        route.iter().copied().map(GridPoint::from).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Validates the grid and builds a maze.
    pub fn into_maze(self) -> Result<Maze, MazeError> {
        let metadata = MazeMetadata::new(
            self.metadata.name,
            self.metadata.difficulty,
            self.metadata.description,
        );
        let cell_size = self.metadata.cell_size.unwrap_or(DEFAULT_CELL_SIZE);
        let mut maze = Maze::from_rows(&self.layout, cell_size, metadata)?;
        for (name, point) in self.spawn_positions {
            maze = maze.with_spawn(name, point.into());
        }
        for (name, route) in self.patrol_routes {
            maze = maze.with_patrol_route(name, route.into_iter().map(CellCoord::from).collect());
        }
        Ok(maze)
    }

    fn summary(&self, id: MapId) -> MapSummary {
        let clamped = self.metadata.difficulty.clamp(0, i64::from(MAX_DIFFICULTY));
        MapSummary {
            id,
            name: self.metadata.name.clone(),
            difficulty: u8::try_from(clamped).unwrap_or(MAX_DIFFICULTY),
            description: self.metadata.description.clone(),
            columns: u32::try_from(self.layout.first().map_or(0, Vec::len)).unwrap_or(u32::MAX),
            rows: u32::try_from(self.layout.len()).unwrap_or(u32::MAX),
        }
    }
}

/// Describes an already loaded maze under the provided identifier.
#[must_use]
pub fn summarize(id: MapId, maze: &Maze) -> MapSummary {
    let metadata = maze.metadata();
    MapSummary {
        id,
        name: metadata.name().to_owned(),
        difficulty: metadata.difficulty(),
        description: metadata.description().to_owned(),
        columns: maze.columns(),
        rows: maze.rows(),
    }
}

/// Source of the mazes a campaign is played on.
pub trait MapProvider: fmt::Debug {
    /// Available maps ordered from easiest to hardest.
    fn list_maps(&self) -> Vec<MapSummary>;

    /// Loads the identified map; failures never yield a partial maze.
    fn load_map(&self, id: &MapId) -> Result<Maze, MapError>;
}

/// Serves every `*.json` map document found in a directory.
///
/// Map identifiers are the paths of the documents.
#[derive(Clone, Debug)]
pub struct DirectoryMapProvider {
    root: PathBuf,
}

impl DirectoryMapProvider {
    /// Creates a provider scanning `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory that is scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_document(path: &Path, id: &MapId) -> Result<MazeDocument, MapError> {
        let text = fs::read_to_string(path).map_err(|source| MapError::Io {
            id: id.clone(),
            source,
        })?;
        MazeDocument::from_json(&text).map_err(|source| MapError::Json {
            id: id.clone(),
            source,
        })
    }
}

impl MapProvider for DirectoryMapProvider {
    fn list_maps(&self) -> Vec<MapSummary> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) => {
                warn!("cannot scan map directory {}: {error}", self.root.display());
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|extension| extension == "json"))
            .collect();
        paths.sort();

        let mut summaries: Vec<MapSummary> = paths
            .into_iter()
            .filter_map(|path| {
                let id = MapId::new(path.to_string_lossy());
                match Self::read_document(&path, &id) {
                    Ok(document) => Some(document.summary(id)),
                    Err(error) => {
                        warn!("skipping map {}: {error}", path.display());
                        None
                    }
                }
            })
            .collect();
        summaries.sort_by_key(|summary| summary.difficulty);
        summaries
    }

    fn load_map(&self, id: &MapId) -> Result<Maze, MapError> {
        let document = Self::read_document(Path::new(id.as_str()), id)?;
        document
            .into_maze()
            .map_err(|source| MapError::InvalidMaze {
                id: id.clone(),
                source,
            })
    }
}

/// Serves mazes held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryMapProvider {
    maps: Vec<(MapSummary, Maze)>,
}

impl MemoryMapProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a maze under `id`, replacing any maze registered with the same id.
    #[must_use]
    pub fn with_maze(mut self, id: impl Into<String>, maze: Maze) -> Self {
        self.insert(MapId::new(id), maze);
        self
    }

    /// Adds a maze under `id`, replacing any maze registered with the same id.
    pub fn insert(&mut self, id: MapId, maze: Maze) {
        self.maps.retain(|(summary, _)| summary.id != id);
        self.maps.push((summarize(id, &maze), maze));
    }
}

impl MapProvider for MemoryMapProvider {
    fn list_maps(&self) -> Vec<MapSummary> {
        let mut summaries: Vec<MapSummary> =
            self.maps.iter().map(|(summary, _)| summary.clone()).collect();
        summaries.sort_by_key(|summary| summary.difficulty);
        summaries
    }

    fn load_map(&self, id: &MapId) -> Result<Maze, MapError> {
        self.maps
            .iter()
            .find(|(summary, _)| &summary.id == id)
            .map(|(_, maze)| maze.clone())
            .ok_or_else(|| MapError::UnknownMap(id.clone()))
    }
}

/// Built-in maze substituted when a map cannot be loaded.
pub fn fallback_maze() -> Result<Maze, MazeError> {
    let rows: Vec<Vec<u8>> = FALLBACK_LAYOUT
        .iter()
        .map(|row| {
            row.bytes()
                .map(|digit| digit.wrapping_sub(b'0'))
                .collect()
        })
        .collect();
    let metadata = MazeMetadata::new(
        "Built-in Maze (Fallback)",
        DEFAULT_DIFFICULTY,
        "Loaded because the requested map was unavailable",
    );
    Maze::from_rows(&rows, DEFAULT_CELL_SIZE, metadata)
}
