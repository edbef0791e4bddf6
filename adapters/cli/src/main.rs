#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays maze-chase campaigns headlessly.

mod autopilot;
mod config;
mod scoreboard;
mod session;
mod share;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use maze_chase_core::Maze;
use maze_chase_system_ghost_behavior::DifficultyTier;
use maze_chase_world::{
    fallback_maze, DirectoryMapProvider, MapProvider, MazeDocument, Services, World,
    FALLBACK_MAP_ID,
};

use crate::{autopilot::Autopilot, config::GameConfig, scoreboard::ScoreBoard, session::LogCueSink};

#[derive(Debug, Parser)]
#[command(name = "maze-chase", version, about = "Headless maze-chase campaign runner")]
struct Cli {
    /// Directory holding `*.json` map documents.
    #[arg(long, global = true, default_value = "maps")]
    maps: PathBuf,
    /// TOML file overriding the default rules.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plays a campaign with the autopilot steering the player.
    Run {
        /// Maximum number of ticks to simulate.
        #[arg(long, default_value_t = 36_000)]
        ticks: u64,
        /// Records the final score on the score board under this name.
        #[arg(long)]
        name: Option<String>,
        /// Score board file.
        #[arg(long, default_value = "scores.json")]
        scores: PathBuf,
    },
    /// Lists the available maps from easiest to hardest.
    Maps,
    /// Prints the share code of a map file, or of the built-in maze.
    Export {
        /// Path of a map document, or `built-in:fallback`.
        map: String,
    },
    /// Writes the map carried by a share code to a JSON document.
    Import {
        /// Share code produced by `export`.
        code: String,
        /// Destination of the map document.
        output: PathBuf,
        /// Overwrites an existing destination.
        #[arg(long)]
        force: bool,
    },
    /// Prints the score board.
    Scores {
        /// Score board file.
        #[arg(long, default_value = "scores.json")]
        file: PathBuf,
    },
}

/// Entry point for the maze-chase command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            name,
            scores,
        } => run(&cli.maps, cli.config.as_deref(), ticks, name.as_deref(), &scores),
        Commands::Maps => list_maps(&cli.maps),
        Commands::Export { map } => export(&map),
        Commands::Import {
            code,
            output,
            force,
        } => import(&code, &output, force),
        Commands::Scores { file } => print_scores(&file),
    }
}

fn run(
    maps: &Path,
    config: Option<&Path>,
    ticks: u64,
    name: Option<&str>,
    scores: &Path,
) -> Result<()> {
    let overrides = match config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let config = overrides.into_config();
    let autopilot = Autopilot::new(config.entity_size);
    let mut world = World::new(
        config,
        Services::new(DirectoryMapProvider::new(maps), LogCueSink),
    );

    let outcome = session::play(&mut world, &autopilot, ticks);
    println!(
        "{:?} after {} ticks: {} point(s), {} map(s) cleared",
        outcome.phase, outcome.ticks, outcome.score, outcome.maps_cleared
    );
    if outcome.fallbacks > 0 {
        println!("the built-in maze replaced {} map(s)", outcome.fallbacks);
    }

    if let Some(name) = name {
        let mut board = ScoreBoard::open(scores)?;
        match board.record_score(name, outcome.score) {
            Some(rank) => {
                board.save()?;
                info!("score saved to {}", board.path().display());
                println!("{name} placed #{rank} with {} point(s)", outcome.score);
            }
            None => println!("{} point(s) did not make the board", outcome.score),
        }
    }
    Ok(())
}

fn list_maps(maps: &Path) -> Result<()> {
    let provider = DirectoryMapProvider::new(maps);
    let summaries = provider.list_maps();
    if summaries.is_empty() {
        println!(
            "no maps found in {}; campaigns will use the built-in maze",
            maps.display()
        );
        return Ok(());
    }
    for summary in summaries {
        let tier = DifficultyTier::from_level(summary.difficulty);
        println!(
            "{:>3} {:<11} {:>3}x{:<3} {} ({})",
            summary.difficulty,
            tier.to_string(),
            summary.columns,
            summary.rows,
            summary.name,
            summary.id
        );
        if !summary.description.is_empty() {
            println!("                      {}", summary.description);
        }
    }
    Ok(())
}

fn load_maze(map: &str) -> Result<Maze> {
    if map == FALLBACK_MAP_ID {
        return fallback_maze().context("built-in maze is invalid");
    }
    let contents =
        fs::read_to_string(map).with_context(|| format!("failed to read map file at {map}"))?;
    let document = MazeDocument::from_json(&contents)
        .with_context(|| format!("failed to parse map file at {map}"))?;
    document
        .into_maze()
        .with_context(|| format!("map file at {map} has an invalid layout"))
}

fn export(map: &str) -> Result<()> {
    let maze = load_maze(map)?;
    let code = share::encode(&MazeDocument::from_maze(&maze)).context("failed to encode map")?;
    println!("{code}");
    Ok(())
}

fn import(code: &str, output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            output.display()
        );
    }
    let document = share::decode(code).context("failed to decode share code")?;
    let maze = document
        .clone()
        .into_maze()
        .context("share code carries an invalid layout")?;
    let json = document
        .to_json_pretty()
        .context("failed to serialise map document")?;
    fs::write(output, json)
        .with_context(|| format!("failed to write map file at {}", output.display()))?;
    println!(
        "imported '{}' ({}x{}) to {}",
        maze.metadata().name(),
        maze.columns(),
        maze.rows(),
        output.display()
    );
    Ok(())
}

fn print_scores(file: &Path) -> Result<()> {
    let board = ScoreBoard::open(file)?;
    if board.entries().is_empty() {
        println!("no scores recorded in {}", file.display());
        return Ok(());
    }
    for (rank, entry) in board.entries().iter().enumerate() {
        println!("{:>2}. {:<16} {:>7}", rank + 1, entry.name, entry.score);
    }
    Ok(())
}
