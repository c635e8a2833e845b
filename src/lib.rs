use std::{
    error,
    fmt::Display,
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod game;
pub mod map;
pub mod render;

use game::{BoxGame, PushRule};
use map::{Direction, Map, MapBuilder, Position, Tile};
use render::Animator;

#[derive(Debug)]
pub enum Error {
    InconsistentRow(usize, usize),
    MultipleRobots(Position, Position),
    InvalidCharForMap(char),
    NoRobotInMap,
    UnpairedBoxHalf(Position),
    InvalidCharForDirection(char),
    OutOfBounds(Position),
    TerminalError(io::Error),
    NotEnoughTerminalSpace(usize, usize, usize, usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InconsistentRow(expect_col_n, this_col_n) => write!(
                f,
                "Expect {} column(s) in each row, given {}.",
                expect_col_n, this_col_n
            ),
            Error::MultipleRobots(last_position, this_position) => write!(
                f,
                "Given two robots in map({}, {}), expect only one.",
                last_position, this_position
            ),
            Error::InvalidCharForMap(c) => write!(f, "Invalid character({}) for map.", c),
            Error::NoRobotInMap => write!(f, "No robot found in given map, expect one."),
            Error::UnpairedBoxHalf(pos) => {
                write!(f, "Half of a wide box at {} has no matching half.", pos)
            }
            Error::InvalidCharForDirection(c) => {
                write!(f, "Invalid character({}) for direction.", c)
            }
            Error::OutOfBounds(pos) => write!(f, "Position {} is outside of the map.", pos),
            Error::TerminalError(ioe) => write!(
                f,
                "Failed to control terminal(stdout), get error({}).",
                ioe
            ),
            Error::NotEnoughTerminalSpace(real_row_n, real_col_n, expect_row_n, expect_col_n) => {
                write!(
                    f,
                    "Terminal({} x {}) hasn't enough space to render, expect {} rows x {} columns.",
                    real_row_n, real_col_n, expect_row_n, expect_col_n
                )
            }
        }
    }
}

impl error::Error for Error {}

#[derive(Debug, Parser)]
pub struct CLIArgs {
    pub input_path: PathBuf,
    /// Draw the warehouse in the terminal after every move
    #[arg(long)]
    pub animate: bool,
    /// Frames per second of the animation
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub fps: u32,
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn read_game<T: Tile, P: AsRef<Path>>(path: P) -> Result<(Map<T>, Vec<Direction>)> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open given file({}).", path.as_ref().display()))?;
    read_game_from(BufReader::new(file), &path.as_ref().display().to_string())
}

pub fn parse_game<T: Tile>(text: &str) -> Result<(Map<T>, Vec<Direction>)> {
    read_game_from(text.as_bytes(), "<text>")
}

/// Map rows come first, up to a blank line, followed by the moves. Anything
/// in the move text that isn't a move symbol is skipped.
fn read_game_from<T: Tile, R: BufRead>(
    reader: R,
    source: &str,
) -> Result<(Map<T>, Vec<Direction>)> {
    let mut builder = MapBuilder::<T>::new();
    let mut enum_lines = reader.lines().enumerate();
    for (ind, line) in enum_lines.by_ref() {
        let line = line.with_context(|| {
            format!("Failed to read line {} in given source({}).", ind + 1, source)
        })?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }

        builder
            .add_row(line)
            .with_context(|| format!("Invalid map row at line {} in {}.", ind + 1, source))?;
    }

    let mut move_dirs = Vec::new();
    for (ind, line) in enum_lines {
        let line = line.with_context(|| {
            format!("Failed to read line {} in given source({}).", ind + 1, source)
        })?;
        for c in line.chars().filter(|c| Direction::is_symbol(*c)) {
            move_dirs.push(Direction::try_from(c)?);
        }
    }

    let map = builder.build()?;
    debug!(
        source,
        row_n = map.row_n(),
        col_n = map.col_n(),
        move_n = move_dirs.len(),
        "read game"
    );
    Ok((map, move_dirs))
}

/// Runs every move on `map` under rule `R`, animating when asked to, and
/// returns the final GPS sum.
pub fn play<R: PushRule>(
    map: Map<R::Tile>,
    move_dirs: &[Direction],
    args: &CLIArgs,
) -> Result<usize> {
    let mut game = BoxGame::<R>::new(map).context("Refuse to start on an inconsistent map.")?;
    if args.animate {
        let mut animator = Animator::new(args.fps);
        animator.start(game.map(), move_dirs.first().copied())?;
        let result = game.simulate_with(move_dirs, |step| {
            animator.frame(step.map, move_dirs.get(step.index + 1).copied())
        });
        animator.finish()?;
        result?;
    } else {
        game.simulate(move_dirs)?;
    }

    Ok(game.gps_sum())
}
