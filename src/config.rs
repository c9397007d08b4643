//! Command-line options and validated configuration.
//!
//! [`Cli`] is what clap parses; [`Config`] is what the rest of the crate consumes. The conversion
//! between the two checks every option before anything is built.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing::Level;

use crate::{
    errors::GridError,
    grid::{self, Coord},
};

/// Default number of grid columns.
pub const DEFAULT_WIDTH: usize = 35;

/// Default number of grid rows.
pub const DEFAULT_HEIGHT: usize = 15;

/// Default start cell.
pub const DEFAULT_START: Coord = Coord::new(7, 5);

/// Default end cell.
pub const DEFAULT_END: Coord = Coord::new(7, 29);

/// Default delay between two search steps, in milliseconds.
pub const DEFAULT_STEP_DELAY_MS: u64 = 30;

/// Default delay between two path cells, in milliseconds.
pub const DEFAULT_PATH_DELAY_MS: u64 = 75;

/// Command-line arguments of the visualizer.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of grid columns.
    #[arg(long, value_name = "COLUMNS", default_value_t = DEFAULT_WIDTH)]
    pub width: usize,
    /// Number of grid rows.
    #[arg(long, value_name = "ROWS", default_value_t = DEFAULT_HEIGHT)]
    pub height: usize,
    /// Start cell as ROW,COL.
    #[arg(long, value_name = "ROW,COL", default_value = "7,5")]
    pub start: Coord,
    /// End cell as ROW,COL.
    #[arg(long, value_name = "ROW,COL", default_value = "7,29")]
    pub end: Coord,
    /// Milliseconds between two search steps of the animation.
    #[arg(long, value_name = "MILLISECONDS", default_value_t = DEFAULT_STEP_DELAY_MS)]
    pub step_delay_ms: u64,
    /// Milliseconds between two cells of the path animation.
    #[arg(long, value_name = "MILLISECONDS", default_value_t = DEFAULT_PATH_DELAY_MS)]
    pub path_delay_ms: u64,
    /// File to write logs to. Nothing is logged without it.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
    /// Most verbose level written to the log file.
    #[arg(long, value_name = "LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Cli {
    /// Validates the arguments into a [`Config`].
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - Either grid dimension is smaller than 2
    /// - An endpoint lies outside the grid, or both endpoints are the same cell
    /// - A delay is zero
    pub fn into_config(self) -> Result<Config, GridError> {
        Config::new(
            self.width,
            self.height,
            self.start,
            self.end,
            Delays::from_millis(self.step_delay_ms, self.path_delay_ms)?,
        )
    }
}

/// Animation delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delays {
    /// Delay between two search steps.
    pub step: Duration,
    /// Delay between two path cells.
    pub path: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
            path: Duration::from_millis(DEFAULT_PATH_DELAY_MS),
        }
    }
}

impl Delays {
    /// Builds delays from millisecond counts.
    ///
    /// # Errors
    ///
    /// This function may return errors if either delay is zero.
    pub fn from_millis(step: u64, path: u64) -> Result<Self, GridError> {
        if step == 0 {
            return Err(GridError::InvalidDelay { name: "step" });
        }
        if path == 0 {
            return Err(GridError::InvalidDelay { name: "path" });
        }

        Ok(Self {
            step: Duration::from_millis(step),
            path: Duration::from_millis(path),
        })
    }

    /// Returns the delay of the given search step.
    pub fn step_at(&self, step: u32) -> Duration {
        self.step.saturating_mul(step)
    }

    /// Returns the delay of the given path cell.
    pub fn path_at(&self, index: usize) -> Duration {
        self.path
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// Validated configuration of a visualizer session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Number of grid columns, at least 2.
    width: usize,
    /// Number of grid rows, at least 2.
    height: usize,
    /// Initial start cell.
    start: Coord,
    /// Initial end cell.
    end: Coord,
    /// Animation delays.
    delays: Delays,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            start: DEFAULT_START,
            end: DEFAULT_END,
            delays: Delays::default(),
        }
    }
}

impl Config {
    /// Builds a configuration after checking every option.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - Either grid dimension is smaller than 2
    /// - An endpoint lies outside the grid, or both endpoints are the same cell
    pub fn new(
        width: usize,
        height: usize,
        start: Coord,
        end: Coord,
        delays: Delays,
    ) -> Result<Self, GridError> {
        grid::validate_layout(width, height, start, end)?;

        Ok(Self {
            width,
            height,
            start,
            end,
            delays,
        })
    }

    /// Returns the number of grid columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of grid rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the initial start cell.
    pub const fn start(&self) -> Coord {
        self.start
    }

    /// Returns the initial end cell.
    pub const fn end(&self) -> Coord {
        self.end
    }

    /// Returns the animation delays.
    pub const fn delays(&self) -> Delays {
        self.delays
    }
}
