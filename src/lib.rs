//! Terminal A* pathfinding visualizer.
//!
//! The core is terminal-agnostic: a [`Grid`] of cells, a comparator-driven
//! [`heap::PriorityQueue`], a pausable [`timer::Scheduler`] and the A* search in [`search`], all
//! tied together by the [`Visualizer`]. [`App`] puts a ratatui interface on top of it.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

mod app;
mod events;
mod types;
mod ui;

pub mod config;
pub mod errors;
pub mod grid;
pub mod heap;
pub mod logging;
pub mod search;
pub mod timer;
pub mod visualizer;

pub use app::App;
pub use config::{Cli, Config, Delays};
pub use errors::GridError;
pub use grid::{Cell, Coord, Grid};
pub use visualizer::Visualizer;
