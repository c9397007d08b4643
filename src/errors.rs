//! Error kinds surfaced by the grid, the priority queue and the visualizer.
//!
//! Every fallible grid operation validates its input before touching any state, so an error
//! always means the requested operation was rejected as a whole.

use std::fmt;

use thiserror::Error;

use crate::{grid::Coord, heap::EmptyQueue};

/// Reason a coordinate was refused as a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateFault {
    /// The coordinate lies outside the grid.
    OutOfBounds,
    /// The coordinate holds a wall.
    Wall,
    /// The coordinate holds the start or end cell.
    Occupied,
}

impl fmt::Display for CoordinateFault {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::OutOfBounds => "is out of bounds",
            Self::Wall => "is a wall",
            Self::Occupied => "is occupied by an endpoint",
        })
    }
}

/// Errors produced by the pathfinding core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A placement targeted a cell that cannot take it.
    #[error("cell {coord} {fault}")]
    InvalidCoordinate {
        /// Targeted cell.
        coord: Coord,
        /// Why the cell was refused.
        fault: CoordinateFault,
    },
    /// The grid must be at least 2x2.
    #[error("grid dimensions {width}x{height} are invalid, both must be at least 2")]
    InvalidDimensions {
        /// Requested number of columns.
        width: usize,
        /// Requested number of rows.
        height: usize,
    },
    /// An animation delay was zero.
    #[error("{name} delay must be a positive number of milliseconds")]
    InvalidDelay {
        /// Name of the offending delay.
        name: &'static str,
    },
    /// A search is active, so the grid cannot be touched and no new search may start.
    #[error("a search is already running")]
    SearchRunning,
    /// The priority queue was drained past its end.
    #[error(transparent)]
    EmptyQueue(#[from] EmptyQueue),
}

impl GridError {
    /// Returns whether the error is a refused user request rather than a broken invariant.
    ///
    /// Rejections leave every piece of state untouched and can be reported back to the user.
    /// Anything else is a programming error and should abort.
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::EmptyQueue(_))
    }
}
