//! Grid model for the pathfinder.
//!
//! This module contains the [`Grid`] type, which exclusively owns every [`Cell`] of a fixed-size
//! rectangular board, and the [`Coord`] type used to address them. Search bookkeeping lives on the
//! cells themselves and back-references are plain coordinates, so a finished search leaves behind
//! an acyclic predecessor chain without any shared ownership.

use std::{fmt, str::FromStr};

use crate::errors::{CoordinateFault, GridError};

/// Position of a cell on the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    /// Zero-based row, growing downwards.
    pub row: usize,
    /// Zero-based column, growing rightwards.
    pub col: usize,
}

impl Coord {
    /// Builds a coordinate from a row and a column.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the Manhattan distance between two coordinates.
    pub const fn manhattan(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "({}, {})", self.row, self.col)
    }
}

impl FromStr for Coord {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (row, col) = value
            .split_once(',')
            .ok_or_else(|| "expected format ROW,COL".to_owned())?;

        let row = row
            .trim()
            .parse()
            .map_err(|err| format!("invalid row `{}`: {err}", row.trim()))?;
        let col = col
            .trim()
            .parse()
            .map_err(|err| format!("invalid column `{}`: {err}", col.trim()))?;

        Ok(Self { row, col })
    }
}

/// Static role of a cell.
///
/// Walls and endpoints are mutually exclusive, which is why they share a single tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellKind {
    /// Walkable cell.
    #[default]
    Open,
    /// Blocked cell.
    Wall,
    /// The cell the search starts from.
    Start,
    /// The cell the search is looking for.
    End,
}

/// Single grid cell with its search bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Where the cell sits.
    pub(crate) coord: Coord,
    /// Static role of the cell.
    pub(crate) kind: CellKind,
    /// Best known cost from the start; `None` stands for infinity.
    pub(crate) g_score: Option<u32>,
    /// `g_score` plus the heuristic estimate to the end; `None` stands for infinity.
    pub(crate) f_score: Option<u32>,
    /// Whether the search has closed this cell.
    pub(crate) visited: bool,
    /// Cell this one was reached from on the best known route.
    pub(crate) predecessor: Option<Coord>,
}

impl Cell {
    /// Creates an unscored cell.
    const fn new(coord: Coord, kind: CellKind) -> Self {
        Self {
            coord,
            kind,
            g_score: None,
            f_score: None,
            visited: false,
            predecessor: None,
        }
    }

    /// Returns the position of the cell.
    pub const fn coord(&self) -> Coord {
        self.coord
    }

    /// Returns the static role of the cell.
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Returns whether this is the start cell.
    pub const fn is_start(&self) -> bool {
        matches!(self.kind, CellKind::Start)
    }

    /// Returns whether this is the end cell.
    pub const fn is_end(&self) -> bool {
        matches!(self.kind, CellKind::End)
    }

    /// Returns whether the cell is a wall.
    pub const fn is_wall(&self) -> bool {
        matches!(self.kind, CellKind::Wall)
    }

    /// Returns the cost from the start, or `None` if the cell was never reached.
    pub const fn g_score(&self) -> Option<u32> {
        self.g_score
    }

    /// Returns the estimated total cost through this cell, or `None` if it was never reached.
    pub const fn f_score(&self) -> Option<u32> {
        self.f_score
    }

    /// Returns the heuristic part of the score, `f_score - g_score`.
    pub fn h_score(&self) -> Option<u32> {
        self.f_score?.checked_sub(self.g_score?)
    }

    /// Returns whether the search has closed this cell.
    pub const fn is_visited(&self) -> bool {
        self.visited
    }

    /// Returns the cell this one was reached from.
    pub const fn predecessor(&self) -> Option<Coord> {
        self.predecessor
    }

    /// Drops every piece of search state, leaving the static role alone.
    pub(crate) fn reset_search(&mut self) {
        self.g_score = None;
        self.f_score = None;
        self.visited = false;
        self.predecessor = None;
    }
}

/// Checks grid dimensions and endpoint placement without building anything.
///
/// # Errors
///
/// This function may return errors if:
/// - Either dimension is smaller than 2
/// - An endpoint lies outside the grid
/// - Start and end are the same cell
pub(crate) fn validate_layout(
    width: usize,
    height: usize,
    start: Coord,
    end: Coord,
) -> Result<(), GridError> {
    if width < 2 || height < 2 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    for coord in [start, end] {
        if coord.row >= height || coord.col >= width {
            return Err(GridError::InvalidCoordinate {
                coord,
                fault: CoordinateFault::OutOfBounds,
            });
        }
    }
    if start == end {
        return Err(GridError::InvalidCoordinate {
            coord: end,
            fault: CoordinateFault::Occupied,
        });
    }

    Ok(())
}

/// Which endpoint a relocation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Endpoint {
    /// The start cell.
    Start,
    /// The end cell.
    End,
}

/// Rectangular board owning all of its cells.
///
/// Exactly one cell is the start and exactly one is the end at all times; every mutation checks its
/// target before touching anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Number of columns.
    width: usize,
    /// Number of rows.
    height: usize,
    /// Cells in row-major order.
    cells: Vec<Cell>,
    /// Current start position.
    start: Coord,
    /// Current end position.
    end: Coord,
}

impl Grid {
    /// Builds a wall-free grid with the given size and endpoints.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - Either dimension is smaller than 2
    /// - An endpoint lies outside the grid
    /// - Start and end are the same cell
    pub fn new(width: usize, height: usize, start: Coord, end: Coord) -> Result<Self, GridError> {
        validate_layout(width, height, start, end)?;

        let cells = (0..height)
            .flat_map(|row| (0..width).map(move |col| Coord::new(row, col)))
            .map(|coord| {
                let kind = if coord == start {
                    CellKind::Start
                } else if coord == end {
                    CellKind::End
                } else {
                    CellKind::Open
                };
                Cell::new(coord, kind)
            })
            .collect();

        Ok(Self {
            width,
            height,
            cells,
            start,
            end,
        })
    }

    /// Returns the number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the start position.
    pub const fn start(&self) -> Coord {
        self.start
    }

    /// Returns the end position.
    pub const fn end(&self) -> Coord {
        self.end
    }

    /// Returns whether the coordinate lies on the grid.
    pub const fn contains(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Maps a coordinate to its slot in the row-major storage.
    fn index(&self, coord: Coord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.row * self.width + coord.col)
    }

    /// Maps a coordinate to its slot, failing with an out-of-bounds error.
    fn checked_index(&self, coord: Coord) -> Result<usize, GridError> {
        self.index(coord).ok_or(GridError::InvalidCoordinate {
            coord,
            fault: CoordinateFault::OutOfBounds,
        })
    }

    /// Returns the cell at `coord`, if it lies on the grid.
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.cells.get(self.index(coord)?)
    }

    /// Returns the cell at `coord` for search bookkeeping.
    pub(crate) fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        let index = self.index(coord)?;
        self.cells.get_mut(index)
    }

    /// Returns every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Returns the in-bounds neighbors of `coord` in up, down, left, right order.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = Coord> + '_ {
        let up = coord.row.checked_sub(1).map(|row| Coord::new(row, coord.col));
        let down = coord.row.checked_add(1).map(|row| Coord::new(row, coord.col));
        let left = coord.col.checked_sub(1).map(|col| Coord::new(coord.row, col));
        let right = coord.col.checked_add(1).map(|col| Coord::new(coord.row, col));

        [up, down, left, right]
            .into_iter()
            .flatten()
            .filter(move |neighbor| self.contains(*neighbor))
    }

    /// Flips the wall state of a cell and returns whether it is now a wall.
    ///
    /// # Errors
    ///
    /// This function may return errors if the cell is out of bounds or is an endpoint.
    pub fn toggle_wall(&mut self, coord: Coord) -> Result<bool, GridError> {
        let wall = self
            .cell(coord)
            .is_some_and(|cell| !cell.is_wall());
        self.set_wall(coord, wall)?;

        Ok(wall)
    }

    /// Makes a cell a wall or clears it.
    ///
    /// # Errors
    ///
    /// This function may return errors if the cell is out of bounds or is an endpoint.
    pub fn set_wall(&mut self, coord: Coord, wall: bool) -> Result<(), GridError> {
        let index = self.checked_index(coord)?;
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(GridError::InvalidCoordinate {
                coord,
                fault: CoordinateFault::OutOfBounds,
            })?;
        if cell.is_start() || cell.is_end() {
            return Err(GridError::InvalidCoordinate {
                coord,
                fault: CoordinateFault::Occupied,
            });
        }

        cell.kind = if wall { CellKind::Wall } else { CellKind::Open };

        Ok(())
    }

    /// Relocates the start cell.
    ///
    /// # Errors
    ///
    /// This function may return errors if the target is out of bounds, a wall, or the end cell.
    pub fn move_start(&mut self, coord: Coord) -> Result<(), GridError> {
        self.move_endpoint(coord, Endpoint::Start)
    }

    /// Relocates the end cell.
    ///
    /// # Errors
    ///
    /// This function may return errors if the target is out of bounds, a wall, or the start cell.
    pub fn move_end(&mut self, coord: Coord) -> Result<(), GridError> {
        self.move_endpoint(coord, Endpoint::End)
    }

    /// Validates a relocation target and moves the chosen endpoint onto it.
    fn move_endpoint(&mut self, coord: Coord, endpoint: Endpoint) -> Result<(), GridError> {
        let (current, other, kind) = match endpoint {
            Endpoint::Start => (self.start, self.end, CellKind::Start),
            Endpoint::End => (self.end, self.start, CellKind::End),
        };

        let target = self.checked_index(coord)?;
        let source = self.checked_index(current)?;
        if coord == current {
            return Ok(());
        }
        if coord == other {
            return Err(GridError::InvalidCoordinate {
                coord,
                fault: CoordinateFault::Occupied,
            });
        }
        if self.cells.get(target).is_some_and(Cell::is_wall) {
            return Err(GridError::InvalidCoordinate {
                coord,
                fault: CoordinateFault::Wall,
            });
        }

        if let Some(cell) = self.cells.get_mut(source) {
            cell.kind = CellKind::Open;
        }
        if let Some(cell) = self.cells.get_mut(target) {
            cell.kind = kind;
        }
        match endpoint {
            Endpoint::Start => self.start = coord,
            Endpoint::End => self.end = coord,
        }

        Ok(())
    }

    /// Turns every wall back into an open cell.
    pub fn clear_walls(&mut self) {
        for cell in self.cells.iter_mut().filter(|cell| cell.is_wall()) {
            cell.kind = CellKind::Open;
        }
    }

    /// Drops scores, closed marks and predecessors from every cell.
    pub fn reset_search_state(&mut self) {
        for cell in &mut self.cells {
            cell.reset_search();
        }
    }

    /// Returns the number of walls on the grid.
    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_wall()).count()
    }
}
