//! A* search over the grid and path reconstruction.
//!
//! The search runs synchronously to completion. What it produces besides the updated cell scores is
//! a stream of [`Effect`]s handed to a [`Scheduler`], each stamped with a delay derived from a step
//! counter that advances once per expanded cell. The scheduler then replays that stream at
//! presentation speed.

use tracing::{debug, info};

use crate::{
    config::Delays,
    errors::GridError,
    grid::{Coord, Grid},
    heap::PriorityQueue,
    timer::{Clock, Scheduler},
};

/// Visual effect produced by the search, in the order it should be shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// A cell got a better score and entered the open set.
    Visit {
        /// Relaxed cell.
        coord: Coord,
        /// Its new estimated total cost.
        f_score: u32,
    },
    /// The goal was closed; time to reconstruct and show the path.
    TracePath,
    /// A cell of the shortest path, in start-to-end order.
    Path(Coord),
    /// The animation is over.
    Complete {
        /// Whether a path was found.
        found: bool,
    },
}

/// Summary of a search run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Whether the end cell was reached.
    pub found: bool,
    /// Number of cells that were closed.
    pub expanded: usize,
    /// Number of effects handed to the scheduler.
    pub steps_scheduled: usize,
    /// Lowest and highest `f` carried by the scheduled visits, if there were any.
    ///
    /// Visited shades are scaled against this range, so a cell keeps its shade for the whole
    /// animation.
    pub f_range: Option<(u32, u32)>,
}

/// Priority queue entry: a cell together with the scores it was pushed with.
///
/// A cell is pushed again whenever its score improves; the older entries stay in the queue and are
/// thrown away when popped, because by then the cell is already closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Entry {
    /// Queued cell.
    coord: Coord,
    /// Cost from the start at push time.
    g_score: u32,
    /// Estimated total cost at push time.
    f_score: u32,
}

impl Entry {
    /// Returns the heuristic part of the entry's score.
    const fn h_score(&self) -> u32 {
        self.f_score.saturating_sub(self.g_score)
    }
}

/// Queue ordering: lowest `f` first, ties go to the entry closer to the goal.
fn ranks_before(lhs: &Entry, rhs: &Entry) -> bool {
    if lhs.f_score == rhs.f_score {
        lhs.h_score() < rhs.h_score()
    } else {
        lhs.f_score < rhs.f_score
    }
}

/// Manhattan distance between two cells.
pub fn heuristic(from: Coord, to: Coord) -> u32 {
    u32::try_from(from.manhattan(to)).unwrap_or(u32::MAX)
}

/// Runs A* from the grid's start to its end and schedules the resulting effects.
///
/// The grid must come in with clean search state (see [`Grid::reset_search_state`]). A `Visit` is
/// scheduled for every relaxation of a cell other than the endpoints, at the current step times
/// the step delay. Reaching the goal schedules a single [`Effect::TracePath`] after the last visit;
/// exhausting the queue schedules [`Effect::Complete`] with `found: false` instead. Not finding a
/// path is a regular outcome.
///
/// # Errors
///
/// This function may return errors if the queue is drained past its end, which would mean the
/// loop itself is broken.
pub fn run<C: Clock>(
    grid: &mut Grid,
    scheduler: &mut Scheduler<Effect, C>,
    delays: &Delays,
) -> Result<Outcome, GridError> {
    let start = grid.start();
    let end = grid.end();
    debug!(%start, %end, "starting search");

    let mut queue = PriorityQueue::with_capacity(ranks_before, grid.width() * grid.height());
    let mut outcome = Outcome::default();
    let mut step: u32 = 0;

    let start_f = heuristic(start, end);
    if let Some(cell) = grid.cell_mut(start) {
        cell.g_score = Some(0);
        cell.f_score = Some(start_f);
    }
    queue.push(Entry {
        coord: start,
        g_score: 0,
        f_score: start_f,
    });

    while !queue.is_empty() {
        let current = queue.pop()?;

        let Some(cell) = grid.cell_mut(current.coord) else {
            continue;
        };
        if cell.visited || cell.is_wall() {
            continue;
        }
        cell.visited = true;
        let g_current = cell.g_score.unwrap_or(current.g_score);
        outcome.expanded += 1;

        if current.coord == end {
            outcome.found = true;
            scheduler.schedule(Effect::TracePath, delays.step_at(step));
            outcome.steps_scheduled += 1;
            break;
        }

        let tentative = g_current.saturating_add(1);
        let neighbors: Vec<Coord> = grid.neighbors(current.coord).collect();
        for neighbor in neighbors {
            let Some(cell) = grid.cell_mut(neighbor) else {
                continue;
            };
            if cell.is_wall() || cell.g_score.is_some_and(|g_score| tentative >= g_score) {
                continue;
            }

            let f_score = tentative.saturating_add(heuristic(neighbor, end));
            cell.predecessor = Some(current.coord);
            cell.g_score = Some(tentative);
            cell.f_score = Some(f_score);

            if !cell.is_start() && !cell.is_end() {
                scheduler.schedule(
                    Effect::Visit {
                        coord: neighbor,
                        f_score,
                    },
                    delays.step_at(step),
                );
                outcome.steps_scheduled += 1;
                let (low, high) = outcome.f_range.unwrap_or((f_score, f_score));
                outcome.f_range = Some((low.min(f_score), high.max(f_score)));
            }
            queue.push(Entry {
                coord: neighbor,
                g_score: tentative,
                f_score,
            });
        }

        step = step.saturating_add(1);
    }

    if !outcome.found {
        scheduler.schedule(Effect::Complete { found: false }, delays.step_at(step));
        outcome.steps_scheduled += 1;
    }

    info!(
        found = outcome.found,
        expanded = outcome.expanded,
        steps_scheduled = outcome.steps_scheduled,
        "search finished"
    );

    Ok(outcome)
}

/// Walks the predecessor chain back from the end cell.
///
/// Returns the cells from start to end, both included, or `None` if the last search did not close
/// the end cell.
pub fn shortest_path(grid: &Grid) -> Option<Vec<Coord>> {
    let end = grid.cell(grid.end())?;
    if !end.is_visited() {
        return None;
    }

    let mut path = vec![end.coord()];
    let mut current = end.predecessor();
    while let Some(coord) = current {
        path.push(coord);
        current = grid.cell(coord)?.predecessor();
    }
    path.reverse();

    (path.first() == Some(&grid.start())).then_some(path)
}

/// Schedules the staggered path animation followed by the completion signal.
///
/// One [`Effect::Path`] goes out per path cell at its index times the path delay, and
/// [`Effect::Complete`] goes out together with the last one. Returns the number of scheduled
/// effects.
pub fn schedule_path<C: Clock>(
    grid: &Grid,
    scheduler: &mut Scheduler<Effect, C>,
    delays: &Delays,
) -> usize {
    let Some(path) = shortest_path(grid) else {
        scheduler.schedule(Effect::Complete { found: false }, delays.path_at(0));
        return 1;
    };

    for (index, coord) in path.iter().enumerate() {
        scheduler.schedule(Effect::Path(*coord), delays.path_at(index));
    }
    scheduler.schedule(
        Effect::Complete { found: true },
        delays.path_at(path.len().saturating_sub(1)),
    );
    debug!(cells = path.len(), "scheduled path animation");

    path.len() + 1
}
