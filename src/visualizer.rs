//! Pathfinding session: grid, search, animation and the rules binding them together.
//!
//! [`Visualizer`] is the single owner of the mutable state. Grid edits and searches are mutually
//! exclusive: while an animation is in flight the grid is frozen, and the only ways out are letting
//! the animation finish or aborting it.

use std::{collections::BTreeMap, time::Instant};

use tracing::{debug, info, warn};

use crate::{
    config::{Config, Delays},
    errors::GridError,
    grid::{Cell, Coord, Grid},
    search::{self, Effect, Outcome},
    timer::{Clock, Scheduler, SystemClock},
};

/// How a cell is currently painted by the animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Paint {
    /// Nothing shown yet.
    #[default]
    Blank,
    /// Reached by the search with the given estimated total cost.
    Visited(u32),
    /// Part of the shortest path.
    Path,
}

/// Owner of a grid, its animation scheduler and the search guard.
#[derive(Debug)]
pub struct Visualizer<C = SystemClock> {
    /// Board being searched.
    grid: Grid,
    /// Pending animation effects.
    scheduler: Scheduler<Effect, C>,
    /// Animation pacing.
    delays: Delays,
    /// Cells painted so far by fired effects.
    painted: BTreeMap<Coord, Paint>,
    /// Whether a search animation is in flight.
    running: bool,
    /// Summary of the most recent search.
    last_outcome: Option<Outcome>,
}

impl Visualizer {
    /// Builds a session on the system clock.
    ///
    /// # Errors
    ///
    /// This function may return errors if the configuration describes an impossible grid.
    pub fn new(config: &Config) -> Result<Self, GridError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C> Visualizer<C>
where
    C: Clock,
{
    /// Builds a session whose animation reads time from `clock`.
    ///
    /// # Errors
    ///
    /// This function may return errors if the configuration describes an impossible grid.
    pub fn with_clock(config: &Config, clock: C) -> Result<Self, GridError> {
        let grid = Grid::new(config.width(), config.height(), config.start(), config.end())?;
        info!(
            width = grid.width(),
            height = grid.height(),
            start = %grid.start(),
            end = %grid.end(),
            "grid initialised"
        );

        Ok(Self {
            grid,
            scheduler: Scheduler::with_clock(clock),
            delays: config.delays(),
            painted: BTreeMap::new(),
            running: false,
            last_outcome: None,
        })
    }

    /// Returns the board.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns a read-only view of a cell.
    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.grid.cell(coord)
    }

    /// Returns how a cell is currently painted.
    pub fn paint(&self, coord: Coord) -> Paint {
        self.painted.get(&coord).copied().unwrap_or_default()
    }

    /// Returns every painted cell.
    pub fn painted(&self) -> impl Iterator<Item = (Coord, Paint)> + '_ {
        self.painted.iter().map(|(coord, paint)| (*coord, *paint))
    }

    /// Returns the animation pacing.
    pub const fn delays(&self) -> Delays {
        self.delays
    }

    /// Returns the clock driving the animation.
    pub const fn clock(&self) -> &C {
        self.scheduler.clock()
    }

    /// Returns whether a search animation is in flight.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Returns whether the animation in flight is paused.
    pub const fn is_paused(&self) -> bool {
        self.running && self.scheduler.is_paused()
    }

    /// Returns the summary of the most recent search, if one ran since the last reset.
    pub const fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Returns the number of effects still waiting to be shown.
    pub fn pending_effects(&self) -> usize {
        self.scheduler.len()
    }

    /// Returns when the next effect is due, if any is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Fails if a search animation is in flight.
    ///
    /// # Errors
    ///
    /// This function may return errors if a search is running.
    pub fn ensure_idle(&self) -> Result<(), GridError> {
        if self.running {
            warn!("grid change refused while a search is running");
            return Err(GridError::SearchRunning);
        }

        Ok(())
    }

    /// Runs a search from the current start to the current end and queues its animation.
    ///
    /// Scores and paint left over from the previous run are wiped first.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - A search is already running
    /// - The search loop breaks its own invariants
    pub fn run_search(&mut self) -> Result<Outcome, GridError> {
        self.ensure_idle()?;

        self.abort();
        self.grid.reset_search_state();
        self.painted.clear();
        self.running = true;

        let outcome = search::run(&mut self.grid, &mut self.scheduler, &self.delays)?;
        self.last_outcome = Some(outcome);

        Ok(outcome)
    }

    /// Holds the animation back. Returns whether anything changed.
    pub fn pause_animation(&mut self) -> bool {
        if !self.running || self.scheduler.is_paused() {
            return false;
        }
        self.scheduler.pause();
        info!("animation paused");

        true
    }

    /// Lets a paused animation continue. Returns whether anything changed.
    pub fn resume_animation(&mut self) -> bool {
        if !self.is_paused() {
            return false;
        }
        self.scheduler.resume();
        info!("animation resumed");

        true
    }

    /// Pauses a playing animation or resumes a paused one. Returns whether it is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.is_paused() {
            let _ = self.resume_animation();
        } else {
            let _ = self.pause_animation();
        }

        self.is_paused()
    }

    /// Aborts any animation and brings the board back to an empty state.
    ///
    /// Walls, scores and paint are dropped; start and end stay where they are.
    pub fn reset_grid(&mut self) {
        self.abort();
        self.grid.clear_walls();
        self.grid.reset_search_state();
        self.painted.clear();
        self.last_outcome = None;
        info!("grid reset");
    }

    /// Removes every wall.
    ///
    /// # Errors
    ///
    /// This function may return errors if a search is running.
    pub fn clear_walls(&mut self) -> Result<(), GridError> {
        self.ensure_idle()?;
        self.grid.clear_walls();
        debug!("walls cleared");

        Ok(())
    }

    /// Aborts any animation and wipes scores and paint, keeping walls and endpoints.
    pub fn clear_path_artifacts(&mut self) {
        self.abort();
        self.grid.reset_search_state();
        self.painted.clear();
        self.last_outcome = None;
        debug!("search artifacts cleared");
    }

    /// Flips a wall. Returns whether the cell is now a wall.
    ///
    /// # Errors
    ///
    /// This function may return errors if a search is running, or if the cell is out of bounds or
    /// an endpoint.
    pub fn toggle_wall(&mut self, coord: Coord) -> Result<bool, GridError> {
        self.ensure_idle()?;
        self.grid.toggle_wall(coord)
    }

    /// Moves the start cell.
    ///
    /// # Errors
    ///
    /// This function may return errors if a search is running, or if the target is out of bounds,
    /// a wall, or the end cell.
    pub fn move_start(&mut self, coord: Coord) -> Result<(), GridError> {
        self.ensure_idle()?;
        self.grid.move_start(coord)
    }

    /// Moves the end cell.
    ///
    /// # Errors
    ///
    /// This function may return errors if a search is running, or if the target is out of bounds,
    /// a wall, or the start cell.
    pub fn move_end(&mut self, coord: Coord) -> Result<(), GridError> {
        self.ensure_idle()?;
        self.grid.move_end(coord)
    }

    /// Applies every effect that is due and returns how many were applied.
    pub fn tick(&mut self) -> usize {
        let Self {
            grid,
            scheduler,
            delays,
            painted,
            running,
            ..
        } = self;

        scheduler.fire_due(|scheduler, effect| match effect {
            Effect::Visit { coord, f_score } => {
                let _ = painted.insert(coord, Paint::Visited(f_score));
            }
            Effect::TracePath => {
                let _ = search::schedule_path(grid, scheduler, delays);
            }
            Effect::Path(coord) => {
                if grid
                    .cell(coord)
                    .is_some_and(|cell| !cell.is_start() && !cell.is_end())
                {
                    let _ = painted.insert(coord, Paint::Path);
                }
            }
            Effect::Complete { found } => {
                *running = false;
                info!(found, "animation complete");
            }
        })
    }

    /// Drops every pending effect and releases the search guard.
    fn abort(&mut self) {
        self.scheduler.clear();
        self.scheduler.resume();
        if self.running {
            info!("animation aborted");
        }
        self.running = false;
    }
}
