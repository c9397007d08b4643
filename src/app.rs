//! Application state and main loop of the visualizer.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use ratatui::{layout::Rect, DefaultTerminal};

use crate::{
    config::Config,
    errors::GridError,
    events,
    grid::Coord,
    types::{Gesture, MainMenuItem, Screen},
    ui,
    visualizer::Visualizer,
};

/// Longest time the loop blocks waiting for input.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Application state container.
///
/// This structure holds everything the interface needs between two frames. Ratatui renders from
/// it and crossterm events are written into it.
pub struct App {
    /// Set once the user asks to quit.
    ///
    /// This field is checked by the main loop before every redraw.
    pub(crate) exit: bool,
    /// Screen being displayed.
    ///
    /// This field decides both what gets drawn and how key presses are dispatched.
    pub(crate) screen: Screen,
    /// Grid, search and animation.
    ///
    /// This field owns the board and the scheduler playing the search back. Every grid command
    /// goes through it so that edits are refused while a search is animating.
    pub(crate) visualizer: Visualizer,
    /// Cell under the keyboard cursor, or last hovered by the mouse.
    ///
    /// This field selects the cell the key commands act on and whose scores the status bar shows.
    pub(crate) cursor: Coord,
    /// Terminal area the grid occupied during the last redraw.
    ///
    /// This field holds the area measured in terminal cells during the last redraw of the grid
    /// screen. Mouse positions are mapped to cells through it. It's empty until the grid is first
    /// drawn, and again whenever the terminal is too small to hold the grid.
    pub(crate) grid_area: Rect,
    /// Mouse gesture in progress.
    pub(crate) gesture: Option<Gesture>,
    /// Why the last grid command was refused.
    ///
    /// This field is shown in the status bar until the next grid command succeeds.
    pub(crate) status: Option<String>,
}

impl App {
    /// Creates the application for the given configuration.
    ///
    /// This function starts on the main menu with the cursor on the start cell.
    ///
    /// # Errors
    ///
    /// This function may return errors if the configuration describes an impossible grid.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            exit: false,
            screen: Screen::MainMenu(MainMenuItem::Visualize),
            visualizer: Visualizer::new(config)?,
            cursor: config.start(),
            grid_area: Rect::default(),
            gesture: None,
            status: None,
        })
    }

    /// Runs the main loop until the user quits.
    ///
    /// This function alternates between drawing a frame and handling the events that arrived in
    /// the meantime, which also moves the animation forward.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            let _ = terminal.try_draw(|frame| {
                ui::draw(self, frame).map_err(std::io::Error::other)
            })?;
            events::handle_events(self)?;
        }

        Ok(())
    }

    /// Returns how long to wait for input before the animation needs another frame.
    pub(crate) fn poll_timeout(&self) -> Duration {
        self.visualizer
            .next_deadline()
            .map_or(POLL_INTERVAL, |deadline| {
                deadline
                    .saturating_duration_since(Instant::now())
                    .min(POLL_INTERVAL)
            })
    }

    /// Records the result of a grid command.
    ///
    /// Refusals end up in the status line; anything else is a bug and goes up.
    ///
    /// # Errors
    ///
    /// This function may return errors if `result` holds an error that is not a refusal.
    pub(crate) fn report<T>(&mut self, result: Result<T, GridError>) -> Result<()> {
        match result {
            Ok(_) => {
                self.status = None;
                Ok(())
            }
            Err(err) if err.is_rejection() => {
                self.status = Some(err.to_string());
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Maps a terminal position to the grid cell drawn there.
    ///
    /// This function relies on the last redraw having placed one grid cell on each terminal cell
    /// of [`App::grid_area`]. An area of any other size means the grid wasn't drawn, and no
    /// position maps to a cell.
    pub(crate) fn cell_at(&self, column: u16, row: u16) -> Option<Coord> {
        let grid = self.visualizer.grid();
        let area = self.grid_area;
        if usize::from(area.width) != grid.width() || usize::from(area.height) != grid.height() {
            return None;
        }
        let inside = (area.left()..area.right()).contains(&column)
            && (area.top()..area.bottom()).contains(&row);
        if !inside {
            return None;
        }

        let coord = Coord::new(usize::from(row - area.y), usize::from(column - area.x));
        grid.contains(coord).then_some(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::EmptyQueue;

    /// Creates an app on the default configuration.
    fn create_test_app() -> App {
        App::new(&Config::default()).expect("default config is valid")
    }

    #[test]
    fn test_new_app() {
        let app = create_test_app();

        assert!(!app.exit);
        assert_eq!(app.screen, Screen::MainMenu(MainMenuItem::Visualize));
        assert_eq!(app.cursor, Coord::new(7, 5));
        assert_eq!(app.gesture, None);
        assert_eq!(app.status, None);
    }

    #[test]
    fn test_poll_timeout_when_idle() {
        let app = create_test_app();

        assert_eq!(app.poll_timeout(), POLL_INTERVAL);
    }

    #[test]
    fn test_poll_timeout_while_animating() {
        let mut app = create_test_app();
        let _outcome = app
            .visualizer
            .run_search()
            .expect("idle session can search");

        // First visits are due immediately.
        assert_eq!(app.poll_timeout(), Duration::ZERO);
    }

    #[test]
    fn test_report_keeps_refusals() {
        let mut app = create_test_app();

        app.report::<()>(Err(GridError::SearchRunning))
            .expect("refusals are not fatal");
        assert_eq!(
            app.status.as_deref(),
            Some("a search is already running")
        );

        app.report(Ok(true)).expect("success");
        assert_eq!(app.status, None);
    }

    #[test]
    fn test_report_propagates_faults() {
        let mut app = create_test_app();

        let result = app.report::<()>(Err(GridError::EmptyQueue(EmptyQueue)));

        assert!(result.is_err());
    }

    #[test]
    fn test_cell_at() {
        let mut app = create_test_app();
        app.grid_area = Rect::new(10, 2, 35, 15);

        assert_eq!(app.cell_at(10, 2), Some(Coord::new(0, 0)));
        assert_eq!(app.cell_at(44, 16), Some(Coord::new(14, 34)));
        assert_eq!(app.cell_at(9, 2), None);
        assert_eq!(app.cell_at(45, 2), None);
        assert_eq!(app.cell_at(10, 17), None);
    }

    #[test]
    fn test_cell_at_ignores_mismatched_area() {
        let mut app = create_test_app();
        app.grid_area = Rect::new(0, 0, 34, 15);

        assert_eq!(app.cell_at(0, 0), None);
        assert_eq!(app.cell_at(10, 5), None);
    }

    #[test]
    fn test_cell_at_before_first_draw() {
        let app = create_test_app();

        assert_eq!(app.cell_at(0, 0), None);
    }
}
