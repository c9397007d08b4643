//! Event handling functions for user input and animation updates.

use color_eyre::eyre::Result;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use tracing::debug;

use crate::{
    grid::Coord,
    types::{Gesture, MainMenuItem, Screen},
    App,
};

/// Handles input events and advances the animation.
///
/// Polling waits at most until the next animation effect is due, so the animation keeps its pace
/// while the user is idle.
pub(crate) fn handle_events(app: &mut App) -> Result<()> {
    if event::poll(app.poll_timeout())? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key.code)?,
            Event::Mouse(mouse) => handle_mouse(app, mouse)?,
            _ => {}
        }
    }

    let _ = app.visualizer.tick();

    Ok(())
}

/// Dispatches a key press.
///
/// This function routes the navigation keys to their `handle_*_events` functions and everything
/// else to the screen-specific handlers.
///
/// # Errors
///
/// This function may return errors if a grid command breaks an invariant of the search.
pub(crate) fn handle_key(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Char('q') => app.exit = true,
        KeyCode::Char('j') | KeyCode::Down => handle_j_events(app),
        KeyCode::Char('k') | KeyCode::Up => handle_k_events(app),
        KeyCode::Char('l') | KeyCode::Right => handle_l_events(app),
        KeyCode::Char('h') | KeyCode::Left => handle_h_events(app),
        KeyCode::Esc => handle_escape(app),
        _ if app.screen == Screen::Grid => handle_grid_command(app, code)?,
        _ => {}
    }

    Ok(())
}

/// Handles 'j' key press events for downward navigation.
///
/// This function moves to the next main menu entry, or moves the cursor down on the grid.
pub(crate) fn handle_j_events(app: &mut App) {
    match app.screen {
        Screen::MainMenu(MainMenuItem::Visualize) => {
            app.screen = Screen::MainMenu(MainMenuItem::Controls);
        }
        Screen::MainMenu(MainMenuItem::Controls) => {
            app.screen = Screen::MainMenu(MainMenuItem::Quit);
        }
        Screen::Grid => {
            let last = app.visualizer.grid().height().saturating_sub(1);
            app.cursor.row = (app.cursor.row + 1).min(last);
        }
        _ => {}
    }
}

/// Handles 'k' key press events for upward navigation.
///
/// This function moves to the previous main menu entry, or moves the cursor up on the grid.
pub(crate) fn handle_k_events(app: &mut App) {
    match app.screen {
        Screen::MainMenu(MainMenuItem::Quit) => {
            app.screen = Screen::MainMenu(MainMenuItem::Controls);
        }
        Screen::MainMenu(MainMenuItem::Controls) => {
            app.screen = Screen::MainMenu(MainMenuItem::Visualize);
        }
        Screen::Grid => app.cursor.row = app.cursor.row.saturating_sub(1),
        _ => {}
    }
}

/// Handles 'l' key press events for selection and forward navigation.
///
/// This function opens the highlighted main menu entry, or moves the cursor right on the grid.
pub(crate) fn handle_l_events(app: &mut App) {
    match app.screen {
        Screen::MainMenu(MainMenuItem::Visualize) => app.screen = Screen::Grid,
        Screen::MainMenu(MainMenuItem::Controls) => app.screen = Screen::Controls,
        Screen::MainMenu(MainMenuItem::Quit) => app.exit = true,
        Screen::Grid => {
            let last = app.visualizer.grid().width().saturating_sub(1);
            app.cursor.col = (app.cursor.col + 1).min(last);
        }
        Screen::Controls => {}
    }
}

/// Handles 'h' key press events for backward navigation.
///
/// This function returns from the controls screen to the main menu, or moves the cursor left on
/// the grid.
pub(crate) fn handle_h_events(app: &mut App) {
    match app.screen {
        Screen::Controls => app.screen = Screen::MainMenu(MainMenuItem::Controls),
        Screen::Grid => app.cursor.col = app.cursor.col.saturating_sub(1),
        Screen::MainMenu(_) => {}
    }
}

/// Handles the escape key.
///
/// This function aborts any animation in flight and goes back to the main menu.
pub(crate) fn handle_escape(app: &mut App) {
    match app.screen {
        Screen::Grid => {
            app.visualizer.clear_path_artifacts();
            app.gesture = None;
            app.status = None;
            app.screen = Screen::MainMenu(MainMenuItem::Visualize);
        }
        Screen::Controls => app.screen = Screen::MainMenu(MainMenuItem::Controls),
        Screen::MainMenu(_) => {}
    }
}

/// Runs the grid command bound to `code` against the cursor cell.
///
/// This function hands the outcome to [`App::report`], so refusals show up in the status bar.
///
/// # Errors
///
/// This function may return errors if the command fails with anything other than a refusal.
pub(crate) fn handle_grid_command(app: &mut App, code: KeyCode) -> Result<()> {
    let cursor = app.cursor;
    match code {
        KeyCode::Char(' ') => {
            let result = app.visualizer.toggle_wall(cursor);
            app.report(result)?;
        }
        KeyCode::Char('s') => {
            let result = app.visualizer.move_start(cursor);
            app.report(result)?;
        }
        KeyCode::Char('e') => {
            let result = app.visualizer.move_end(cursor);
            app.report(result)?;
        }
        KeyCode::Enter => {
            let result = app.visualizer.run_search();
            app.report(result)?;
        }
        KeyCode::Char('p') => {
            let paused = app.visualizer.toggle_pause();
            debug!(paused, "pause toggled");
        }
        KeyCode::Char('r') => {
            app.visualizer.reset_grid();
            app.status = None;
        }
        KeyCode::Char('c') => {
            let result = app.visualizer.clear_walls();
            app.report(result)?;
        }
        KeyCode::Char('x') => {
            app.visualizer.clear_path_artifacts();
            app.status = None;
        }
        _ => {}
    }

    Ok(())
}

/// Handles mouse input on the grid.
///
/// Pressing on an endpoint picks it up and dragging carries it over open cells. Pressing anywhere
/// else toggles a wall, and dragging keeps toggling the cells passed over.
pub(crate) fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Result<()> {
    if app.screen != Screen::Grid {
        return Ok(());
    }
    if matches!(mouse.kind, MouseEventKind::Up(MouseButton::Left)) {
        app.gesture = None;
        return Ok(());
    }
    let Some(coord) = app.cell_at(mouse.column, mouse.row) else {
        return Ok(());
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => press(app, coord)?,
        MouseEventKind::Drag(MouseButton::Left) => drag(app, coord),
        MouseEventKind::Moved => app.cursor = coord,
        _ => {}
    }

    Ok(())
}

/// Starts a gesture on `coord`.
fn press(app: &mut App, coord: Coord) -> Result<()> {
    app.cursor = coord;

    let guard = app.visualizer.ensure_idle();
    if guard.is_err() {
        return app.report(guard);
    }

    let grid = app.visualizer.grid();
    if coord == grid.start() {
        app.gesture = Some(Gesture::MoveStart);
    } else if coord == grid.end() {
        app.gesture = Some(Gesture::MoveEnd);
    } else {
        let result = app.visualizer.toggle_wall(coord);
        if result.is_ok() {
            app.gesture = Some(Gesture::Paint { last: coord });
        }
        app.report(result)?;
    }

    Ok(())
}

/// Continues the gesture in progress over `coord`.
///
/// Cells that can't take the change are skipped without a message.
fn drag(app: &mut App, coord: Coord) {
    app.cursor = coord;

    match app.gesture {
        Some(Gesture::MoveStart) => {
            let _moved = app.visualizer.move_start(coord).is_ok();
        }
        Some(Gesture::MoveEnd) => {
            let _moved = app.visualizer.move_end(coord).is_ok();
        }
        Some(Gesture::Paint { last }) if last != coord => {
            let _toggled = app.visualizer.toggle_wall(coord).is_ok();
            app.gesture = Some(Gesture::Paint { last: coord });
        }
        _ => {}
    }
}
