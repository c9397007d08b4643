//! User interface rendering functions for all application screens.

use std::{collections::BTreeMap, rc::Rc};

use color_eyre::eyre::Result;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{
        canvas::{Canvas, Points},
        Block, BorderType, Borders, Clear,
    },
    Frame,
};

use crate::{
    grid::{Coord, Grid},
    types::{MainMenuItem, MenuType, Screen},
    visualizer::Paint,
    App,
};

/// Colour of wall cells.
pub(crate) const WALL_COLOR: Color = Color::Green;

/// Colour of the start cell.
pub(crate) const START_COLOR: Color = Color::Cyan;

/// Colour of the end cell.
pub(crate) const END_COLOR: Color = Color::Red;

/// Colour of the shortest path.
pub(crate) const PATH_COLOR: Color = Color::Rgb(255, 235, 59);

/// Colour of the cursor.
pub(crate) const CURSOR_COLOR: Color = Color::Magenta;

/// Lightness of the visited shade for the lowest score, in percent.
const LIGHTEST: i32 = 90;

/// Range the visited shade darkens over, in percent.
const SHADE_RANGE: i32 = 60;

/// Narrowest the status bar gets, so the key hints fit under small grids.
const TOOLTIP_WIDTH: u16 = 60;

/// Main menu entries with their labels, top to bottom.
const MAIN_MENU: [(&str, MainMenuItem); 3] = [
    ("Visualize", MainMenuItem::Visualize),
    ("Controls", MainMenuItem::Controls),
    ("Quit", MainMenuItem::Quit),
];

/// Bindings listed on the controls screen.
const CONTROLS: [(&str, &str); 12] = [
    ("h j k l, arrows", "move the cursor"),
    ("space", "toggle a wall"),
    ("s / e", "move start / end to the cursor"),
    ("enter", "run the search"),
    ("p", "pause or resume the animation"),
    ("x", "clear the search"),
    ("c", "clear walls"),
    ("r", "reset the grid"),
    ("esc", "abort and return to the menu"),
    ("q", "quit"),
    ("click", "toggle a wall"),
    ("drag", "paint walls or move an endpoint"),
];

/// Updates the application UI based on the persistent state.
///
/// This function dispatches to the rendering function of the screen stored in the [`App`].
///
/// # Errors
///
/// This function may return errors from drawing operations or data conversion failures.
pub(crate) fn draw(app: &mut App, frame: &mut Frame) -> Result<()> {
    match app.screen {
        Screen::MainMenu(item) => main_menu(frame, item),
        Screen::Controls => controls(frame)?,
        Screen::Grid => grid_screen(app, frame)?,
    }

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
///
/// This function covers the whole frame so nothing from the previous screen shows through.
pub(crate) fn clear(frame: &mut Frame) {
    frame.render_widget(Clear, frame.area());
}

/// Renders the centered, bordered box shared by the menus.
///
/// This function sizes the box from the [`MenuType`], draws its title and key hint, and returns
/// one row per content line for the caller to fill.
pub(crate) fn init_menu(frame: &mut Frame, menu: MenuType) -> Rc<[Rect]> {
    let [space] = Layout::vertical([Constraint::Length(u16::from(menu.value()) + 2)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [space] = Layout::horizontal([Constraint::Length(menu.width())])
        .flex(Flex::Center)
        .areas(space);

    let block = Block::bordered()
        .title(menu.repr())
        .title_bottom(menu.hint())
        .title_alignment(Alignment::Center)
        .style(Color::Green)
        .border_type(BorderType::Rounded);

    let inner_space = block.inner(space);

    frame.render_widget(block, space);

    Layout::vertical(vec![Constraint::Length(1); menu.value().into()]).split(inner_space)
}

/// Renders the main menu, highlighting the selected entry.
///
/// This function draws the entries in [`MAIN_MENU`] order inside the shared menu box.
pub(crate) fn main_menu(frame: &mut Frame, item: MainMenuItem) {
    clear(frame);

    let rows = init_menu(frame, MenuType::MainMenu(3));

    let content_style = Style::default().fg(Color::Green);
    let active_content_style = Style::default().fg(Color::White).bg(Color::Green);

    for ((label, entry), row) in MAIN_MENU.iter().zip(rows.iter()) {
        let style = if *entry == item {
            active_content_style
        } else {
            content_style
        };
        frame.render_widget(Line::raw(*label).centered().style(style), *row);
    }
}

/// Renders the key and mouse bindings.
///
/// # Errors
///
/// This function may return errors if the bindings list outgrows the menu line count.
pub(crate) fn controls(frame: &mut Frame) -> Result<()> {
    clear(frame);

    let rows = init_menu(frame, MenuType::Controls(u8::try_from(CONTROLS.len())?));

    let key_style = Style::default().fg(Color::White);
    let action_style = Style::default().fg(Color::Green);

    for ((keys, action), row) in CONTROLS.iter().zip(rows.iter()) {
        let line = Line::from(vec![
            Span::styled(format!(" {keys:<17}"), key_style),
            Span::styled(*action, action_style),
        ]);
        frame.render_widget(line, *row);
    }

    Ok(())
}

/// Renders the grid with the animation overlay and the status bar beneath it.
///
/// The terminal area the grid lands on is stored in the application so mouse input can be mapped
/// back to cells. Each grid cell takes exactly one terminal cell; when the terminal can't hold the
/// whole grid a notice is drawn instead and the stored area is emptied.
///
/// # Errors
///
/// This function may return errors if the grid is too large for terminal coordinates.
pub(crate) fn grid_screen(app: &mut App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let columns = u16::try_from(app.visualizer.grid().width())?;
    let rows = u16::try_from(app.visualizer.grid().height())?;

    let [content_area, tooltip_full_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(frame.area());
    let [_, tooltip_area, _] = Layout::horizontal([
        Constraint::Min(1),
        Constraint::Length(columns.max(TOOLTIP_WIDTH)),
        Constraint::Min(1),
    ])
    .areas(tooltip_full_area);

    let tooltip_block = Block::bordered()
        .title("(enter) search / (p) pause / (esc) menu / (q) quit")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Plain)
        .borders(Borders::TOP);
    let tooltip_inner = tooltip_block.inner(tooltip_area);

    frame.render_widget(tooltip_block, tooltip_area);
    frame.render_widget(tooltip(app), tooltip_inner);

    if content_area.width < columns || content_area.height < rows {
        app.grid_area = Rect::default();
        too_small(frame, content_area, columns, rows);
        return Ok(());
    }

    let [grid_rows] = Layout::vertical([Constraint::Length(rows)])
        .flex(Flex::Center)
        .areas(content_area);
    let [space] = Layout::horizontal([Constraint::Length(columns)])
        .flex(Flex::Center)
        .areas(grid_rows);

    let grid = app.visualizer.grid();
    let walls: Vec<Coord> = grid
        .cells()
        .filter(|cell| cell.is_wall())
        .map(|cell| cell.coord())
        .collect();

    let (lowest, highest) = app
        .visualizer
        .last_outcome()
        .and_then(|outcome| outcome.f_range)
        .unwrap_or_default();

    let mut shades: BTreeMap<i32, Vec<Coord>> = BTreeMap::new();
    let mut path = Vec::new();
    for (coord, paint) in app.visualizer.painted() {
        match paint {
            Paint::Visited(f_score) => shades
                .entry(visited_lightness(f_score, lowest, highest))
                .or_default()
                .push(coord),
            Paint::Path => path.push(coord),
            Paint::Blank => {}
        }
    }

    let shade_layers = shades
        .iter()
        .map(|(lightness, coords)| {
            Ok((
                visited_shade(*lightness),
                transform_grid_to_screen_coords(coords, grid)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    let path_coords = transform_grid_to_screen_coords(&path, grid)?;
    let wall_coords = transform_grid_to_screen_coords(&walls, grid)?;
    let cursor_coords = transform_grid_to_screen_coords(&[app.cursor], grid)?;
    let start_coords = transform_grid_to_screen_coords(&[grid.start()], grid)?;
    let end_coords = transform_grid_to_screen_coords(&[grid.end()], grid)?;

    let board = Canvas::default()
        .x_bounds(centered_bounds(columns))
        .y_bounds(centered_bounds(rows))
        .marker(Marker::Block)
        .paint(|ctx| {
            for (color, coords) in &shade_layers {
                ctx.draw(&Points {
                    coords,
                    color: *color,
                });
            }
            ctx.draw(&Points {
                coords: &path_coords,
                color: PATH_COLOR,
            });
            ctx.draw(&Points {
                coords: &wall_coords,
                color: WALL_COLOR,
            });
            ctx.draw(&Points {
                coords: &cursor_coords,
                color: CURSOR_COLOR,
            });
            ctx.draw(&Points {
                coords: &start_coords,
                color: START_COLOR,
            });
            ctx.draw(&Points {
                coords: &end_coords,
                color: END_COLOR,
            });
        });

    frame.render_widget(board, space);
    app.grid_area = space;

    Ok(())
}

/// Renders a notice in place of a grid that doesn't fit in `area`.
///
/// Nothing is drawn cell by cell in this case, so mouse input has no cell to land on.
fn too_small(frame: &mut Frame, area: Rect, columns: u16, rows: u16) {
    let [notice_area] = Layout::vertical([Constraint::Length(2)])
        .flex(Flex::Center)
        .areas(area);
    let notice = Text::from(vec![
        Line::raw("Terminal too small"),
        Line::raw(format!("the grid needs {columns}x{rows} cells")),
    ])
    .centered()
    .style(Style::default().fg(Color::Red));

    frame.render_widget(notice, notice_area);
}

/// Builds the status line: the cursor cell and its scores, then the search state or the last
/// refusal.
fn tooltip(app: &App) -> Line<'static> {
    let scores = app
        .visualizer
        .cell(app.cursor)
        .and_then(|cell| Some((cell.g_score()?, cell.h_score()?, cell.f_score()?)))
        .map_or_else(
            || "g: - h: - f: -".to_owned(),
            |(g_score, h_score, f_score)| format!("g: {g_score} h: {h_score} f: {f_score}"),
        );

    let state = match app.status.as_deref() {
        Some(status) => Span::styled(status.to_owned(), Style::default().fg(Color::Red)),
        None => Span::styled(search_state(app), Style::default().fg(Color::White)),
    };

    Line::from(vec![
        Span::raw(format!("Node {} | {scores} | ", app.cursor)),
        state,
    ])
    .centered()
}

/// Describes where the search stands.
fn search_state(app: &App) -> &'static str {
    let visualizer = &app.visualizer;
    if visualizer.is_paused() {
        "paused"
    } else if visualizer.is_running() {
        "searching"
    } else {
        match visualizer.last_outcome() {
            Some(outcome) if outcome.found => "path found",
            Some(_) => "no path",
            None => "ready",
        }
    }
}

/// Canvas bounds placing `cells` cell centers exactly one unit apart around the origin.
fn centered_bounds(cells: u16) -> [f64; 2] {
    let half = (f64::from(cells) - 1.) / 2.;
    [-half, half]
}

/// Transforms grid coordinates to canvas coordinates.
///
/// Rows grow downwards on the grid and upwards on the canvas, so a row maps to
/// `(rows - 1) / 2 - row` and a column to `col - (columns - 1) / 2`.
///
/// # Errors
///
/// This function may return errors if a coordinate doesn't fit terminal dimensions.
pub(crate) fn transform_grid_to_screen_coords(
    coords: &[Coord],
    grid: &Grid,
) -> Result<Vec<(f64, f64)>> {
    let [_, top] = centered_bounds(u16::try_from(grid.height())?);
    let [left, _] = centered_bounds(u16::try_from(grid.width())?);

    coords
        .iter()
        .map(|coord| {
            let screen_y = top - f64::from(u16::try_from(coord.row)?);
            let screen_x = left + f64::from(u16::try_from(coord.col)?);

            Ok((screen_x, screen_y))
        })
        .collect()
}

/// Lightness of a visited cell in percent, from the lightest for the lowest score to the darkest
/// for the highest.
pub(crate) fn visited_lightness(f_score: u32, lowest: u32, highest: u32) -> i32 {
    let span = i32::try_from(highest.saturating_sub(lowest)).unwrap_or(i32::MAX);
    if span == 0 {
        return LIGHTEST;
    }
    let offset = i32::try_from(f_score.saturating_sub(lowest))
        .unwrap_or(i32::MAX)
        .min(span);

    LIGHTEST - rounded_div::i32(offset.saturating_mul(SHADE_RANGE), span)
}

/// Converts a lightness on the fully saturated blue hue (210 degrees) to RGB.
pub(crate) fn visited_shade(lightness: i32) -> Color {
    let lightness = lightness.clamp(0, 100);
    let half_chroma = 50 - (lightness - 50).abs();

    Color::Rgb(
        percent_to_channel(lightness - half_chroma),
        percent_to_channel(lightness),
        percent_to_channel(lightness + half_chroma),
    )
}

/// Scales a percentage to a color channel.
fn percent_to_channel(percent: i32) -> u8 {
    u8::try_from(rounded_div::i32(percent.clamp(0, 100) * 255, 100)).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    use super::*;
    use crate::config::{Config, Delays};

    /// Creates a test app on the default configuration.
    fn create_test_app() -> App {
        App::new(&Config::default()).expect("default config is valid")
    }

    /// Creates a test terminal with known dimensions for UI testing.
    fn create_test_terminal() -> Terminal<TestBackend> {
        let backend = TestBackend::new(80, 24);
        Terminal::new(backend).expect("failed to create test terminal")
    }

    /// Returns every row of the buffer as text.
    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .filter_map(|x| buffer.cell((x, y)).map(|cell| cell.symbol().to_owned()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the foreground colour drawn over a grid cell.
    fn cell_color(buffer: &Buffer, area: Rect, coord: Coord) -> Option<Color> {
        let x = area.x + u16::try_from(coord.col).ok()?;
        let y = area.y + u16::try_from(coord.row).ok()?;
        buffer.cell((x, y)).map(|cell| cell.fg)
    }

    /// Draws the app once and returns the resulting buffer.
    fn render(app: &mut App) -> Buffer {
        let mut terminal = create_test_terminal();
        let _ = terminal
            .draw(|frame| draw(app, frame).expect("drawing should succeed in test"))
            .expect("test backend never fails");
        terminal.backend().buffer().clone()
    }

    #[test]
    fn test_draw_main_menu() {
        let mut app = create_test_app();

        let text = buffer_text(&render(&mut app));

        assert!(text.contains("Visualize"));
        assert!(text.contains("Controls"));
        assert!(text.contains("Quit"));
        assert!(text.contains("(l) select"));
    }

    #[test]
    fn test_draw_controls() {
        let mut app = create_test_app();
        app.screen = Screen::Controls;

        let text = buffer_text(&render(&mut app));

        assert!(text.contains("toggle a wall"));
        assert!(text.contains("paint walls or move an endpoint"));
        assert!(text.contains("(h) return"));
    }

    #[test]
    fn test_init_menu_rows() {
        let mut terminal = create_test_terminal();

        let _ = terminal
            .draw(|frame| {
                let layout = init_menu(frame, MenuType::MainMenu(3));
                assert_eq!(layout.len(), 3, "main menu should have 3 rows");
            })
            .expect("test backend never fails");
    }

    #[test]
    fn test_draw_grid_records_area() {
        let mut app = create_test_app();
        app.screen = Screen::Grid;

        let _buffer = render(&mut app);

        assert_eq!(app.grid_area.width, 35);
        assert_eq!(app.grid_area.height, 15);
    }

    #[test]
    fn test_wide_grid_reports_small_terminal() {
        let config = Config::new(
            100,
            15,
            Coord::new(0, 0),
            Coord::new(14, 99),
            Delays::default(),
        )
        .expect("valid wide config");
        let mut app = App::new(&config).expect("valid wide grid");
        app.screen = Screen::Grid;
        app.grid_area = Rect::new(0, 0, 100, 15);

        let text = buffer_text(&render(&mut app));

        assert!(text.contains("Terminal too small"));
        assert!(text.contains("the grid needs 100x15 cells"));
        assert_eq!(app.grid_area, Rect::default());
        assert_eq!(app.cell_at(78, 3), None);
    }

    #[test]
    fn test_drawn_cells_match_mouse_mapping() {
        let mut app = create_test_app();
        app.screen = Screen::Grid;

        let buffer = render(&mut app);
        let area = app.grid_area;
        let end = app.visualizer.grid().end();
        let column = area.x + 29;
        let row = area.y + 7;

        assert_eq!(app.cell_at(column, row), Some(end));
        assert_eq!(buffer.cell((column, row)).map(|cell| cell.fg), Some(END_COLOR));
        assert_eq!(
            app.cell_at(area.right() - 1, area.bottom() - 1),
            Some(Coord::new(14, 34))
        );
    }

    #[test]
    fn test_draw_grid_colors() {
        let mut app = create_test_app();
        app.screen = Screen::Grid;
        assert_eq!(app.visualizer.toggle_wall(Coord::new(0, 0)), Ok(true));

        let buffer = render(&mut app);
        let area = app.grid_area;

        assert_eq!(cell_color(&buffer, area, Coord::new(0, 0)), Some(WALL_COLOR));
        assert_eq!(cell_color(&buffer, area, Coord::new(7, 5)), Some(START_COLOR));
        assert_eq!(cell_color(&buffer, area, Coord::new(7, 29)), Some(END_COLOR));
    }

    #[test]
    fn test_draw_grid_while_searching() {
        let mut app = create_test_app();
        app.screen = Screen::Grid;
        let _outcome = app
            .visualizer
            .run_search()
            .expect("idle session can search");
        let _ = app.visualizer.tick();

        let buffer = render(&mut app);
        let area = app.grid_area;

        // First step of the animation: the cell right of the start.
        assert!(matches!(
            cell_color(&buffer, area, Coord::new(7, 6)),
            Some(Color::Rgb(..))
        ));
        assert!(buffer_text(&buffer).contains("searching"));
    }

    #[test]
    fn test_visited_shades_scale_over_whole_run() {
        let mut app = create_test_app();
        app.screen = Screen::Grid;
        for row in 1..15 {
            assert_eq!(app.visualizer.toggle_wall(Coord::new(row, 10)), Ok(true));
        }
        let outcome = app
            .visualizer
            .run_search()
            .expect("idle session can search");
        let _ = app.visualizer.tick();
        let (lowest, highest) = outcome.f_range.expect("the search visited cells");

        let buffer = render(&mut app);
        let area = app.grid_area;

        // Left of the start: the highest score painted after the first step, not of the run.
        let lightness = visited_lightness(26, lowest, highest);
        assert!(lightness > LIGHTEST - SHADE_RANGE);
        assert_eq!(
            cell_color(&buffer, area, Coord::new(7, 4)),
            Some(visited_shade(lightness))
        );
    }

    #[test]
    fn test_tooltip_shows_cursor_scores() {
        let mut app = create_test_app();
        app.screen = Screen::Grid;
        let _outcome = app
            .visualizer
            .run_search()
            .expect("idle session can search");

        let text = buffer_text(&render(&mut app));

        assert!(text.contains("Node (7, 5) | g: 0 h: 24 f: 24"));
    }

    #[test]
    fn test_tooltip_shows_refusal() {
        let mut app = create_test_app();
        app.screen = Screen::Grid;
        app.status = Some("a search is already running".to_owned());

        let text = buffer_text(&render(&mut app));

        assert!(text.contains("a search is already running"));
    }

    #[test]
    fn test_search_state_labels() {
        let mut app = create_test_app();
        assert_eq!(search_state(&app), "ready");

        let _outcome = app
            .visualizer
            .run_search()
            .expect("idle session can search");
        assert_eq!(search_state(&app), "searching");

        let _ = app.visualizer.pause_animation();
        assert_eq!(search_state(&app), "paused");

        app.visualizer.clear_path_artifacts();
        assert_eq!(search_state(&app), "ready");
    }

    #[test]
    fn test_transform_grid_to_screen_coords() {
        let grid = Grid::new(3, 3, Coord::new(0, 0), Coord::new(2, 2)).expect("valid grid");

        let coords = transform_grid_to_screen_coords(
            &[Coord::new(0, 0), Coord::new(1, 1), Coord::new(2, 0)],
            &grid,
        )
        .expect("small coordinates");

        assert_eq!(coords, vec![(-1., 1.), (0., 0.), (-1., -1.)]);
    }

    #[test]
    fn test_visited_lightness() {
        assert_eq!(visited_lightness(10, 10, 30), 90);
        assert_eq!(visited_lightness(30, 10, 30), 30);
        assert_eq!(visited_lightness(20, 10, 30), 60);
        assert_eq!(visited_lightness(12, 12, 12), 90);
    }

    #[test]
    fn test_visited_shade() {
        assert!(matches!(visited_shade(90), Color::Rgb(204, _, 255)));
        assert!(matches!(visited_shade(30), Color::Rgb(0, _, 153)));
        assert!(matches!(visited_shade(50), Color::Rgb(0, _, 255)));
    }
}
