//! Navigation and interaction state shared by the event handlers and the renderer.

use crate::grid::Coord;

/// Screen currently shown to the user.
///
/// This enumeration decides which screen gets rendered and how key presses are interpreted.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Screen {
    /// Main menu, with the highlighted entry.
    ///
    /// This variant represents the entry screen of the application.
    MainMenu(MainMenuItem),
    /// Key and mouse bindings reference.
    ///
    /// This variant represents the static screen listing every binding.
    Controls,
    /// The grid being edited and searched.
    ///
    /// This variant represents the screen where walls are drawn, endpoints moved and the search
    /// animated.
    Grid,
}

/// Entries of the main menu.
///
/// This enumeration holds the items the user can highlight and select in the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MainMenuItem {
    /// Opens the grid.
    Visualize,
    /// Opens the bindings reference.
    Controls,
    /// Leaves the application.
    Quit,
}

/// Boxed menus sharing the same frame.
///
/// This enumeration is handed to the menu layout to pick the title, hint and size of the box.
/// Each variant carries the number of content lines the menu needs.
pub(crate) enum MenuType {
    /// Main menu.
    MainMenu(u8),
    /// Bindings reference.
    Controls(u8),
}

impl MenuType {
    /// Returns the menu title.
    pub(crate) const fn repr(&self) -> &str {
        match self {
            Self::MainMenu(_) => "Pathtuine",
            Self::Controls(_) => "Controls",
        }
    }

    /// Returns the number of content lines.
    pub(crate) const fn value(&self) -> u8 {
        match self {
            Self::MainMenu(value) | Self::Controls(value) => *value,
        }
    }

    /// Returns the key hint shown in the bottom border.
    pub(crate) const fn hint(&self) -> &str {
        match self {
            Self::MainMenu(_) => "(j) down / (k) up / (l) select",
            Self::Controls(_) => "(h) return",
        }
    }

    /// Returns the width of the box in terminal cells, borders included.
    pub(crate) const fn width(&self) -> u16 {
        match self {
            Self::MainMenu(_) => 34,
            Self::Controls(_) => 52,
        }
    }
}

/// Mouse gesture in progress on the grid.
///
/// This enumeration remembers what the left button picked up when it was pressed, so drags keep
/// doing the same thing. A gesture lasts until the button is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Gesture {
    /// Dragging the start cell around.
    ///
    /// This variant is entered by pressing on the start cell.
    MoveStart,
    /// Dragging the end cell around.
    ///
    /// This variant is entered by pressing on the end cell.
    MoveEnd,
    /// Toggling walls under the pointer.
    ///
    /// This variant is entered by pressing anywhere else on the grid.
    Paint {
        /// Last cell toggled, so hovering in place doesn't flip it back.
        last: Coord,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_variants() {
        let main_menu = Screen::MainMenu(MainMenuItem::Visualize);

        assert_eq!(main_menu, Screen::MainMenu(MainMenuItem::Visualize));
        assert_ne!(main_menu, Screen::MainMenu(MainMenuItem::Quit));
        assert_ne!(main_menu, Screen::Grid);
        assert_ne!(Screen::Controls, Screen::Grid);
    }

    #[test]
    fn test_menu_type_accessors() {
        let main_menu = MenuType::MainMenu(3);
        let controls = MenuType::Controls(14);

        assert_eq!(main_menu.repr(), "Pathtuine");
        assert_eq!(controls.repr(), "Controls");
        assert_eq!(main_menu.value(), 3);
        assert_eq!(controls.value(), 14);
        assert!(main_menu.hint().contains("(l) select"));
        assert!(controls.hint().contains("(h) return"));
    }

    #[test]
    fn test_menu_fits_hint() {
        for menu in [MenuType::MainMenu(3), MenuType::Controls(14)] {
            let hint = u16::try_from(menu.hint().len()).expect("short hint");
            assert!(menu.width() >= hint + 2, "{} hint overflows", menu.repr());
        }
    }

    #[test]
    fn test_gesture_tracks_last_cell() {
        let gesture = Gesture::Paint {
            last: Coord::new(1, 2),
        };

        assert_ne!(
            gesture,
            Gesture::Paint {
                last: Coord::new(2, 1)
            }
        );
        assert_ne!(gesture, Gesture::MoveStart);
        assert_eq!(format!("{:?}", Gesture::MoveEnd), "MoveEnd");
    }
}
