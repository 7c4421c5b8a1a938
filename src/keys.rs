/// Keyboard shortcuts
///
/// j = next, k = previous, h = mark Bad, l = mark Good.
/// Case-insensitive; modifier combos are left to the system.

use iced::keyboard::{Key, Modifiers};

use crate::state::data::Quality;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Next,
    Previous,
    Mark(Quality),
}

/// Map a key press to a labeling shortcut
pub fn shortcut(key: &Key, modifiers: Modifiers) -> Option<Shortcut> {
    if modifiers.control() || modifiers.alt() || modifiers.logo() {
        return None;
    }

    let Key::Character(c) = key else {
        return None;
    };

    match c.to_lowercase().as_str() {
        "j" => Some(Shortcut::Next),
        "k" => Some(Shortcut::Previous),
        "h" => Some(Shortcut::Mark(Quality::Bad)),
        "l" => Some(Shortcut::Mark(Quality::Good)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::keyboard::key::Named;

    fn press(c: &str) -> Option<Shortcut> {
        shortcut(&Key::Character(c.into()), Modifiers::default())
    }

    #[test]
    fn test_bindings() {
        assert_eq!(press("j"), Some(Shortcut::Next));
        assert_eq!(press("k"), Some(Shortcut::Previous));
        assert_eq!(press("h"), Some(Shortcut::Mark(Quality::Bad)));
        assert_eq!(press("l"), Some(Shortcut::Mark(Quality::Good)));
    }

    #[test]
    fn test_uppercase_matches() {
        assert_eq!(press("J"), Some(Shortcut::Next));
        assert_eq!(press("L"), Some(Shortcut::Mark(Quality::Good)));
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(press("x"), None);
        assert_eq!(shortcut(&Key::Named(Named::ArrowRight), Modifiers::default()), None);
    }

    #[test]
    fn test_ctrl_combo_ignored() {
        assert_eq!(shortcut(&Key::Character("l".into()), Modifiers::CTRL), None);
    }
}
