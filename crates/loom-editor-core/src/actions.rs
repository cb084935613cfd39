//! Keyboard input types.
//!
//! Platform-agnostic key definitions. Platform-specific code converts native
//! key events into `KeyInput`, and the inline editor classifies them into
//! `EditKey` triggers.

use smol_str::SmolStr;

/// Key values for keyboard input.
///
/// Only the keys the editing engine reacts to get their own variant;
/// everything else is `Character` or `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    /// Any other named key (navigation, modifiers, function keys...).
    Other(SmolStr),
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<SmolStr>) -> Self {
        Self::Character(s.into())
    }

    /// Parse a W3C `KeyboardEvent.key` value.
    pub fn from_key_value(value: &str) -> Self {
        match value {
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            other if other.chars().count() == 1 => Self::Character(other.into()),
            other => Self::Other(other.into()),
        }
    }
}

/// Modifier key state for a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };
}

/// A key press with its modifier state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }

    /// Classify this key press as an edit-session trigger.
    pub fn edit_key(&self) -> EditKey {
        match self.key {
            Key::Enter if !self.modifiers.shift => EditKey::Confirm,
            Key::Escape => EditKey::Cancel,
            _ => EditKey::Other,
        }
    }
}

/// What a key press means to an open edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    /// Unshifted Enter: commit and suppress the newline.
    Confirm,
    /// Escape: roll back, then commit.
    Cancel,
    /// Regular typing, left to the surface.
    Other,
}

/// Result of handling a keydown event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// Event was handled, prevent default.
    Handled,
    /// Event was not for us, let the platform handle it.
    NotHandled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_key_classification() {
        assert_eq!(KeyInput::new(Key::Enter).edit_key(), EditKey::Confirm);
        assert_eq!(KeyInput::shift(Key::Enter).edit_key(), EditKey::Other);
        assert_eq!(KeyInput::new(Key::Escape).edit_key(), EditKey::Cancel);
        assert_eq!(KeyInput::shift(Key::Escape).edit_key(), EditKey::Cancel);
        assert_eq!(
            KeyInput::new(Key::character("a")).edit_key(),
            EditKey::Other
        );
    }

    #[test]
    fn test_key_from_value() {
        assert_eq!(Key::from_key_value("Enter"), Key::Enter);
        assert_eq!(Key::from_key_value("Esc"), Key::Escape);
        assert_eq!(Key::from_key_value("x"), Key::character("x"));
        assert_eq!(
            Key::from_key_value("ArrowLeft"),
            Key::Other("ArrowLeft".into())
        );
    }
}
