//! Key event vocabulary shared between the composer and its host.

use smol_str::SmolStr;

/// Logical key identity, independent of layout and platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A printable character as the platform reported it.
    Character(SmolStr),
    Enter,
    Backspace,
    Delete,
    Tab,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    /// Anything the host could not map.
    Unidentified,
}

impl Key {
    /// A `Character` key from a single char.
    pub fn char(c: char) -> Self {
        Key::Character(SmolStr::from_iter([c]))
    }

    /// True for the four caret-movement arrows.
    pub fn is_arrow(&self) -> bool {
        matches!(
            self,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight
        )
    }

    /// True for ArrowUp and ArrowDown.
    pub fn is_vertical_arrow(&self) -> bool {
        matches!(self, Key::ArrowUp | Key::ArrowDown)
    }

    /// Lowercased char for shortcut matching, when this is a
    /// single-character key.
    pub fn shortcut_char(&self) -> Option<char> {
        match self {
            Key::Character(s) => {
                let mut chars = s.chars();
                let first = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Some(first.to_ascii_lowercase())
            }
            _ => None,
        }
    }
}

/// Modifier key state for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };
    pub const META: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: true,
    };
    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    /// True when the platform command modifier is down. Ctrl and meta both
    /// count, so the same chords work across conventions.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// One key event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// A bare key with no modifiers.
    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// What the host must do with the event after the composer saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Consumed. Prevent the default action and stop propagation.
    Handled,
    /// The draft is ready to submit. Prevent the default action; submission
    /// itself is host-owned.
    Submit,
    /// Let the default action run but keep the event away from outer
    /// handlers.
    StopPropagation,
    /// Not interesting here. Default action and propagation both proceed.
    PassThrough,
}
