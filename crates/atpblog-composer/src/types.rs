//! Core value types shared across the composer modules.

use std::ops::Range;

use smol_str::SmolStr;

/// A selection span over the buffer, in char offsets.
///
/// `start == end` is a caret. Values built through [`Selection::new`] are
/// always ordered; whether a span fits a given buffer is checked at the
/// composer boundary with [`Selection::fits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A collapsed selection at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the span lies inside a buffer of `len` chars.
    pub fn fits(&self, len: usize) -> bool {
        self.start <= self.end && self.end <= len
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// One planned buffer mutation plus the selection to restore afterwards.
///
/// Plans are computed against the current buffer and committed atomically;
/// `range` is in pre-edit char offsets, `selection_after` in post-edit ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Chars to remove, end exclusive.
    pub range: Range<usize>,
    /// Text taking their place.
    pub insert: SmolStr,
    /// Where the selection lands once applied.
    pub selection_after: Selection,
}

/// Formatting operations routed through the composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Link,
    Mention,
}
