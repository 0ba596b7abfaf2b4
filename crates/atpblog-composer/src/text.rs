//! Text surface abstraction over the draft buffer.

use std::ops::Range;

use ropey::Rope;
use smol_str::SmolStr;

/// Char-offset addressed text storage under the composer.
///
/// Offsets are char offsets throughout, never bytes. All methods are total:
/// out-of-range input answers with `None` or does nothing, matching the
/// composer's absorb-faults discipline.
pub trait TextSurface {
    /// Length in chars.
    fn len_chars(&self) -> usize;

    /// True when the buffer holds no text.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// The char at `offset`, if any.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Copy of `range`, or `None` when it falls outside the buffer.
    fn slice(&self, range: Range<usize>) -> Option<SmolStr>;

    /// Replaces `range` with `text`. Out-of-range input is a no-op.
    fn replace(&mut self, range: Range<usize>, text: &str);

    /// Inserts at `offset`.
    fn insert(&mut self, offset: usize, text: &str) {
        self.replace(offset..offset, text);
    }

    /// Removes `range`.
    fn delete(&mut self, range: Range<usize>) {
        self.replace(range, "");
    }

    /// Whole buffer as an owned `String`.
    fn to_text(&self) -> String;

    /// Char offset of the first occurrence of `needle`, if present.
    fn find(&self, needle: &str) -> Option<usize> {
        let text = self.to_text();
        let byte = text.find(needle)?;
        Some(text[..byte].chars().count())
    }
}

/// Rope-backed surface.
#[derive(Debug, Clone, Default)]
pub struct RopeSurface {
    rope: Rope,
}

impl RopeSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<&str> for RopeSurface {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl From<String> for RopeSurface {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl TextSurface for RopeSurface {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.rope.get_char(offset)
    }

    fn slice(&self, range: Range<usize>) -> Option<SmolStr> {
        self.rope
            .get_slice(range)
            .map(|slice| SmolStr::new(slice.to_string()))
    }

    fn replace(&mut self, range: Range<usize>, text: &str) {
        let start = range.start;
        if self.rope.try_remove(range).is_err() {
            return;
        }
        if !text.is_empty() {
            let _ = self.rope.try_insert(start, text);
        }
    }

    fn to_text(&self) -> String {
        self.rope.to_string()
    }
}
