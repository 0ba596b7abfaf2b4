//! Selection boundary resolution.

use std::ops::Range;

use smol_str::SmolStr;

use crate::text::TextSurface;
use crate::types::Selection;

/// A selection with its surrounding whitespace peeled off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedSpan {
    /// Selection contents without leading or trailing whitespace.
    pub text: SmolStr,
    /// First char of the trimmed text.
    pub start: usize,
    /// One past the last char of the trimmed text.
    pub end: usize,
}

/// Shrinks `selection` to its non-whitespace core.
///
/// Empty and all-whitespace selections collapse to the original start, so
/// callers never see an inverted span. Returns `None` when the selection
/// falls outside the buffer.
pub fn trim_selection<S: TextSurface>(surface: &S, selection: Selection) -> Option<TrimmedSpan> {
    let raw = surface.slice(selection.to_range())?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(TrimmedSpan {
            text: SmolStr::default(),
            start: selection.start,
            end: selection.start,
        });
    }
    let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
    let trailing = raw.chars().rev().take_while(|c| c.is_whitespace()).count();
    Some(TrimmedSpan {
        text: SmolStr::new(trimmed),
        start: selection.start + leading,
        end: selection.end - trailing,
    })
}

/// The maximal run of non-whitespace chars touching `caret`, with its span.
///
/// A caret surrounded by whitespace yields an empty word at `caret..caret`.
pub fn close_word<S: TextSurface>(surface: &S, caret: usize) -> (SmolStr, Range<usize>) {
    let len = surface.len_chars();
    let caret = caret.min(len);
    let mut start = caret;
    while start > 0 {
        match surface.char_at(start - 1) {
            Some(c) if !c.is_whitespace() => start -= 1,
            _ => break,
        }
    }
    let mut end = caret;
    while end < len {
        match surface.char_at(end) {
            Some(c) if !c.is_whitespace() => end += 1,
            _ => break,
        }
    }
    match surface.slice(start..end) {
        Some(word) => (word, start..end),
        None => (SmolStr::default(), caret..caret),
    }
}
