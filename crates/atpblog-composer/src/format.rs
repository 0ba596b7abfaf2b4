//! Markdown formatting plans.
//!
//! Everything here computes an [`Edit`] against the current buffer without
//! applying it; the composer commits plans atomically.

use std::ops::Range;

use smol_str::SmolStr;

use crate::boundary::{close_word, trim_selection};
use crate::text::TextSurface;
use crate::types::{Edit, Selection};

/// Toggles a symmetric wrap symbol around the selection.
///
/// When the trimmed selection already sits between two copies of `symbol`,
/// both copies are removed and the selection shifts left by the symbol
/// width; otherwise the symbol is inserted on both sides and the selection
/// keeps covering the trimmed text. A collapsed selection gets an empty
/// pair with the caret between the halves, so toggling twice at the same
/// caret is an exact round trip.
pub fn toggle_wrap<S: TextSurface>(
    surface: &S,
    selection: Selection,
    symbol: &str,
) -> Option<Edit> {
    let span = trim_selection(surface, selection)?;
    let sym_len = symbol.chars().count();
    let wrapped = span.start >= sym_len
        && surface.slice(span.start - sym_len..span.start).as_deref() == Some(symbol)
        && surface.slice(span.end..span.end + sym_len).as_deref() == Some(symbol);
    if wrapped {
        Some(Edit {
            range: span.start - sym_len..span.end + sym_len,
            insert: span.text.clone(),
            selection_after: Selection::new(span.start - sym_len, span.end - sym_len),
        })
    } else {
        let mut wrapped_text = String::with_capacity(span.text.len() + symbol.len() * 2);
        wrapped_text.push_str(symbol);
        wrapped_text.push_str(&span.text);
        wrapped_text.push_str(symbol);
        Some(Edit {
            range: span.start..span.end,
            insert: SmolStr::new(wrapped_text),
            selection_after: Selection::new(span.start + sym_len, span.end + sym_len),
        })
    }
}

/// Rewrites a paste of `url` over a non-empty selection into a markdown
/// link, caret after the closing parenthesis. Returns `None` when the paste
/// should fall through to the default insertion.
pub fn link_paste_rewrite<S: TextSurface>(
    surface: &S,
    selection: Selection,
    url: &str,
) -> Option<Edit> {
    if selection.is_empty() {
        return None;
    }
    let span = trim_selection(surface, selection)?;
    if span.text.is_empty() {
        // Whitespace-only selection: plain replacement, no link construct.
        let caret = selection.start + url.chars().count();
        return Some(Edit {
            range: selection.to_range(),
            insert: SmolStr::new(url),
            selection_after: Selection::caret(caret),
        });
    }
    let link = format!("[{}]({})", span.text, url);
    let caret = span.start + link.chars().count();
    Some(Edit {
        range: span.start..span.end,
        insert: SmolStr::new(link),
        selection_after: Selection::caret(caret),
    })
}

/// Wraps the selection (or the word at the caret) as a markdown link with a
/// literal `url` placeholder left selected for typing over.
pub fn link_command<S: TextSurface>(surface: &S, selection: Selection) -> Option<Edit> {
    let (label, range) = if selection.is_empty() {
        close_word(surface, selection.start)
    } else {
        let span = trim_selection(surface, selection)?;
        (span.text, span.start..span.end)
    };
    let url_start = range.start + 1 + label.chars().count() + 2;
    let link = format!("[{label}](url)");
    Some(Edit {
        range,
        insert: SmolStr::new(link),
        selection_after: Selection::new(url_start, url_start + 3),
    })
}

/// Replaces the mention token at `range` with the chosen username plus a
/// trailing space, caret after the space.
pub fn mention_replacement(range: Range<usize>, username: &str) -> Edit {
    let insert = format!("@{username} ");
    let caret = range.start + insert.chars().count();
    Edit {
        range,
        insert: SmolStr::new(insert),
        selection_after: Selection::caret(caret),
    }
}

/// Ensures the word at the caret starts with `@`, so the mention probe can
/// open a session through the normal path. Yields a pure caret move when the
/// word is already a mention token.
pub fn mention_command<S: TextSurface>(surface: &S, selection: Selection) -> Option<Edit> {
    let (word, range) = close_word(surface, selection.start);
    if word.starts_with('@') {
        return Some(Edit {
            range: range.end..range.end,
            insert: SmolStr::default(),
            selection_after: Selection::caret(range.end),
        });
    }
    let caret = range.start + word.chars().count() + 1;
    Some(Edit {
        range: range.start..range.start,
        insert: SmolStr::new_static("@"),
        selection_after: Selection::caret(caret),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::RopeSurface;

    fn make_surface(content: &str) -> RopeSurface {
        RopeSurface::from(content)
    }

    fn apply(surface: &mut RopeSurface, edit: &Edit) {
        surface.replace(edit.range.clone(), &edit.insert);
    }

    #[test]
    fn wraps_a_plain_selection() {
        let surface = make_surface("hello world");
        let edit = toggle_wrap(&surface, Selection::new(6, 11), "**").unwrap();
        assert_eq!(edit.range, 6..11);
        assert_eq!(edit.insert, "**world**");
        assert_eq!(edit.selection_after, Selection::new(8, 13));
    }

    #[test]
    fn unwraps_when_already_wrapped() {
        let mut surface = make_surface("hello world");
        let wrap = toggle_wrap(&surface, Selection::new(6, 11), "**").unwrap();
        apply(&mut surface, &wrap);
        assert_eq!(surface.to_text(), "hello **world**");

        let unwrap = toggle_wrap(&surface, wrap.selection_after, "**").unwrap();
        apply(&mut surface, &unwrap);
        assert_eq!(surface.to_text(), "hello world");
        assert_eq!(unwrap.selection_after, Selection::new(6, 11));
    }

    #[test]
    fn wrap_ignores_selected_whitespace() {
        let surface = make_surface("say hello now");
        // Selection covers " hello " with the padding.
        let edit = toggle_wrap(&surface, Selection::new(3, 10), "_").unwrap();
        assert_eq!(edit.range, 4..9);
        assert_eq!(edit.insert, "_hello_");
        assert_eq!(edit.selection_after, Selection::new(5, 10));
    }

    #[test]
    fn collapsed_selection_round_trips() {
        let mut surface = make_surface("ab");
        let open = toggle_wrap(&surface, Selection::caret(1), "**").unwrap();
        apply(&mut surface, &open);
        assert_eq!(surface.to_text(), "a****b");
        assert_eq!(open.selection_after, Selection::caret(3));

        let close = toggle_wrap(&surface, open.selection_after, "**").unwrap();
        apply(&mut surface, &close);
        assert_eq!(surface.to_text(), "ab");
        assert_eq!(close.selection_after, Selection::caret(1));
    }

    #[test]
    fn single_char_symbol_toggles() {
        let mut surface = make_surface("x word y");
        let wrap = toggle_wrap(&surface, Selection::new(2, 6), "_").unwrap();
        apply(&mut surface, &wrap);
        assert_eq!(surface.to_text(), "x _word_ y");
        let unwrap = toggle_wrap(&surface, wrap.selection_after, "_").unwrap();
        apply(&mut surface, &unwrap);
        assert_eq!(surface.to_text(), "x word y");
    }

    #[test]
    fn paste_builds_a_link_over_the_trimmed_selection() {
        let surface = make_surface("check this out");
        let edit =
            link_paste_rewrite(&surface, Selection::new(6, 10), "https://example.com").unwrap();
        assert_eq!(edit.range, 6..10);
        assert_eq!(edit.insert, "[this](https://example.com)");
        // Caret right after the closing parenthesis.
        assert_eq!(edit.selection_after, Selection::caret(6 + 27));

        let mut patched = make_surface("check this out");
        apply(&mut patched, &edit);
        assert_eq!(patched.to_text(), "check [this](https://example.com) out");
    }

    #[test]
    fn paste_over_empty_selection_is_not_intercepted() {
        let surface = make_surface("check this out");
        assert!(link_paste_rewrite(&surface, Selection::caret(6), "https://example.com").is_none());
    }

    #[test]
    fn paste_over_whitespace_selection_replaces_plainly() {
        let surface = make_surface("a   b");
        let edit = link_paste_rewrite(&surface, Selection::new(1, 4), "https://example.com")
            .unwrap();
        assert_eq!(edit.range, 1..4);
        assert_eq!(edit.insert, "https://example.com");
        assert_eq!(edit.selection_after, Selection::caret(1 + 19));
    }

    #[test]
    fn link_command_selects_the_url_placeholder() {
        let surface = make_surface("read docs today");
        let edit = link_command(&surface, Selection::new(5, 9)).unwrap();
        assert_eq!(edit.insert, "[docs](url)");
        // "[docs](" is 7 chars, so the placeholder starts at 5 + 7.
        assert_eq!(edit.selection_after, Selection::new(12, 15));
    }

    #[test]
    fn link_command_at_isolated_caret() {
        let surface = make_surface("a  b");
        let edit = link_command(&surface, Selection::caret(2)).unwrap();
        assert_eq!(edit.insert, "[](url)");
        assert_eq!(edit.selection_after, Selection::new(5, 8));
    }

    #[test]
    fn mention_replacement_appends_a_space() {
        let edit = mention_replacement(4..7, "alan");
        assert_eq!(edit.insert, "@alan ");
        assert_eq!(edit.selection_after, Selection::caret(10));
    }

    #[test]
    fn mention_command_prefixes_the_word() {
        let surface = make_surface("ping alan");
        let edit = mention_command(&surface, Selection::caret(7)).unwrap();
        assert_eq!(edit.range, 5..5);
        assert_eq!(edit.insert, "@");
        assert_eq!(edit.selection_after, Selection::caret(10));
    }

    #[test]
    fn mention_command_keeps_existing_token() {
        let surface = make_surface("ping @alan");
        let edit = mention_command(&surface, Selection::caret(8)).unwrap();
        assert_eq!(edit.insert, "");
        assert_eq!(edit.selection_after, Selection::caret(10));
    }
}
