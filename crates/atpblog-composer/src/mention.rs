//! Mention session tracking.
//!
//! A session opens when a qualifying `@word` touches the caret, refines as
//! the user keeps typing, and closes when adjacency breaks, the user
//! dismisses it, or a candidate is applied. Candidate lists live in a keyed
//! cache that outlives sessions, so reopening a query paints instantly.

use std::collections::HashMap;
use std::ops::Range;

use atpblog_common::{MentionKey, Profile};
use regex::Regex;
use smol_str::SmolStr;

use crate::boundary::close_word;
use crate::text::TextSurface;

/// Outcome of probing the text around the caret for a mention token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionProbe {
    /// A qualifying `@word` touches the caret.
    Inside {
        /// Text after the `@`, possibly empty.
        query: SmolStr,
        /// Span of the whole token, `@` included.
        token: Range<usize>,
    },
    /// Nothing mention-shaped at the caret.
    Outside,
}

/// Extracts the mention query at `caret`, when the adjacent word qualifies:
/// it starts with `@` and the remainder is empty or matches `handle_pattern`.
pub fn probe<S: TextSurface>(surface: &S, caret: usize, handle_pattern: &Regex) -> MentionProbe {
    let (word, range) = close_word(surface, caret);
    let Some(rest) = word.strip_prefix('@') else {
        return MentionProbe::Outside;
    };
    if !rest.is_empty() && !handle_pattern.is_match(rest) {
        return MentionProbe::Outside;
    }
    MentionProbe::Inside {
        query: SmolStr::new(rest),
        token: range,
    }
}

/// Live mention session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSession {
    /// Text typed after the `@`.
    pub query: SmolStr,
    /// Caret span captured when the session opened, for popover placement.
    pub anchor: (usize, usize),
    /// Highlighted candidate row.
    pub selected: usize,
}

/// The mention sub-protocol state machine.
///
/// Transitions happen only through these methods, so the anchor-capture and
/// selection-reset rules hold everywhere: the anchor is taken once per
/// session, and `selected` resets on every query change.
#[derive(Debug, Clone, Default)]
pub struct MentionMachine {
    session: Option<MentionSession>,
    cache: HashMap<MentionKey, Vec<Profile>>,
}

impl MentionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&MentionSession> {
        self.session.as_ref()
    }

    pub fn query(&self) -> Option<&SmolStr> {
        self.session.as_ref().map(|s| &s.query)
    }

    pub fn anchor(&self) -> Option<(usize, usize)> {
        self.session.as_ref().map(|s| s.anchor)
    }

    /// Highlighted row, 0 while closed.
    pub fn selected(&self) -> usize {
        self.session.as_ref().map(|s| s.selected).unwrap_or(0)
    }

    /// Feeds a probe result into the machine. Returns the query that now
    /// needs candidates, when it changed.
    pub fn observe(&mut self, probe: MentionProbe, caret: (usize, usize)) -> Option<SmolStr> {
        match probe {
            MentionProbe::Outside => {
                self.session = None;
                None
            }
            MentionProbe::Inside { query, .. } => match &mut self.session {
                Some(session) if session.query == query => None,
                Some(session) => {
                    session.query = query.clone();
                    session.selected = 0;
                    Some(query)
                }
                None => {
                    self.session = Some(MentionSession {
                        query: query.clone(),
                        anchor: caret,
                        selected: 0,
                    });
                    Some(query)
                }
            },
        }
    }

    /// Closes the session. Cached candidate lists survive.
    pub fn dismiss(&mut self) {
        self.session = None;
    }

    /// Stores a fetched candidate list under its key, last write wins.
    pub fn store(&mut self, key: MentionKey, profiles: Vec<Profile>) {
        self.cache.insert(key, profiles);
    }

    /// Cached candidates for `key`, empty when none arrived yet.
    pub fn candidates(&self, key: &MentionKey) -> &[Profile] {
        self.cache.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Moves the highlight up one row, saturating at the top.
    pub fn select_previous(&mut self) {
        if let Some(session) = &mut self.session {
            session.selected = session.selected.saturating_sub(1);
        }
    }

    /// Moves the highlight down one row, saturating at the last of `len`
    /// candidates.
    pub fn select_next(&mut self, len: usize) {
        if let Some(session) = &mut self.session {
            if len > 0 && session.selected + 1 < len {
                session.selected += 1;
            }
        }
    }

    /// Clamps the highlight into the bounds of a refreshed candidate list.
    pub fn clamp_selected(&mut self, len: usize) {
        if let Some(session) = &mut self.session {
            if len == 0 {
                session.selected = 0;
            } else if session.selected >= len {
                session.selected = len - 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::RopeSurface;

    fn pattern() -> Regex {
        Regex::new("^[A-Za-z0-9_]{1,39}$").unwrap()
    }

    fn probe_at(content: &str, caret: usize) -> MentionProbe {
        probe(&RopeSurface::from(content), caret, &pattern())
    }

    fn key(query: &str) -> MentionKey {
        MentionKey::new(query, None, None)
    }

    #[test]
    fn probe_finds_a_mention_token() {
        match probe_at("hi @al", 6) {
            MentionProbe::Inside { query, token } => {
                assert_eq!(query, "al");
                assert_eq!(token, 3..6);
            }
            MentionProbe::Outside => panic!("expected a token"),
        }
    }

    #[test]
    fn probe_accepts_a_bare_at_sign() {
        match probe_at("hi @", 4) {
            MentionProbe::Inside { query, .. } => assert_eq!(query, ""),
            MentionProbe::Outside => panic!("expected a token"),
        }
    }

    #[test]
    fn probe_rejects_plain_words_and_bad_handles() {
        assert_eq!(probe_at("hi al", 5), MentionProbe::Outside);
        assert_eq!(probe_at("mail a@b", 8), MentionProbe::Outside);
        assert_eq!(probe_at("", 0), MentionProbe::Outside);
    }

    #[test]
    fn probe_rejects_when_caret_left_the_token() {
        // Caret sits past the space, no longer touching "@al".
        assert_eq!(probe_at("@al x", 4), MentionProbe::Outside);
    }

    #[test]
    fn anchor_is_captured_once_per_session() {
        let mut machine = MentionMachine::new();
        let opened = machine.observe(
            MentionProbe::Inside {
                query: SmolStr::new("a"),
                token: 0..2,
            },
            (2, 2),
        );
        assert_eq!(opened.as_deref(), Some("a"));
        assert_eq!(machine.anchor(), Some((2, 2)));

        // Refining the query keeps the original anchor.
        let refined = machine.observe(
            MentionProbe::Inside {
                query: SmolStr::new("al"),
                token: 0..3,
            },
            (3, 3),
        );
        assert_eq!(refined.as_deref(), Some("al"));
        assert_eq!(machine.anchor(), Some((2, 2)));
    }

    #[test]
    fn unchanged_query_requests_nothing() {
        let mut machine = MentionMachine::new();
        let inside = MentionProbe::Inside {
            query: SmolStr::new("al"),
            token: 0..3,
        };
        assert!(machine.observe(inside.clone(), (3, 3)).is_some());
        assert!(machine.observe(inside, (3, 3)).is_none());
    }

    #[test]
    fn query_change_resets_the_highlight() {
        let mut machine = MentionMachine::new();
        machine.observe(
            MentionProbe::Inside {
                query: SmolStr::new("a"),
                token: 0..2,
            },
            (2, 2),
        );
        machine.select_next(3);
        machine.select_next(3);
        assert_eq!(machine.selected(), 2);

        machine.observe(
            MentionProbe::Inside {
                query: SmolStr::new("al"),
                token: 0..3,
            },
            (3, 3),
        );
        assert_eq!(machine.selected(), 0);
    }

    #[test]
    fn navigation_saturates_at_both_ends() {
        let mut machine = MentionMachine::new();
        machine.observe(
            MentionProbe::Inside {
                query: SmolStr::new("a"),
                token: 0..2,
            },
            (2, 2),
        );
        machine.select_previous();
        assert_eq!(machine.selected(), 0);
        machine.select_next(2);
        machine.select_next(2);
        machine.select_next(2);
        assert_eq!(machine.selected(), 1);
    }

    #[test]
    fn cache_outlives_the_session() {
        let mut machine = MentionMachine::new();
        machine.store(key("al"), vec![Profile::new("alan")]);
        machine.dismiss();
        assert_eq!(machine.candidates(&key("al")).len(), 1);
        assert!(machine.candidates(&key("zz")).is_empty());
    }

    #[test]
    fn clamp_pulls_the_highlight_into_bounds() {
        let mut machine = MentionMachine::new();
        machine.observe(
            MentionProbe::Inside {
                query: SmolStr::new("a"),
                token: 0..2,
            },
            (2, 2),
        );
        machine.select_next(5);
        machine.select_next(5);
        machine.select_next(5);
        assert_eq!(machine.selected(), 3);
        machine.clamp_selected(2);
        assert_eq!(machine.selected(), 1);
        machine.clamp_selected(0);
        assert_eq!(machine.selected(), 0);
    }
}
