//! Upload staging.
//!
//! Accepted files become tasks in a ledger keyed by a monotonically assigned
//! id. Each task owns a placeholder token that marks where the final image
//! reference will land; the token is found again by content search, so it
//! survives every edit that leaves it intact. Byte transfer itself lives in
//! an adapter crate behind the [`UploadJob`] / [`UploadEvent`] pair.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use smol_str::SmolStr;

use crate::config::ComposerConfig;
use crate::text::TextSurface;
use crate::types::{Edit, Selection};

/// A file handed to the composer by paste, drop, or explicit attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingFile {
    pub name: SmolStr,
    /// Declared media type, e.g. `image/png`.
    pub content_type: SmolStr,
    pub data: Bytes,
}

impl IncomingFile {
    pub fn new(
        name: impl Into<SmolStr>,
        content_type: impl Into<SmolStr>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Ledger-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadId(pub u64);

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Queued,
    Uploading,
    Finished,
    Failed,
}

/// One staged file, tracked from acceptance to a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub id: UploadId,
    pub file: IncomingFile,
    pub state: UploadState,
    /// Token standing in for the image until the transfer settles.
    pub placeholder: SmolStr,
}

/// The transfer order handed to the pipeline adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    pub id: UploadId,
    pub file: IncomingFile,
}

/// Progress reported back by the pipeline adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Started(UploadId),
    /// `Ok` carries the stored URL, `Err` a human-readable reason.
    Finished(UploadId, Result<SmolStr, SmolStr>),
}

/// Whether a file passes the size and content-type gates.
pub fn verify_file(file: &IncomingFile, config: &ComposerConfig) -> bool {
    file.size() <= config.max_file_size
        && config
            .allowed_content
            .iter()
            .any(|kind| *kind == file.content_type)
}

/// The marker inserted while a task's bytes are in flight.
pub fn placeholder_token(id: UploadId, name: &str) -> SmolStr {
    SmolStr::new(format!("![uploading {name}](upload://{id})"))
}

/// Registry of in-flight uploads. Tasks leave on resolution, so the map's
/// size is the live-upload count.
#[derive(Debug, Clone, Default)]
pub struct UploadLedger {
    tasks: HashMap<UploadId, UploadTask>,
    next_id: u64,
    uploaded: usize,
}

impl UploadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a file, assigning it a fresh id and placeholder. Duplicate
    /// names stay distinguishable because the token embeds the id.
    pub fn stage(&mut self, file: IncomingFile) -> UploadJob {
        let id = UploadId(self.next_id);
        self.next_id += 1;
        let task = UploadTask {
            id,
            file: file.clone(),
            state: UploadState::Queued,
            placeholder: placeholder_token(id, &file.name),
        };
        self.tasks.insert(id, task);
        UploadJob { id, file }
    }

    /// Marks a queued task as transferring and yields its placeholder.
    /// Unknown ids and repeated starts yield nothing.
    pub fn begin(&mut self, id: UploadId) -> Option<SmolStr> {
        let task = self.tasks.get_mut(&id)?;
        if task.state != UploadState::Queued {
            return None;
        }
        task.state = UploadState::Uploading;
        Some(task.placeholder.clone())
    }

    /// Settles a task into its terminal state and removes it.
    pub fn resolve(&mut self, id: UploadId, success: bool) -> Option<UploadTask> {
        let mut task = self.tasks.remove(&id)?;
        task.state = if success {
            self.uploaded += 1;
            UploadState::Finished
        } else {
            UploadState::Failed
        };
        Some(task)
    }

    pub fn get(&self, id: UploadId) -> Option<&UploadTask> {
        self.tasks.get(&id)
    }

    /// Tasks still queued or transferring.
    pub fn uploading(&self) -> usize {
        self.tasks.len()
    }

    /// Total successful finishes over the ledger's lifetime.
    pub fn uploaded(&self) -> usize {
        self.uploaded
    }
}

/// Plans the placeholder insertion at `caret`: a paragraph break before when
/// the preceding character exists and is not whitespace, always one after.
pub fn placement_plan<S: TextSurface>(surface: &S, caret: usize, token: &str) -> Edit {
    let caret = caret.min(surface.len_chars());
    let needs_break = match caret.checked_sub(1).and_then(|at| surface.char_at(at)) {
        Some(c) => !c.is_whitespace(),
        None => false,
    };
    let mut insert = String::new();
    if needs_break {
        insert.push_str("\n\n");
    }
    insert.push_str(token);
    insert.push_str("\n\n");
    let after = caret + insert.chars().count();
    Edit {
        range: caret..caret,
        insert: SmolStr::new(insert),
        selection_after: Selection::caret(after),
    }
}

/// Plans swapping the placeholder for the final image reference. The token
/// is located by search; `None` when the user has deleted it.
pub fn replacement_plan<S: TextSurface>(
    surface: &S,
    token: &str,
    name: &str,
    url: &str,
    selection: Selection,
) -> Option<Edit> {
    let start = surface.find(token)?;
    let token_len = token.chars().count();
    let end = start + token_len;
    let insert = format!("![{name}]({url})");
    let new_len = insert.chars().count();
    let shift = |pos: usize| {
        if pos <= start {
            pos
        } else if pos >= end {
            pos - token_len + new_len
        } else {
            start + new_len
        }
    };
    Some(Edit {
        range: start..end,
        insert: SmolStr::new(insert),
        selection_after: Selection::new(shift(selection.start), shift(selection.end)),
    })
}

/// Plans deleting the placeholder, taking one trailing paragraph break with
/// it when present. `None` when the token is already gone.
pub fn removal_plan<S: TextSurface>(
    surface: &S,
    token: &str,
    selection: Selection,
) -> Option<Edit> {
    let start = surface.find(token)?;
    let mut end = start + token.chars().count();
    if surface.slice(end..end + 2).as_deref() == Some("\n\n") {
        end += 2;
    }
    let removed = end - start;
    let shift = |pos: usize| {
        if pos <= start {
            pos
        } else if pos >= end {
            pos - removed
        } else {
            start
        }
    };
    Some(Edit {
        range: start..end,
        insert: SmolStr::default(),
        selection_after: Selection::new(shift(selection.start), shift(selection.end)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::RopeSurface;

    fn png(name: &str, bytes: usize) -> IncomingFile {
        IncomingFile::new(name, "image/png", vec![0u8; bytes])
    }

    #[test]
    fn verify_gates_on_size_and_type() {
        let config = ComposerConfig {
            max_file_size: 64,
            ..ComposerConfig::default()
        };
        assert!(verify_file(&png("ok.png", 64), &config));
        assert!(!verify_file(&png("big.png", 65), &config));
        assert!(!verify_file(
            &IncomingFile::new("doc.pdf", "application/pdf", vec![0u8; 4]),
            &config,
        ));
    }

    #[test]
    fn duplicate_names_get_distinct_placeholders() {
        let mut ledger = UploadLedger::new();
        let a = ledger.stage(png("shot.png", 8));
        let b = ledger.stage(png("shot.png", 8));
        assert_ne!(a.id, b.id);
        let first = ledger.get(a.id).unwrap().placeholder.clone();
        let second = ledger.get(b.id).unwrap().placeholder.clone();
        assert_ne!(first, second);
        assert_eq!(first, "![uploading shot.png](upload://0)");
        assert_eq!(second, "![uploading shot.png](upload://1)");
    }

    #[test]
    fn begin_only_fires_once_per_task() {
        let mut ledger = UploadLedger::new();
        let job = ledger.stage(png("a.png", 8));
        assert!(ledger.begin(job.id).is_some());
        assert!(ledger.begin(job.id).is_none());
        assert!(ledger.begin(UploadId(99)).is_none());
    }

    #[test]
    fn resolve_counts_successes_and_empties_the_ledger() {
        let mut ledger = UploadLedger::new();
        let a = ledger.stage(png("a.png", 8));
        let b = ledger.stage(png("b.png", 8));
        assert_eq!(ledger.uploading(), 2);

        let done = ledger.resolve(a.id, true).unwrap();
        assert_eq!(done.state, UploadState::Finished);
        let failed = ledger.resolve(b.id, false).unwrap();
        assert_eq!(failed.state, UploadState::Failed);

        assert_eq!(ledger.uploading(), 0);
        assert_eq!(ledger.uploaded(), 1);
        assert!(ledger.resolve(a.id, true).is_none());
    }

    #[test]
    fn placement_pads_after_text_but_not_at_line_starts() {
        let surface = RopeSurface::from("intro");
        let edit = placement_plan(&surface, 5, "TOKEN");
        assert_eq!(edit.insert, "\n\nTOKEN\n\n");
        assert_eq!(edit.selection_after, Selection::caret(14));

        let surface = RopeSurface::from("intro\n");
        let edit = placement_plan(&surface, 6, "TOKEN");
        assert_eq!(edit.insert, "TOKEN\n\n");

        let surface = RopeSurface::from("");
        let edit = placement_plan(&surface, 0, "TOKEN");
        assert_eq!(edit.insert, "TOKEN\n\n");
        assert_eq!(edit.selection_after, Selection::caret(7));
    }

    #[test]
    fn replacement_survives_edits_before_the_token() {
        // The token moved right since insertion; search still finds it.
        let surface = RopeSurface::from("padded padded TOKEN\n\ntail");
        let edit = replacement_plan(&surface, "TOKEN", "shot.png", "https://x/1", Selection::caret(25))
            .unwrap();
        assert_eq!(edit.range, 14..19);
        assert_eq!(edit.insert, "![shot.png](https://x/1)");
        // Caret sat 6 past the token end; it stays 6 past the replacement.
        assert_eq!(edit.selection_after, Selection::caret(44));
    }

    #[test]
    fn replacement_skips_a_deleted_token() {
        let surface = RopeSurface::from("no marker here");
        assert!(replacement_plan(&surface, "TOKEN", "a", "b", Selection::caret(0)).is_none());
        assert!(removal_plan(&surface, "TOKEN", Selection::caret(0)).is_none());
    }

    #[test]
    fn removal_takes_the_trailing_break() {
        let surface = RopeSurface::from("keep\n\nTOKEN\n\nrest");
        let edit = removal_plan(&surface, "TOKEN", Selection::caret(17)).unwrap();
        assert_eq!(edit.range, 6..13);
        assert_eq!(edit.insert, "");
        assert_eq!(edit.selection_after, Selection::caret(10));

        // Token at the very end, no break to absorb.
        let surface = RopeSurface::from("keep TOKEN");
        let edit = removal_plan(&surface, "TOKEN", Selection::caret(3)).unwrap();
        assert_eq!(edit.range, 5..10);
        assert_eq!(edit.selection_after, Selection::caret(3));
    }

    #[test]
    fn removal_collapses_a_selection_inside_the_token() {
        let surface = RopeSurface::from("ab TOKEN cd");
        let edit = removal_plan(&surface, "TOKEN", Selection::new(4, 6)).unwrap();
        assert_eq!(edit.selection_after, Selection::caret(3));
    }
}
