//! The composer facade.
//!
//! [`Composer`] owns the draft surface and every sub-protocol, and is the
//! only place edits are committed. Entry points correspond to host events
//! (keys, input, paste, drop) and to feedback from async collaborators
//! (mention results, upload progress). Work that needs a collaborator is
//! queued as an [`Effect`] and drained by the host with
//! [`Composer::take_effects`].
//!
//! Everything here is synchronous and single-threaded; between any two
//! entry points the state is coherent and safe to render.

use smol_str::SmolStr;
use tracing::{debug, warn};

use atpblog_common::{MentionKey, Notifier, Profile, is_likely_url};

use crate::boundary::close_word;
use crate::config::{Command, ComposerConfig, ComposerContext};
use crate::format::{
    link_command, link_paste_rewrite, mention_command, mention_replacement, toggle_wrap,
};
use crate::keymap::{Key, KeyDisposition, KeyPress};
use crate::mention::{MentionMachine, probe};
use crate::text::TextSurface;
use crate::types::{Edit, FormatCommand, Selection};
use crate::upload::{
    IncomingFile, UploadEvent, UploadId, UploadJob, UploadLedger, UploadTask, placement_plan,
    removal_plan, replacement_plan, verify_file,
};

/// Work the composer needs the host to carry out asynchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Resolve mention candidates for this key and feed them back through
    /// [`Composer::mention_results`].
    FetchMentions(MentionKey),
    /// Hand this batch to the upload pipeline and feed progress back through
    /// [`Composer::handle_upload_event`].
    StartUploads(Vec<UploadJob>),
}

/// Markdown input coordinator.
pub struct Composer<S, N> {
    surface: S,
    selection: Selection,
    dirty: bool,
    config: ComposerConfig,
    context: ComposerContext,
    notifier: N,
    mentions: MentionMachine,
    uploads: UploadLedger,
    effects: Vec<Effect>,
}

impl<S: TextSurface, N: Notifier> Composer<S, N> {
    /// Wraps an existing surface; the caret starts at the end of it.
    pub fn new(surface: S, config: ComposerConfig, context: ComposerContext, notifier: N) -> Self {
        let caret = surface.len_chars();
        Self {
            surface,
            selection: Selection::caret(caret),
            dirty: false,
            config,
            context,
            notifier,
            mentions: MentionMachine::new(),
            uploads: UploadLedger::new(),
            effects: Vec::new(),
        }
    }

    pub fn content(&self) -> String {
        self.surface.to_text()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// True once the user has mutated the draft. Never resets.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mention_query(&self) -> Option<&str> {
        self.mentions.query().map(SmolStr::as_str)
    }

    /// Caret span captured when the mention session opened.
    pub fn mention_anchor(&self) -> Option<(usize, usize)> {
        self.mentions.anchor()
    }

    /// Candidates for the current mention key, empty while closed or before
    /// results arrive.
    pub fn candidates(&self) -> &[Profile] {
        match self.current_mention_key() {
            Some(key) => self.mentions.candidates(&key),
            None => &[],
        }
    }

    /// Highlighted candidate row.
    pub fn selected(&self) -> usize {
        self.mentions.selected()
    }

    pub fn uploading(&self) -> usize {
        self.uploads.uploading()
    }

    pub fn uploaded(&self) -> usize {
        self.uploads.uploaded()
    }

    pub fn upload_task(&self, id: UploadId) -> Option<&UploadTask> {
        self.uploads.get(id)
    }

    /// Drains the pending effect queue.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Moves the selection. Out-of-bounds input is dropped.
    pub fn set_selection(&mut self, selection: Selection) {
        if selection.fits(self.surface.len_chars()) {
            self.selection = selection;
        } else {
            warn!(
                start = selection.start,
                end = selection.end,
                "selection out of bounds, ignoring"
            );
        }
    }

    /// Seeds the draft from externally loaded content. Applies only while
    /// the buffer is still empty and untouched, so late loads never clobber
    /// what the user typed.
    pub fn set_initial_content(&mut self, content: &str) {
        if self.dirty || !self.surface.is_empty() || content.is_empty() {
            return;
        }
        self.surface.replace(0..0, content);
        self.selection = Selection::caret(self.surface.len_chars());
    }

    /// Applies an edit plan atomically: buffer, then selection, then dirty.
    fn commit(&mut self, edit: Edit) {
        let len = self.surface.len_chars();
        if edit.range.start > edit.range.end || edit.range.end > len {
            warn!(
                start = edit.range.start,
                end = edit.range.end,
                len,
                "edit out of bounds, dropping"
            );
            return;
        }
        self.surface.replace(edit.range, &edit.insert);
        let len = self.surface.len_chars();
        self.selection = if edit.selection_after.fits(len) {
            edit.selection_after
        } else {
            Selection::caret(len)
        };
        self.dirty = true;
    }

    /// Types `text` over the current selection.
    pub fn insert_text(&mut self, text: &str) {
        let caret = self.selection.start + text.chars().count();
        self.commit(Edit {
            range: self.selection.to_range(),
            insert: SmolStr::new(text),
            selection_after: Selection::caret(caret),
        });
        self.refresh_mentions();
    }

    /// Mirrors an edit the host applied to its own widget: full new content
    /// plus the post-edit selection. Marks the draft dirty and re-runs the
    /// mention probe.
    pub fn handle_input(&mut self, content: &str, selection: Selection) {
        let len = self.surface.len_chars();
        self.surface.replace(0..len, content);
        self.dirty = true;
        let len = self.surface.len_chars();
        self.selection = if selection.fits(len) {
            selection
        } else {
            Selection::caret(len)
        };
        self.refresh_mentions();
    }

    /// Runs a formatting command at the current selection.
    ///
    /// Bold and italic are always available; link and mention honor the
    /// configured command set.
    pub fn format(&mut self, command: FormatCommand) {
        match command {
            FormatCommand::Bold => {
                let symbol = self.config.symbols.bold.clone();
                if let Some(edit) = toggle_wrap(&self.surface, self.selection, &symbol) {
                    self.commit(edit);
                }
            }
            FormatCommand::Italic => {
                let symbol = self.config.symbols.italic.clone();
                if let Some(edit) = toggle_wrap(&self.surface, self.selection, &symbol) {
                    self.commit(edit);
                }
            }
            FormatCommand::Link => {
                if !self.config.commands.contains(Command::Link) {
                    return;
                }
                if let Some(edit) = link_command(&self.surface, self.selection) {
                    self.commit(edit);
                }
            }
            FormatCommand::Mention => {
                if !self.config.commands.contains(Command::Mention) {
                    return;
                }
                if let Some(edit) = mention_command(&self.surface, self.selection) {
                    self.commit(edit);
                }
                self.refresh_mentions();
            }
        }
    }

    fn mention_key(&self, query: &str) -> MentionKey {
        MentionKey::new(query, self.context.post.clone(), self.context.source.clone())
    }

    fn current_mention_key(&self) -> Option<MentionKey> {
        self.mentions.query().map(|query| self.mention_key(query))
    }

    /// Re-runs the trigger probe at the caret and requests candidates when
    /// the query changed.
    fn refresh_mentions(&mut self) {
        if !self.config.commands.contains(Command::Mention) {
            self.mentions.dismiss();
            return;
        }
        let found = probe(
            &self.surface,
            self.selection.start,
            &self.config.handle_pattern,
        );
        let caret = (self.selection.start, self.selection.end);
        if let Some(query) = self.mentions.observe(found, caret) {
            self.request_candidates(&query);
        }
    }

    fn request_candidates(&mut self, query: &str) {
        // Lookups are scoped to an authenticated actor; without one the
        // session still tracks the query but nothing is fetched.
        if self.context.actor.is_none() {
            debug!(query, "mention lookup suppressed without an actor");
            return;
        }
        let key = self.mention_key(query);
        self.effects.push(Effect::FetchMentions(key));
    }

    /// Feeds back a resolved candidate list. The list is cached under its
    /// key either way; the visible list changes only when the key is still
    /// current.
    pub fn mention_results(&mut self, key: MentionKey, profiles: Vec<Profile>) {
        let is_current = self.current_mention_key().as_ref() == Some(&key);
        if !is_current {
            debug!(query = %key.query, "caching mention results for an inactive key");
        }
        let len = profiles.len();
        self.mentions.store(key, profiles);
        if is_current {
            self.mentions.clamp_selected(len);
        }
    }

    /// Replaces the live `@query` token with the highlighted candidate and
    /// closes the session.
    pub fn apply_mention(&mut self) {
        let Some(key) = self.current_mention_key() else {
            return;
        };
        let Some(profile) = self
            .mentions
            .candidates(&key)
            .get(self.mentions.selected())
            .cloned()
        else {
            return;
        };
        let (word, range) = close_word(&self.surface, self.selection.start);
        if !word.starts_with('@') {
            // The buffer moved under the session; drop it rather than guess.
            self.mentions.dismiss();
            return;
        }
        self.commit(mention_replacement(range, &profile.username));
        self.mentions.dismiss();
    }

    pub fn dismiss_mention(&mut self) {
        self.mentions.dismiss();
    }

    /// Intercepts a paste carrying text and/or files. Returns true when the
    /// composer consumed the event and the host must prevent the default
    /// insertion.
    pub fn handle_paste(&mut self, text: Option<&str>, files: Vec<IncomingFile>) -> bool {
        if let Some(text) = text {
            if self.config.commands.contains(Command::Link)
                && !self.selection.is_empty()
                && is_likely_url(text)
            {
                if let Some(edit) = link_paste_rewrite(&self.surface, self.selection, text.trim())
                {
                    self.commit(edit);
                    self.refresh_mentions();
                    return true;
                }
            }
        }
        if !files.is_empty() && self.config.commands.contains(Command::Upload) {
            // Claimed even when every file is rejected, same as a drop;
            // otherwise the host would paste the rejected payload as text.
            self.attach_files(files);
            return true;
        }
        false
    }

    /// Files dropped onto the editor. The event is claimed whenever uploads
    /// are enabled, so the browser never navigates away mid-draft.
    pub fn handle_drop(&mut self, files: Vec<IncomingFile>) -> bool {
        if !self.config.commands.contains(Command::Upload) {
            return false;
        }
        self.attach_files(files);
        true
    }

    /// Validates and stages a batch. Each reject raises one notification;
    /// accepted files become queued tasks behind a single `StartUploads`
    /// effect. Returns true when at least one file was staged.
    pub fn attach_files(&mut self, files: Vec<IncomingFile>) -> bool {
        if !self.config.commands.contains(Command::Upload) {
            return false;
        }
        let mut jobs = Vec::new();
        for file in files {
            if verify_file(&file, &self.config) {
                jobs.push(self.uploads.stage(file));
            } else {
                debug!(name = %file.name, size = file.size(), "rejected attachment");
                self.notifier.notify(&self.config.rejected_upload_message);
            }
        }
        if jobs.is_empty() {
            return false;
        }
        self.effects.push(Effect::StartUploads(jobs));
        true
    }

    /// Dispatches a progress event from the upload queue.
    pub fn handle_upload_event(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::Started(id) => self.upload_started(id),
            UploadEvent::Finished(id, outcome) => self.upload_finished(id, outcome),
        }
    }

    /// A task began transferring: insert its placeholder at the caret.
    pub fn upload_started(&mut self, id: UploadId) {
        let Some(token) = self.uploads.begin(id) else {
            warn!(%id, "start event for an unknown or already started upload");
            return;
        };
        let edit = placement_plan(&self.surface, self.selection.start, &token);
        self.commit(edit);
    }

    /// A task settled: swap the placeholder for the final reference, or
    /// notify and clean up on failure.
    pub fn upload_finished(&mut self, id: UploadId, outcome: Result<SmolStr, SmolStr>) {
        match outcome {
            Ok(url) => self.finish_upload(id, &url),
            Err(reason) => self.fail_upload(id, &reason),
        }
    }

    fn finish_upload(&mut self, id: UploadId, url: &str) {
        let Some(task) = self.uploads.resolve(id, true) else {
            warn!(%id, "finish event for an unknown upload");
            return;
        };
        let plan = replacement_plan(
            &self.surface,
            &task.placeholder,
            &task.file.name,
            url,
            self.selection,
        );
        match plan {
            Some(edit) => self.commit(edit),
            None => debug!(%id, "placeholder already deleted, skipping replacement"),
        }
    }

    fn fail_upload(&mut self, id: UploadId, reason: &str) {
        let Some(task) = self.uploads.resolve(id, false) else {
            warn!(%id, "failure event for an unknown upload");
            return;
        };
        let message = if reason.is_empty() {
            format!("Failed to upload {}", task.file.name)
        } else {
            format!("Failed to upload {}: {reason}", task.file.name)
        };
        self.notifier.notify(&message);
        if let Some(edit) = removal_plan(&self.surface, &task.placeholder, self.selection) {
            self.commit(edit);
        }
    }

    fn visible_candidates(&self) -> usize {
        match self.current_mention_key() {
            Some(key) => self.mentions.candidates(&key).len(),
            None => 0,
        }
    }

    /// Classifies a key-down event.
    ///
    /// Precedence: formatting shortcuts, then submit, then mention
    /// navigation, then arrows, then everything else.
    pub fn handle_key_down(&mut self, press: &KeyPress) -> KeyDisposition {
        if press.modifiers.primary() {
            if let Some(shortcut) = press.key.shortcut_char() {
                match shortcut {
                    'b' => {
                        self.format(FormatCommand::Bold);
                        return KeyDisposition::Handled;
                    }
                    'i' => {
                        self.format(FormatCommand::Italic);
                        return KeyDisposition::Handled;
                    }
                    'k' => {
                        self.format(FormatCommand::Link);
                        return KeyDisposition::Handled;
                    }
                    _ => {}
                }
            }
            if press.key == Key::Enter && !self.surface.is_empty() {
                return KeyDisposition::Submit;
            }
        }
        let candidates = self.visible_candidates();
        if candidates > 0 {
            match press.key {
                Key::Enter => {
                    self.apply_mention();
                    return KeyDisposition::Handled;
                }
                Key::ArrowUp => {
                    self.mentions.select_previous();
                    return KeyDisposition::Handled;
                }
                Key::ArrowDown => {
                    self.mentions.select_next(candidates);
                    return KeyDisposition::Handled;
                }
                _ => {}
            }
        }
        if press.key.is_arrow() {
            return KeyDisposition::PassThrough;
        }
        KeyDisposition::StopPropagation
    }

    /// Follows up an arrow key once the host's caret actually moved.
    /// Vertical arrows that navigated the candidate list on key-down are
    /// skipped so the session is not torn down mid-navigation.
    pub fn handle_key_up(&mut self, press: &KeyPress, selection: Selection) {
        if !press.key.is_arrow() {
            return;
        }
        self.set_selection(selection);
        if press.key.is_vertical_arrow() && self.visible_candidates() > 0 {
            return;
        }
        self.refresh_mentions();
    }
}
