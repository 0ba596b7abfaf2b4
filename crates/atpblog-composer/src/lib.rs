//! Markdown input coordination.
//!
//! One [`Composer`] owns the draft buffer, the selection, and every
//! sub-protocol that turns raw input events into markdown: boundary-aware
//! symbol wrapping, link-paste rewriting, mention sessions, upload staging,
//! and key-event classification.
//!
//! The composer is synchronous and free of I/O. Host events come in through
//! the `handle_*` methods; [`Effect`]s and [`KeyDisposition`]s come out, and
//! async collaborators (mention directory, upload pipeline) answer through
//! explicit feedback methods. Between any two events the state is coherent,
//! so a render layer can observe it at will.

pub mod boundary;
pub mod config;
pub mod coordinator;
pub mod format;
pub mod keymap;
pub mod mention;
pub mod text;
pub mod types;
pub mod upload;

pub use config::{Command, CommandSet, ComposerConfig, ComposerContext, SymbolSet};
pub use coordinator::{Composer, Effect};
pub use keymap::{Key, KeyDisposition, KeyPress, Modifiers};
pub use mention::{MentionMachine, MentionProbe, MentionSession};
pub use text::{RopeSurface, TextSurface};
pub use types::{Edit, FormatCommand, Selection};
pub use upload::{IncomingFile, UploadEvent, UploadId, UploadJob, UploadState, UploadTask};
