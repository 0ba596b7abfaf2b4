//! Shared platform types for the composer stack: mention profiles and the
//! directory service, the user-facing notification sink, and paste-time URL
//! sniffing.

pub mod directory;
pub mod error;
pub mod notify;
pub mod profile;
pub mod urlcheck;

pub use directory::{CachedDirectory, InMemoryDirectory, MentionDirectory, MentionKey};
pub use error::DirectoryError;
pub use notify::{BufferedNotifier, Notifier, TracingNotifier};
pub use profile::Profile;
pub use urlcheck::is_likely_url;
