//! Composer configuration and runtime context.

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

/// Sub-protocols a composer instance can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Link,
    Mention,
    Upload,
}

impl Command {
    const fn bit(self) -> u8 {
        match self {
            Command::Link => 1,
            Command::Mention => 1 << 1,
            Command::Upload => 1 << 2,
        }
    }
}

/// Set of enabled [`Command`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandSet(u8);

impl CommandSet {
    pub const EMPTY: CommandSet = CommandSet(0);

    pub fn with(mut self, command: Command) -> Self {
        self.0 |= command.bit();
        self
    }

    pub fn insert(&mut self, command: Command) {
        self.0 |= command.bit();
    }

    pub fn remove(&mut self, command: Command) {
        self.0 &= !command.bit();
    }

    pub fn contains(&self, command: Command) -> bool {
        self.0 & command.bit() != 0
    }
}

impl FromIterator<Command> for CommandSet {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        iter.into_iter().fold(CommandSet::EMPTY, CommandSet::with)
    }
}

/// Markdown symbol pairs used by the wrap toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSet {
    pub bold: SmolStr,
    pub italic: SmolStr,
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self {
            bold: SmolStr::new_static("**"),
            italic: SmolStr::new_static("_"),
        }
    }
}

/// Largest accepted upload, in bytes.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Content types accepted for upload out of the box.
pub const DEFAULT_ALLOWED_CONTENT: [&str; 4] =
    ["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Raised when a file fails validation.
pub const DEFAULT_REJECTED_UPLOAD_MESSAGE: &str =
    "File type is not allowed or the size exceeds the limit";

// Partial input is validated too, so the pattern must accept every prefix
// of a valid handle.
static DEFAULT_HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z0-9_]{1,39}$").expect("static pattern compiles"));

/// Static knobs for one composer instance.
#[derive(Debug, Clone)]
pub struct ComposerConfig {
    /// Largest accepted upload, in bytes.
    pub max_file_size: u64,
    /// Declared content types accepted for upload.
    pub allowed_content: Vec<SmolStr>,
    /// Shape of a (possibly partial) handle typed after `@`.
    pub handle_pattern: Regex,
    /// Wrap symbols for the formatting commands.
    pub symbols: SymbolSet,
    /// Message raised when a file fails validation.
    pub rejected_upload_message: SmolStr,
    /// Enabled sub-protocols.
    pub commands: CommandSet,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_content: DEFAULT_ALLOWED_CONTENT
                .iter()
                .map(|t| SmolStr::new_static(t))
                .collect(),
            handle_pattern: DEFAULT_HANDLE_PATTERN.clone(),
            symbols: SymbolSet::default(),
            rejected_upload_message: SmolStr::new_static(DEFAULT_REJECTED_UPLOAD_MESSAGE),
            commands: CommandSet::EMPTY
                .with(Command::Link)
                .with(Command::Mention),
        }
    }
}

impl ComposerConfig {
    /// Default config with every sub-protocol switched on.
    pub fn with_all_commands() -> Self {
        Self {
            commands: CommandSet::EMPTY
                .with(Command::Link)
                .with(Command::Mention)
                .with(Command::Upload),
            ..Self::default()
        }
    }
}

/// Runtime scope the host resolves before constructing the composer.
#[derive(Debug, Clone, Default)]
pub struct ComposerContext {
    /// Authenticated user id. Mention lookups are suppressed without one.
    pub actor: Option<SmolStr>,
    /// Post the draft belongs to.
    pub post: Option<SmolStr>,
    /// Source (feed) scope for mention ranking.
    pub source: Option<SmolStr>,
}

impl ComposerContext {
    pub fn for_actor(actor: impl Into<SmolStr>) -> Self {
        Self {
            actor: Some(actor.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_set_inserts_and_removes() {
        let mut set = CommandSet::EMPTY.with(Command::Link);
        assert!(set.contains(Command::Link));
        assert!(!set.contains(Command::Upload));
        set.insert(Command::Upload);
        assert!(set.contains(Command::Upload));
        set.remove(Command::Link);
        assert!(!set.contains(Command::Link));
    }

    #[test]
    fn command_set_collects() {
        let set: CommandSet = [Command::Mention, Command::Upload].into_iter().collect();
        assert!(set.contains(Command::Mention));
        assert!(set.contains(Command::Upload));
        assert!(!set.contains(Command::Link));
    }

    #[test]
    fn default_config_shape() {
        let config = ComposerConfig::default();
        assert!(config.commands.contains(Command::Link));
        assert!(config.commands.contains(Command::Mention));
        assert!(!config.commands.contains(Command::Upload));
        assert_eq!(config.symbols.bold, "**");
        assert_eq!(config.symbols.italic, "_");
    }

    #[test]
    fn handle_pattern_accepts_partial_handles() {
        let config = ComposerConfig::default();
        assert!(config.handle_pattern.is_match("a"));
        assert!(config.handle_pattern.is_match("alan_turing"));
        assert!(!config.handle_pattern.is_match("has space"));
        assert!(!config.handle_pattern.is_match("semi;colon"));
        assert!(!config.handle_pattern.is_match(""));
    }
}
