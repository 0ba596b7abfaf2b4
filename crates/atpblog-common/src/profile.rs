//! Mention candidate profiles.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A user profile as surfaced in mention suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Unique handle, without the leading `@`.
    pub username: SmolStr,
    /// Display name shown next to the handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<SmolStr>,
    /// Avatar URL, when the user has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Profile {
    pub fn new(username: impl Into<SmolStr>) -> Self {
        Self {
            username: username.into(),
            name: None,
            image: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
