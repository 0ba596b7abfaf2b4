//! Mention directory lookups.
//!
//! The composer asks for candidates by key and consumes whatever comes back;
//! implementations decide where profiles live. Lookups for the same key must
//! be safe and cheap to repeat, so a keyed cache wrapper is provided.

use std::collections::HashMap;
use std::future::Future;

use smol_str::SmolStr;
use tokio::sync::RwLock;

use crate::error::DirectoryError;
use crate::profile::Profile;

/// How many candidates a lookup returns at most.
pub const MAX_CANDIDATES: usize = 5;

/// Cache and fetch key for one candidate lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MentionKey {
    /// Partial handle typed after the `@`.
    pub query: SmolStr,
    /// Post the draft belongs to, when any.
    pub post: Option<SmolStr>,
    /// Source (feed) scope, when any.
    pub source: Option<SmolStr>,
}

impl MentionKey {
    pub fn new(
        query: impl Into<SmolStr>,
        post: Option<SmolStr>,
        source: Option<SmolStr>,
    ) -> Self {
        Self {
            query: query.into(),
            post,
            source,
        }
    }
}

/// Where mention candidates come from.
pub trait MentionDirectory {
    /// Ranked candidates for `key`, best first.
    fn lookup(
        &self,
        key: &MentionKey,
    ) -> impl Future<Output = Result<Vec<Profile>, DirectoryError>> + Send;
}

/// Directory backed by an in-memory profile list.
///
/// Ranking: handle prefix matches first, then handle substring matches, then
/// display-name prefix matches, each group alphabetical by handle.
/// Matching is case-insensitive and results are capped at [`MAX_CANDIDATES`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    profiles: Vec<Profile>,
}

impl InMemoryDirectory {
    pub fn new(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }

    /// Parses a JSON array of profiles.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, DirectoryError> {
        Ok(Self::new(serde_json::from_slice(data)?))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn rank(&self, query: &str) -> Vec<Profile> {
        let needle = query.to_lowercase();
        let mut scored: Vec<(u8, &Profile)> = self
            .profiles
            .iter()
            .filter_map(|profile| {
                let handle = profile.username.to_lowercase();
                let score = if needle.is_empty() || handle.starts_with(&needle) {
                    0
                } else if handle.contains(&needle) {
                    1
                } else if profile
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().starts_with(&needle))
                {
                    2
                } else {
                    return None;
                };
                Some((score, profile))
            })
            .collect();
        scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.username.cmp(&b.1.username)));
        scored
            .into_iter()
            .take(MAX_CANDIDATES)
            .map(|(_, profile)| profile.clone())
            .collect()
    }
}

impl MentionDirectory for InMemoryDirectory {
    async fn lookup(&self, key: &MentionKey) -> Result<Vec<Profile>, DirectoryError> {
        Ok(self.rank(&key.query))
    }
}

/// Caches lookups per key on top of any directory.
///
/// Entries never expire; the last write per key wins.
#[derive(Debug)]
pub struct CachedDirectory<D> {
    inner: D,
    cache: RwLock<HashMap<MentionKey, Vec<Profile>>>,
}

impl<D> CachedDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// The cached list for `key`, when one exists.
    pub async fn cached(&self, key: &MentionKey) -> Option<Vec<Profile>> {
        self.cache.read().await.get(key).cloned()
    }
}

impl<D> MentionDirectory for CachedDirectory<D>
where
    D: MentionDirectory + Sync,
{
    async fn lookup(&self, key: &MentionKey) -> Result<Vec<Profile>, DirectoryError> {
        if let Some(hit) = self.cache.read().await.get(key) {
            return Ok(hit.clone());
        }
        let fresh = self.inner.lookup(key).await?;
        self.cache
            .write()
            .await
            .insert(key.clone(), fresh.clone());
        Ok(fresh)
    }
}
