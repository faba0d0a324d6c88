//! Compiled-expression cache
//!
//! Entries are keyed by a SHA-256 hash of the rule content (field, operator
//! and values of every rule, in order) and the requesting user. Two
//! playlists with identical rules share an entry; editing a playlist's
//! rules drops every entry recorded for it. The lock is only held for map
//! access, never while compiling.

use crate::error::CompileErrors;
use crate::expression::CompiledExpression;
use cadence_core::types::{PlaylistId, RuleGroupRecord, UserId};
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Content hash of a rule tree as seen by one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(user_id: UserId, groups: &[RuleGroupRecord]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(user_id.as_i64().to_le_bytes());
        hasher.update((groups.len() as u64).to_le_bytes());

        for group in groups {
            hasher.update((group.rules.len() as u64).to_le_bytes());
            for rule in &group.rules {
                update_str(&mut hasher, rule.field.field_name());
                update_str(&mut hasher, &rule.operator);
                hasher.update((rule.values.len() as u64).to_le_bytes());
                for value in &rule.values {
                    update_str(&mut hasher, &value.to_string());
                }
            }
        }

        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

// Length-prefixed so adjacent strings cannot run together.
fn update_str(hasher: &mut Sha256, text: &str) {
    hasher.update((text.len() as u64).to_le_bytes());
    hasher.update(text.as_bytes());
}

struct CacheState {
    entries: LruCache<ContentHash, Arc<CompiledExpression>>,
    by_playlist: HashMap<PlaylistId, HashSet<ContentHash>>,
}

impl CacheState {
    /// Drop `key` from every playlist's key set
    fn forget(&mut self, key: &ContentHash) {
        self.by_playlist.retain(|_, keys| {
            keys.remove(key);
            !keys.is_empty()
        });
    }
}

/// Bounded LRU of compiled smart playlist expressions
pub struct ExpressionCache {
    state: Mutex<CacheState>,
}

impl ExpressionCache {
    /// Create a cache holding at most `capacity` expressions (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                by_playlist: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached expression for this content, compiling on a miss.
    ///
    /// Invalid rules are never cached.
    pub fn get_or_compile(
        &self,
        playlist_id: PlaylistId,
        groups: &[RuleGroupRecord],
        user_id: UserId,
    ) -> Result<Arc<CompiledExpression>, CompileErrors> {
        let key = ContentHash::of(user_id, groups);

        if let Some(hit) = self.lock().entries.get(&key) {
            tracing::trace!(playlist = %playlist_id, key = %key.to_hex(), "expression cache hit");
            return Ok(Arc::clone(hit));
        }

        let expression = Arc::new(crate::compile_strict(groups, user_id)?);

        let mut state = self.lock();
        if let Some((evicted, _)) = state.entries.push(key, Arc::clone(&expression)) {
            // `push` also hands back the old value when `key` was already present
            if evicted != key {
                state.forget(&evicted);
            }
        }
        state.by_playlist.entry(playlist_id).or_default().insert(key);

        Ok(expression)
    }

    /// Forget everything compiled for `playlist_id`
    pub fn invalidate_playlist(&self, playlist_id: PlaylistId) {
        let mut state = self.lock();
        if let Some(keys) = state.by_playlist.remove(&playlist_id) {
            for key in keys {
                state.entries.pop(&key);
                state.forget(&key);
            }
            tracing::debug!(playlist = %playlist_id, "invalidated cached smart playlist expressions");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.by_playlist.clear();
    }
}
