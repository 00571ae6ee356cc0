//! In-memory cache of understanding results keyed by session id.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::{AssistantError, Result};
use crate::meeting::StructuredMeeting;

const MAX_SESSION_ID_LEN: usize = 128;

fn session_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:-]*$").ok())
        .as_ref()
}

/// Generate a fresh session id.
pub fn new_session_id() -> String {
    format!("session_{}", uuid::Uuid::new_v4().simple())
}

/// Reject ids that are empty, oversized or contain characters unsafe in a
/// URL path segment.
pub fn validate_session_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(AssistantError::validation("Session id must not be empty"));
    }
    if id.len() > MAX_SESSION_ID_LEN {
        return Err(AssistantError::validation(format!(
            "Session id must be at most {MAX_SESSION_ID_LEN} characters"
        )));
    }
    if !session_id_pattern().is_some_and(|pattern| pattern.is_match(id)) {
        return Err(AssistantError::validation(
            "Session id may only contain letters, digits, '_', '-', '.' and ':'",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct SessionEntry {
    meeting: StructuredMeeting,
    stored_at: Instant,
}

/// Shared handle to the session map. Clones share the same entries.
#[derive(Clone)]
pub struct SessionCache {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Option<Duration>,
    max_entries: usize,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl SessionCache {
    /// `ttl` of `None` keeps entries until deleted or evicted for space.
    pub fn new(ttl: Option<Duration>, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.ttl(), config.max_entries)
    }

    fn is_expired(&self, entry: &SessionEntry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.duration_since(entry.stored_at) >= ttl)
    }

    /// Store `meeting` under `session_id`, replacing any previous entry.
    pub async fn put(&self, session_id: &str, meeting: StructuredMeeting) {
        let now = Instant::now();
        let mut entries = self.inner.write().await;

        entries.retain(|_, entry| !self.is_expired(entry, now));

        if !entries.contains_key(session_id) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                debug!("Session cache full, evicting {}", oldest);
                entries.remove(&oldest);
            }
        }

        entries.insert(
            session_id.to_string(),
            SessionEntry {
                meeting,
                stored_at: now,
            },
        );
        debug!("Cached meeting for session {}", session_id);
    }

    /// Look up a session. Missing and expired ids are `NotFound`.
    pub async fn get(&self, session_id: &str) -> Result<StructuredMeeting> {
        let now = Instant::now();
        {
            let entries = self.inner.read().await;
            match entries.get(session_id) {
                Some(entry) if !self.is_expired(entry, now) => {
                    return Ok(entry.meeting.clone());
                }
                Some(_) => {}
                None => return Err(not_found(session_id)),
            }
        }

        // Expired: drop it unless it was replaced in the meantime.
        let mut entries = self.inner.write().await;
        if entries
            .get(session_id)
            .is_some_and(|entry| self.is_expired(entry, now))
        {
            entries.remove(session_id);
            info!("Session {} expired", session_id);
        }
        Err(not_found(session_id))
    }

    /// Remove a session. Returns whether an entry existed.
    pub async fn delete(&self, session_id: &str) -> bool {
        let removed = self.inner.write().await.remove(session_id).is_some();
        if removed {
            info!("Cleared cache for session {}", session_id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.inner.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }
}

fn not_found(session_id: &str) -> AssistantError {
    AssistantError::not_found(format!(
        "Session {session_id} not found. Provide the transcript instead."
    ))
}
