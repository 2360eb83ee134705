use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::Error;
use crate::pipeline::ProcessedDocument;

pub const DEFAULT_TTL_SECS: u64 = 3600;

/// A stored pipeline result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub document: Arc<ProcessedDocument>,
}

impl Session {
    fn is_expired_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at >= ttl
    }
}

/// In-memory results keyed by session id.
///
/// Entries live until they are removed or their TTL runs out. Expired entries
/// are evicted lazily on lookup and in bulk by [`SessionStore::purge_expired`].
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert(&self, document: ProcessedDocument) -> Session {
        self.insert_at(document, Utc::now())
    }

    pub fn insert_at(&self, document: ProcessedDocument, now: DateTime<Utc>) -> Session {
        let mut sessions = self.lock();

        let mut id = new_session_id();
        while sessions.contains_key(&id) {
            id = new_session_id();
        }

        let session = Session {
            id: id.clone(),
            created_at: now,
            document: Arc::new(document),
        };
        sessions.insert(id, session.clone());

        log::info!(
            "stored session {} ({} chapters, {} live)",
            session.id,
            session.document.output.chapters.len(),
            sessions.len()
        );

        session
    }

    pub fn get(&self, id: &str) -> Result<Session, Error> {
        self.get_at(id, Utc::now())
    }

    /// Look up a session as of `now`, evicting it if it has expired.
    pub fn get_at(&self, id: &str, now: DateTime<Utc>) -> Result<Session, Error> {
        let mut sessions = self.lock();

        match sessions.get(id) {
            None => Err(Error::SessionNotFound(id.to_string())),
            Some(session) if session.is_expired_at(self.ttl, now) => {
                sessions.remove(id);
                log::debug!("evicted expired session {}", id);
                Err(Error::SessionExpired(id.to_string()))
            }
            Some(session) => Ok(session.clone()),
        }
    }

    /// Returns whether a session was present.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.lock().remove(id).is_some();
        if removed {
            log::debug!("cleared session {}", id);
        }
        removed
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    /// Drop every session that has expired as of `now`; returns how many went.
    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(self.ttl, now));
        let purged = before - sessions.len();
        if purged > 0 {
            log::debug!("purged {} expired sessions", purged);
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }
}

fn new_session_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use studypack_core::config::StudyConfig;
    use studypack_core::pipeline::prioritize_pages;

    fn document(text: &str) -> ProcessedDocument {
        ProcessedDocument {
            source: "test.pdf".to_string(),
            metadata: pdf::DocumentMetadata::default(),
            output: prioritize_pages(vec![text.to_string()], &StudyConfig::default()),
        }
    }

    fn store(ttl_secs: u64) -> SessionStore {
        SessionStore::new(std::time::Duration::from_secs(ttl_secs))
    }

    #[test]
    fn test_insert_then_get() {
        let store = store(60);
        let session = store.insert(document("some notes"));

        assert_eq!(session.id.len(), 16);
        assert!(session.id.chars().all(|c| c.is_ascii_hexdigit()));

        let fetched = store.get(&session.id).unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.document.output.raw_text, "some notes");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let store = store(60);
        assert!(matches!(
            store.get("0000000000000000"),
            Err(Error::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_expired_session_is_evicted_on_lookup() {
        let store = store(60);
        let start = Utc::now();
        let session = store.insert_at(document("notes"), start);

        assert!(store
            .get_at(&session.id, start + Duration::seconds(59))
            .is_ok());
        assert!(matches!(
            store.get_at(&session.id, start + Duration::seconds(60)),
            Err(Error::SessionExpired(_))
        ));
        assert_eq!(store.len(), 0);
        assert!(matches!(
            store.get_at(&session.id, start + Duration::seconds(61)),
            Err(Error::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_remove() {
        let store = store(60);
        let session = store.insert(document("notes"));
        assert!(store.remove(&session.id));
        assert!(!store.remove(&session.id));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_purge_expired_keeps_fresh_sessions() {
        let store = store(100);
        let start = Utc::now();
        store.insert_at(document("old"), start);
        let fresh = store.insert_at(document("new"), start + Duration::seconds(50));

        assert_eq!(store.purge_expired_at(start + Duration::seconds(120)), 1);
        assert_eq!(store.len(), 1);
        assert!(store
            .get_at(&fresh.id, start + Duration::seconds(120))
            .is_ok());
    }

    #[test]
    fn test_ids_are_distinct() {
        let store = store(60);
        let a = store.insert(document("a"));
        let b = store.insert(document("b"));
        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }
}
