// 🗂️ Sessions - one isolated record set per user
//
// A session owns an `Arc<RecordSet>` snapshot. Uploads swap the whole Arc;
// a question clones the Arc first and runs against that, so a concurrent
// upload is either fully visible to it or not at all. Sessions idle for
// longer than the store's TTL are dropped along with their records.

use crate::analysis::Insight;
use crate::engine::InsightEngine;
use crate::error::AnalysisError;
use crate::records::RecordSet;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;
use uuid::Uuid;

// ============================================================================
// SESSION
// ============================================================================

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    records: Arc<RecordSet>,
    /// When the current record set was loaded (`None` before any upload)
    pub loaded_at: Option<DateTime<Utc>>,
    /// Last create, upload or question
    pub last_used: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            id: Uuid::new_v4(),
            records: Arc::new(RecordSet::default()),
            loaded_at: None,
            last_used: Utc::now(),
        }
    }

    pub fn with_records(records: RecordSet) -> Self {
        let mut session = Session::new();
        session.replace_records(records);
        session
    }

    /// Swap in a new upload wholesale.
    pub fn replace_records(&mut self, records: RecordSet) {
        info!(session = %self.id, records = records.len(), "replacing session records");
        let now = Utc::now();
        self.records = Arc::new(records);
        self.loaded_at = Some(now);
        self.last_used = now;
    }

    /// Current snapshot; stays valid after a later replace.
    pub fn snapshot(&self) -> Arc<RecordSet> {
        Arc::clone(&self.records)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_used > ttl
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SESSION STORE
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Sessions keyed by id. Cheap to clone; clones share the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    /// Idle time after which a session ends; `None` keeps sessions until
    /// they are removed.
    ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: None,
        }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Some(ttl),
        }
    }

    /// Store configured from `[server] session_ttl_secs`; 0 disables expiry.
    pub fn from_ttl_secs(secs: u64) -> Self {
        if secs == 0 {
            return Self::new();
        }
        match Duration::from_std(std::time::Duration::from_secs(secs)) {
            Ok(ttl) => Self::with_ttl(ttl),
            Err(_) => Self::new(),
        }
    }

    pub fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;
        let mut sessions = self.write();
        self.evict_idle(&mut sessions, Utc::now());
        sessions.insert(id, session);
        info!(session = %id, "created session");
        id
    }

    /// Replace a session's records; returns the new record count.
    pub fn replace_records(&self, id: Uuid, records: RecordSet) -> Result<usize, SessionError> {
        let mut sessions = self.write();
        let session = self.live_session(&mut sessions, id)?;
        session.replace_records(records);
        Ok(session.record_count())
    }

    /// Current snapshot of a live session; counts as activity.
    pub fn snapshot(&self, id: Uuid) -> Result<Arc<RecordSet>, SessionError> {
        let mut sessions = self.write();
        let session = self.live_session(&mut sessions, id)?;
        session.last_used = Utc::now();
        Ok(session.snapshot())
    }

    /// Answer against the snapshot current at call time. The lock is
    /// released before the analysis runs.
    pub fn ask(
        &self,
        id: Uuid,
        engine: &InsightEngine,
        question: &str,
    ) -> Result<Insight, SessionError> {
        let records = self.snapshot(id)?;
        Ok(engine.ask(question, &records)?)
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self.write().remove(&id).is_some();
        if removed {
            info!(session = %id, "removed session");
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Drop every session idle past the TTL; returns how many went.
    pub fn evict_expired(&self) -> usize {
        let mut sessions = self.write();
        self.evict_idle(&mut sessions, Utc::now())
    }

    fn evict_idle(&self, sessions: &mut HashMap<Uuid, Session>, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, "evicted idle sessions");
        }
        evicted
    }

    /// The session for `id`, unless it is unknown or has expired. An
    /// expired session is removed on the spot.
    fn live_session<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, Session>,
        id: Uuid,
    ) -> Result<&'a mut Session, SessionError> {
        let expired = match (sessions.get(&id), self.ttl) {
            (None, _) => return Err(SessionError::NotFound(id)),
            (Some(session), Some(ttl)) => session.is_expired(Utc::now(), ttl),
            (Some(_), None) => false,
        };

        if expired {
            sessions.remove(&id);
            info!(session = %id, "session expired");
            return Err(SessionError::NotFound(id));
        }

        sessions.get_mut(&id).ok_or(SessionError::NotFound(id))
    }

    // A panic while holding the lock cannot leave a half-written session:
    // every mutation is a single insert, remove or Arc swap.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Session>> {
        self.sessions.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Record;

    fn records(budget: f64, actual: f64) -> RecordSet {
        RecordSet::new(vec![Record::new()
            .with("Year", 2022.0)
            .with("Budget", budget)
            .with("Actual", actual)])
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut session = Session::with_records(records(100.0, 100.0));
        let before = session.snapshot();

        session.replace_records(records(50.0, 75.0));

        // old snapshot is untouched, new one is fully visible
        assert_eq!(before[0].budget(), 100.0);
        assert_eq!(session.snapshot()[0].budget(), 50.0);
        assert!(session.loaded_at.is_some());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let engine = InsightEngine::new();
        let a = store.create();
        let b = store.create();

        store.replace_records(a, records(100.0, 200.0)).unwrap();
        store.replace_records(b, records(100.0, 100.0)).unwrap();

        let answer_a = store.ask(a, &engine, "total").unwrap();
        let answer_b = store.ask(b, &engine, "total").unwrap();
        assert!(answer_a.narrative.contains("over budget"));
        assert!(answer_b.narrative.contains("excellent control"));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_unknown_session() {
        let store = SessionStore::new();
        let engine = InsightEngine::new();
        let id = Uuid::new_v4();

        assert_eq!(store.snapshot(id).unwrap_err(), SessionError::NotFound(id));
        assert_eq!(
            store.ask(id, &engine, "total").unwrap_err(),
            SessionError::NotFound(id)
        );
        assert!(!store.remove(id));
    }

    #[test]
    fn test_new_session_has_no_records() {
        let store = SessionStore::new();
        let engine = InsightEngine::new();
        let id = store.create();

        assert_eq!(
            store.ask(id, &engine, "total").unwrap_err(),
            SessionError::Analysis(AnalysisError::EmptyRecordSet)
        );

        assert!(store.remove(id));
        assert_eq!(store.count(), 0);
    }

    fn idle_for(store: &SessionStore, id: Uuid, idle: Duration) {
        let mut sessions = store.write();
        if let Some(session) = sessions.get_mut(&id) {
            session.last_used = Utc::now() - idle;
        }
    }

    #[test]
    fn test_idle_session_expires() {
        let store = SessionStore::with_ttl(Duration::seconds(60));
        let engine = InsightEngine::new();
        let id = store.create();
        store.replace_records(id, records(100.0, 100.0)).unwrap();

        idle_for(&store, id, Duration::seconds(120));

        assert_eq!(
            store.ask(id, &engine, "total").unwrap_err(),
            SessionError::NotFound(id)
        );
        assert_eq!(
            store.replace_records(id, records(1.0, 1.0)).unwrap_err(),
            SessionError::NotFound(id)
        );
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_activity_keeps_session_alive() {
        let store = SessionStore::with_ttl(Duration::seconds(60));
        let engine = InsightEngine::new();
        let id = store.create();
        store.replace_records(id, records(100.0, 100.0)).unwrap();

        idle_for(&store, id, Duration::seconds(30));
        assert!(store.ask(id, &engine, "total").is_ok());

        // the question reset the idle clock
        idle_for(&store, id, Duration::seconds(30));
        assert_eq!(store.evict_expired(), 0);
        assert!(store.ask(id, &engine, "total").is_ok());
    }

    #[test]
    fn test_create_sweeps_idle_sessions() {
        let store = SessionStore::from_ttl_secs(60);
        let stale = store.create();
        idle_for(&store, stale, Duration::seconds(61));

        let fresh = store.create();

        assert_eq!(store.count(), 1);
        assert!(store.snapshot(fresh).is_ok());
        assert_eq!(store.snapshot(stale).unwrap_err(), SessionError::NotFound(stale));
    }

    #[test]
    fn test_zero_ttl_disables_expiry() {
        let store = SessionStore::from_ttl_secs(0);
        let id = store.create();
        idle_for(&store, id, Duration::days(365));

        assert_eq!(store.evict_expired(), 0);
        assert!(store.snapshot(id).is_ok());
    }
}
