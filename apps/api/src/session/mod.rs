//! Per-user session context and the in-memory store that holds it.
//!
//! Handlers never keep the lock across an await point that does real work:
//! they read what they need through `read`, compute, then write back through
//! `update`. Sessions idle for longer than the store's TTL are evicted.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::analysis::pipeline::AnalysisRecord;
use crate::analysis::AnalysisKind;
use crate::chat::ConversationTurn;
use crate::errors::AppError;
use crate::extraction::ExtractedDocument;

pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Last time any request touched this session, on the tokio clock.
    pub last_seen: Instant,
    /// `None` until the first upload.
    pub document: Option<ExtractedDocument>,
    /// Bumped by every upload. Results tagged with an older value are dropped.
    pub generation: u64,
    pub job_description: String,
    pub chat_log: Vec<ConversationTurn>,
    pub results: HashMap<AnalysisKind, AnalysisRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_seen: Instant::now(),
            document: None,
            generation: 0,
            job_description: String::new(),
            chat_log: Vec::new(),
            results: HashMap::new(),
        }
    }

    pub fn resume_text(&self) -> &str {
        self.document
            .as_ref()
            .map(|doc| doc.text.as_str())
            .unwrap_or_default()
    }

    /// Installs a new upload. Results computed from the previous résumé are dropped.
    pub fn replace_document(&mut self, document: ExtractedDocument) {
        self.document = Some(document);
        self.generation += 1;
        self.results.clear();
    }

    /// Stores `record` if it was computed from the current document.
    ///
    /// Returns false, leaving the results untouched, when an upload landed
    /// after `generation` was read.
    pub fn store_result(&mut self, generation: u64, record: AnalysisRecord) -> bool {
        if generation != self.generation {
            return false;
        }
        self.results.insert(record.kind, record);
        true
    }

    pub fn job_description_words(&self) -> usize {
        self.job_description.split_whitespace().count()
    }

    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= ttl
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Creates a session, evicting idle ones first.
    pub async fn create(&self) -> Session {
        let session = Session::new();
        let mut sessions = self.sessions.write().await;
        evict_idle(&mut sessions, self.ttl);
        sessions.insert(session.id, session.clone());
        tracing::info!(session_id = %session.id, "Session created");
        session
    }

    /// Runs `f` against the session and marks it as seen.
    ///
    /// Takes the write lock because touching `last_seen` is a write.
    pub async fn read<T>(&self, id: Uuid, f: impl FnOnce(&Session) -> T) -> Result<T, AppError> {
        self.update(id, |session| f(&*session)).await
    }

    /// Runs `f` against the session under a write lock and marks it as seen.
    ///
    /// A session past its TTL is treated as gone even if the sweeper has not
    /// reached it yet.
    pub async fn update<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, AppError> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        match sessions.get_mut(&id) {
            Some(session) if !session.is_idle(now, self.ttl) => {
                session.last_seen = now;
                Ok(f(session))
            }
            Some(_) => {
                sessions.remove(&id);
                tracing::info!(session_id = %id, "Session expired");
                Err(not_found(id))
            }
            None => Err(not_found(id)),
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| tracing::info!(session_id = %id, "Session ended"))
            .ok_or_else(|| not_found(id))
    }

    /// Drops every session idle for at least the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        evict_idle(&mut *self.sessions.write().await, self.ttl)
    }

    /// Starts a background task that evicts idle sessions once per `period`.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                store.evict_idle().await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

fn evict_idle(sessions: &mut HashMap<Uuid, Session>, ttl: Duration) -> usize {
    let now = Instant::now();
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_idle(now, ttl));
    let evicted = before - sessions.len();
    if evicted > 0 {
        tracing::info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
    }
    evicted
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}
