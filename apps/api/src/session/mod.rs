//! Session State Store: in-memory, one entry per browser session.
//!
//! Each session sits behind its own `tokio::sync::Mutex`. Handlers hold that lock
//! for the whole operation, completion call included, so one session's requests run
//! in arrival order while other sessions proceed independently.

pub mod handlers;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use crate::credentials::CredentialInputs;
use crate::errors::AppError;
use crate::export::ArtifactKind;
use crate::reader::extract::ExtractedDocument;
use crate::wizard::machine::WizardState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationEntry {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub credentials: CredentialInputs,
    pub conversation: Vec<ConversationEntry>,
    pub document: Option<ExtractedDocument>,
    pub wizard: WizardState,
    artifacts: BTreeMap<ArtifactKind, String>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            credentials: CredentialInputs::default(),
            conversation: Vec::new(),
            document: None,
            wizard: WizardState::new(),
            artifacts: BTreeMap::new(),
        }
    }

    /// Clears everything the session produced. Credentials are kept.
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.document = None;
        self.wizard.reset();
        self.artifacts.clear();
    }

    /// Installs a freshly extracted document. Returns `false` when a document with
    /// the same filename is already loaded, in which case nothing changes.
    pub fn replace_document(&mut self, document: ExtractedDocument) -> bool {
        if self
            .document
            .as_ref()
            .is_some_and(|current| current.filename == document.filename)
        {
            return false;
        }
        self.document = Some(document);
        self.conversation.clear();
        // The summary described the previous document.
        self.artifacts.remove(&ArtifactKind::DocumentSummary);
        true
    }

    /// Records one completed question/answer exchange.
    pub fn push_exchange(&mut self, question: &str, answer: &str) {
        self.conversation.push(ConversationEntry {
            role: ChatRole::User,
            content: question.to_string(),
        });
        self.conversation.push(ConversationEntry {
            role: ChatRole::Assistant,
            content: answer.to_string(),
        });
    }

    pub fn record_artifact(&mut self, kind: ArtifactKind, content: &str) {
        self.artifacts.insert(kind, content.to_string());
    }

    /// Latest content for an artifact. Proposal exports read the wizard's final document.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::ProposalMarkdown | ArtifactKind::ProposalText => {
                self.wizard.final_document()
            }
            _ => self.artifacts.get(&kind).map(String::as_str),
        }
    }

    pub fn available_artifacts(&self) -> Vec<ArtifactKind> {
        let mut kinds: Vec<ArtifactKind> = self.artifacts.keys().copied().collect();
        if self.wizard.final_document().is_some() {
            kinds.push(ArtifactKind::ProposalMarkdown);
            kinds.push(ArtifactKind::ProposalText);
        }
        kinds
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

struct StoredSession {
    handle: SessionHandle,
    last_active: Instant,
}

/// All live sessions, keyed by id.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionHandle {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.write().await.insert(
            id,
            StoredSession {
                handle: handle.clone(),
                last_active: Instant::now(),
            },
        );
        info!("Session {id} created");
        handle
    }

    /// Looks a session up and marks it active.
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        stored.last_active = Instant::now();
        Ok(stored.handle.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!("Session {id} ended");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Session {id} not found"))),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions untouched for longer than `ttl`. A session whose handle is
    /// still held by a request is kept. Returns how many were dropped.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, stored| {
            let in_use = Arc::strong_count(&stored.handle) > 1;
            let keep = in_use || now.duration_since(stored.last_active) < ttl;
            if !keep {
                debug!("Session {id} idle for over {}s, evicting", ttl.as_secs());
            }
            keep
        });
        before - sessions.len()
    }

    /// Runs `evict_idle` every `every` until the runtime shuts down.
    pub fn spawn_eviction(&self, ttl: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(ttl).await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle session(s)");
                }
            }
        })
    }
}
