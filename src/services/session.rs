use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Where a member currently is in the registration conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    #[default]
    Idle,
    WaitingName,
    WaitingPhone,
    WaitingPayment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Session {
    pub state: SessionState,
    pub full_name: Option<String>,
}

impl Session {
    pub fn waiting_name() -> Self {
        Session {
            state: SessionState::WaitingName,
            full_name: None,
        }
    }

    pub fn waiting_phone(full_name: String) -> Self {
        Session {
            state: SessionState::WaitingPhone,
            full_name: Some(full_name),
        }
    }

    pub fn waiting_payment() -> Self {
        Session {
            state: SessionState::WaitingPayment,
            full_name: None,
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, telegram_id: &str) -> Option<Session>;
    async fn set(&self, telegram_id: &str, session: Session);
    async fn clear(&self, telegram_id: &str);
}

/// Process-local session storage. Conversations restart from idle after
/// a process restart, which matches how the registration flow recovers.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, telegram_id: &str) -> Option<Session> {
        self.sessions.read().await.get(telegram_id).cloned()
    }

    async fn set(&self, telegram_id: &str, session: Session) {
        self.sessions
            .write()
            .await
            .insert(telegram_id.to_string(), session);
    }

    async fn clear(&self, telegram_id: &str) {
        self.sessions.write().await.remove(telegram_id);
    }
}
