use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::database::models::TemplateKey;

/// What the admin's next force-reply answer should be interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    RejectionReason { member_id: i64 },
    TemplateValue { key: TemplateKey },
}

/// One-shot registry of force-reply prompts awaiting an answer, keyed by
/// the prompt's chat and message id. `take` consumes the entry so a prompt
/// can only be answered once.
#[derive(Default, Clone)]
pub struct PendingReplies {
    pending: Arc<RwLock<HashMap<(i64, i32), PendingAction>>>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, chat_id: i64, message_id: i32, action: PendingAction) {
        self.pending
            .write()
            .await
            .insert((chat_id, message_id), action);
    }

    pub async fn take(&self, chat_id: i64, message_id: i32) -> Option<PendingAction> {
        self.pending.write().await.remove(&(chat_id, message_id))
    }
}
