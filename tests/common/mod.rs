#![allow(dead_code)]

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use membership_bot::database::connection::DatabaseManager;
use membership_bot::services::notifier::{Controls, Notifier};
use tempfile::{tempdir, TempDir};

pub async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        recipient: String,
        body: String,
        controls: Option<Controls>,
    },
    Photo {
        recipient: String,
        blob_path: String,
        caption: String,
        controls: Option<Controls>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupAction {
    Removed(String),
    Reinstated(String),
}

/// Notifier that records every call instead of talking to Telegram.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<SentMessage>>,
    pub group_actions: Mutex<Vec<GroupAction>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn group_actions(&self) -> Vec<GroupAction> {
        self.group_actions.lock().unwrap().clone()
    }

    /// Bodies of all text messages sent to `recipient`, in order.
    pub fn texts_to(&self, recipient: &str) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::Text {
                    recipient: r, body, ..
                } if r == recipient => Some(body),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(
        &self,
        recipient: &str,
        body: &str,
        controls: Option<Controls>,
    ) -> Result<()> {
        self.messages.lock().unwrap().push(SentMessage::Text {
            recipient: recipient.to_string(),
            body: body.to_string(),
            controls,
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        recipient: &str,
        blob_path: &str,
        caption: &str,
        controls: Option<Controls>,
    ) -> Result<()> {
        self.messages.lock().unwrap().push(SentMessage::Photo {
            recipient: recipient.to_string(),
            blob_path: blob_path.to_string(),
            caption: caption.to_string(),
            controls,
        });
        Ok(())
    }

    async fn remove_from_group(&self, telegram_id: &str) -> Result<()> {
        self.group_actions
            .lock()
            .unwrap()
            .push(GroupAction::Removed(telegram_id.to_string()));
        Ok(())
    }

    async fn reinstate_in_group(&self, telegram_id: &str) -> Result<()> {
        self.group_actions
            .lock()
            .unwrap()
            .push(GroupAction::Reinstated(telegram_id.to_string()));
        Ok(())
    }

    async fn create_invite_link(&self) -> Result<String> {
        Ok("https://t.me/+test-invite".to_string())
    }
}
