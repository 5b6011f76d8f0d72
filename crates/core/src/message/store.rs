//! File-based message storage

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::Message;
use crate::{Error, Result};

pub struct FileMessageStore {
    path: PathBuf,
    cache: RwLock<HashMap<Uuid, Message>>,
}

impl FileMessageStore {
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let messages: Vec<Message> = serde_json::from_str(&content)?;
            messages.into_iter().map(|m| (m.id, m)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    async fn persist(&self) -> Result<()> {
        let cache = self.cache.read().await;
        let messages: Vec<&Message> = cache.values().collect();
        let content = serde_json::to_string_pretty(&messages)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    pub async fn send(&self, message: Message) -> Result<Message> {
        if message.receiver.trim().is_empty() {
            return Err(Error::InvalidInput("receiver is required".to_string()));
        }
        if message.subject.trim().is_empty() && message.body.trim().is_empty() {
            return Err(Error::InvalidInput(
                "message must have a subject or a body".to_string(),
            ));
        }

        {
            let mut cache = self.cache.write().await;
            cache.insert(message.id, message.clone());
        }
        self.persist().await?;
        Ok(message)
    }

    /// Messages addressed to the given receiver, newest first
    pub async fn inbox(&self, receiver: &str) -> Result<Vec<Message>> {
        let cache = self.cache.read().await;
        let mut messages: Vec<Message> = cache
            .values()
            .filter(|m| m.receiver == receiver)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(messages)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<Message> {
        let updated = {
            let mut cache = self.cache.write().await;
            let message = cache
                .get_mut(&id)
                .ok_or_else(|| Error::NotFound(format!("message {}", id)))?;
            message.read = true;
            message.clone()
        };
        self.persist().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileMessageStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("messages.json");
        let store = FileMessageStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_send_and_inbox() {
        let (store, _temp) = create_test_store().await;

        store
            .send(Message::new("admin", "u1", "Curfew", "Gates close at 22:00"))
            .await
            .unwrap();
        store
            .send(Message::new("u2", "admin", "Query", "Room change possible?"))
            .await
            .unwrap();

        let inbox = store.inbox("u1").await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].subject, "Curfew");
        assert!(!inbox[0].read);

        assert!(store.inbox("u3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_requires_receiver_and_content() {
        let (store, _temp) = create_test_store().await;

        let result = store.send(Message::new("admin", "", "Hi", "there")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = store.send(Message::new("admin", "u1", "", "  ")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_mark_read() {
        let (store, _temp) = create_test_store().await;

        let message = store
            .send(Message::new("admin", "u1", "Curfew", "Gates close at 22:00"))
            .await
            .unwrap();

        let updated = store.mark_read(message.id).await.unwrap();
        assert!(updated.read);

        let result = store.mark_read(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
