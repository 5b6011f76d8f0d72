//! Append-only entry/exit log storage
//!
//! One JSONL line per gate event. Lines are appended and flushed on
//! every record; nothing is ever rewritten.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::warn;

use super::model::EntryExitLog;
use crate::{Error, Result};

pub struct EntryExitStore {
    log_path: PathBuf,
    logs: RwLock<Vec<EntryExitLog>>,
}

impl EntryExitStore {
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await?;
        let log_path = data_dir.join("entry_exit.jsonl");

        if fs::metadata(&log_path).await.is_err() {
            fs::File::create(&log_path).await?;
        }

        let logs = Self::load_logs(&log_path).await?;
        Ok(Self {
            log_path,
            logs: RwLock::new(logs),
        })
    }

    async fn load_logs(path: &Path) -> Result<Vec<EntryExitLog>> {
        let file = fs::File::open(path).await?;
        let mut reader = BufReader::new(file).lines();
        let mut logs = Vec::new();

        while let Some(line) = reader.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<EntryExitLog>(&line) {
                Ok(log) => logs.push(log),
                Err(err) => warn!(
                    "Ignoring malformed entry/exit log line in {}: {}",
                    path.display(),
                    err
                ),
            }
        }

        Ok(logs)
    }

    /// Append one gate event
    pub async fn record(&self, log: EntryExitLog) -> Result<EntryExitLog> {
        let encoded = serde_json::to_string(&log)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await
            .map_err(|err| Error::Storage(format!("Failed to open entry/exit log: {}", err)))?;

        file.write_all(encoded.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        let mut logs = self.logs.write().await;
        logs.push(log.clone());
        Ok(log)
    }

    /// All events, newest first
    pub async fn list(&self) -> Vec<EntryExitLog> {
        let logs = self.logs.read().await;
        let mut logs: Vec<EntryExitLog> = logs.iter().cloned().collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry_exit::EntryKind;
    use crate::user::{NewUser, UserProfile, UserRole};
    use tempfile::TempDir;

    fn profile() -> UserProfile {
        UserProfile::new(
            NewUser {
                uid: "u1".into(),
                name: "Asha Perera".into(),
                email: "asha@example.com".into(),
                phone: "0712345678".into(),
                index_number: "IT2021-044".into(),
                other_detail: String::new(),
            },
            UserRole::Student,
        )
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let store = EntryExitStore::new(temp_dir.path()).await.unwrap();

        store
            .record(EntryExitLog::new("finger-001", &profile(), EntryKind::Entry))
            .await
            .unwrap();
        store
            .record(EntryExitLog::new(
                "finger-001",
                &profile(),
                EntryKind::ShortExit,
            ))
            .await
            .unwrap();

        let logs = store.list().await;
        assert_eq!(logs.len(), 2);
        // Newest first
        assert_eq!(logs[0].kind, EntryKind::ShortExit);
    }

    #[tokio::test]
    async fn test_logs_survive_reload() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = EntryExitStore::new(temp_dir.path()).await.unwrap();
            store
                .record(EntryExitLog::new("finger-001", &profile(), EntryKind::Entry))
                .await
                .unwrap();
            store
                .record(EntryExitLog::new(
                    "finger-001",
                    &profile(),
                    EntryKind::LongExit,
                ))
                .await
                .unwrap();
        }

        let store = EntryExitStore::new(temp_dir.path()).await.unwrap();
        let logs = store.list().await;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].credential_hash, logs[1].credential_hash);
    }
}
