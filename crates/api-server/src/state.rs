//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use hostel_core::entry_exit::EntryExitStore;
use hostel_core::ledger::FileLedgerStore;
use hostel_core::maintenance::FileMaintenanceStore;
use hostel_core::message::FileMessageStore;
use hostel_core::user::FileUserStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    ledger: Arc<FileLedgerStore>,
    users: Arc<FileUserStore>,
    maintenance: Arc<FileMaintenanceStore>,
    entry_exit: Arc<EntryExitStore>,
    messages: Arc<FileMessageStore>,
    /// uids that get the admin role at registration
    admin_uids: Vec<String>,
}

impl AppState {
    /// Create a new AppState with the given data directory
    pub async fn new(data_dir: PathBuf, admin_uids: Vec<String>) -> hostel_core::Result<Self> {
        let ledger = Arc::new(FileLedgerStore::new(&data_dir).await?);
        let users = Arc::new(FileUserStore::new(data_dir.join("users.json")).await?);
        let maintenance = Arc::new(FileMaintenanceStore::new(&data_dir).await?);
        let entry_exit = Arc::new(EntryExitStore::new(&data_dir).await?);
        let messages = Arc::new(FileMessageStore::new(data_dir.join("messages.json")).await?);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                ledger,
                users,
                maintenance,
                entry_exit,
                messages,
                admin_uids,
            }),
        })
    }

    pub fn ledger(&self) -> &FileLedgerStore {
        &self.inner.ledger
    }

    pub fn ledger_arc(&self) -> Arc<FileLedgerStore> {
        Arc::clone(&self.inner.ledger)
    }

    pub fn users(&self) -> &FileUserStore {
        &self.inner.users
    }

    pub fn maintenance(&self) -> &FileMaintenanceStore {
        &self.inner.maintenance
    }

    pub fn entry_exit(&self) -> &EntryExitStore {
        &self.inner.entry_exit
    }

    pub fn messages(&self) -> &FileMessageStore {
        &self.inner.messages
    }

    pub fn is_seed_admin(&self, uid: &str) -> bool {
        self.inner.admin_uids.iter().any(|admin| admin == uid)
    }
}
