//! The session: one booted machine.
//!
//! Owns the filesystem, the identity table, the process table and the
//! current working directory. The kernel and every builtin reach machine
//! state through an `Arc<Session>`; nothing is global.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info};

use crate::error::ShellError;
use crate::identity::IdentityTable;
use crate::scheduler::{Pid, ProcessTable};
use crate::state::SnapshotStore;
use crate::vfs::{NodeId, Tree, Vfs};

/// Ways a session can be asked to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitRequest {
    /// Leave without saving.
    Exit,
    /// Save the filesystem, then leave.
    Shutdown,
}

pub struct Session {
    pub vfs: Vfs,
    pub procs: Arc<ProcessTable>,
    users: RwLock<IdentityTable>,
    cwd: RwLock<NodeId>,
    store: Option<SnapshotStore>,
    exit: RwLock<Option<ExitRequest>>,
    hostname: String,
    booted_at: DateTime<Utc>,
}

impl Session {
    /// Bring up a session on `tree`. Identities are loaded from (and homes
    /// created in) the tree before it is shared.
    pub fn new(mut tree: Tree, store: Option<SnapshotStore>, pid_base: Pid, hostname: &str) -> Self {
        let users = IdentityTable::boot(&mut tree);
        let root = tree.root();
        Self {
            vfs: Vfs::new(tree),
            procs: Arc::new(ProcessTable::new(pid_base)),
            users: RwLock::new(users),
            cwd: RwLock::new(root),
            store,
            exit: RwLock::new(None),
            hostname: hostname.to_string(),
            booted_at: Utc::now(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn uptime(&self) -> Duration {
        Utc::now() - self.booted_at
    }

    pub fn store(&self) -> Option<&SnapshotStore> {
        self.store.as_ref()
    }

    /// Current working directory. Falls back to the root if the node it
    /// named has been deleted.
    pub async fn cwd(&self) -> NodeId {
        let cwd = *self.cwd.read().await;
        if self.vfs.contains(cwd).await {
            return cwd;
        }
        let root = self.vfs.root().await;
        debug!("cwd vanished, resetting to /");
        *self.cwd.write().await = root;
        root
    }

    pub async fn set_cwd(&self, id: NodeId) {
        *self.cwd.write().await = id;
    }

    pub async fn cwd_path(&self) -> String {
        let cwd = self.cwd().await;
        self.vfs.path_of(cwd).await.unwrap_or_else(|| "/".to_string())
    }

    /// Resolve `path` against the current working directory.
    pub async fn resolve(&self, path: &str) -> Option<NodeId> {
        let cwd = self.cwd().await;
        self.vfs.resolve(cwd, path).await
    }

    /// Name of the active user.
    pub async fn user(&self) -> String {
        self.users.read().await.current().to_string()
    }

    pub async fn identities(&self) -> RwLockReadGuard<'_, IdentityTable> {
        self.users.read().await
    }

    /// Become `name` and move to their home (or `/` if it is missing).
    pub async fn switch_user(&self, name: &str) -> Result<(), ShellError> {
        let home = self.users.write().await.switch_user(name)?;
        let root = self.vfs.root().await;
        let target = self.vfs.resolve(root, &home).await.unwrap_or(root);
        self.set_cwd(target).await;
        info!(user = name, "switched user");
        Ok(())
    }

    /// Prompt text: `user@host:cwd$ ` with the user's home shown as `~`.
    pub async fn prompt(&self) -> String {
        let user = self.user().await;
        let cwd = self.cwd_path().await;
        let home = format!("/home/{user}");
        let shown = match cwd.strip_prefix(&home) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => format!("~{rest}"),
            _ => cwd,
        };
        format!("{}@{}:{}$ ", user, self.hostname, shown)
    }

    /// Persist the filesystem. Returns false for a transient session.
    pub async fn save(&self) -> Result<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        let record = self.vfs.snapshot().await;
        store.save(&record)?;
        Ok(true)
    }

    /// Save, then reload the filesystem from the snapshot. The working
    /// directory is looked up again by path.
    pub async fn reboot(&self) -> Result<()> {
        let cwd_path = self.cwd_path().await;
        if let Some(store) = &self.store {
            store.save(&self.vfs.snapshot().await)?;
            if let Some(record) = store.load()? {
                self.vfs.restore(&record).await?;
            }
        }
        let root = self.vfs.root().await;
        let cwd = self.vfs.resolve(root, &cwd_path).await.unwrap_or(root);
        self.set_cwd(cwd).await;
        info!("rebooted");
        Ok(())
    }

    pub async fn request_exit(&self, request: ExitRequest) {
        *self.exit.write().await = Some(request);
    }

    pub async fn exit_requested(&self) -> Option<ExitRequest> {
        *self.exit.read().await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("hostname", &self.hostname)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
