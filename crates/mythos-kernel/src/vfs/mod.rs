//! Virtual Filesystem (VFS) for mythOS.
//!
//! A single in-memory node tree, shared by the shell and every running
//! process:
//!
//! ```text
//! /
//! ├── bin/     # mythOS scripts
//! ├── etc/     # motd, issue, passwd
//! ├── home/    # per-user homes
//! ├── root/
//! ├── tmp/
//! ├── usr/
//! └── var/
//! ```
//!
//! The tree itself ([`Tree`]) is synchronous and lock-free. [`Vfs`] wraps it
//! in an async `RwLock` so concurrent readers never observe a tree in the
//! middle of a mutation.

mod entry;
mod tree;

pub use entry::{mode_string, DirEntry, DirEntryKind};
pub use tree::{FileNode, Metadata, NodeId, NodeKind, NodeRecord, Tree, DIR_MODE, FILE_MODE};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::error::VfsError;

/// Directories present on a freshly formatted tree.
pub const DEFAULT_DIRS: &[&str] = &["/bin", "/etc", "/home", "/tmp", "/var", "/usr"];

/// Message of the day written on a fresh tree.
pub const MOTD: &str = "Welcome to mythOS\n";

/// Build the tree a brand new machine boots with.
pub fn default_layout() -> Tree {
    let mut tree = Tree::new();
    let root = tree.root();
    for dir in DEFAULT_DIRS {
        if let Err(e) = tree.make_directory(root, dir, "root") {
            debug!("default layout: {}", e);
        }
    }
    let issue = format!("mythOS v{} \\n \\l", crate::OS_VERSION);
    for (path, content) in [("/etc/motd", MOTD), ("/etc/issue", issue.as_str())] {
        if let Err(e) = tree.write_file(root, path, content, "root") {
            debug!("default layout: {}", e);
        }
    }
    tree
}

/// The shared filesystem.
#[derive(Debug)]
pub struct Vfs {
    tree: RwLock<Tree>,
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new(default_layout())
    }
}

impl Vfs {
    pub fn new(tree: Tree) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    /// Shared access for multi-step reads.
    pub async fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().await
    }

    /// Exclusive access for multi-step mutations.
    pub async fn write(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().await
    }

    pub async fn root(&self) -> NodeId {
        self.tree.read().await.root()
    }

    pub async fn resolve(&self, base: NodeId, path: &str) -> Option<NodeId> {
        self.tree.read().await.resolve(base, path)
    }

    pub async fn path_of(&self, id: NodeId) -> Option<String> {
        self.tree.read().await.path_of(id)
    }

    pub async fn contains(&self, id: NodeId) -> bool {
        self.tree.read().await.contains(id)
    }

    pub async fn make_directory(
        &self,
        base: NodeId,
        path: &str,
        owner: &str,
    ) -> Result<NodeId, VfsError> {
        self.tree.write().await.make_directory(base, path, owner)
    }

    pub async fn write_file(
        &self,
        base: NodeId,
        path: &str,
        content: &str,
        owner: &str,
    ) -> Result<NodeId, VfsError> {
        self.tree.write().await.write_file(base, path, content, owner)
    }

    pub async fn append_file(
        &self,
        base: NodeId,
        path: &str,
        content: &str,
        owner: &str,
    ) -> Result<NodeId, VfsError> {
        self.tree.write().await.append_file(base, path, content, owner)
    }

    pub async fn touch(&self, base: NodeId, path: &str, owner: &str) -> Result<NodeId, VfsError> {
        self.tree.write().await.touch(base, path, owner)
    }

    pub async fn read_file(&self, base: NodeId, path: &str) -> Result<String, VfsError> {
        self.tree.read().await.read_file(base, path)
    }

    pub async fn list(&self, base: NodeId, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        self.tree.read().await.list(base, path)
    }

    pub async fn stat(&self, base: NodeId, path: &str) -> Result<DirEntry, VfsError> {
        self.tree.read().await.stat(base, path)
    }

    pub async fn remove(&self, base: NodeId, path: &str) -> Result<(), VfsError> {
        self.tree.write().await.remove(base, path)
    }

    pub async fn remove_directory(&self, base: NodeId, path: &str) -> Result<(), VfsError> {
        self.tree.write().await.remove_directory(base, path)
    }

    pub async fn set_permissions(&self, base: NodeId, path: &str, mode: u32) -> Result<(), VfsError> {
        self.tree.write().await.set_permissions(base, path, mode)
    }

    pub async fn set_owner(
        &self,
        base: NodeId,
        path: &str,
        owner: &str,
        group: Option<&str>,
    ) -> Result<(), VfsError> {
        self.tree.write().await.set_owner(base, path, owner, group)
    }

    pub async fn node_count(&self) -> usize {
        self.tree.read().await.node_count()
    }

    pub async fn snapshot(&self) -> NodeRecord {
        self.tree.read().await.snapshot()
    }

    /// Replace the whole tree from a snapshot.
    ///
    /// Every outstanding [`NodeId`] is invalidated.
    pub async fn restore(&self, record: &NodeRecord) -> Result<(), VfsError> {
        let restored = Tree::restore(record)?;
        *self.tree.write().await = restored;
        Ok(())
    }
}
