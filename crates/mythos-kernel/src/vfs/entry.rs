//! Directory entries returned by `list` and `stat`.

use chrono::{DateTime, Utc};

/// Kind of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryKind {
    File,
    Directory,
}

/// A point-in-time copy of a node's metadata.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Name of the entry (not full path).
    pub name: String,
    /// Kind of entry.
    pub kind: DirEntryKind,
    /// Content length in bytes (0 for directories).
    pub size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    /// Permission bits (e.g., 0o644).
    pub permissions: u32,
    pub owner: String,
    pub group: String,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == DirEntryKind::Directory
    }

    /// `ls -l` style mode, e.g. `drwxr-xr-x`.
    pub fn mode_string(&self) -> String {
        mode_string(self.is_dir(), self.permissions)
    }
}

/// Render a kind flag plus three rwx triplets.
pub fn mode_string(is_dir: bool, permissions: u32) -> String {
    let mut out = String::with_capacity(10);
    out.push(if is_dir { 'd' } else { '-' });
    for shift in [6, 3, 0] {
        let bits = (permissions >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}
