//! Arena-backed node tree.
//!
//! Every node lives in a single map keyed by [`NodeId`]. Parent and child
//! links are ids, so the structure can't form reference cycles and a
//! detached subtree simply disappears from the map. Ids are handed out
//! monotonically and never reused: a stale id after a delete resolves to
//! nothing instead of aliasing a newer node.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::{DirEntry, DirEntryKind};
use crate::error::VfsError;

/// Default permission bits for new directories.
pub const DIR_MODE: u32 = 0o755;
/// Default permission bits for new files.
pub const FILE_MODE: u32 = 0o644;

/// Stable handle to a node in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Payload that distinguishes files from directories.
#[derive(Debug, Clone)]
pub enum NodeKind {
    File { content: String },
    Directory { children: BTreeMap<String, NodeId> },
}

/// Tracked metadata for a node.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub permissions: u32,
    pub owner: String,
    pub group: String,
}

impl Metadata {
    fn new(permissions: u32, owner: &str) -> Self {
        let now = Utc::now();
        Self {
            size: 0,
            created_at: now,
            modified_at: now,
            permissions,
            owner: owner.to_string(),
            group: owner.to_string(),
        }
    }
}

/// A file or directory.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub meta: Metadata,
}

impl FileNode {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Children of a directory; `None` for files.
    pub fn children(&self) -> Option<&BTreeMap<String, NodeId>> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Content of a file; `None` for directories.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory { .. } => None,
        }
    }

    fn child(&self, name: &str) -> Option<NodeId> {
        self.children().and_then(|c| c.get(name).copied())
    }

    fn to_entry(&self) -> DirEntry {
        DirEntry {
            name: self.name.clone(),
            kind: if self.is_dir() {
                DirEntryKind::Directory
            } else {
                DirEntryKind::File
            },
            size: self.meta.size,
            created: self.meta.created_at,
            modified: self.meta.modified_at,
            permissions: self.meta.permissions,
            owner: self.meta.owner.clone(),
            group: self.meta.group.clone(),
        }
    }
}

/// Serializable form of a node and its subtree.
///
/// Children are stored in name order; parent links are implied by nesting
/// and rebuilt on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub is_directory: bool,
    pub permissions: u32,
    pub owner: String,
    pub group: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

/// The node arena.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: HashMap<NodeId, FileNode>,
    root: NodeId,
    next_id: u64,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree containing only an empty root directory owned by `root`.
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            FileNode {
                name: String::new(),
                parent: None,
                kind: NodeKind::Directory {
                    children: BTreeMap::new(),
                },
                meta: Metadata::new(DIR_MODE, "root"),
            },
        );
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&FileNode> {
        self.nodes.get(&id)
    }

    /// True while `id` names a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve `path` against `base`. Absolute paths start at the root.
    ///
    /// Empty segments are skipped, `.` stays put, `..` climbs (and stays at
    /// the root when there is nowhere to climb). Anything else must name an
    /// existing child.
    pub fn resolve(&self, base: NodeId, path: &str) -> Option<NodeId> {
        self.walk(base, path).ok()
    }

    /// Like [`Tree::resolve`] but reports why resolution failed.
    pub fn walk(&self, base: NodeId, path: &str) -> Result<NodeId, VfsError> {
        let mut current = if path.starts_with('/') { self.root } else { base };
        let mut node = self
            .nodes
            .get(&current)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))?;

        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if let Some(parent) = node.parent {
                        current = parent;
                    }
                }
                name => {
                    if !node.is_dir() {
                        return Err(VfsError::NotADirectory(path.to_string()));
                    }
                    current = node
                        .child(name)
                        .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
                }
            }
            node = self
                .nodes
                .get(&current)
                .ok_or_else(|| VfsError::NotFound(path.to_string()))?;
        }
        Ok(current)
    }

    /// Absolute path of a live node.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self.nodes.get(&id)?;
        while let Some(parent) = current.parent {
            segments.push(current.name.as_str());
            current = self.nodes.get(&parent)?;
        }
        if segments.is_empty() {
            return Some("/".to_string());
        }
        segments.reverse();
        Some(format!("/{}", segments.join("/")))
    }

    /// Create the leaf directory of `path`. Ancestors must already exist.
    pub fn make_directory(
        &mut self,
        base: NodeId,
        path: &str,
        owner: &str,
    ) -> Result<NodeId, VfsError> {
        let (parent, leaf) = self.split_parent(base, path)?;
        if self.child_of(parent, &leaf).is_some() {
            return Err(VfsError::AlreadyExists(path.to_string()));
        }
        let kind = NodeKind::Directory {
            children: BTreeMap::new(),
        };
        Ok(self.attach(parent, leaf, kind, Metadata::new(DIR_MODE, owner)))
    }

    /// Create or overwrite a file.
    pub fn write_file(
        &mut self,
        base: NodeId,
        path: &str,
        content: &str,
        owner: &str,
    ) -> Result<NodeId, VfsError> {
        self.put_file(base, path, owner, |existing| {
            existing.clear();
            existing.push_str(content);
        })
    }

    /// Create a file or append to an existing one.
    pub fn append_file(
        &mut self,
        base: NodeId,
        path: &str,
        content: &str,
        owner: &str,
    ) -> Result<NodeId, VfsError> {
        self.put_file(base, path, owner, |existing| existing.push_str(content))
    }

    /// Create an empty file, or bump the modification time of an existing node.
    pub fn touch(&mut self, base: NodeId, path: &str, owner: &str) -> Result<NodeId, VfsError> {
        if let Some(id) = self.resolve(base, path) {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.meta.modified_at = Utc::now();
            }
            return Ok(id);
        }
        self.put_file(base, path, owner, |_| {})
    }

    pub fn read_file(&self, base: NodeId, path: &str) -> Result<String, VfsError> {
        let id = self.walk(base, path)?;
        let node = self.node(id, path)?;
        node.content()
            .map(str::to_string)
            .ok_or_else(|| VfsError::IsADirectory(path.to_string()))
    }

    /// Entries of a directory sorted by name. A file lists as itself.
    pub fn list(&self, base: NodeId, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let id = self.walk(base, path)?;
        let node = self.node(id, path)?;
        match node.children() {
            Some(children) => Ok(children
                .values()
                .filter_map(|child| self.nodes.get(child))
                .map(FileNode::to_entry)
                .collect()),
            None => Ok(vec![node.to_entry()]),
        }
    }

    pub fn stat(&self, base: NodeId, path: &str) -> Result<DirEntry, VfsError> {
        let id = self.walk(base, path)?;
        let mut entry = self.node(id, path)?.to_entry();
        if id == self.root {
            entry.name = "/".to_string();
        }
        Ok(entry)
    }

    /// Remove a file.
    pub fn remove(&mut self, base: NodeId, path: &str) -> Result<(), VfsError> {
        let id = self.walk(base, path)?;
        if id == self.root {
            return Err(VfsError::InvalidPath(path.to_string()));
        }
        if self.node(id, path)?.is_dir() {
            return Err(VfsError::IsADirectory(path.to_string()));
        }
        self.detach(id);
        Ok(())
    }

    /// Remove a directory together with everything under it.
    pub fn remove_directory(&mut self, base: NodeId, path: &str) -> Result<(), VfsError> {
        let id = self.walk(base, path)?;
        if id == self.root {
            return Err(VfsError::InvalidPath(path.to_string()));
        }
        if !self.node(id, path)?.is_dir() {
            return Err(VfsError::NotADirectory(path.to_string()));
        }
        self.detach(id);
        Ok(())
    }

    pub fn set_permissions(&mut self, base: NodeId, path: &str, mode: u32) -> Result<(), VfsError> {
        let id = self.walk(base, path)?;
        let node = self.node_mut(id, path)?;
        node.meta.permissions = mode & 0o777;
        node.meta.modified_at = Utc::now();
        Ok(())
    }

    pub fn set_owner(
        &mut self,
        base: NodeId,
        path: &str,
        owner: &str,
        group: Option<&str>,
    ) -> Result<(), VfsError> {
        let id = self.walk(base, path)?;
        let node = self.node_mut(id, path)?;
        node.meta.owner = owner.to_string();
        if let Some(group) = group {
            node.meta.group = group.to_string();
        }
        node.meta.modified_at = Utc::now();
        Ok(())
    }

    /// Serialize the whole tree, depth first from the root.
    pub fn snapshot(&self) -> NodeRecord {
        // The root is never detached.
        self.record_of(&self.nodes[&self.root])
    }

    /// Rebuild a tree from a snapshot. Fresh ids are assigned.
    pub fn restore(record: &NodeRecord) -> Result<Self, VfsError> {
        if !record.is_directory {
            return Err(VfsError::NotADirectory("/".to_string()));
        }
        let mut tree = Self::new();
        let root = tree.root;
        if let Some(node) = tree.nodes.get_mut(&root) {
            node.meta = record_meta(record);
        }
        for child in &record.children {
            tree.restore_into(root, child)?;
        }
        Ok(tree)
    }

    fn restore_into(&mut self, parent: NodeId, record: &NodeRecord) -> Result<(), VfsError> {
        if !valid_leaf(&record.name) {
            return Err(VfsError::InvalidPath(record.name.clone()));
        }
        if self.child_of(parent, &record.name).is_some() {
            let dir = self.path_of(parent).unwrap_or_default();
            return Err(VfsError::AlreadyExists(format!(
                "{}/{}",
                dir.trim_end_matches('/'),
                record.name
            )));
        }
        let kind = if record.is_directory {
            NodeKind::Directory {
                children: BTreeMap::new(),
            }
        } else {
            NodeKind::File {
                content: record.content.clone(),
            }
        };
        let id = self.attach(parent, record.name.clone(), kind, record_meta(record));
        if record.is_directory {
            for child in &record.children {
                self.restore_into(id, child)?;
            }
        }
        Ok(())
    }

    fn record_of(&self, node: &FileNode) -> NodeRecord {
        NodeRecord {
            name: node.name.clone(),
            is_directory: node.is_dir(),
            permissions: node.meta.permissions,
            owner: node.meta.owner.clone(),
            group: node.meta.group.clone(),
            size: node.meta.size,
            created_at: node.meta.created_at,
            modified_at: node.meta.modified_at,
            content: node.content().unwrap_or_default().to_string(),
            children: node
                .children()
                .map(|c| {
                    c.values()
                        .filter_map(|child| self.nodes.get(child))
                        .map(|child| self.record_of(child))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn put_file(
        &mut self,
        base: NodeId,
        path: &str,
        owner: &str,
        update: impl FnOnce(&mut String),
    ) -> Result<NodeId, VfsError> {
        let (parent, leaf) = self.split_parent(base, path)?;
        let id = match self.child_of(parent, &leaf) {
            Some(id) => id,
            None => self.attach(
                parent,
                leaf,
                NodeKind::File {
                    content: String::new(),
                },
                Metadata::new(FILE_MODE, owner),
            ),
        };
        let node = self.node_mut(id, path)?;
        match &mut node.kind {
            NodeKind::File { content } => {
                update(content);
                node.meta.size = content.len() as u64;
                node.meta.modified_at = Utc::now();
                Ok(id)
            }
            NodeKind::Directory { .. } => Err(VfsError::IsADirectory(path.to_string())),
        }
    }

    /// Split `path` into its resolved parent directory and leaf name.
    fn split_parent(&self, base: NodeId, path: &str) -> Result<(NodeId, String), VfsError> {
        let trimmed = path.trim_end_matches('/');
        let (dir, leaf) = match trimmed.rfind('/') {
            Some(0) => ("/", &trimmed[1..]),
            Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
            None => (".", trimmed),
        };
        if !valid_leaf(leaf) {
            return Err(VfsError::InvalidPath(path.to_string()));
        }
        let parent = self.walk(base, dir).map_err(|e| match e {
            VfsError::NotADirectory(_) => VfsError::NotADirectory(path.to_string()),
            _ => VfsError::NotFound(path.to_string()),
        })?;
        if !self.node(parent, path)?.is_dir() {
            return Err(VfsError::NotADirectory(path.to_string()));
        }
        Ok((parent, leaf.to_string()))
    }

    fn child_of(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes.get(&parent).and_then(|p| p.child(name))
    }

    fn attach(&mut self, parent: NodeId, name: String, kind: NodeKind, meta: Metadata) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        if let Some(NodeKind::Directory { children }) =
            self.nodes.get_mut(&parent).map(|p| &mut p.kind)
        {
            children.insert(name.clone(), id);
        }
        self.nodes.insert(
            id,
            FileNode {
                name,
                parent: Some(parent),
                kind,
                meta,
            },
        );
        id
    }

    /// Unlink `id` from its parent and drop it with all descendants.
    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let (name, parent) = (node.name.clone(), node.parent);
        if let Some(NodeKind::Directory { children }) =
            parent.and_then(|p| self.nodes.get_mut(&p)).map(|p| &mut p.kind)
        {
            children.remove(&name);
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&next) {
                if let Some(children) = removed.children() {
                    pending.extend(children.values().copied());
                }
            }
        }
    }

    fn node(&self, id: NodeId, path: &str) -> Result<&FileNode, VfsError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    fn node_mut(&mut self, id: NodeId, path: &str) -> Result<&mut FileNode, VfsError> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }
}

fn valid_leaf(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

fn record_meta(record: &NodeRecord) -> Metadata {
    Metadata {
        size: record.size,
        created_at: record.created_at,
        modified_at: record.modified_at,
        permissions: record.permissions,
        owner: record.owner.clone(),
        group: record.group.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.make_directory(root, "/etc", "root").unwrap();
        tree.make_directory(root, "/home", "root").unwrap();
        tree.make_directory(root, "/home/guest", "guest").unwrap();
        tree.write_file(root, "/etc/motd", "hello\n", "root").unwrap();
        tree
    }

    #[test]
    fn root_resolves_from_anywhere() {
        let tree = sample();
        let guest = tree.resolve(tree.root(), "/home/guest").unwrap();
        assert_eq!(tree.resolve(guest, "/"), Some(tree.root()));
        assert_eq!(tree.path_of(tree.root()).as_deref(), Some("/"));
    }

    #[test]
    fn relative_resolution_walks_segments() {
        let tree = sample();
        let home = tree.resolve(tree.root(), "/home").unwrap();
        let guest = tree.resolve(home, "guest").unwrap();
        assert_eq!(tree.path_of(guest).as_deref(), Some("/home/guest"));
        assert_eq!(tree.resolve(guest, "../..//./etc/motd"), tree.resolve(home, "/etc/motd"));
        assert_eq!(tree.resolve(tree.root(), "../../.."), Some(tree.root()));
        assert!(tree.resolve(home, "nobody").is_none());
    }

    #[test]
    fn mkdir_reports_each_failure() {
        let mut tree = sample();
        let root = tree.root();
        assert_eq!(
            tree.make_directory(root, "/etc", "root"),
            Err(VfsError::AlreadyExists("/etc".into()))
        );
        assert_eq!(
            tree.make_directory(root, "/a/b", "root"),
            Err(VfsError::NotFound("/a/b".into()))
        );
        assert_eq!(
            tree.make_directory(root, "/etc/motd/x", "root"),
            Err(VfsError::NotADirectory("/etc/motd/x".into()))
        );
        assert!(tree.resolve(root, "/a").is_none(), "ancestors are never created");
    }

    #[test]
    fn write_overwrites_in_place() {
        let mut tree = sample();
        let root = tree.root();
        let first = tree.write_file(root, "/etc/motd", "one", "root").unwrap();
        let second = tree.write_file(root, "/etc/motd", "two", "root").unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.read_file(root, "/etc/motd").unwrap(), "two");
        assert_eq!(tree.get(first).unwrap().meta.size, 3);

        tree.append_file(root, "/etc/motd", "!", "root").unwrap();
        assert_eq!(tree.read_file(root, "/etc/motd").unwrap(), "two!");
    }

    #[test]
    fn write_without_parent_fails() {
        let mut tree = sample();
        let root = tree.root();
        assert_eq!(
            tree.write_file(root, "/nope/file", "x", "root"),
            Err(VfsError::NotFound("/nope/file".into()))
        );
        assert_eq!(
            tree.write_file(root, "/etc", "x", "root"),
            Err(VfsError::IsADirectory("/etc".into()))
        );
    }

    #[test]
    fn remove_directory_drops_subtree() {
        let mut tree = sample();
        let root = tree.root();
        let guest = tree.resolve(root, "/home/guest").unwrap();
        tree.write_file(root, "/home/guest/notes", "x", "guest").unwrap();
        let before = tree.node_count();

        tree.remove_directory(root, "/home").unwrap();
        assert!(!tree.contains(guest));
        assert_eq!(tree.node_count(), before - 3);
        assert!(tree.resolve(root, "/home/guest/notes").is_none());
    }

    #[test]
    fn remove_checks_kind_and_root() {
        let mut tree = sample();
        let root = tree.root();
        assert_eq!(tree.remove(root, "/etc"), Err(VfsError::IsADirectory("/etc".into())));
        assert_eq!(
            tree.remove_directory(root, "/etc/motd"),
            Err(VfsError::NotADirectory("/etc/motd".into()))
        );
        assert_eq!(tree.remove_directory(root, "/"), Err(VfsError::InvalidPath("/".into())));
        tree.remove(root, "/etc/motd").unwrap();
        assert!(tree.resolve(root, "/etc/motd").is_none());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut tree = sample();
        let root = tree.root();
        let old = tree.write_file(root, "/tmpfile", "", "root").unwrap();
        tree.remove(root, "/tmpfile").unwrap();
        let new = tree.write_file(root, "/tmpfile", "", "root").unwrap();
        assert_ne!(old, new);
        assert!(tree.get(old).is_none());
    }

    #[test]
    fn touch_creates_then_keeps_content() {
        let mut tree = sample();
        let root = tree.root();
        tree.touch(root, "/etc/new", "guest").unwrap();
        assert_eq!(tree.read_file(root, "/etc/new").unwrap(), "");
        assert_eq!(tree.stat(root, "/etc/new").unwrap().owner, "guest");
        tree.touch(root, "/etc/motd", "guest").unwrap();
        assert_eq!(tree.read_file(root, "/etc/motd").unwrap(), "hello\n");
    }

    #[test]
    fn list_is_sorted() {
        let tree = sample();
        let names: Vec<_> = tree
            .list(tree.root(), "/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["etc", "home"]);
    }

    #[test]
    fn snapshot_round_trip_preserves_metadata() {
        let mut tree = sample();
        let root = tree.root();
        tree.set_permissions(root, "/etc/motd", 0o600).unwrap();
        tree.set_owner(root, "/etc/motd", "guest", Some("staff")).unwrap();

        let record = tree.snapshot();
        let restored = Tree::restore(&record).unwrap();
        assert_eq!(restored.snapshot(), record);

        let motd = restored.stat(restored.root(), "/etc/motd").unwrap();
        assert_eq!(motd.permissions, 0o600);
        assert_eq!(motd.owner, "guest");
        assert_eq!(motd.group, "staff");

        let guest = restored.resolve(restored.root(), "/home/guest").unwrap();
        let parent = restored.get(guest).unwrap().parent.unwrap();
        assert_eq!(restored.path_of(parent).as_deref(), Some("/home"));
    }

    #[test]
    fn restore_rejects_file_root() {
        let mut record = Tree::new().snapshot();
        record.is_directory = false;
        assert!(Tree::restore(&record).is_err());
    }

    #[test]
    fn restore_rejects_duplicate_siblings() {
        let mut record = sample().snapshot();
        let etc = record.children[0].clone();
        record.children.push(etc);
        assert_eq!(
            Tree::restore(&record).unwrap_err(),
            VfsError::AlreadyExists("/etc".into())
        );

        let mut record = sample().snapshot();
        let home = &mut record.children[1];
        let guest = home.children[0].clone();
        home.children.push(guest);
        assert_eq!(
            Tree::restore(&record).unwrap_err(),
            VfsError::AlreadyExists("/home/guest".into())
        );
    }
}
