//! User identities.
//!
//! Identities come from `/etc/passwd` inside the virtual filesystem
//! (`name:credential:uid:gid:gecos:home:shell`). A machine without that
//! file gets the two built-in accounts written back to it.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::ShellError;
use crate::vfs::Tree;

/// Where the identity file lives.
pub const PASSWD_PATH: &str = "/etc/passwd";

/// Identity file written when none exists.
pub const DEFAULT_PASSWD: &str = "root::0:0:System Administrator:/root:/bin/sh\n\
guest::1000:1000:Guest User:/home/guest:/bin/sh\n";

/// The user every session starts as.
pub const INITIAL_USER: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub credential: String,
    pub home: String,
}

impl User {
    pub fn new(name: impl Into<String>, credential: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credential: credential.into(),
            home: home.into(),
        }
    }
}

/// Registered users plus the active identity.
#[derive(Debug, Clone)]
pub struct IdentityTable {
    users: BTreeMap<String, User>,
    current: String,
}

impl Default for IdentityTable {
    fn default() -> Self {
        let mut users = BTreeMap::new();
        for user in [User::new("root", "", "/root"), User::new("guest", "", "/home/guest")] {
            users.insert(user.name.clone(), user);
        }
        Self {
            users,
            current: INITIAL_USER.to_string(),
        }
    }
}

impl IdentityTable {
    /// Build the table for a booting machine.
    ///
    /// Reads `/etc/passwd` (or writes the default one), then creates any
    /// missing home directory plus `/root`.
    pub fn boot(tree: &mut Tree) -> Self {
        let mut table = Self::default();
        let root = tree.root();

        match tree.read_file(root, PASSWD_PATH) {
            Ok(text) => {
                for user in parse_passwd(&text) {
                    table.register(user);
                }
            }
            Err(_) => {
                if let Err(e) = tree.write_file(root, PASSWD_PATH, DEFAULT_PASSWD, "root") {
                    warn!("could not write {}: {}", PASSWD_PATH, e);
                }
            }
        }

        for user in table.users.values() {
            if tree.resolve(root, &user.home).is_none() {
                match tree.make_directory(root, &user.home, &user.name) {
                    Ok(_) => debug!("created home {} for {}", user.home, user.name),
                    Err(e) => warn!("home for {}: {}", user.name, e),
                }
            }
        }
        if tree.resolve(root, "/root").is_none() {
            if let Err(e) = tree.make_directory(root, "/root", "root") {
                warn!("/root: {}", e);
            }
        }
        table
    }

    /// Add or replace a user.
    pub fn register(&mut self, user: User) {
        self.users.insert(user.name.clone(), user);
    }

    pub fn lookup(&self, name: &str) -> Option<&User> {
        self.users.get(name)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Name of the active identity.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Home directory of the active identity.
    pub fn current_home(&self) -> String {
        self.home_of(&self.current)
    }

    pub fn home_of(&self, name: &str) -> String {
        self.users
            .get(name)
            .map(|u| u.home.clone())
            .unwrap_or_else(|| format!("/home/{name}"))
    }

    /// Make `name` the active identity. Returns its home path.
    pub fn switch_user(&mut self, name: &str) -> Result<String, ShellError> {
        let home = self
            .users
            .get(name)
            .map(|u| u.home.clone())
            .ok_or_else(|| ShellError::UnknownUser(name.to_string()))?;
        self.current = name.to_string();
        Ok(home)
    }
}

/// Parse passwd lines. Blank lines and `#` comments are skipped; lines with
/// fewer than three fields are ignored.
pub fn parse_passwd(text: &str) -> Vec<User> {
    text.lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() < 3 {
                return None;
            }
            let name = fields[0];
            let home = if fields.len() >= 6 {
                fields[5].to_string()
            } else {
                format!("/home/{name}")
            };
            Some(User::new(name, fields[1], home))
        })
        .collect()
}
