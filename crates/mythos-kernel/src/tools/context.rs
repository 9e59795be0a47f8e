//! Execution context for tools.

use std::sync::Arc;

use crate::error::VfsError;
use crate::session::Session;
use crate::vfs::NodeId;

use super::ToolSchema;

/// Execution context passed to tools.
///
/// Provides access to the session (filesystem, identities, processes) and
/// the stage's redirected input.
pub struct ExecContext {
    pub session: Arc<Session>,
    /// Standard input for the tool (from `<`).
    pub stdin: Option<String>,
    /// Schemas of every registered tool, for `help`.
    pub tool_schemas: Vec<ToolSchema>,
}

impl ExecContext {
    /// Create a new execution context.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            stdin: None,
            tool_schemas: Vec::new(),
        }
    }

    /// Set stdin for this execution.
    pub fn set_stdin(&mut self, stdin: String) {
        self.stdin = Some(stdin);
    }

    /// Get stdin, consuming it.
    pub fn take_stdin(&mut self) -> Option<String> {
        self.stdin.take()
    }

    pub async fn cwd(&self) -> NodeId {
        self.session.cwd().await
    }

    /// Name of the active user; new nodes are owned by them.
    pub async fn user(&self) -> String {
        self.session.user().await
    }

    pub async fn read_file(&self, path: &str) -> Result<String, VfsError> {
        let cwd = self.cwd().await;
        self.session.vfs.read_file(cwd, path).await
    }
}
