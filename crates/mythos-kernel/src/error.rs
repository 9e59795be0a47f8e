//! Domain errors for the filesystem and the shell.
//!
//! Builtins never propagate these; they render them into `ExecResult`
//! messages. They exist so the VFS and kernel can report precise failures
//! to callers and tests.

use thiserror::Error;

/// Failures from virtual filesystem operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VfsError {
    #[error("{0}: No such file or directory")]
    NotFound(String),

    #[error("{0}: Not a directory")]
    NotADirectory(String),

    #[error("{0}: Is a directory")]
    IsADirectory(String),

    #[error("{0}: File exists")]
    AlreadyExists(String),

    #[error("{0}: Invalid path")]
    InvalidPath(String),
}

impl VfsError {
    /// The path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            VfsError::NotFound(p)
            | VfsError::NotADirectory(p)
            | VfsError::IsADirectory(p)
            | VfsError::AlreadyExists(p)
            | VfsError::InvalidPath(p) => p,
        }
    }

    /// The message without the path, e.g. `File exists`.
    pub fn reason(&self) -> &'static str {
        match self {
            VfsError::NotFound(_) => "No such file or directory",
            VfsError::NotADirectory(_) => "Not a directory",
            VfsError::IsADirectory(_) => "Is a directory",
            VfsError::AlreadyExists(_) => "File exists",
            VfsError::InvalidPath(_) => "Invalid path",
        }
    }
}

/// Failures surfaced while dispatching a shell line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("su: user '{0}' does not exist")]
    UnknownUser(String),

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{0}: not a mythOS script")]
    ScriptNotExecutable(String),

    #[error("{name}: maximum script depth ({depth}) exceeded")]
    RecursionLimit { name: String, depth: usize },

    #[error("Background not allowed for builtin: {0}")]
    BackgroundBuiltin(String),

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl ShellError {
    /// Exit code reported for a stage that failed with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::CommandNotFound(_) => 127,
            ShellError::ScriptNotExecutable(_) => 126,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_console_wording() {
        assert_eq!(
            VfsError::AlreadyExists("/tmp".into()).to_string(),
            "/tmp: File exists"
        );
        assert_eq!(
            ShellError::UnknownUser("bob".into()).to_string(),
            "su: user 'bob' does not exist"
        );
        assert_eq!(
            ShellError::CommandNotFound("frob".into()).to_string(),
            "frob: command not found"
        );
    }

    #[test]
    fn vfs_errors_convert() {
        let err: ShellError = VfsError::NotFound("/x".into()).into();
        assert_eq!(err.to_string(), "/x: No such file or directory");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(ShellError::CommandNotFound("x".into()).exit_code(), 127);
    }
}
