//! ExecResult — the structured result of every command execution.

/// The result of executing a builtin, a script, or a whole line.
///
/// - `code` — exit code (0 = success)
/// - `out` — text for the terminal (or a redirect target)
/// - `err` — diagnostics, always shown on the terminal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i32,
    pub out: String,
    pub err: String,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
        }
    }

    /// Create a failed result with an error message.
    ///
    /// A trailing newline is added if missing so messages stack cleanly on
    /// the console.
    pub fn failure(code: i32, err: impl Into<String>) -> Self {
        let mut err = err.into();
        if !err.is_empty() && !err.ends_with('\n') {
            err.push('\n');
        }
        Self {
            code,
            out: String::new(),
            err,
        }
    }

    /// Create a result from raw output streams.
    pub fn from_output(code: i32, out: impl Into<String>, err: impl Into<String>) -> Self {
        Self {
            code,
            out: out.into(),
            err: err.into(),
        }
    }

    /// True if the command succeeded (exit code 0).
    pub fn ok(&self) -> bool {
        self.code == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_terminates_message() {
        let result = ExecResult::failure(1, "cd: /nope: No such file or directory");
        assert!(!result.ok());
        assert_eq!(result.err, "cd: /nope: No such file or directory\n");
        assert_eq!(ExecResult::failure(2, "").err, "");
    }

    #[test]
    fn default_is_success() {
        let result = ExecResult::default();
        assert!(result.ok());
        assert!(result.out.is_empty());
    }
}
