//! Parsed shell lines.

use std::fmt;

/// Output redirection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    /// `>>` rather than `>`.
    pub append: bool,
}

/// One pipeline stage after tokenizing and redirection handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
    /// File named by `<`.
    pub input: Option<String>,
    /// File named by `>` or `>>`.
    pub output: Option<Redirect>,
    /// Stage ended in ` &`.
    pub background: bool,
    /// The stage as typed, background marker included.
    pub raw: String,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A whole input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Command>,
}

impl Pipeline {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Index of the stage the shell waits on: the final stage, unless it
    /// was sent to the background.
    pub fn foreground_index(&self) -> Option<usize> {
        match self.stages.last() {
            Some(last) if !last.background => Some(self.stages.len() - 1),
            _ => None,
        }
    }
}
