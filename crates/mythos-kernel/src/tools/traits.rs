//! The Tool trait and its argument/schema types.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::ExecContext;
use crate::interpreter::ExecResult;

/// A positional parameter in a tool's usage line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSchema {
    pub name: String,
    pub description: String,
    pub required: bool,
    /// Accepts any number of values.
    pub variadic: bool,
}

impl ParamSchema {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
            variadic: false,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    /// Mark the parameter as repeatable.
    pub fn many(mut self) -> Self {
        self.variadic = true;
        self
    }
}

/// Describes a tool for `help` and for argument parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSchema>,
    /// Single-letter switches (`-l`).
    pub flags: Vec<(char, String)>,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            flags: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSchema) -> Self {
        self.params.push(param);
        self
    }

    pub fn flag(mut self, flag: char, description: impl Into<String>) -> Self {
        self.flags.push((flag, description.into()));
        self
    }

    /// One-line usage, e.g. `ls [-l] [path...]`.
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        if !self.flags.is_empty() {
            let letters: String = self.flags.iter().map(|(c, _)| *c).collect();
            usage.push_str(&format!(" [-{letters}]"));
        }
        for param in &self.params {
            let dots = if param.variadic { "..." } else { "" };
            if param.required {
                usage.push_str(&format!(" {}{}", param.name, dots));
            } else {
                usage.push_str(&format!(" [{}{}]", param.name, dots));
            }
        }
        usage
    }

    fn accepts_flag(&self, flag: char) -> bool {
        self.flags.iter().any(|(c, _)| *c == flag)
    }
}

/// Arguments after flag extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArgs {
    pub positional: Vec<String>,
    pub flags: BTreeSet<char>,
}

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split words into flags and positionals.
    ///
    /// A word is a flag group only if every letter after the `-` is a flag
    /// the schema declares; anything else (`-9`, `-KILL`, `-`) stays
    /// positional.
    pub fn parse(words: &[String], schema: &ToolSchema) -> Self {
        let mut args = Self::new();
        for word in words {
            let letters = word.strip_prefix('-').filter(|rest| !rest.is_empty());
            match letters {
                Some(rest) if rest.chars().all(|c| schema.accepts_flag(c)) => {
                    args.flags.extend(rest.chars());
                }
                _ => args.positional.push(word.clone()),
            }
        }
        args
    }

    pub fn has_flag(&self, flag: char) -> bool {
        self.flags.contains(&flag)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }
}

/// A builtin command.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> ToolSchema;

    /// Run the tool. Domain failures are reported through the result, never
    /// by ending the session.
    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult;
}
