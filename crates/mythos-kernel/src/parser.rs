//! Line parser: pipeline splitting, redirection, backgrounding.
//!
//! ```text
//! line     := stage ('|' stage)*
//! stage    := word* (redirect word)* [' &']
//! redirect := '>' | '>>' | '<'
//! ```
//!
//! `|` only splits at nesting depth zero, where depth counts `()`, `{}` and
//! `[]`. Quotes do not protect a `|`.

use crate::ast::{Command, Pipeline, Redirect};
use crate::lexer::tokenize;

/// Split a line into stages on top-level `|`. Stages are trimmed; empty
/// stages are kept so callers can decide what they mean.
pub fn split_pipeline(line: &str) -> Vec<String> {
    let mut stages = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;

    for c in line.chars() {
        match c {
            '(' | '{' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | '}' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            '|' if depth == 0 => {
                stages.push(current.trim().to_string());
                current.clear();
            }
            c => current.push(c),
        }
    }
    stages.push(current.trim().to_string());
    stages
}

/// Parse one stage. Returns `None` when the stage names no command.
pub fn parse_command(stage: &str) -> Option<Command> {
    let raw = stage.trim();
    let background = raw.ends_with(" &");
    let body = if background {
        raw[..raw.len() - 2].trim()
    } else {
        raw
    };

    let mut name = None;
    let mut args = Vec::new();
    let mut input = None;
    let mut output = None;

    let mut tokens = tokenize(body).into_iter();
    while let Some(token) = tokens.next() {
        match token.as_str() {
            ">" | ">>" => {
                let append = token == ">>";
                if let Some(path) = tokens.next() {
                    output = Some(Redirect { path, append });
                }
            }
            "<" => {
                if let Some(path) = tokens.next() {
                    input = Some(path);
                }
            }
            _ if name.is_none() => name = Some(token),
            _ => args.push(token),
        }
    }

    Some(Command {
        name: name?,
        args,
        input,
        output,
        background,
        raw: raw.to_string(),
    })
}

/// Parse a whole line. Stages without a command are dropped.
pub fn parse(line: &str) -> Pipeline {
    Pipeline {
        stages: split_pipeline(line)
            .iter()
            .filter_map(|stage| parse_command(stage))
            .collect(),
    }
}
