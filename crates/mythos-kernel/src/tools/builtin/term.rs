//! clear / help — Terminal housekeeping.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, Tool, ToolArgs, ToolSchema};

/// ANSI: cursor home, then erase the screen.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

pub struct Clear;

#[async_trait]
impl Tool for Clear {
    fn name(&self) -> &str {
        "clear"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("clear", "Clear the terminal")
    }

    async fn execute(&self, _args: ToolArgs, _ctx: &mut ExecContext) -> ExecResult {
        ExecResult::success(CLEAR_SCREEN)
    }
}

pub struct Help;

#[async_trait]
impl Tool for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("help", "Show available commands")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let width = ctx
            .tool_schemas
            .iter()
            .map(|s| s.usage().len())
            .max()
            .unwrap_or(0);
        let mut out = String::from("Builtin commands:\n");
        for schema in &ctx.tool_schemas {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                schema.usage(),
                schema.description,
                width = width
            ));
        }
        out.push_str("\nAnything else runs as a script from /bin (first line: #!mythos).\n");
        out.push_str("Stages: a | b   Redirects: > file  >> file  < file   Background: cmd &\n");
        ExecResult::success(out)
    }
}
