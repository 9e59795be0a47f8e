//! rm — Remove files.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Rm tool: remove files. Directories go through `rmdir`.
pub struct Rm;

#[async_trait]
impl Tool for Rm {
    fn name(&self) -> &str {
        "rm"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("rm", "Remove files")
            .param(ParamSchema::required("path", "Files to remove").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        if args.positional.is_empty() {
            return ExecResult::failure(1, "rm: missing operand");
        }
        let cwd = ctx.cwd().await;
        let mut err = String::new();
        for path in &args.positional {
            if let Err(e) = ctx.session.vfs.remove(cwd, path).await {
                err.push_str(&format!("rm: cannot remove '{}': {}\n", path, e.reason()));
            }
        }
        ExecResult::from_output(if err.is_empty() { 0 } else { 1 }, "", err)
    }
}
