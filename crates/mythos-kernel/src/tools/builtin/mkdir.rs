//! mkdir / rmdir — Create and remove directories.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Create the leaf directory of each operand. Parents are never created.
pub struct Mkdir;

#[async_trait]
impl Tool for Mkdir {
    fn name(&self) -> &str {
        "mkdir"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("mkdir", "Create directories")
            .param(ParamSchema::required("path", "Directories to create").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        if args.positional.is_empty() {
            return ExecResult::failure(1, "mkdir: missing operand");
        }
        let cwd = ctx.cwd().await;
        let owner = ctx.user().await;
        let mut err = String::new();
        for path in &args.positional {
            if let Err(e) = ctx.session.vfs.make_directory(cwd, path, &owner).await {
                err.push_str(&format!("mkdir: '{}': {}\n", path, e.reason()));
            }
        }
        ExecResult::from_output(if err.is_empty() { 0 } else { 1 }, "", err)
    }
}

/// Remove each operand directory along with everything beneath it.
pub struct Rmdir;

#[async_trait]
impl Tool for Rmdir {
    fn name(&self) -> &str {
        "rmdir"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("rmdir", "Remove directories and their contents")
            .param(ParamSchema::required("path", "Directories to remove").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        if args.positional.is_empty() {
            return ExecResult::failure(1, "rmdir: missing operand");
        }
        let cwd = ctx.cwd().await;
        let mut err = String::new();
        for path in &args.positional {
            if let Err(e) = ctx.session.vfs.remove_directory(cwd, path).await {
                err.push_str(&format!("rmdir: '{}': {}\n", path, e.reason()));
            }
        }
        ExecResult::from_output(if err.is_empty() { 0 } else { 1 }, "", err)
    }
}
