//! touch — Create empty files or bump modification times.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

pub struct Touch;

#[async_trait]
impl Tool for Touch {
    fn name(&self) -> &str {
        "touch"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("touch", "Create empty files or update modification times")
            .param(ParamSchema::required("path", "Files to touch").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        if args.positional.is_empty() {
            return ExecResult::failure(1, "touch: missing file operand");
        }
        let cwd = ctx.cwd().await;
        let owner = ctx.user().await;
        let mut err = String::new();
        for path in &args.positional {
            if let Err(e) = ctx.session.vfs.touch(cwd, path, &owner).await {
                err.push_str(&format!("touch: cannot touch '{}': {}\n", path, e.reason()));
            }
        }
        ExecResult::from_output(if err.is_empty() { 0 } else { 1 }, "", err)
    }
}
