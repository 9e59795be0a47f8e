//! pwd — Print working directory.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, Tool, ToolArgs, ToolSchema};

pub struct Pwd;

#[async_trait]
impl Tool for Pwd {
    fn name(&self) -> &str {
        "pwd"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("pwd", "Print the current working directory")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        ExecResult::success(format!("{}\n", ctx.session.cwd_path().await))
    }
}

#[cfg(test)]
mod tests {
    use crate::tools::test_support::{make_ctx, run};

    #[tokio::test]
    async fn prints_cwd() {
        let mut ctx = make_ctx();
        assert_eq!(run(&mut ctx, "pwd", &[]).await.out, "/\n");
        run(&mut ctx, "cd", &["/etc"]).await;
        assert_eq!(run(&mut ctx, "pwd", &[]).await.out, "/etc\n");
    }
}
