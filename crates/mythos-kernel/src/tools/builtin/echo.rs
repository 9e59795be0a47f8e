//! echo — Print arguments to stdout.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Echo tool: prints its arguments separated by spaces.
pub struct Echo;

#[async_trait]
impl Tool for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("echo", "Print arguments to standard output")
            .param(ParamSchema::optional("text", "Words to print").many())
    }

    async fn execute(&self, args: ToolArgs, _ctx: &mut ExecContext) -> ExecResult {
        ExecResult::success(format!("{}\n", args.positional.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use crate::tools::test_support::{make_ctx, run};

    #[tokio::test]
    async fn joins_with_spaces() {
        let mut ctx = make_ctx();
        assert_eq!(run(&mut ctx, "echo", &["hello", "a b"]).await.out, "hello a b\n");
        assert_eq!(run(&mut ctx, "echo", &[]).await.out, "\n");
        assert_eq!(run(&mut ctx, "echo", &["-n"]).await.out, "-n\n");
    }
}
