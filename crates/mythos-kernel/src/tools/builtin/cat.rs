//! cat — Concatenate files.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Cat tool: print files, or stdin when there are no operands.
pub struct Cat;

#[async_trait]
impl Tool for Cat {
    fn name(&self) -> &str {
        "cat"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("cat", "Print file contents")
            .param(ParamSchema::optional("path", "Files to read (default: stdin)").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        if args.positional.is_empty() {
            return ExecResult::success(ctx.take_stdin().unwrap_or_default());
        }

        let mut out = String::new();
        let mut err = String::new();
        for path in &args.positional {
            match ctx.read_file(path).await {
                Ok(content) => out.push_str(&content),
                Err(e) => err.push_str(&format!("cat: {}: {}\n", path, e.reason())),
            }
        }
        ExecResult::from_output(if err.is_empty() { 0 } else { 1 }, out, err)
    }
}

#[cfg(test)]
mod tests {
    use crate::tools::test_support::{make_ctx, run};

    #[tokio::test]
    async fn concatenates() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, "cat", &["/etc/motd", "/etc/motd"]).await;
        assert_eq!(result.out, "Welcome to mythOS\nWelcome to mythOS\n");
    }

    #[tokio::test]
    async fn reads_stdin_without_operands() {
        let mut ctx = make_ctx();
        ctx.set_stdin("piped\n".to_string());
        assert_eq!(run(&mut ctx, "cat", &[]).await.out, "piped\n");
        assert!(ctx.stdin.is_none());
    }

    #[tokio::test]
    async fn directory_and_missing() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, "cat", &["/etc", "/nope"]).await;
        assert_eq!(
            result.err,
            "cat: /etc: Is a directory\ncat: /nope: No such file or directory\n"
        );
    }
}
