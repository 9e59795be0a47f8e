//! cd — Change working directory.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Cd tool: change current working directory.
pub struct Cd;

#[async_trait]
impl Tool for Cd {
    fn name(&self) -> &str {
        "cd"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("cd", "Change current working directory")
            .param(ParamSchema::optional("path", "Directory to change to (default: home)"))
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let path = match args.get(0) {
            Some(path) => path.to_string(),
            None => ctx.session.identities().await.current_home(),
        };

        let cwd = ctx.cwd().await;
        let vfs = &ctx.session.vfs;
        let target = match vfs.resolve(cwd, &path).await {
            Some(id) => id,
            None => return ExecResult::failure(1, format!("cd: {}: No such file or directory", path)),
        };
        match vfs.stat(target, ".").await {
            Ok(entry) if entry.is_dir() => {
                ctx.session.set_cwd(target).await;
                ExecResult::success("")
            }
            _ => ExecResult::failure(1, format!("cd: {}: Not a directory", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tools::test_support::{make_ctx, run};

    #[tokio::test]
    async fn cd_subdir_and_back() {
        let mut ctx = make_ctx();
        assert!(run(&mut ctx, "cd", &["/home/guest"]).await.ok());
        assert_eq!(ctx.session.cwd_path().await, "/home/guest");

        assert!(run(&mut ctx, "cd", &[".."]).await.ok());
        assert_eq!(ctx.session.cwd_path().await, "/home");
    }

    #[tokio::test]
    async fn cd_without_args_goes_home() {
        let mut ctx = make_ctx();
        assert!(run(&mut ctx, "cd", &[]).await.ok());
        assert_eq!(ctx.session.cwd_path().await, "/root");
    }

    #[tokio::test]
    async fn cd_file_fails() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, "cd", &["/etc/motd"]).await;
        assert_eq!(result.err, "cd: /etc/motd: Not a directory\n");
        assert_eq!(ctx.session.cwd_path().await, "/");
    }

    #[tokio::test]
    async fn cd_nonexistent() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, "cd", &["/nonexistent"]).await;
        assert!(!result.ok());
        assert!(result.err.contains("No such file or directory"));
    }
}
