//! ls — List directory contents.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};
use crate::vfs::DirEntry;

/// Ls tool: list directory contents.
pub struct Ls;

#[async_trait]
impl Tool for Ls {
    fn name(&self) -> &str {
        "ls"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("ls", "List directory contents")
            .flag('l', "Use long format with mode, owner, size and time")
            .param(ParamSchema::optional("path", "Paths to list (default: .)").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let long = args.has_flag('l');
        let paths = if args.positional.is_empty() {
            vec![".".to_string()]
        } else {
            args.positional.clone()
        };
        let with_headers = paths.len() > 1;

        let cwd = ctx.cwd().await;
        let vfs = &ctx.session.vfs;
        let mut out = String::new();
        let mut err = String::new();
        let mut code = 0;

        for path in &paths {
            let entries = match vfs.list(cwd, path).await {
                Ok(entries) => entries,
                Err(e) => {
                    err.push_str(&format!("ls: cannot access '{}': {}\n", path, e.reason()));
                    code = 1;
                    continue;
                }
            };
            let is_dir = vfs.stat(cwd, path).await.map(|e| e.is_dir()).unwrap_or(false);
            if with_headers && is_dir {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&format!("{}:\n", path));
            }
            for entry in &entries {
                let line = if long {
                    long_line(entry)
                } else if entry.is_dir() {
                    format!("{}/", entry.name)
                } else {
                    entry.name.clone()
                };
                out.push_str(&line);
                out.push('\n');
            }
        }

        ExecResult::from_output(code, out, err)
    }
}

fn long_line(entry: &DirEntry) -> String {
    format!(
        "{} {:<8} {:<8} {:>6} {} {}",
        entry.mode_string(),
        entry.owner,
        entry.group,
        entry.size,
        entry.modified.format("%b %e %H:%M"),
        entry.name
    )
}
