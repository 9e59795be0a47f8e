//! fetch — System information summary.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, Tool, ToolArgs, ToolSchema};

pub struct Fetch;

#[async_trait]
impl Tool for Fetch {
    fn name(&self) -> &str {
        "fetch"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("fetch", "Show system information")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let session = &ctx.session;
        let title = format!("{}@{}", session.user().await, session.hostname());
        let uptime = session.uptime().num_seconds().max(0);

        let mut out = format!("{}\n{}\n", title, "-".repeat(title.len()));
        out.push_str(&format!("OS: {} {}\n", crate::OS_NAME, crate::OS_VERSION));
        out.push_str(&format!("Kernel: mythos-kernel {}\n", env!("CARGO_PKG_VERSION")));
        out.push_str(&format!(
            "Uptime: {}h {}m {}s\n",
            uptime / 3600,
            (uptime / 60) % 60,
            uptime % 60
        ));
        out.push_str(&format!("Processes: {}\n", session.procs.len().await));
        out.push_str(&format!("Nodes: {}\n", session.vfs.node_count().await));
        out.push_str(&format!("Users: {}\n", session.identities().await.users().count()));
        ExecResult::success(out)
    }
}
