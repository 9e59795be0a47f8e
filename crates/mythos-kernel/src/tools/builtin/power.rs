//! exit / reboot / shutdown — Session lifecycle.
//!
//! These only record what should happen; the front end decides how to leave.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::kernel::banner;
use crate::session::ExitRequest;
use crate::tools::{ExecContext, Tool, ToolArgs, ToolSchema};

pub struct Exit;

#[async_trait]
impl Tool for Exit {
    fn name(&self) -> &str {
        "exit"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("exit", "Leave the session without saving")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        ctx.session.request_exit(ExitRequest::Exit).await;
        ExecResult::success("")
    }
}

pub struct Reboot;

#[async_trait]
impl Tool for Reboot {
    fn name(&self) -> &str {
        "reboot"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("reboot", "Save the filesystem and restart")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let out = format!("\nRebooting…\n{}", banner());
        match ctx.session.reboot().await {
            Ok(()) => ExecResult::success(out),
            Err(e) => ExecResult::from_output(1, out, format!("reboot: {:#}\n", e)),
        }
    }
}

pub struct Shutdown;

#[async_trait]
impl Tool for Shutdown {
    fn name(&self) -> &str {
        "shutdown"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("shutdown", "Save the filesystem and power off")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let out = "\nShutting down mythOS…\n";
        ctx.session.request_exit(ExitRequest::Shutdown).await;
        match ctx.session.save().await {
            Ok(_) => ExecResult::success(out),
            Err(e) => ExecResult::from_output(1, out, format!("shutdown: {:#}\n", e)),
        }
    }
}
