//! su / whoami — Identity switching.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Switch the active identity. No credential check is made.
pub struct Su;

#[async_trait]
impl Tool for Su {
    fn name(&self) -> &str {
        "su"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("su", "Switch user").param(ParamSchema::required("user", "User to become"))
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let Some(user) = args.get(0) else {
            return ExecResult::failure(1, format!("usage: {}", self.schema().usage()));
        };
        match ctx.session.switch_user(user).await {
            Ok(()) => ExecResult::success(format!("Switched to {}\n", user)),
            Err(e) => ExecResult::failure(1, e.to_string()),
        }
    }
}

pub struct Whoami;

#[async_trait]
impl Tool for Whoami {
    fn name(&self) -> &str {
        "whoami"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("whoami", "Print the active user")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        ExecResult::success(format!("{}\n", ctx.user().await))
    }
}
