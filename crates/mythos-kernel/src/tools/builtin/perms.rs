//! chmod / chown — Change node permissions and ownership.
//!
//! Permission bits are recorded and displayed but not enforced.

use async_trait::async_trait;

use crate::interpreter::ExecResult;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

pub struct Chmod;

#[async_trait]
impl Tool for Chmod {
    fn name(&self) -> &str {
        "chmod"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("chmod", "Change permission bits (octal)")
            .param(ParamSchema::required("mode", "Octal mode, e.g. 755"))
            .param(ParamSchema::required("path", "Nodes to change").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let (Some(mode), true) = (args.get(0), args.positional.len() >= 2) else {
            return ExecResult::failure(1, format!("usage: {}", self.schema().usage()));
        };
        let mode = match u32::from_str_radix(mode, 8) {
            Ok(bits) if bits <= 0o777 => bits,
            _ => return ExecResult::failure(1, format!("chmod: invalid mode: '{}'", mode)),
        };

        let cwd = ctx.cwd().await;
        let mut err = String::new();
        for path in &args.positional[1..] {
            if let Err(e) = ctx.session.vfs.set_permissions(cwd, path, mode).await {
                err.push_str(&format!("chmod: cannot access '{}': {}\n", path, e.reason()));
            }
        }
        ExecResult::from_output(if err.is_empty() { 0 } else { 1 }, "", err)
    }
}

pub struct Chown;

#[async_trait]
impl Tool for Chown {
    fn name(&self) -> &str {
        "chown"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("chown", "Change owner and group")
            .param(ParamSchema::required("owner[:group]", "New owner, optionally with group"))
            .param(ParamSchema::required("path", "Nodes to change").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let (Some(spec), true) = (args.get(0), args.positional.len() >= 2) else {
            return ExecResult::failure(1, format!("usage: {}", self.schema().usage()));
        };
        let (owner, group) = match spec.split_once(':') {
            Some((owner, group)) => (owner, Some(group).filter(|g| !g.is_empty())),
            None => (spec, None),
        };
        if ctx.session.identities().await.lookup(owner).is_none() {
            return ExecResult::failure(1, format!("chown: invalid user: '{}'", owner));
        }

        let cwd = ctx.cwd().await;
        let mut err = String::new();
        for path in &args.positional[1..] {
            if let Err(e) = ctx.session.vfs.set_owner(cwd, path, owner, group).await {
                err.push_str(&format!("chown: cannot access '{}': {}\n", path, e.reason()));
            }
        }
        ExecResult::from_output(if err.is_empty() { 0 } else { 1 }, "", err)
    }
}
