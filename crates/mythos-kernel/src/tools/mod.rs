//! Builtin commands.
//!
//! Every builtin implements [`Tool`] and runs on the shell's own control
//! flow, against the session passed in through [`ExecContext`].

mod builtin;
mod context;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use context::ExecContext;
pub use registry::ToolRegistry;
pub use traits::{ParamSchema, Tool, ToolArgs, ToolSchema};
