//! Execution results shared by builtins and the kernel.

mod result;

pub use result::ExecResult;
