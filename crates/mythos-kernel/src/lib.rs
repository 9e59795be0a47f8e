//! mythos-kernel: the core of mythOS.
//!
//! mythOS is a simulated operating system that lives entirely in memory:
//! a hierarchical filesystem, a small set of users, a process table and a
//! shell that ties them together.
//!
//! This crate provides:
//!
//! - **VFS**: Arena-backed file tree with permissions, ownership and JSON snapshots
//! - **Identity**: Users loaded from `/etc/passwd`, `su` and home directories
//! - **Scheduler**: Process table with watch-based waiting and kill
//! - **Lexer/Parser**: Quote-aware tokenizing, `|` stages, redirects and `&`
//! - **Tools**: The builtin command set
//! - **Kernel**: Line dispatch, `#!mythos` scripts and output routing
//!
//! Everything hangs off a [`session::Session`]; a [`Kernel`] owns one.

pub mod ast;
pub mod error;
pub mod identity;
pub mod interpreter;
pub mod kernel;
pub mod lexer;
pub mod parser;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod tools;
pub mod vfs;

pub use interpreter::ExecResult;
pub use kernel::{Kernel, KernelConfig};

/// Operating system name shown in the banner and `fetch`.
pub const OS_NAME: &str = "mythOS";

/// Operating system release.
pub const OS_VERSION: &str = "1.5.1";
