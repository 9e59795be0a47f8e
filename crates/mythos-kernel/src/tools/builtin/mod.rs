//! Built-in commands for mythOS.
//!
//! These run synchronously on the shell's control flow and can't be sent
//! to the background.

mod cat;
mod cd;
mod echo;
mod fetch;
mod ls;
mod mkdir;
mod perms;
mod power;
mod procs;
mod pwd;
mod rm;
mod sleep;
mod term;
mod touch;
mod users;

use super::ToolRegistry;

/// Register all built-in tools with the registry.
pub fn register_builtins(registry: &mut ToolRegistry) {
    // Filesystem
    registry.register(ls::Ls);
    registry.register(cd::Cd);
    registry.register(pwd::Pwd);
    registry.register(mkdir::Mkdir);
    registry.register(mkdir::Rmdir);
    registry.register(touch::Touch);
    registry.register(rm::Rm);
    registry.register(cat::Cat);
    registry.register(echo::Echo);
    registry.register(perms::Chmod);
    registry.register(perms::Chown);

    // Identity
    registry.register(users::Su);
    registry.register(users::Whoami);

    // Processes
    registry.register(procs::Ps);
    registry.register(procs::Kill);
    registry.register(sleep::Sleep);

    // Terminal and power
    registry.register(term::Clear);
    registry.register(term::Help);
    registry.register(power::Exit);
    registry.register(power::Reboot);
    registry.register(power::Shutdown);
    registry.register(fetch::Fetch);
}
