//! mythOS REPL: the interactive console.
//!
//! Boots a [`Kernel`], shows the banner and feeds each line typed at the
//! prompt to it. Output from scripts nobody waited on is printed before the
//! next prompt. The loop ends on `exit`, `shutdown`, Ctrl-D or a fatal
//! terminal error.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use mythos_kernel::kernel::banner;
use mythos_kernel::session::ExitRequest;
use mythos_kernel::state::paths;
use mythos_kernel::{ExecResult, Kernel, KernelConfig};

/// REPL state: a booted machine and the runtime that drives it.
pub struct Repl {
    kernel: Kernel,
    runtime: Runtime,
}

impl Repl {
    /// Boot a machine with `config`.
    pub fn new(config: KernelConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to start runtime")?;
        let kernel = Kernel::new(config).context("Failed to boot kernel")?;
        Ok(Self { kernel, runtime })
    }

    /// A throwaway machine.
    pub fn transient() -> Result<Self> {
        Self::new(KernelConfig::transient())
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Run one line and return its result.
    pub fn execute(&self, line: &str) -> Result<ExecResult> {
        self.runtime.block_on(self.kernel.execute(line))
    }

    /// Run one line and return everything it printed, if anything.
    ///
    /// Blank lines are skipped without touching the kernel.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let result = self.execute(trimmed)?;
        let mut output = result.out;
        output.push_str(&result.err);
        let output = output.trim_end_matches('\n');
        if output.is_empty() {
            Ok(None)
        } else {
            Ok(Some(output.to_string()))
        }
    }

    pub fn prompt(&self) -> String {
        self.runtime.block_on(self.kernel.prompt())
    }

    /// Output from unawaited scripts since the last call.
    pub fn drain_console(&self) -> String {
        self.runtime.block_on(self.kernel.drain_console())
    }

    pub fn exit_requested(&self) -> Option<ExitRequest> {
        self.runtime.block_on(self.kernel.exit_requested())
    }
}

/// Run each line of `script` non-interactively. Returns the exit code of
/// the last line that ran.
pub fn run_command(config: KernelConfig, script: &str) -> Result<i32> {
    let repl = Repl::new(config)?;
    for warning in repl.kernel.boot_warnings() {
        eprintln!("{}", warning);
    }

    let mut code = 0;
    for line in script.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if repl.exit_requested().is_some() {
            break;
        }
        let result = repl.execute(line)?;
        print!("{}", result.out);
        eprint!("{}", result.err);
        code = result.code;
    }
    print!("{}", repl.drain_console());
    Ok(code)
}

/// Run the interactive console.
pub fn run(config: KernelConfig) -> Result<()> {
    let repl = Repl::new(config)?;

    print!("{}", banner().cyan());
    for warning in repl.kernel.boot_warnings() {
        eprintln!("{}", warning.yellow());
    }

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = paths::history_path();
    if rl.load_history(&history_path).is_err() {
        debug!("no history at {}", history_path.display());
    }

    loop {
        print!("{}", repl.drain_console());
        if let Some(request) = repl.exit_requested() {
            debug!(?request, "leaving");
            break;
        }

        match rl.readline(&repl.prompt()) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(e) = rl.add_history_entry(line.as_str()) {
                    debug!("history: {}", e);
                }

                match repl.execute(line.trim()) {
                    Ok(result) => {
                        print!("{}", result.out);
                        if !result.err.is_empty() {
                            eprint!("{}", result.err.red());
                        }
                    }
                    Err(e) => eprintln!("{} {:#}", "Error:".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("could not create {}: {}", parent.display(), e);
        }
    }
    if let Err(e) = rl.save_history(&history_path) {
        warn!("could not save history: {}", e);
    }

    Ok(())
}
