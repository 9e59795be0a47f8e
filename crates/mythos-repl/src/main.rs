//! mythOS console entry point.
//!
//! Boot the default machine:
//! ```bash
//! cargo run -p mythos-repl
//! ```
//!
//! Or run a throwaway one: `mythos --transient -c 'ls /'`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mythos_kernel::KernelConfig;

#[derive(Parser)]
#[command(name = "mythos")]
#[command(about = "A text operating system in a terminal")]
#[command(version)]
struct Cli {
    /// Don't load or save the filesystem
    #[arg(long, conflicts_with = "snapshot")]
    transient: bool,

    /// Snapshot file to load at boot and save on shutdown
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Machine name, used to pick the default snapshot file
    #[arg(long, default_value = "default")]
    name: String,

    /// Run these lines instead of starting the console
    #[arg(short = 'c')]
    command: Option<String>,
}

impl Cli {
    fn kernel_config(&self) -> KernelConfig {
        if self.transient {
            return KernelConfig::transient();
        }
        let config = KernelConfig::persistent(&self.name);
        match &self.snapshot {
            Some(path) => config.with_snapshot(path),
            None => config,
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.kernel_config();

    match &cli.command {
        Some(script) => {
            let code = mythos_repl::run_command(config, script)?;
            std::process::exit(code);
        }
        None => mythos_repl::run(config),
    }
}
