//! The Kernel — the heart of mythOS.
//!
//! The Kernel boots a [`Session`] and dispatches shell lines against it:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          Kernel                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │ ToolRegistry │  │   Session    │  │    Console     │  │
//! │  │  (builtins)  │  │ vfs · users  │  │ (unawaited     │  │
//! │  │              │  │ procs · cwd  │  │  script output)│  │
//! │  └──────────────┘  └──────────────┘  └────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Builtins run inline. Anything else is a script in the script directory:
//! it is forked into the process table and runs on its own task. The shell
//! waits for the final stage of a line unless it ends in `&`; everything
//! else keeps running and writes to the console.
//!
//! Scripts re-enter the same line dispatcher for each of their lines, so
//! nesting is bounded by [`KernelConfig::max_script_depth`].

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::ast::{Command, Redirect};
use crate::error::ShellError;
use crate::interpreter::ExecResult;
use crate::parser::parse;
use crate::scheduler::{BoundedStream, OutputSink, Pid, DEFAULT_PID_BASE, INIT_PID};
use crate::session::{ExitRequest, Session};
use crate::state::{paths as state_paths, SnapshotStore};
use crate::tools::{ExecContext, ToolArgs, ToolRegistry, ToolSchema};
use crate::vfs::{default_layout, NodeId, Tree};

/// First line every script must carry.
pub const SCRIPT_MARKER: &str = "#!mythos";

/// Default limit on nested script invocations.
pub const DEFAULT_MAX_SCRIPT_DEPTH: usize = 16;

/// The boot banner.
pub fn banner() -> String {
    format!(
        "╔══════════════════════════════════════════════════╗\n\
         ║                                                  ║\n\
         ║{:^50}║\n\
         ║{:^50}║\n\
         ║                                                  ║\n\
         ╚══════════════════════════════════════════════════╝\n\
         Type 'help' for commands.\n",
        format!("{} beta v{}", crate::OS_NAME, crate::OS_VERSION),
        "Text OS • Graphical OS",
    )
}

/// Configuration for kernel initialization.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Machine name (used for snapshot file naming).
    pub name: String,
    /// Whether to load and save a filesystem snapshot.
    pub persist: bool,
    /// Snapshot location; defaults to `$XDG_DATA_HOME/mythos/{name}.fs.json`.
    pub snapshot_path: Option<PathBuf>,
    /// Host name shown in the prompt.
    pub hostname: String,
    /// First pid given to a forked process.
    pub pid_base: Pid,
    /// Directory searched for scripts.
    pub script_dir: String,
    /// How deeply scripts may invoke scripts.
    pub max_script_depth: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            persist: true,
            snapshot_path: None,
            hostname: "mythos".to_string(),
            pid_base: DEFAULT_PID_BASE,
            script_dir: "/bin".to_string(),
            max_script_depth: DEFAULT_MAX_SCRIPT_DEPTH,
        }
    }
}

impl KernelConfig {
    /// Create a transient (non-persistent) kernel config.
    pub fn transient() -> Self {
        Self {
            name: "transient".to_string(),
            persist: false,
            ..Self::default()
        }
    }

    /// Create a persistent kernel config with the given name.
    pub fn persistent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Persist to an explicit snapshot file.
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist = true;
        self.snapshot_path = Some(path.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.script_dir.starts_with('/') {
            bail!("script_dir must be absolute, got {:?}", self.script_dir);
        }
        if self.max_script_depth == 0 {
            bail!("max_script_depth must be at least 1");
        }
        Ok(())
    }
}

/// The Kernel — executes mythOS shell lines.
///
/// Cheap to clone; clones share the same machine.
#[derive(Clone)]
pub struct Kernel {
    name: String,
    shell: Shell,
    boot_warnings: Vec<String>,
}

impl Kernel {
    /// Boot a machine with the given configuration.
    ///
    /// A snapshot that can't be loaded does not stop the boot: the default
    /// tree is used and the failure is reported through
    /// [`Kernel::boot_warnings`].
    pub fn new(config: KernelConfig) -> Result<Self> {
        config.validate().context("invalid kernel config")?;

        let store = config.persist.then(|| {
            SnapshotStore::new(
                config
                    .snapshot_path
                    .clone()
                    .unwrap_or_else(|| state_paths::snapshot_path(&config.name)),
            )
        });

        let mut boot_warnings = Vec::new();
        let tree = match store.as_ref().map(load_tree) {
            Some(Ok(Some(tree))) => tree,
            Some(Ok(None)) | None => default_layout(),
            Some(Err(e)) => {
                warn!("failed to load FS: {:#}", e);
                boot_warnings.push(format!("Warning: failed to load FS: {:#}", e));
                default_layout()
            }
        };

        let session = Arc::new(Session::new(tree, store, config.pid_base, &config.hostname));
        info!(name = %config.name, persist = config.persist, "kernel booted");

        Ok(Self {
            name: config.name.clone(),
            shell: Shell {
                session,
                tools: Arc::new(ToolRegistry::with_builtins()),
                console: BoundedStream::default_size(),
                config: Arc::new(config),
            },
            boot_warnings,
        })
    }

    /// Create a transient kernel (no persistence).
    pub fn transient() -> Result<Self> {
        Self::new(KernelConfig::transient())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Problems hit while booting.
    pub fn boot_warnings(&self) -> &[String] {
        &self.boot_warnings
    }

    /// Execute one shell line.
    ///
    /// Returns once every builtin has run and the foreground script (if any)
    /// has terminated. Output of the foreground stage is in the result;
    /// background output goes to the console.
    pub async fn execute(&self, line: &str) -> Result<ExecResult> {
        if let Some(request) = self.shell.session.exit_requested().await {
            bail!("session has ended ({:?})", request);
        }
        let sink = OutputSink::default();
        let code = self.shell.run_line(line, Frame::top(), &sink).await;
        Ok(ExecResult::from_output(
            code,
            sink.out.take_string().await,
            sink.err.take_string().await,
        ))
    }

    pub fn session(&self) -> Arc<Session> {
        self.shell.session.clone()
    }

    pub async fn prompt(&self) -> String {
        self.shell.session.prompt().await
    }

    /// Take whatever unawaited scripts have written since the last call.
    pub async fn drain_console(&self) -> String {
        self.shell.console.take_string().await
    }

    pub async fn exit_requested(&self) -> Option<ExitRequest> {
        self.shell.session.exit_requested().await
    }

    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.shell.tools.schemas()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.shell.config
    }
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("name", &self.name)
            .field("tools", &self.shell.tools)
            .finish_non_exhaustive()
    }
}

fn load_tree(store: &SnapshotStore) -> Result<Option<Tree>> {
    match store.load()? {
        Some(record) => Ok(Some(Tree::restore(&record).context("restoring snapshot")?)),
        None => Ok(None),
    }
}

/// Where a line is being run from.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Number of enclosing scripts.
    depth: usize,
    /// Parent for processes forked by this line.
    parent: Pid,
}

impl Frame {
    fn top() -> Self {
        Self {
            depth: 0,
            parent: INIT_PID,
        }
    }
}

type LineFuture<'a> = Pin<Box<dyn Future<Output = i32> + Send + 'a>>;

/// Line dispatcher shared by the kernel and every running script.
#[derive(Clone)]
struct Shell {
    session: Arc<Session>,
    tools: Arc<ToolRegistry>,
    console: BoundedStream,
    config: Arc<KernelConfig>,
}

impl Shell {
    /// Run every stage of a line. Returns the exit code of the last stage
    /// that ran.
    fn run_line<'a>(&'a self, line: &'a str, frame: Frame, sink: &'a OutputSink) -> LineFuture<'a> {
        Box::pin(async move {
            let pipeline = parse(line);
            let foreground = pipeline.foreground_index();
            let mut code = 0;

            for (index, command) in pipeline.stages.iter().enumerate() {
                if self.session.exit_requested().await.is_some() {
                    break;
                }
                debug!(depth = frame.depth, stage = %command, "dispatch");
                code = if self.tools.contains(&command.name) {
                    self.run_builtin(command, sink).await
                } else {
                    self.run_script(command, frame, sink, foreground == Some(index))
                        .await
                };
            }
            code
        })
    }

    async fn run_builtin(&self, command: &Command, sink: &OutputSink) -> i32 {
        if command.background {
            return report(sink, &ShellError::BackgroundBuiltin(command.name.clone())).await;
        }
        let Some(tool) = self.tools.get(&command.name) else {
            return report(sink, &ShellError::CommandNotFound(command.name.clone())).await;
        };

        let mut ctx = ExecContext::new(self.session.clone());
        ctx.tool_schemas = self.tools.schemas();
        if let Some(input) = &command.input {
            match ctx.read_file(input).await {
                Ok(content) => ctx.set_stdin(content),
                Err(e) => return report(sink, &ShellError::from(e)).await,
            }
        }

        let args = ToolArgs::parse(&command.args, &tool.schema());
        let result = tool.execute(args, &mut ctx).await;

        let mut code = result.code;
        match &command.output {
            Some(redirect) => {
                let cwd = self.session.cwd().await;
                if let Err(e) = self.write_redirect(cwd, redirect, &result.out).await {
                    code = report(sink, &e).await;
                }
            }
            None => sink.out.write_str(&result.out).await,
        }
        sink.err.write_str(&result.err).await;
        code
    }

    /// Fork and schedule a script stage. Lookup failures are reported
    /// without forking.
    async fn run_script(
        &self,
        command: &Command,
        frame: Frame,
        sink: &OutputSink,
        foreground: bool,
    ) -> i32 {
        let body = match self.load_script(&command.name, frame).await {
            Ok(body) => body,
            Err(e) => return report(sink, &e).await,
        };

        let cwd = self.session.cwd_path().await;
        let mut handle = self
            .session
            .procs
            .fork(frame.parent, &command.raw, &cwd)
            .await;
        let pid = handle.pid();

        // Foreground output belongs to the line; anything nobody waits on
        // goes to the console.
        let target = if foreground {
            sink.clone()
        } else {
            OutputSink {
                out: self.console.clone(),
                err: self.console.clone(),
            }
        };
        let script_sink = match command.output {
            Some(_) => OutputSink {
                out: BoundedStream::default_size(),
                err: target.err.clone(),
            },
            None => target,
        };

        let shell = self.clone();
        let name = command.name.clone();
        let args = command.args.clone();
        let redirect = command.output.clone();
        let child = Frame {
            depth: frame.depth + 1,
            parent: pid,
        };
        let task = async move {
            shell.interpret(&name, &args, &body, child, &script_sink).await;
            if let Some(redirect) = redirect {
                let out = script_sink.out.take_string().await;
                // Relative targets name files in the directory the script
                // was started from.
                let vfs = &shell.session.vfs;
                let root = vfs.root().await;
                let base = vfs.resolve(root, &cwd).await.unwrap_or(root);
                shell
                    .write_redirect(base, &redirect, &out)
                    .await
                    .with_context(|| format!("{}: redirect to {}", name, redirect.path))?;
            }
            Ok(())
        };
        self.session.procs.schedule(&handle, task).await;

        if command.background {
            sink.out.write_str(&format!("[{}]\n", pid)).await;
            0
        } else if foreground {
            let code = handle.wait().await;
            debug!(pid, code, "foreground done");
            code
        } else {
            0
        }
    }

    /// Read a script and check it may run at this depth.
    async fn load_script(&self, name: &str, frame: Frame) -> Result<Vec<String>, ShellError> {
        let path = format!("{}/{}", self.config.script_dir.trim_end_matches('/'), name);
        let root = self.session.vfs.root().await;
        let content = self
            .session
            .vfs
            .read_file(root, &path)
            .await
            .map_err(|_| ShellError::CommandNotFound(name.to_string()))?;

        if !content.starts_with(SCRIPT_MARKER) {
            return Err(ShellError::ScriptNotExecutable(name.to_string()));
        }
        if frame.depth >= self.config.max_script_depth {
            return Err(ShellError::RecursionLimit {
                name: name.to_string(),
                depth: self.config.max_script_depth,
            });
        }
        Ok(content.lines().map(str::to_string).collect())
    }

    /// Feed each script line back through the dispatcher.
    async fn interpret(
        &self,
        name: &str,
        args: &[String],
        body: &[String],
        frame: Frame,
        sink: &OutputSink,
    ) {
        for line in body {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if self.session.exit_requested().await.is_some() {
                break;
            }
            let line = substitute(line, name, args);
            self.run_line(&line, frame, sink).await;
        }
    }

    async fn write_redirect(
        &self,
        base: NodeId,
        redirect: &Redirect,
        content: &str,
    ) -> Result<(), ShellError> {
        let owner = self.session.user().await;
        let vfs = &self.session.vfs;
        if redirect.append {
            vfs.append_file(base, &redirect.path, content, &owner).await?;
        } else {
            vfs.write_file(base, &redirect.path, content, &owner).await?;
        }
        Ok(())
    }
}

/// Write an error to the stage's err stream and return its exit code.
async fn report(sink: &OutputSink, error: &ShellError) -> i32 {
    sink.err.write_str(&format!("{}\n", error)).await;
    error.exit_code()
}

/// Replace `$1..$N` with positional arguments and `$0` with the script name.
///
/// Higher indices go first so `$12` isn't clobbered by `$1`. Placeholders
/// without an argument are left as written.
fn substitute(line: &str, name: &str, args: &[String]) -> String {
    let mut line = line.to_string();
    for (index, arg) in args.iter().enumerate().rev() {
        line = line.replace(&format!("${}", index + 1), arg);
    }
    line.replace("$0", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_positionals() {
        let args = vec!["a".to_string(), "b".to_string()];
        assert_eq!(substitute("echo $2 $1 $0", "greet", &args), "echo b a greet");
        assert_eq!(substitute("echo $3", "greet", &args), "echo $3");

        let many: Vec<String> = (1..=12).map(|i| format!("v{i}")).collect();
        assert_eq!(substitute("echo $12 $1", "s", &many), "echo v12 v1");
    }

    #[test]
    fn banner_names_version() {
        let banner = banner();
        assert!(banner.contains("mythOS beta v1.5.1"));
        assert!(banner.ends_with("Type 'help' for commands.\n"));
    }

    #[test]
    fn config_validation() {
        assert!(Kernel::new(KernelConfig {
            script_dir: "bin".into(),
            ..KernelConfig::transient()
        })
        .is_err());
        assert!(Kernel::new(KernelConfig {
            max_script_depth: 0,
            ..KernelConfig::transient()
        })
        .is_err());
    }

    #[tokio::test]
    async fn execute_collects_builtin_output() {
        let kernel = Kernel::transient().unwrap();
        let result = kernel.execute("echo one | echo two").await.unwrap();
        assert_eq!(result.out, "one\ntwo\n");
        assert!(result.ok());
    }

    #[tokio::test]
    async fn execute_after_exit_fails() {
        let kernel = Kernel::transient().unwrap();
        kernel.execute("exit").await.unwrap();
        assert_eq!(kernel.exit_requested().await, Some(ExitRequest::Exit));
        assert!(kernel.execute("echo hi").await.is_err());
    }
}
