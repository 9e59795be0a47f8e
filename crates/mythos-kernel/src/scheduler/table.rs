//! The process table.
//!
//! Every external command runs as a simulated process: an entry in this
//! table plus one tokio task doing the work. A supervisor task watches the
//! worker and records its exit code; anyone holding a [`ProcessHandle`] can
//! await that through a `watch` channel.
//!
//! Terminated processes are removed immediately. There is no zombie state.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// Process identifier.
pub type Pid = u32;

/// The process every interactive command descends from.
pub const INIT_PID: Pid = 1;

/// First pid handed out by [`ProcessTable::fork`].
pub const DEFAULT_PID_BASE: Pid = 1000;

/// Lifecycle state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Terminated(i32),
}

impl ProcessStatus {
    pub fn is_terminated(&self) -> bool {
        matches!(self, ProcessStatus::Terminated(_))
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessStatus::Running => None,
            ProcessStatus::Terminated(code) => Some(*code),
        }
    }
}

/// Point-in-time view of one live process.
#[derive(Debug, Clone)]
pub struct Process {
    pub pid: Pid,
    pub command: String,
    pub parent: Option<Pid>,
    pub children: Vec<Pid>,
    pub status: ProcessStatus,
    pub started_at: DateTime<Utc>,
    /// Working directory at fork time.
    pub cwd: String,
}

/// Caller's side of a forked process.
#[derive(Debug, Clone)]
pub struct ProcessHandle {
    pid: Pid,
    status: watch::Receiver<ProcessStatus>,
}

impl ProcessHandle {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn status(&self) -> ProcessStatus {
        *self.status.borrow()
    }

    /// Suspend until the process terminates; returns its exit code.
    pub async fn wait(&mut self) -> i32 {
        let waited = self
            .status
            .wait_for(|s| s.is_terminated())
            .await
            .map(|status| *status);
        match waited {
            Ok(status) => status.exit_code().unwrap_or(1),
            // The sender only goes away after publishing a final status.
            Err(_) => self.status.borrow().exit_code().unwrap_or(1),
        }
    }
}

struct Entry {
    process: Process,
    status: watch::Sender<ProcessStatus>,
    abort: Option<AbortHandle>,
}

struct TableInner {
    next_pid: Pid,
    entries: BTreeMap<Pid, Entry>,
}

/// Live processes, keyed by pid.
pub struct ProcessTable {
    inner: Mutex<TableInner>,
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new(DEFAULT_PID_BASE)
    }
}

impl ProcessTable {
    /// Create a table holding only `init`. Forked pids start at `base`.
    pub fn new(base: Pid) -> Self {
        let (status, _) = watch::channel(ProcessStatus::Running);
        let init = Entry {
            process: Process {
                pid: INIT_PID,
                command: "init".to_string(),
                parent: None,
                children: Vec::new(),
                status: ProcessStatus::Running,
                started_at: Utc::now(),
                cwd: "/".to_string(),
            },
            status,
            abort: None,
        };
        let mut entries = BTreeMap::new();
        entries.insert(INIT_PID, init);
        Self {
            inner: Mutex::new(TableInner {
                next_pid: base.max(INIT_PID + 1),
                entries,
            }),
        }
    }

    /// Register a new process under `parent`. Nothing runs until
    /// [`ProcessTable::schedule`] is called.
    pub async fn fork(&self, parent: Pid, command: &str, cwd: &str) -> ProcessHandle {
        let mut inner = self.inner.lock().await;
        let pid = inner.next_pid;
        inner.next_pid += 1;

        let (status, receiver) = watch::channel(ProcessStatus::Running);
        let parent = match inner.entries.get_mut(&parent) {
            Some(entry) => {
                entry.process.children.push(pid);
                Some(parent)
            }
            None => None,
        };
        inner.entries.insert(
            pid,
            Entry {
                process: Process {
                    pid,
                    command: command.to_string(),
                    parent,
                    children: Vec::new(),
                    status: ProcessStatus::Running,
                    started_at: Utc::now(),
                    cwd: cwd.to_string(),
                },
                status,
                abort: None,
            },
        );
        debug!(pid, ?parent, command, "fork");
        ProcessHandle {
            pid,
            status: receiver,
        }
    }

    /// Run `task` on its own tokio task. Success exits 0; an error or a
    /// panic exits 1.
    pub async fn schedule<F>(self: &Arc<Self>, handle: &ProcessHandle, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let pid = handle.pid;
        let worker = tokio::spawn(task);
        {
            let mut inner = self.inner.lock().await;
            match inner.entries.get_mut(&pid) {
                Some(entry) => entry.abort = Some(worker.abort_handle()),
                None => {
                    // Killed between fork and schedule.
                    worker.abort();
                    return;
                }
            }
        }

        let table = Arc::clone(self);
        tokio::spawn(async move {
            let code = match worker.await {
                Ok(Ok(())) => 0,
                Ok(Err(e)) => {
                    debug!(pid, "process failed: {:#}", e);
                    1
                }
                Err(e) if e.is_cancelled() => return,
                Err(e) => {
                    warn!(pid, "process panicked: {}", e);
                    1
                }
            };
            table.terminate(pid, code).await;
        });
    }

    /// Terminate a live process with `signal` as its exit code.
    ///
    /// Returns false when there is no such process (or it is `init`).
    pub async fn kill(&self, pid: Pid, signal: i32) -> bool {
        if pid == INIT_PID {
            return false;
        }
        let killed = self.terminate(pid, signal).await;
        if killed {
            info!(pid, signal, "killed");
        }
        killed
    }

    async fn terminate(&self, pid: Pid, code: i32) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(entry) = inner.entries.remove(&pid) else {
            return false;
        };
        if let Some(parent) = entry
            .process
            .parent
            .and_then(|p| inner.entries.get_mut(&p))
        {
            parent.process.children.retain(|c| *c != pid);
        }
        entry.status.send_replace(ProcessStatus::Terminated(code));
        if let Some(abort) = entry.abort {
            abort.abort();
        }
        debug!(pid, code, "terminated");
        true
    }

    pub async fn get(&self, pid: Pid) -> Option<Process> {
        self.inner
            .lock()
            .await
            .entries
            .get(&pid)
            .map(|e| e.process.clone())
    }

    /// Snapshot of every live process, ordered by pid.
    pub async fn list(&self) -> Vec<Process> {
        self.inner
            .lock()
            .await
            .entries
            .values()
            .map(|e| e.process.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl std::fmt::Debug for ProcessTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessTable")
            .field("inner", &"<locked>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn init_is_registered() {
        let table = ProcessTable::default();
        let init = table.get(INIT_PID).await.unwrap();
        assert_eq!(init.command, "init");
        assert_eq!(init.cwd, "/");
        assert!(!table.kill(INIT_PID, 9).await);
    }

    #[tokio::test]
    async fn pids_increase_from_base() {
        let table = ProcessTable::new(1000);
        let a = table.fork(INIT_PID, "a", "/").await;
        let b = table.fork(INIT_PID, "b", "/").await;
        let c = table.fork(a.pid(), "c", "/tmp").await;
        assert_eq!((a.pid(), b.pid(), c.pid()), (1000, 1001, 1002));

        let a_entry = table.get(a.pid()).await.unwrap();
        assert_eq!(a_entry.children, vec![1002]);
        assert_eq!(table.get(c.pid()).await.unwrap().parent, Some(1000));
        assert_eq!(table.get(INIT_PID).await.unwrap().children, vec![1000, 1001]);
    }

    #[tokio::test]
    async fn kill_removes_and_reports_signal() {
        let table = Arc::new(ProcessTable::default());
        let mut handle = table.fork(INIT_PID, "sleeper", "/").await;
        table
            .schedule(&handle, async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        assert!(table.kill(handle.pid(), 15).await);
        assert!(table.get(handle.pid()).await.is_none());
        assert!(table.list().await.iter().all(|p| p.pid != handle.pid()));
        assert_eq!(handle.wait().await, 15);
        assert!(table.get(INIT_PID).await.unwrap().children.is_empty());

        // Second kill is a no-op.
        assert!(!table.kill(handle.pid(), 9).await);
    }

    #[tokio::test]
    async fn exit_codes_follow_task_outcome() {
        let table = Arc::new(ProcessTable::default());

        let mut ok = table.fork(INIT_PID, "ok", "/").await;
        table.schedule(&ok, async { Ok(()) }).await;
        assert_eq!(ok.wait().await, 0);

        let mut failed = table.fork(INIT_PID, "failed", "/").await;
        table
            .schedule(&failed, async { Err(anyhow::anyhow!("boom")) })
            .await;
        assert_eq!(failed.wait().await, 1);

        let mut panicked = table.fork(INIT_PID, "panicked", "/").await;
        table
            .schedule(&panicked, async {
                if true {
                    panic!("task blew up");
                }
                Ok(())
            })
            .await;
        assert_eq!(panicked.wait().await, 1);

        assert_eq!(table.len().await, 1, "only init remains");
    }

    #[tokio::test]
    async fn running_until_task_finishes() {
        let table = Arc::new(ProcessTable::default());
        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let mut handle = table.fork(INIT_PID, "gated", "/").await;
        table
            .schedule(&handle, async move {
                let _ = gate.await;
                Ok(())
            })
            .await;

        assert_eq!(handle.status(), ProcessStatus::Running);
        release.send(()).unwrap();
        assert_eq!(handle.wait().await, 0);
        assert_eq!(handle.status(), ProcessStatus::Terminated(0));
    }
}
