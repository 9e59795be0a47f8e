//! ps / kill — Inspect and signal processes.

use async_trait::async_trait;
use chrono::Utc;

use crate::interpreter::ExecResult;
use crate::scheduler::{Pid, ProcessStatus, INIT_PID};
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Signal sent by `kill` when none is given.
pub const DEFAULT_SIGNAL: i32 = 15;

const SIGNALS: &[(&str, i32)] = &[("HUP", 1), ("INT", 2), ("KILL", 9), ("TERM", 15)];

pub struct Ps;

#[async_trait]
impl Tool for Ps {
    fn name(&self) -> &str {
        "ps"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("ps", "List processes")
    }

    async fn execute(&self, _args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let now = Utc::now();
        let mut out = format!("{:>5} {:>5} {:>4} {:>8} {}\n", "PID", "PPID", "STAT", "TIME", "CMD");
        for proc in ctx.session.procs.list().await {
            let secs = (now - proc.started_at).num_seconds().max(0);
            let time = format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60);
            let ppid = proc
                .parent
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            let stat = match proc.status {
                ProcessStatus::Running => "R",
                ProcessStatus::Terminated(_) => "T",
            };
            out.push_str(&format!(
                "{:>5} {:>5} {:>4} {:>8} {}\n",
                proc.pid, ppid, stat, time, proc.command
            ));
        }
        ExecResult::success(out)
    }
}

pub struct Kill;

#[async_trait]
impl Tool for Kill {
    fn name(&self) -> &str {
        "kill"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("kill", "Terminate processes (signal becomes the exit code)")
            .param(ParamSchema::optional("-signal", "Number or name: HUP INT KILL TERM"))
            .param(ParamSchema::required("pid", "Processes to terminate").many())
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let mut operands = args.positional.as_slice();
        let mut signal = DEFAULT_SIGNAL;
        if let Some(first) = operands.first() {
            if let Some(spec) = first.strip_prefix('-') {
                match parse_signal(spec) {
                    Some(sig) => signal = sig,
                    None => {
                        return ExecResult::failure(1, format!("kill: invalid signal: {}", spec));
                    }
                }
                operands = &operands[1..];
            }
        }
        if operands.is_empty() {
            return ExecResult::failure(1, format!("usage: {}", self.schema().usage()));
        }

        let mut out = String::new();
        let mut err = String::new();
        for operand in operands {
            let Ok(pid) = operand.parse::<Pid>() else {
                err.push_str(&format!("kill: invalid pid: {}\n", operand));
                continue;
            };
            if pid == INIT_PID {
                err.push_str(&format!("kill: ({}) - Operation not permitted\n", pid));
            } else if ctx.session.procs.kill(pid, signal).await {
                out.push_str(&format!("Killed {}\n", pid));
            } else {
                err.push_str(&format!("kill: ({}) - No such process\n", pid));
            }
        }
        ExecResult::from_output(if err.is_empty() { 0 } else { 1 }, out, err)
    }
}

/// `9`, `KILL` or `SIGKILL`.
fn parse_signal(spec: &str) -> Option<i32> {
    if let Ok(n) = spec.parse::<i32>() {
        return (n > 0).then_some(n);
    }
    let name = spec.strip_prefix("SIG").unwrap_or(spec);
    SIGNALS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, sig)| *sig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{make_ctx, run};

    #[test]
    fn signals_by_number_and_name() {
        assert_eq!(parse_signal("9"), Some(9));
        assert_eq!(parse_signal("KILL"), Some(9));
        assert_eq!(parse_signal("SIGHUP"), Some(1));
        assert_eq!(parse_signal("term"), Some(15));
        assert_eq!(parse_signal("0"), None);
        assert_eq!(parse_signal("BOGUS"), None);
    }

    #[tokio::test]
    async fn ps_lists_init() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, "ps", &[]).await;
        let lines: Vec<_> = result.out.lines().collect();
        assert_eq!(lines[0], "  PID  PPID STAT     TIME CMD");
        assert!(lines[1].starts_with("    1     -    R "));
        assert!(lines[1].ends_with(" init"));
    }

    #[tokio::test]
    async fn kill_terminates_with_signal() {
        let mut ctx = make_ctx();
        let procs = ctx.session.procs.clone();
        let mut handle = procs.fork(INIT_PID, "spin", "/").await;
        procs
            .schedule(&handle, async {
                std::future::pending::<()>().await;
                Ok(())
            })
            .await;

        let pid = handle.pid().to_string();
        let result = run(&mut ctx, "kill", &["-KILL", &pid]).await;
        assert_eq!(result.out, format!("Killed {pid}\n"));
        assert_eq!(handle.wait().await, 9);
        assert!(!run(&mut ctx, "ps", &[]).await.out.contains("spin"));
    }

    #[tokio::test]
    async fn kill_reports_missing_and_init() {
        let mut ctx = make_ctx();
        let result = run(&mut ctx, "kill", &["4242", "1", "abc"]).await;
        assert_eq!(result.code, 1);
        assert_eq!(
            result.err,
            "kill: (4242) - No such process\n\
             kill: (1) - Operation not permitted\n\
             kill: invalid pid: abc\n"
        );
    }
}
