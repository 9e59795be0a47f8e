//! Integration tests for the mythOS console.
//!
//! These run lines through the REPL and check what a user would see.

use mythos_kernel::session::ExitRequest;
use mythos_kernel::KernelConfig;
use mythos_repl::{run_command, Repl};
use tempfile::TempDir;

/// Run each non-blank line through a fresh REPL and collect outputs.
fn run_script(script: &str) -> Vec<String> {
    let mut repl = Repl::transient().expect("Failed to create REPL");
    let mut outputs = Vec::new();

    for line in script.lines() {
        match repl.process_line(line) {
            Ok(Some(output)) => outputs.push(output),
            Ok(None) => {}
            Err(e) => outputs.push(format!("ERROR: {}", e)),
        }
    }

    outputs
}

#[test]
fn blank_lines_print_nothing() {
    assert!(run_script("\n   \n").is_empty());
}

#[test]
fn filesystem_session() {
    let outputs = run_script(
        r#"
        mkdir /home/guest/notes
        cd /home/guest/notes
        echo first > a
        echo second >> a
        cat a
        pwd
        "#,
    );
    assert_eq!(outputs, vec!["first\nsecond", "/home/guest/notes"]);
}

#[test]
fn errors_are_shown() {
    let outputs = run_script("frobnicate\ncat /missing\n");
    assert_eq!(outputs[0], "frobnicate: command not found");
    assert!(outputs[1].contains("/missing"), "got: {}", outputs[1]);
}

#[test]
fn prompt_tracks_user_and_cwd() {
    let mut repl = Repl::transient().unwrap();
    assert_eq!(repl.prompt(), "root@mythos:/$ ");
    repl.process_line("cd /tmp").unwrap();
    assert_eq!(repl.prompt(), "root@mythos:/tmp$ ");
    repl.process_line("su guest").unwrap();
    assert_eq!(repl.prompt(), "guest@mythos:~$ ");
}

#[test]
fn help_lists_builtins() {
    let outputs = run_script("help");
    for name in ["ls", "cd", "chmod", "su", "ps", "kill", "reboot", "shutdown"] {
        assert!(outputs[0].contains(name), "help is missing {}", name);
    }
}

#[test]
fn exit_ends_session() {
    let mut repl = Repl::transient().unwrap();
    repl.process_line("exit").unwrap();
    assert_eq!(repl.exit_requested(), Some(ExitRequest::Exit));
    assert!(repl.process_line("echo too late").is_err());
}

#[test]
fn background_output_reaches_console() {
    let mut repl = Repl::transient().unwrap();

    // Scripts are plain files; write one line at a time.
    repl.process_line("echo #!mythos > /bin/tick").unwrap();
    repl.process_line("echo echo tock >> /bin/tick").unwrap();
    assert_eq!(repl.process_line("tick &").unwrap().as_deref(), Some("[1000]"));

    let mut console = String::new();
    for _ in 0..200 {
        console.push_str(&repl.drain_console());
        if !console.is_empty() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(console, "tock\n");
}

#[test]
fn run_command_reports_last_code() {
    let dir = TempDir::new().unwrap();
    let config = KernelConfig::persistent("cli").with_snapshot(dir.path().join("fs.json"));

    let code = run_command(config.clone(), "mkdir /tmp/x\ntouch /tmp/x/y\nshutdown\n").unwrap();
    assert_eq!(code, 0);

    let code = run_command(config.clone(), "cat /tmp/x/y\n").unwrap();
    assert_eq!(code, 0);

    let code = run_command(config, "cat /tmp/x/missing\n").unwrap();
    assert_eq!(code, 1);
}
