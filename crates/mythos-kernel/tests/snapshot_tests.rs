//! Persistence across kernel boots.

use mythos_kernel::session::ExitRequest;
use mythos_kernel::{Kernel, KernelConfig};
use tempfile::TempDir;

fn config(dir: &TempDir) -> KernelConfig {
    KernelConfig::persistent("test").with_snapshot(dir.path().join("machine.fs.json"))
}

#[tokio::test]
async fn test_shutdown_saves_and_boot_restores() {
    let dir = TempDir::new().unwrap();

    let kernel = Kernel::new(config(&dir)).unwrap();
    assert!(kernel.boot_warnings().is_empty());
    kernel.execute("mkdir /home/keep").await.unwrap();
    kernel.execute("echo kept > /home/keep/note").await.unwrap();
    kernel.execute("chmod 600 /home/keep/note").await.unwrap();
    let result = kernel.execute("shutdown").await.unwrap();
    assert!(result.ok(), "shutdown failed: {}", result.err);
    assert_eq!(kernel.exit_requested().await, Some(ExitRequest::Shutdown));
    assert!(dir.path().join("machine.fs.json").exists());

    let kernel = Kernel::new(config(&dir)).unwrap();
    assert!(kernel.boot_warnings().is_empty());
    assert_eq!(kernel.execute("cat /home/keep/note").await.unwrap().out, "kept\n");
    let long = kernel.execute("ls -l /home/keep").await.unwrap();
    assert!(long.out.starts_with("-rw-------"), "got: {}", long.out);
}

#[tokio::test]
async fn test_exit_does_not_save() {
    let dir = TempDir::new().unwrap();

    let kernel = Kernel::new(config(&dir)).unwrap();
    kernel.execute("touch /tmp/lost").await.unwrap();
    kernel.execute("exit").await.unwrap();
    assert!(!dir.path().join("machine.fs.json").exists());

    let kernel = Kernel::new(config(&dir)).unwrap();
    let result = kernel.execute("cat /tmp/lost").await.unwrap();
    assert_eq!(result.code, 1);
}

#[tokio::test]
async fn test_reboot_keeps_files_and_cwd() {
    let dir = TempDir::new().unwrap();

    let kernel = Kernel::new(config(&dir)).unwrap();
    kernel.execute("mkdir /tmp/work").await.unwrap();
    kernel.execute("cd /tmp/work").await.unwrap();
    kernel.execute("echo x > f").await.unwrap();

    let result = kernel.execute("reboot").await.unwrap();
    assert!(result.out.contains("Rebooting"));
    assert!(kernel.exit_requested().await.is_none());
    assert_eq!(kernel.execute("pwd").await.unwrap().out, "/tmp/work\n");
    assert_eq!(kernel.execute("cat f").await.unwrap().out, "x\n");
}

#[tokio::test]
async fn test_corrupt_snapshot_boots_default_tree() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("machine.fs.json"), "{ not json").unwrap();

    let kernel = Kernel::new(config(&dir)).unwrap();
    let warnings = kernel.boot_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0].starts_with("Warning: failed to load FS"),
        "got: {}",
        warnings[0]
    );

    let ls = kernel.execute("ls /").await.unwrap();
    for dir in ["bin/", "etc/", "home/", "tmp/"] {
        assert!(ls.out.contains(dir), "missing {} in {}", dir, ls.out);
    }
    assert_eq!(kernel.execute("cat /etc/motd").await.unwrap().out, "Welcome to mythOS\n");
}

#[tokio::test]
async fn test_users_come_from_passwd() {
    let dir = TempDir::new().unwrap();

    let kernel = Kernel::new(config(&dir)).unwrap();
    kernel
        .execute("echo root::0:0:admin:/root:/bin/sh > /etc/passwd")
        .await
        .unwrap();
    kernel
        .execute("echo alice::1001:1001:alice:/home/alice:/bin/sh >> /etc/passwd")
        .await
        .unwrap();
    kernel.execute("shutdown").await.unwrap();

    let kernel = Kernel::new(config(&dir)).unwrap();
    let result = kernel.execute("su alice").await.unwrap();
    assert!(result.ok(), "su failed: {}", result.err);
    assert_eq!(kernel.execute("pwd").await.unwrap().out, "/home/alice\n");
    assert!(!kernel.execute("su guest").await.unwrap().ok());
}
