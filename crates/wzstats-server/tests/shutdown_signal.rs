//! SIGTERM ends the serve loop the same way Ctrl-C does.
//!
//! Kept in its own test binary because it signals the whole process.

#![cfg(unix)]

use std::process::Command;
use std::time::Duration;
use wzstats_server::shutdown_signal;

#[tokio::test]
async fn test_sigterm_resolves_shutdown_signal() {
    let waiter = tokio::spawn(shutdown_signal());

    // Let the task install its handlers before the signal arrives.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!waiter.is_finished());

    let status = Command::new("kill")
        .arg("-TERM")
        .arg(std::process::id().to_string())
        .status()
        .unwrap();
    assert!(status.success());

    tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .expect("shutdown_signal did not resolve on SIGTERM")
        .unwrap();
}
