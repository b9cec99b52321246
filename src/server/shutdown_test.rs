//! Tests for graceful shutdown handling

use super::shutdown::*;
use std::time::Duration;

#[tokio::test]
async fn test_shutdown_channel_initially_not_shutdown() {
    let (_controller, signal) = shutdown_channel();

    assert!(!signal.is_shutdown());
}

#[tokio::test]
async fn test_shutdown_channel_triggers_shutdown() {
    let (controller, signal) = shutdown_channel();

    controller.shutdown();

    assert!(signal.is_shutdown());
}

/// wait() completes once shutdown is triggered from another task
#[tokio::test]
async fn test_shutdown_wait_completes_on_signal() {
    let (controller, mut signal) = shutdown_channel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.shutdown();
    });

    let result = tokio::time::timeout(Duration::from_secs(1), signal.wait()).await;

    assert!(
        result.is_ok(),
        "wait() should complete when shutdown triggered"
    );
    assert!(signal.is_shutdown());
}

/// wait() returns immediately if shutdown already happened
#[tokio::test]
async fn test_shutdown_wait_after_trigger_returns_immediately() {
    let (controller, mut signal) = shutdown_channel();
    controller.shutdown();

    let result = tokio::time::timeout(Duration::from_millis(100), signal.wait()).await;

    assert!(result.is_ok());
}

/// Dropping the controller releases waiters instead of hanging them
#[tokio::test]
async fn test_shutdown_wait_completes_when_controller_dropped() {
    let (controller, mut signal) = shutdown_channel();
    drop(controller);

    let result = tokio::time::timeout(Duration::from_secs(1), signal.wait()).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_shutdown_reaches_all_clones() {
    let (controller, signal) = shutdown_channel();
    let cloned = signal.clone();

    assert!(!cloned.is_shutdown());

    controller.shutdown();

    assert!(signal.is_shutdown());
    assert!(cloned.is_shutdown());
}
