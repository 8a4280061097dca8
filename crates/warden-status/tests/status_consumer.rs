//! Integration tests for the status event consumer.

use std::time::Duration;

use warden_status::{
    ConnectivityState, SharedStatus, StatusError, StatusTracker, StoreKind,
    spawn_status_consumer,
};

/// Lets the consumer task drain its queue.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

#[tokio::test]
async fn test_consumer_applies_events_to_tracker() {
    let status = SharedStatus::new();
    let (sender, _task) = spawn_status_consumer(status.clone(), 8);

    sender
        .send(StoreKind::Primary, ConnectivityState::Connected)
        .await
        .expect("consumer running");
    settle().await;

    assert!(status.is_connected(StoreKind::Primary));
    assert_eq!(status.get(StoreKind::Cache), ConnectivityState::Uninitialized);
}

#[tokio::test]
async fn test_consumer_applies_events_in_arrival_order() {
    let status = SharedStatus::new();
    let (sender, _task) = spawn_status_consumer(status.clone(), 8);

    for state in [
        ConnectivityState::Connecting,
        ConnectivityState::Connected,
        ConnectivityState::Disconnected,
    ] {
        sender.send(StoreKind::Cache, state).await.expect("consumer running");
    }
    settle().await;

    assert_eq!(status.get(StoreKind::Cache), ConnectivityState::Disconnected);
}

#[tokio::test]
async fn test_try_send_from_sync_callback() {
    let status = SharedStatus::new();
    let (sender, _task) = spawn_status_consumer(status.clone(), 8);

    // Simulates a client library callback that can't await.
    let callback = {
        let sender = sender.clone();
        move || sender.try_send(StoreKind::Cache, ConnectivityState::Error)
    };
    callback().expect("queue has room");
    settle().await;

    assert_eq!(status.get(StoreKind::Cache), ConnectivityState::Error);
}

#[tokio::test]
async fn test_consumer_stops_when_senders_dropped() {
    let status = SharedStatus::new();
    let (sender, task) = spawn_status_consumer(status, 1);

    drop(sender);

    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("consumer should exit")
        .expect("consumer should not panic");
}

#[tokio::test]
async fn test_send_after_consumer_abort_returns_closed() {
    let status = SharedStatus::new();
    let (sender, task) = spawn_status_consumer(status, 1);

    task.abort();
    let _ = task.await;

    let result = sender
        .send(StoreKind::Cache, ConnectivityState::Connected)
        .await;
    assert!(matches!(result, Err(StatusError::ConsumerClosed)));
}
