use crate::common::TestHelper;
use pitlane_client::{ClientError, ReadMark, ToggleOutcome};
use pitlane_mocks::make_notification;
use pitlane_types::UnreadCount;

#[tokio::test]
async fn test_unread_count() {
    let mut helper = TestHelper::new(20, true).await.unwrap();
    let mock = helper
        .api
        .mock_ok("GET", "notifications/unread-count", &UnreadCount { count: 4 })
        .await;

    assert_eq!(helper.client.unread_count().await.unwrap(), 4);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_notifications_require_session() {
    let mut helper = TestHelper::new(20, false).await.unwrap();
    let untouched = helper.api.mock_untouched("GET", "notifications").await;

    let err = helper.client.list_notifications(1).await.unwrap_err();
    assert!(err.requires_sign_in());

    let feed = helper.client.notification_feed();
    feed.load_initial().await;
    assert!(feed.snapshot().error.is_some());
    assert!(feed.is_empty());

    untouched.assert_async().await;
}

#[tokio::test]
async fn test_read_mark_reverts_on_failure() {
    let mut helper = TestHelper::new(20, true).await.unwrap();
    let notifications = [make_notification("n1", false), make_notification("n2", false)];
    helper
        .api
        .mock_page("notifications", 1, 20, &notifications, 1, 2)
        .await;
    helper
        .api
        .mock_rejection("PUT", "notifications/n1/read", 404, "Notification not found")
        .await;
    helper.api.mock_ack("PUT", "notifications/n2/read").await;

    let feed = helper.client.notification_feed();
    feed.load_initial().await;

    let reads = helper.client.read_board();
    for notification in feed.items() {
        reads.insert(notification.id.clone(), ReadMark { read: notification.read });
    }

    let outcome = helper.client.read_notification(&reads, "n1").await.unwrap();
    assert!(matches!(
        outcome,
        ToggleOutcome::Reverted { state: ReadMark { read: false }, .. }
    ));

    let outcome = helper.client.read_notification(&reads, "n2").await.unwrap();
    assert_eq!(outcome, ToggleOutcome::Confirmed(ReadMark { read: true }));
    feed.update_item("n2", |n| n.read = true);

    let unread: Vec<String> = feed
        .items()
        .into_iter()
        .filter(|n| !n.read)
        .map(|n| n.id)
        .collect();
    assert_eq!(unread, vec!["n1"]);
}

#[tokio::test]
async fn test_mark_all_read() {
    let mut helper = TestHelper::new(20, true).await.unwrap();
    let mock = helper.api.mock_ack("PUT", "notifications/read-all").await;

    helper.client.mark_all_notifications_read().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_notification_is_rejected_locally() {
    let helper = TestHelper::new(20, true).await.unwrap();
    let reads = helper.client.read_board();

    let err = helper
        .client
        .read_notification(&reads, "n404")
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnknownItem(_)));
}
