use crate::common::{TestHelper, USER_ID};
use pitlane_client::{ClientError, LoadOutcome, Reentrancy, ToggleOutcome};
use pitlane_mocks::make_post;
use pitlane_types::{EngagementState, FeedSort, NewPost, PostQuery};
use serde_json::json;

#[tokio::test]
async fn test_feed_accumulates_pages() {
    let mut helper = TestHelper::new(2, false).await.unwrap();
    let first = [make_post("p1", "u2", &[]), make_post("p2", "u3", &[])];
    let second = [make_post("p3", "u2", &[])];

    let page_one = helper.api.mock_page("posts", 1, 2, &first, 2, 3).await;
    let page_two = helper.api.mock_page("posts", 2, 2, &second, 2, 3).await;

    let feed = helper.client.post_feed(PostQuery {
        category: Some("builds".to_string()),
        search: None,
        sort: FeedSort::Popular,
    });

    assert_eq!(feed.load_initial().await, LoadOutcome::Loaded { added: 2 });
    assert!(feed.has_more());
    assert!(feed.sentinel_visible());

    assert_eq!(
        feed.on_sentinel_visible().await.unwrap(),
        LoadOutcome::Loaded { added: 1 }
    );
    let ids: Vec<String> = feed.items().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
    assert!(!feed.has_more());
    assert!(!feed.sentinel_visible());

    // exhausted, nothing else is requested
    assert_eq!(
        feed.on_sentinel_visible().await.unwrap(),
        LoadOutcome::Skipped
    );

    page_one.assert_async().await;
    page_two.assert_async().await;
}

#[tokio::test]
async fn test_feed_failure_hides_sentinel_until_retry() {
    let mut helper = TestHelper::new(2, false).await.unwrap();
    let first = [make_post("p1", "u2", &[]), make_post("p2", "u3", &[])];
    helper.api.mock_page("posts", 1, 2, &first, 3, 6).await;

    let feed = helper.client.post_feed(PostQuery::default());
    feed.load_initial().await;
    assert!(feed.sentinel_visible());

    let failing = helper
        .api
        .mock_rejection("GET", "posts", 500, "Database unavailable")
        .await;

    assert_eq!(feed.load_more().await.unwrap(), LoadOutcome::Failed);
    failing.assert_async().await;
    assert_eq!(feed.len(), 2);
    assert!(!feed.sentinel_visible());
    assert_eq!(
        feed.snapshot().error.map(|e| e.message),
        Some("Database unavailable".to_string())
    );
}

#[tokio::test]
async fn test_like_reverts_when_server_rejects() {
    let mut helper = TestHelper::new(10, true).await.unwrap();
    let posts = vec![
        make_post("p1", "u2", &["u7", "u8"]),
        make_post("p2", "u2", &[USER_ID]),
    ];

    let board = helper.client.engagement_board(Reentrancy::Serialize);
    board.track(&posts);
    assert_eq!(board.state("p2"), Some(EngagementState::new(true, 1)));

    let rejected = helper
        .api
        .mock_rejection("POST", "posts/p1/like", 500, "Try again later")
        .await;
    let accepted = helper.api.mock_ack("POST", "posts/p2/like").await;

    let outcome = helper.client.toggle_post_like(&board, "p1").await.unwrap();
    assert_eq!(
        outcome,
        ToggleOutcome::Reverted {
            state: EngagementState::new(false, 2),
            reason: "Try again later".to_string()
        }
    );

    let outcome = helper.client.toggle_post_like(&board, "p2").await.unwrap();
    assert_eq!(
        outcome,
        ToggleOutcome::Confirmed(EngagementState::new(false, 0))
    );

    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_like_without_session_sends_nothing() {
    let mut helper = TestHelper::new(10, false).await.unwrap();
    let untouched = helper.api.mock_untouched("POST", "posts/p1/like").await;

    let board = helper.client.engagement_board(Reentrancy::Allow);
    board.track(&[make_post("p1", "u2", &["u3"])]);

    let err = helper
        .client
        .toggle_post_like(&board, "p1")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::SignInRequired));
    assert!(err.to_string().contains("/signin"));
    assert_eq!(board.state("p1"), Some(EngagementState::new(false, 1)));
    untouched.assert_async().await;
}

#[tokio::test]
async fn test_created_post_goes_to_top_of_feed() {
    let mut helper = TestHelper::new(2, true).await.unwrap();
    helper
        .api
        .mock_page("posts", 1, 2, &[make_post("p1", "u2", &[])], 1, 1)
        .await;

    let created = make_post("p9", "u1", &[]);
    let create = helper
        .api
        .server()
        .mock("POST", "/api/posts")
        .match_header("authorization", "Bearer test-jwt")
        .match_body(mockito::Matcher::PartialJson(
            json!({"title": "Build thread p9"}),
        ))
        .with_status(201)
        .with_body(pitlane_mocks::envelope(&created).to_string())
        .create_async()
        .await;

    let feed = helper.client.post_feed(PostQuery::default());
    feed.load_initial().await;

    let post = helper
        .client
        .create_post(&NewPost {
            title: "Build thread p9".to_string(),
            content: "Fresh turbo".to_string(),
            category: None,
            images: vec![],
        })
        .await
        .unwrap();
    feed.prepend(post);

    let ids: Vec<String> = feed.items().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["p9", "p1"]);
    create.assert_async().await;
}

#[tokio::test]
async fn test_delete_post_rejected() {
    let mut helper = TestHelper::new(2, true).await.unwrap();
    helper
        .api
        .mock_rejection("DELETE", "posts/p1", 403, "Not authorized to delete this post")
        .await;

    let err = helper.client.delete_post("p1").await.unwrap_err();
    assert!(
        matches!(err, ClientError::Api(message) if message == "Not authorized to delete this post")
    );
}

#[tokio::test]
async fn test_confirmed_like_survives_tracking_cached_items() {
    let mut helper = TestHelper::new(1, true).await.unwrap();
    helper
        .api
        .mock_page("posts", 1, 1, &[make_post("p1", "u2", &[])], 2, 2)
        .await;
    helper
        .api
        .mock_page("posts", 2, 1, &[make_post("p2", "u3", &["u4"])], 2, 2)
        .await;
    helper.api.mock_ack("POST", "posts/p1/like").await;

    let feed = helper.client.post_feed(PostQuery::default());
    let board = helper.client.engagement_board(Reentrancy::Serialize);

    feed.load_initial().await;
    board.track(&feed.items());

    let outcome = helper.client.toggle_post_like(&board, "p1").await.unwrap();
    assert_eq!(
        outcome,
        ToggleOutcome::Confirmed(EngagementState::new(true, 1))
    );

    // the loaded p1 still lists no likes; tracking the grown list must not undo
    feed.load_more().await.unwrap();
    board.track(&feed.items());

    assert_eq!(board.state("p1"), Some(EngagementState::new(true, 1)));
    assert_eq!(board.state("p2"), Some(EngagementState::new(false, 1)));

    // a real refetch is authoritative
    board.resync_from(&[make_post("p1", "u2", &[USER_ID, "u5"])]);
    assert_eq!(board.state("p1"), Some(EngagementState::new(true, 2)));
}
