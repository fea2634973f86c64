use crate::common::{TestHelper, USER_ID};
use mockito::Matcher;
use pitlane_client::{CommentThread, LoadOutcome, Reentrancy, ToggleOutcome};
use pitlane_mocks::{envelope, make_comment};
use pitlane_types::EngagementState;
use serde_json::json;

#[tokio::test]
async fn test_comment_feed_builds_thread() {
    let mut helper = TestHelper::new(20, false).await.unwrap();
    let comments = [
        make_comment("c1", "p1", None),
        make_comment("c2", "p1", Some("c1")),
        make_comment("c3", "p1", None),
    ];
    helper
        .api
        .mock_page("posts/p1/comments", 1, 20, &comments, 1, 3)
        .await;

    let feed = helper.client.comment_feed("p1");
    assert_eq!(feed.load_initial().await, LoadOutcome::Loaded { added: 3 });
    assert!(!feed.has_more());

    let mut thread = CommentThread::from_comments(feed.items());
    assert_eq!(thread.visible().len(), 2);

    thread.toggle_replies("c1");
    let rows: Vec<(&str, usize)> = thread
        .visible()
        .into_iter()
        .map(|row| (row.comment.id.as_str(), row.depth))
        .collect();
    assert_eq!(rows, vec![("c1", 0), ("c2", 1), ("c3", 0)]);
}

#[tokio::test]
async fn test_reply_is_posted_with_parent() {
    let mut helper = TestHelper::new(20, true).await.unwrap();
    let reply = make_comment("c5", "p1", Some("c1"));

    let mock = helper
        .api
        .server()
        .mock("POST", "/api/posts/p1/comments")
        .match_body(Matcher::Json(
            json!({"content": "Same here", "parentId": "c1"}),
        ))
        .with_status(201)
        .with_body(envelope(&reply).to_string())
        .create_async()
        .await;

    let mut thread = CommentThread::from_comments(vec![make_comment("c1", "p1", None)]);
    let comment = helper
        .client
        .add_comment("p1", "Same here", Some("c1"))
        .await
        .unwrap();
    thread.insert(comment);

    assert!(thread.is_expanded("c1"));
    assert_eq!(thread.reply_count("c1"), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_comment_like_confirmed() {
    let mut helper = TestHelper::new(20, true).await.unwrap();
    let mut comment = make_comment("c1", "p1", None);
    comment.likes = vec!["u4".to_string()];

    let board = helper.client.engagement_board(Reentrancy::Serialize);
    board.track(&[comment]);

    let like = helper.api.mock_ack("POST", "comments/c1/like").await;
    let outcome = helper
        .client
        .toggle_comment_like(&board, "c1")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ToggleOutcome::Confirmed(EngagementState::new(true, 2))
    );
    assert!(!board.is_pending("c1"));
    like.assert_async().await;

    // a refetch that now includes the viewer agrees with the local state
    let mut refetched = make_comment("c1", "p1", None);
    refetched.likes = vec!["u4".to_string(), USER_ID.to_string()];
    board.resync_from(&[refetched]);
    assert_eq!(board.state("c1"), Some(EngagementState::new(true, 2)));
}

#[tokio::test]
async fn test_delete_comment() {
    let mut helper = TestHelper::new(20, true).await.unwrap();
    let mock = helper.api.mock_ack("DELETE", "comments/c2").await;

    let mut thread = CommentThread::from_comments(vec![
        make_comment("c1", "p1", None),
        make_comment("c2", "p1", Some("c1")),
    ]);

    helper.client.delete_comment("c2").await.unwrap();
    assert_eq!(thread.remove("c2"), 1);
    assert_eq!(thread.len(), 1);
    mock.assert_async().await;
}
