use crate::common::TestHelper;
use mockito::Matcher;
use pitlane_client::{ClientError, LoadOutcome, UserSort, UserTable};
use pitlane_mocks::{envelope, make_user};
use pitlane_types::Role;
use serde_json::json;

#[tokio::test]
async fn test_user_directory_pages_by_number() {
    let mut helper = TestHelper::new(2, true).await.unwrap();
    let first = [
        make_user("u1", "heeltoe", Role::Admin),
        make_user("u2", "apex", Role::User),
    ];
    let second = [make_user("u3", "boost", Role::Moderator)];
    helper.api.mock_page("admin/users", 1, 2, &first, 2, 3).await;
    helper.api.mock_page("admin/users", 2, 2, &second, 2, 3).await;

    let directory = helper.client.user_directory();
    directory.load_initial().await;
    assert_eq!(directory.len(), 2);

    let err = directory.on_sentinel_visible().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidTrigger(_, "numbered")));
    assert!(!directory.sentinel_visible());

    assert_eq!(
        directory.next_page().await.unwrap(),
        LoadOutcome::Loaded { added: 1 }
    );
    let snapshot = directory.snapshot();
    assert_eq!(snapshot.current_page, 2);
    assert_eq!(snapshot.items.len(), 1);
    assert_eq!(snapshot.items[0].id, "u3");

    assert_eq!(directory.next_page().await.unwrap(), LoadOutcome::Skipped);
    assert_eq!(
        directory.previous_page().await.unwrap(),
        LoadOutcome::Loaded { added: 2 }
    );
}

#[tokio::test]
async fn test_role_and_ban_updates_flow_into_table() {
    let mut helper = TestHelper::new(10, true).await.unwrap();
    let users = vec![
        make_user("u1", "heeltoe", Role::Admin),
        make_user("u2", "apex", Role::User),
    ];

    let mut promoted = users[1].clone();
    promoted.role = Role::Moderator;
    let role = helper
        .api
        .server()
        .mock("PUT", "/api/admin/users/u2/role")
        .match_body(Matcher::Json(json!({"role": "moderator"})))
        .with_status(200)
        .with_body(envelope(&promoted).to_string())
        .create_async()
        .await;

    let mut banned = promoted.clone();
    banned.banned = true;
    let ban = helper
        .api
        .server()
        .mock("PUT", "/api/admin/users/u2/ban")
        .match_body(Matcher::Json(json!({"banned": true})))
        .with_status(200)
        .with_body(envelope(&banned).to_string())
        .create_async()
        .await;

    let mut table = UserTable::new(users);
    table.sort = UserSort::Username;

    let updated = helper
        .client
        .set_user_role("u2", Role::Moderator)
        .await
        .unwrap();
    assert!(table.apply(updated));

    let updated = helper.client.set_user_banned("u2", true).await.unwrap();
    assert!(table.apply(updated));

    table.filter.banned = Some(true);
    let rows = table.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].role, Role::Moderator);

    role.assert_async().await;
    ban.assert_async().await;
}

#[tokio::test]
async fn test_delete_user() {
    let mut helper = TestHelper::new(10, true).await.unwrap();
    let mock = helper.api.mock_ack("DELETE", "admin/users/u2").await;

    let mut table = UserTable::new(vec![make_user("u2", "apex", Role::User)]);
    helper.client.delete_user("u2").await.unwrap();
    assert!(table.remove("u2").is_some());
    assert!(table.is_empty());
    mock.assert_async().await;
}
