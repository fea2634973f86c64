use crate::common::{TestHelper, TOKEN};
use mockito::Matcher;
use pitlane_client::{ClientError, Session};
use pitlane_mocks::{envelope, make_user};
use pitlane_types::{NewUser, ProfileUpdate, Role};
use serde_json::json;

#[tokio::test]
async fn test_login_starts_session() {
    let mut helper = TestHelper::new(10, false).await.unwrap();
    let user = make_user("u42", "rotary", Role::User);
    let login = helper.api.mock_login(&user, "fresh-jwt").await;

    let signed_in = helper
        .client
        .login("rotary@pitlane.test", "13b-rew")
        .await
        .unwrap();

    assert_eq!(signed_in.id, "u42");
    assert_eq!(helper.session.token().as_deref(), Some("fresh-jwt"));
    assert_eq!(helper.session.current_user_id().as_deref(), Some("u42"));
    login.assert_async().await;
}

#[tokio::test]
async fn test_failed_login_leaves_session_empty() {
    let mut helper = TestHelper::new(10, false).await.unwrap();
    helper
        .api
        .mock_rejection("POST", "auth/login", 400, "Invalid credentials")
        .await;

    let err = helper
        .client
        .login("rotary@pitlane.test", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api(message) if message == "Invalid credentials"));
    assert!(!helper.session.is_authenticated());
}

#[tokio::test]
async fn test_register() {
    let mut helper = TestHelper::new(10, false).await.unwrap();
    let user = make_user("u43", "vtec", Role::User);
    let mock = helper
        .api
        .server()
        .mock("POST", "/api/auth/register")
        .match_body(Matcher::PartialJson(json!({"username": "vtec"})))
        .with_status(201)
        .with_body(envelope(&json!({"token": "new-jwt", "user": user})).to_string())
        .create_async()
        .await;

    helper
        .client
        .register(&NewUser {
            username: "vtec".to_string(),
            email: "vtec@pitlane.test".to_string(),
            password: "kicked-in-yo".to_string(),
        })
        .await
        .unwrap();

    assert!(helper.session.is_authenticated());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_logout_clears_session_even_if_server_fails() {
    let mut helper = TestHelper::new(10, true).await.unwrap();
    let mock = helper
        .api
        .server()
        .mock("POST", "/api/auth/logout")
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .with_status(503)
        .create_async()
        .await;

    helper.client.logout().await.unwrap();

    assert_eq!(helper.session.token(), None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_expired_session() {
    let mut helper = TestHelper::new(10, true).await.unwrap();
    helper
        .api
        .mock_json("GET", "auth/me", 401, json!({"success": false, "message": "jwt expired"}))
        .await;

    let err = helper.client.current_user().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(err.requires_sign_in());
}

#[tokio::test]
async fn test_update_profile() {
    let mut helper = TestHelper::new(10, true).await.unwrap();
    let mut user = make_user("u1", "heeltoe", Role::User);
    user.car = Some("2004 Subaru STI".to_string());

    let mock = helper
        .api
        .server()
        .mock("PUT", "/api/users/profile")
        .match_body(Matcher::Json(json!({"car": "2004 Subaru STI"})))
        .with_status(200)
        .with_body(envelope(&user).to_string())
        .create_async()
        .await;

    let updated = helper
        .client
        .update_profile(&ProfileUpdate {
            car: Some("2004 Subaru STI".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.car.as_deref(), Some("2004 Subaru STI"));
    mock.assert_async().await;
}
