mod common;

use std::sync::Arc;

use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::FullName;
use account_service::domain::user::models::User;
use account_service::domain::user::models::UserId;
use account_service::domain::user::ports::UserRepository;
use account_service::user::errors::UserError;
use async_trait::async_trait;
use chrono::Duration;
use common::set_cookie_header;
use common::set_cookie_value;
use common::InMemoryUserRepository;
use common::TestApp;
use common::Tokens;
use reqwest::StatusCode;
use serde_json::json;

/// Store whose reads are immediately followed by a logout, so every write
/// that comes after a read races a revocation.
#[derive(Default)]
struct LogoutAfterRead {
    inner: InMemoryUserRepository,
}

#[async_trait]
impl UserRepository for LogoutAfterRead {
    async fn create(&self, user: User) -> Result<User, UserError> {
        self.inner.create(user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let user = self.inner.find_by_id(id).await?;
        if user.is_some() {
            self.inner.update_refresh_token(id, None).await?;
        }
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, UserError> {
        self.inner.find_by_username_or_email(identifier).await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        full_name: &FullName,
        email: &EmailAddress,
    ) -> Result<User, UserError> {
        self.inner.update_profile(id, full_name, email).await
    }

    async fn update_refresh_token(
        &self,
        id: &UserId,
        refresh_token: Option<String>,
    ) -> Result<User, UserError> {
        self.inner.update_refresh_token(id, refresh_token).await
    }

    async fn rotate_refresh_token(
        &self,
        id: &UserId,
        current: &str,
        next: String,
    ) -> Result<Option<User>, UserError> {
        self.inner.rotate_refresh_token(id, current, next).await
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<User, UserError> {
        self.inner.update_password_hash(id, password_hash).await
    }
}

#[tokio::test]
async fn test_login_sets_cookies_and_stores_refresh_token() {
    let app = TestApp::spawn().await;
    app.register("alice", "pass_word!").await;

    let response = app.login("alice", "pass_word!").await;
    assert_eq!(response.status(), StatusCode::OK);

    let access_header = set_cookie_header(&response, "accessToken").expect("access cookie");
    let refresh_header = set_cookie_header(&response, "refreshToken").expect("refresh cookie");
    for header in [&access_header, &refresh_header] {
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
    }

    let refresh_cookie = set_cookie_value(&response, "refreshToken").unwrap();
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let tokens = Tokens::from_body(&body);
    assert_eq!(tokens.refresh_token, refresh_cookie);
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert!(body["data"]["user"].get("refresh_token").is_none());

    let stored = app.stored_user("alice").await;
    assert_eq!(stored.refresh_token.as_deref(), Some(refresh_cookie.as_str()));
}

#[tokio::test]
async fn test_login_with_email() {
    let app = TestApp::spawn().await;
    app.register("alice", "pass_word!").await;

    let response = app
        .post("/login")
        .json(&json!({ "email": "ALICE@example.com", "password": "pass_word!" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::spawn().await;
    app.register("alice", "pass_word!").await;

    let wrong_password = app.login("alice", "not_it").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_header(&wrong_password, "refreshToken").is_none());
    assert!(app.stored_user("alice").await.refresh_token.is_none());

    let unknown = app.login("nobody", "pass_word!").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let no_identifier = app
        .post("/login")
        .json(&json!({ "password": "pass_word!" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(no_identifier.status(), StatusCode::BAD_REQUEST);

    let no_password = app
        .post("/login")
        .json(&json!({ "username": "alice" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(no_password.status(), StatusCode::BAD_REQUEST);
    assert!(app.stored_user("alice").await.refresh_token.is_none());
}

#[tokio::test]
async fn test_second_login_supersedes_first_session() {
    let app = TestApp::spawn().await;
    let first = app.register_and_login("alice", "pass_word!").await;

    let response = app.login("alice", "pass_word!").await;
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let second = Tokens::from_body(&body);
    assert_ne!(first.refresh_token, second.refresh_token);

    let stale = app.refresh_with_body(&first.refresh_token).await;
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    let live = app.refresh_with_body(&second.refresh_token).await;
    assert_eq!(live.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rotates_token() {
    let app = TestApp::spawn().await;
    let original = app.register_and_login("alice", "pass_word!").await;

    let response = app.refresh_with_body(&original.refresh_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookie_header(&response, "accessToken").is_some());
    let rotated_cookie = set_cookie_value(&response, "refreshToken").expect("refresh cookie");

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let rotated = Tokens::from_body(&body);
    assert_ne!(rotated.refresh_token, original.refresh_token);
    assert_eq!(rotated.refresh_token, rotated_cookie);
    assert_eq!(
        app.stored_user("alice").await.refresh_token.as_deref(),
        Some(rotated.refresh_token.as_str())
    );

    // A rotated-out token is rejected and does not disturb the live one.
    let replay = app.refresh_with_body(&original.refresh_token).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.stored_user("alice").await.refresh_token.as_deref(),
        Some(rotated.refresh_token.as_str())
    );

    let next = app.refresh_with_body(&rotated.refresh_token).await;
    assert_eq!(next.status(), StatusCode::OK);

    // The new access token works on protected routes.
    let response = app
        .get("/current-user")
        .bearer_auth(&rotated.access_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_reads_cookie_before_body() {
    let app = TestApp::spawn().await;
    let tokens = app.register_and_login("alice", "pass_word!").await;

    let response = app
        .post("/refresh-token")
        .header("Cookie", format!("refreshToken={}", tokens.refresh_token))
        .json(&json!({ "refresh_token": "garbage" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_without_token() {
    let app = TestApp::spawn().await;

    let no_body = app
        .post("/refresh-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(no_body.status(), StatusCode::UNAUTHORIZED);

    let empty_field = app.refresh_with_body("").await;
    assert_eq!(empty_field.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rejects_tampered_token() {
    let app = TestApp::spawn().await;
    let tokens = app.register_and_login("alice", "pass_word!").await;

    let mut tampered = tokens.refresh_token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = app.refresh_with_body(&tampered).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // An access token is signed with the other secret.
    let response = app.refresh_with_body(&tokens.access_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(
        app.stored_user("alice").await.refresh_token.as_deref(),
        Some(tokens.refresh_token.as_str())
    );
}

#[tokio::test]
async fn test_refresh_rejects_expired_token() {
    let app = TestApp::spawn().await;
    app.register_and_login("alice", "pass_word!").await;
    let user = app.stored_user("alice").await;

    let expired = common::token_issuer(Duration::minutes(15), Duration::seconds(-120))
        .issue_refresh_token(user.id)
        .unwrap();

    let response = app.refresh_with_body(&expired).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("expired"));
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::spawn().await;
    let tokens = app.register_and_login("alice", "pass_word!").await;

    let response = app
        .post("/logout")
        .bearer_auth(&tokens.access_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookie_value(&response, "accessToken").as_deref(), Some(""));
    assert_eq!(set_cookie_value(&response, "refreshToken").as_deref(), Some(""));

    assert!(app.stored_user("alice").await.refresh_token.is_none());

    let replay = app.refresh_with_body(&tokens.refresh_token).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_racing_logout_does_not_revive_session() {
    let app = TestApp::spawn_with(Arc::new(LogoutAfterRead::default()), None).await;
    let tokens = app.register_and_login("alice", "pass_word!").await;

    let response = app.refresh_with_body(&tokens.refresh_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(set_cookie_header(&response, "refreshToken").is_none());

    assert!(app.stored_user("alice").await.refresh_token.is_none());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::spawn().await;
    let tokens = app.register_and_login("alice", "pass_word!").await;

    for _ in 0..2 {
        let response = app
            .post("/logout")
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert!(app.stored_user("alice").await.refresh_token.is_none());
}

#[tokio::test]
async fn test_change_password_wrong_old_password() {
    let app = TestApp::spawn().await;
    let tokens = app.register_and_login("alice", "pass_word!").await;
    let before = app.stored_user("alice").await;

    let response = app
        .post("/change-password")
        .bearer_auth(&tokens.access_token)
        .json(&json!({ "old_password": "not_it", "new_password": "new_pass!" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = app.stored_user("alice").await;
    assert_eq!(after.password_hash, before.password_hash);
    assert_eq!(after.refresh_token, before.refresh_token);
}

#[tokio::test]
async fn test_change_password_success() {
    let app = TestApp::spawn().await;
    let tokens = app.register_and_login("alice", "pass_word!").await;

    let response = app
        .post("/change-password")
        .bearer_auth(&tokens.access_token)
        .json(&json!({ "old_password": "pass_word!", "new_password": "new_pass!" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookie_value(&response, "refreshToken").as_deref(), Some(""));
    assert!(app.stored_user("alice").await.refresh_token.is_none());

    let replay = app.refresh_with_body(&tokens.refresh_token).await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let old = app.login("alice", "pass_word!").await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = app.login("alice", "new_pass!").await;
    assert_eq!(new.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_blank_new_password() {
    let app = TestApp::spawn().await;
    let tokens = app.register_and_login("alice", "pass_word!").await;

    let response = app
        .post("/change-password")
        .bearer_auth(&tokens.access_token)
        .json(&json!({ "old_password": "pass_word!", "new_password": "  " }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
