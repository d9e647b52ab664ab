//! Account lifecycle and user record routes.

mod common;

use axum::http::Method;
use serde_json::json;

use common::{admin, auth, request, sample_user};
use smarthome_core::kernel::TestDependencies;
use smarthome_core::server::router::dispatch;

#[tokio::test]
async fn registration_creates_a_home_user_under_the_identity_subject() {
    let test = TestDependencies::new();

    let req = request(
        Method::POST,
        "/smart-home/register",
        Some(json!({
            "userName": "Ada",
            "email": "ada@example.com",
            "password": "hunter2!",
            "mobileNumber": "+15550100",
        })),
        None,
    );
    let response = dispatch(req, test.deps.clone()).await;

    assert_eq!(response.status_code, 201);
    assert_eq!(response.message(), Some("User registered successfully"));

    let user_id = response.body["userId"].as_str().unwrap().to_string();
    assert_eq!(test.identity.subject_for("ada@example.com"), Some(user_id.clone()));

    let users = test.store.docs("users");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], json!(user_id));
    // New accounts start at home, so no alert fires before the user has
    // ever set their presence.
    assert_eq!(users[0]["isHome"], json!(true));
    assert_eq!(users[0]["isAdmin"], json!(false));
}

#[tokio::test]
async fn verification_checks_the_confirmation_code() {
    let test = TestDependencies::new();

    let req = request(
        Method::POST,
        "/smart-home/verify-user",
        Some(json!({"email": "ada@example.com", "otp": "000000"})),
        None,
    );
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(response.message(), Some("Invalid verification code"));

    let req = request(
        Method::POST,
        "/smart-home/verify-user",
        Some(json!({"email": "ada@example.com", "otp": "123456"})),
        None,
    );
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 201);
    assert_eq!(response.message(), Some("Email verification done"));
}

#[tokio::test]
async fn password_reset_requires_the_new_password() {
    let test = TestDependencies::new();

    let req = request(
        Method::POST,
        "/smart-home/verify-user",
        Some(json!({
            "email": "ada@example.com",
            "otp": "123456",
            "isForgetPassword": true,
        })),
        None,
    );
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 400);

    let req = request(
        Method::POST,
        "/smart-home/verify-user",
        Some(json!({
            "email": "ada@example.com",
            "otp": "123456",
            "isForgetPassword": true,
            "password": "n3w-secret",
        })),
        None,
    );
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 201);
    assert_eq!(response.message(), Some("Password reset confirmed"));
}

#[tokio::test]
async fn login_returns_a_session_for_known_accounts_only() {
    let test = TestDependencies::new();

    let req = request(
        Method::POST,
        "/smart-home/register",
        Some(json!({
            "userName": "Ada",
            "email": "ada@example.com",
            "password": "hunter2!",
            "mobileNumber": "+15550100",
        })),
        None,
    );
    dispatch(req, test.deps.clone()).await;

    let req = request(
        Method::POST,
        "/smart-home/login",
        Some(json!({"email": "ada@example.com", "password": "hunter2!"})),
        None,
    );
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 200);
    assert!(response.body["session"]["accessToken"].as_str().is_some());

    let req = request(
        Method::POST,
        "/smart-home/login",
        Some(json!({"email": "nobody@example.com", "password": "x"})),
        None,
    );
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 401);
    assert_eq!(response.message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn current_user_lookup() {
    let test = TestDependencies::new();
    test.seed_user(&sample_user("u1", true)).await.unwrap();

    let req = request(Method::GET, "/smart-home", None, Some(auth("u1")));
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["user"]["userName"], json!("user-u1"));

    let req = request(Method::GET, "/smart-home", None, Some(auth("u2")));
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 404);
    assert_eq!(response.message(), Some("User not found"));
}

#[tokio::test]
async fn presence_update_merges_into_the_record() {
    let test = TestDependencies::new();
    test.seed_user(&sample_user("u1", true)).await.unwrap();

    let req = request(
        Method::PATCH,
        "/smart-home",
        Some(json!({"isHome": false})),
        Some(auth("u1")),
    );
    let response = dispatch(req, test.deps.clone()).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body["user"]["isHome"], json!(false));
    // Other fields untouched.
    assert_eq!(response.body["user"]["email"], json!("u1@example.com"));
}

#[tokio::test]
async fn user_update_rejects_unknown_fields() {
    let test = TestDependencies::new();
    test.seed_user(&sample_user("u1", true)).await.unwrap();

    // Neither the email nor the admin flag is user-mutable.
    for body in [json!({"email": "new@example.com"}), json!({"isAdmin": true})] {
        let req = request(Method::PATCH, "/smart-home", Some(body), Some(auth("u1")));
        let response = dispatch(req, test.deps.clone()).await;
        assert_eq!(response.status_code, 400);
    }

    let users = test.store.docs("users");
    assert_eq!(users[0]["email"], json!("u1@example.com"));
    assert_eq!(users[0]["isAdmin"], json!(false));
}

#[tokio::test]
async fn user_deletion_is_admin_only() {
    let test = TestDependencies::new();
    test.seed_user(&sample_user("u2", true)).await.unwrap();

    let req = request(Method::DELETE, "/smart-home/u2", None, Some(auth("u1")));
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 403);
    assert_eq!(test.store.doc_count("users"), 1);

    let req = request(Method::DELETE, "/smart-home/u2", None, Some(admin("u1")));
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(test.store.doc_count("users"), 0);

    // A repeated delete reports the record gone.
    let req = request(Method::DELETE, "/smart-home/u2", None, Some(admin("u1")));
    let response = dispatch(req, test.deps.clone()).await;
    assert_eq!(response.status_code, 404);
}

#[tokio::test]
async fn protected_routes_reject_anonymous_callers() {
    let test = TestDependencies::new();

    for (method, path) in [
        (Method::GET, "/smart-home"),
        (Method::PATCH, "/smart-home"),
        (Method::GET, "/smart-home/devices"),
        (Method::GET, "/smart-home/notify"),
    ] {
        let req = request(method, path, None, None);
        let response = dispatch(req, test.deps.clone()).await;
        assert_eq!(response.status_code, 401, "expected 401 for {}", path);
    }
}
