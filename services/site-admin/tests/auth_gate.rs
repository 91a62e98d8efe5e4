//! 邮箱验证码登录与访问控制

mod common;

use axum::http::StatusCode;
use common::TestApp;
use futures::future::join_all;
use serde_json::json;
use siteops_auth_core::TokenService;

const EMAIL: &str = "site.manager@example.com";

#[tokio::test]
async fn test_every_path_requires_token() {
    let app = TestApp::new();
    for (method, path) in [
        ("GET", "/"),
        ("GET", "/sites"),
        ("POST", "/sites"),
        ("GET", "/auth/me"),
        ("GET", "/sites/0190a3c2-0000-7000-8000-000000000000/stock"),
        ("GET", "/definitely/not/a/page"),
    ] {
        let (status, problem) = app.call(method, path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, path);
        assert_eq!(problem["instance"], path);
    }
}

#[tokio::test]
async fn test_invalid_tokens_rejected() {
    let app = TestApp::new();

    let (status, _) = app.call("GET", "/sites", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TokenService::new("some-other-secret-some-other-secret", 3600, "siteops", "siteops-admin")
        .generate_access_token(EMAIL)
        .unwrap();
    let (status, _) = app.call("GET", "/sites", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_path_after_sign_in_is_not_found() {
    let app = TestApp::new();
    let (status, problem) = app.get("/definitely/not/a/page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["instance"], "/definitely/not/a/page");
}

#[tokio::test]
async fn test_empty_email_makes_no_calls() {
    let app = TestApp::new();
    for body in [json!({"email": ""}), json!({"email": "   "}), json!({})] {
        let (status, _) = app.call("POST", "/auth/otp", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert_eq!(app.challenges.calls(), 0);
    assert_eq!(app.mailer.count(), 0);
}

#[tokio::test]
async fn test_malformed_email_rejected() {
    let app = TestApp::new();
    let (status, _) = app
        .call("POST", "/auth/otp", None, Some(json!({"email": "manager-at-site"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.mailer.count(), 0);
}

#[tokio::test]
async fn test_sign_in_with_emailed_code() {
    let app = TestApp::new();

    let (status, body) = app
        .call("POST", "/auth/otp", None, Some(json!({"email": "  Site.Manager@Example.com "})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["expires_in"].as_i64().unwrap() > 0);

    let sent = app.mailer.sent.lock().unwrap().last().cloned().unwrap();
    assert_eq!(sent.to, EMAIL);
    let code = app.mailer.last_code().unwrap();
    let stored = app.challenges.challenges.lock().unwrap()[0].clone();
    assert_ne!(stored.code_hash, code);

    let (status, session) = app
        .call("POST", "/auth/verify", None, Some(json!({"email": EMAIL, "code": code})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["token_type"], "Bearer");
    assert_eq!(session["email"], EMAIL);

    let token = session["access_token"].as_str().unwrap();
    let (status, me) = app.call("GET", "/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], EMAIL);

    let (status, _) = app.call("GET", "/sites", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call("POST", "/auth/verify", None, Some(json!({"email": EMAIL, "code": code})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_code_stays_signed_out() {
    let app = TestApp::new();
    app.call("POST", "/auth/otp", None, Some(json!({"email": EMAIL})))
        .await;
    let code = app.mailer.last_code().unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = app
        .call("POST", "/auth/verify", None, Some(json!({"email": EMAIL, "code": wrong})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("access_token").is_none());
    assert_eq!(app.challenges.challenges.lock().unwrap()[0].attempts, 1);
}

#[tokio::test]
async fn test_empty_code_makes_no_store_call() {
    let app = TestApp::new();
    let (status, _) = app
        .call("POST", "/auth/verify", None, Some(json!({"email": EMAIL, "code": " "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.challenges.calls(), 0);
}

#[tokio::test]
async fn test_attempts_exhausted_locks_code() {
    let app = TestApp::new();
    let max_attempts = common::test_config().otp.max_attempts;
    app.call("POST", "/auth/otp", None, Some(json!({"email": EMAIL})))
        .await;
    let code = app.mailer.last_code().unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    for _ in 0..max_attempts {
        app.call("POST", "/auth/verify", None, Some(json!({"email": EMAIL, "code": wrong})))
            .await;
    }
    let (status, problem) = app
        .call("POST", "/auth/verify", None, Some(json!({"email": EMAIL, "code": code})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(problem["detail"].as_str().unwrap().contains("Too many attempts"));
}

#[tokio::test]
async fn test_daily_request_limit() {
    let app = TestApp::new();
    let limit = common::test_config().otp.max_requests_per_day;

    for _ in 0..limit {
        let (status, _) = app
            .call("POST", "/auth/otp", None, Some(json!({"email": EMAIL})))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = app
        .call("POST", "/auth/otp", None, Some(json!({"email": EMAIL})))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.mailer.count(), limit as usize);
}

#[tokio::test]
async fn test_sign_out_acknowledged() {
    let app = TestApp::new();
    let (status, body) = app
        .call("POST", "/auth/sign-out", Some(&app.token()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notice"]["message"], "Signed out");
}

async fn issued_code(app: &TestApp) -> (String, String) {
    app.call("POST", "/auth/otp", None, Some(json!({"email": EMAIL})))
        .await;
    let code = app.mailer.last_code().unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" }.to_string();
    (code, wrong)
}

#[tokio::test]
async fn test_concurrent_wrong_codes_respect_attempt_limit() {
    let app = TestApp::new();
    let max_attempts = common::test_config().otp.max_attempts;
    let (code, wrong) = issued_code(&app).await;
    app.challenges.set_yield_after_read(true);

    let guesses = (0..20).map(|_| {
        app.call("POST", "/auth/verify", None, Some(json!({"email": EMAIL, "code": wrong})))
    });
    let results = join_all(guesses).await;

    assert!(results.iter().all(|(status, _)| *status == StatusCode::UNAUTHORIZED));
    let counted = results
        .iter()
        .filter(|(_, problem)| problem["detail"].as_str().unwrap().contains("Invalid sign-in code"))
        .count();
    assert_eq!(counted, max_attempts as usize);
    assert_eq!(app.challenges.challenges.lock().unwrap()[0].attempts, max_attempts);

    let (status, problem) = app
        .call("POST", "/auth/verify", None, Some(json!({"email": EMAIL, "code": code})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(problem["detail"].as_str().unwrap().contains("Too many attempts"));
}

#[tokio::test]
async fn test_concurrent_correct_codes_sign_in_once() {
    let app = TestApp::new();
    let (code, _) = issued_code(&app).await;
    app.challenges.set_yield_after_read(true);

    let body = json!({"email": EMAIL, "code": code});
    let (first, second) = tokio::join!(
        app.call("POST", "/auth/verify", None, Some(body.clone())),
        app.call("POST", "/auth/verify", None, Some(body.clone())),
    );

    let signed_in: Vec<_> = [&first, &second]
        .into_iter()
        .filter(|(status, _)| *status == StatusCode::OK)
        .collect();
    assert_eq!(signed_in.len(), 1);
    assert!(signed_in[0].1["access_token"].is_string());

    let rejected = if first.0 == StatusCode::OK { &second } else { &first };
    assert_eq!(rejected.0, StatusCode::UNAUTHORIZED);
    assert!(rejected.1.get("access_token").is_none());
}

#[tokio::test]
async fn test_verified_code_cannot_be_reused() {
    let app = TestApp::new();
    let (code, _) = issued_code(&app).await;
    let body = json!({"email": EMAIL, "code": code});

    let (status, _) = app.call("POST", "/auth/verify", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..2 {
        let (status, problem) = app.call("POST", "/auth/verify", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(problem.get("access_token").is_none());
    }
    assert!(app.challenges.challenges.lock().unwrap()[0].verified_at.is_some());
}
