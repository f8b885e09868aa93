mod common;

use axum::http::{header, StatusCode};
use common::{body_json, request, session_cookie, test_config, test_state, InMemoryCalendar};
use lichhen::auth::cookies::{SESSION_COOKIE_NAME, STATE_COOKIE_NAME};
use lichhen::web::{build_router, AppState};
use serde_json::json;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn set_cookies(response: &axum::http::Response<axum::body::Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_health() {
    let response = build_router(test_state(InMemoryCalendar::new()))
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signin_redirects_to_google_with_state() {
    let response = build_router(test_state(InMemoryCalendar::new()))
        .oneshot(request("GET", "/api/auth/signin", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    let url = Url::parse(location).unwrap();
    let state_param = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}={}", STATE_COOKIE_NAME, state_param))));
}

#[tokio::test]
async fn test_callback_mints_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.fresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "42",
            "email": "an@example.com",
            "name": "An"
        })))
        .mount(&server)
        .await;

    let config = test_config(&[
        ("GOOGLE_TOKEN_URL", format!("{}/token", server.uri())),
        ("GOOGLE_USERINFO_URL", format!("{}/userinfo", server.uri())),
    ]);
    let state = AppState::new(config, InMemoryCalendar::new()).unwrap();

    let response = build_router(state.clone())
        .oneshot(request(
            "GET",
            "/api/auth/callback/google?code=abc&state=s1",
            Some(&format!("{}=s1", STATE_COOKIE_NAME)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");

    let prefix = format!("{}=", SESSION_COOKIE_NAME);
    let session = set_cookies(&response)
        .into_iter()
        .find(|c| c.starts_with(&prefix))
        .unwrap();
    let token = session[prefix.len()..].split(';').next().unwrap().to_string();

    let claims = state.sessions.verify(&token).unwrap();
    assert_eq!(claims.sub, "42");
    assert_eq!(claims.access_token, "ya29.fresh");
}

#[tokio::test]
async fn test_callback_rejects_state_mismatch() {
    let response = build_router(test_state(InMemoryCalendar::new()))
        .oneshot(request(
            "GET",
            "/api/auth/callback/google?code=abc&state=forged",
            Some(&format!("{}=s1", STATE_COOKIE_NAME)),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Invalid sign-in state" }));
}

#[tokio::test]
async fn test_callback_reports_denied_consent() {
    let response = build_router(test_state(InMemoryCalendar::new()))
        .oneshot(request("GET", "/api/auth/callback/google?error=access_denied", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_session_view_hides_access_token() {
    let state = test_state(InMemoryCalendar::new());
    let cookie = session_cookie(&state);
    let app = build_router(state);

    let anonymous = app
        .clone()
        .oneshot(request("GET", "/api/auth/session", None, None))
        .await
        .unwrap();
    assert_eq!(body_json(anonymous).await, json!({}));

    let view = body_json(
        app.oneshot(request("GET", "/api/auth/session", Some(&cookie), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(view["user"]["email"], "an@example.com");
    assert!(view["expires"].is_string());
    assert!(!view.to_string().contains("ya29"));
}

#[tokio::test]
async fn test_signout_clears_session() {
    let state = test_state(InMemoryCalendar::new());
    let cookie = session_cookie(&state);

    let response = build_router(state)
        .oneshot(request("POST", "/api/auth/signout", Some(&cookie), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookies = set_cookies(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", SESSION_COOKIE_NAME)) && c.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_index_redirects_signed_in_users() {
    let state = test_state(InMemoryCalendar::new());
    let cookie = session_cookie(&state);
    let app = build_router(state);

    let signed_in = app
        .clone()
        .oneshot(request("GET", "/", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(signed_in.status(), StatusCode::SEE_OTHER);
    assert_eq!(signed_in.headers()[header::LOCATION], "/dashboard");

    let visitor = app.oneshot(request("GET", "/", None, None)).await.unwrap();
    assert_eq!(visitor.status(), StatusCode::OK);
    assert_eq!(body_json(visitor).await["signin"], "/api/auth/signin");
}
