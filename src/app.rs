use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, request::Parts},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/sleep", get(handlers::sleep))
        .route("/connect", post(handlers::connect))
        .route("/garmin-status", get(handlers::garmin_status))
        .route("/disconnect-garmin", post(handlers::disconnect_garmin))
        .route("/hrv", get(handlers::hrv));

    if state.sync_secret.is_some() {
        router = router.route("/sync/sleep", post(handlers::sync_sleep));
    }

    let cors = cors_layer(&state);
    router.layer(cors).with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let pattern = state.cors_origin.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| pattern.is_match(origin))
            },
        ))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{ErrorBody, HrvResponse, SleepResponse, StatusResponse};
    use crate::vendor::HrvOperation;
    use crate::vendor::fake::{FakeHandle, FakeSource};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn night() -> serde_json::Value {
        json!({ "dailySleepDTO": { "sleepTimeSeconds": 25200, "remSleepSeconds": 5400 } })
    }

    fn test_app(vars: &[(&str, &str)], handle: fn() -> FakeHandle) -> Router {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = Config::from_lookup(|name| vars.get(name).cloned()).unwrap();
        let source = Arc::new(FakeSource::new(move |_| handle()));
        router(AppState::new(&config, source))
    }

    fn sleepy() -> FakeHandle {
        FakeHandle::default()
            .with_sleep_every_day(night())
            .with_hrv(HrvOperation::HrvData, true, Err(crate::vendor::HrvCallError::ArityMismatch))
            .with_hrv(HrvOperation::HrvData, false, Ok(json!({ "lastNightAvg": 44 })))
    }

    fn empty() -> FakeHandle {
        let mut handle = FakeHandle::default();
        handle.advertised = vec!["get_heart_rates".to_string(), "get_steps".to_string()];
        handle
    }

    async fn send(app: &Router, method: &str, uri: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn connect(app: &Router, user_id: &str) {
        let response = send(
            app,
            "POST",
            &format!("/connect?user_id={user_id}&identity=me%40example.com&secret=pw"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_and_root_are_ok() {
        let app = test_app(&[], sleepy);
        let response = send(&app, "GET", "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body::<serde_json::Value>(response).await, json!({ "ok": true }));

        let response = send(&app, "GET", "/").await;
        assert_eq!(json_body::<serde_json::Value>(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn session_lifecycle_over_http() {
        let app = test_app(&[], sleepy);

        let status: StatusResponse =
            json_body(send(&app, "GET", "/garmin-status?user_id=u1").await).await;
        assert!(!status.connected);

        connect(&app, "u1").await;
        let status: StatusResponse =
            json_body(send(&app, "GET", "/garmin-status?user_id=u1").await).await;
        assert!(status.connected);

        let response = send(&app, "POST", "/disconnect-garmin?user_id=u1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = send(&app, "POST", "/disconnect-garmin?user_id=u1").await;
        assert_eq!(response.status(), StatusCode::OK);

        let status: StatusResponse =
            json_body(send(&app, "GET", "/garmin-status?user_id=u1").await).await;
        assert!(!status.connected);
    }

    #[tokio::test]
    async fn connect_accepts_email_password_aliases() {
        let app = test_app(&[], sleepy);
        let response = send(&app, "POST", "/connect?user_id=u2&email=a%40b.c&password=pw").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn connect_validates_params_and_login() {
        let app = test_app(&[], sleepy);

        let response = send(&app, "POST", "/connect?user_id=u1&identity=me").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = json_body(response).await;
        assert_eq!(body.error, "secret is required");

        let response = send(&app, "POST", "/connect?user_id=u1&identity=me&secret=wrong").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: ErrorBody = json_body(response).await;
        assert_eq!(body.error, "Garmin login failed");
    }

    #[tokio::test]
    async fn sleep_for_connected_user() {
        let app = test_app(&[], sleepy);
        connect(&app, "u1").await;

        let response = send(&app, "GET", "/sleep?user_id=u1").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: SleepResponse = json_body(response).await;
        assert_eq!(body.sleep, night());
        assert_eq!(body.date.len(), 10);
    }

    #[tokio::test]
    async fn sleep_errors_are_structured() {
        let app = test_app(&[], empty);

        let response = send(&app, "GET", "/sleep?user_id=ghost").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorBody = json_body(response).await;
        assert_eq!(body.error, "Garmin not connected");

        let response = send(&app, "GET", "/sleep").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: ErrorBody = json_body(response).await;
        assert_eq!(body.error, "Missing GARMIN_EMAIL or GARMIN_PASSWORD");

        connect(&app, "u1").await;
        let response = send(&app, "GET", "/sleep?user_id=u1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = json_body(response).await;
        assert_eq!(body.error, "No valid data found");
    }

    #[tokio::test]
    async fn sleep_without_user_uses_default_account() {
        let app = test_app(&[("GARMIN_EMAIL", "me@example.com"), ("GARMIN_PASSWORD", "pw")], sleepy);
        let response = send(&app, "GET", "/sleep").await;
        assert_eq!(response.status(), StatusCode::OK);

        let app = test_app(
            &[("GARMIN_EMAIL", "me@example.com"), ("GARMIN_PASSWORD", "wrong")],
            sleepy,
        );
        let response = send(&app, "GET", "/sleep").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn hrv_reports_operation_or_candidates() {
        let app = test_app(&[], sleepy);
        connect(&app, "u1").await;
        let response = send(&app, "GET", "/hrv?user_id=u1&date=2025-06-10").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: HrvResponse = json_body(response).await;
        assert_eq!(body.date, "2025-06-10");
        assert_eq!(body.operation, "get_hrv_data");
        assert_eq!(body.hrv, json!({ "lastNightAvg": 44 }));

        let response = send(&app, "GET", "/hrv?user_id=u1&date=06/10/2025").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let app = test_app(&[], empty);
        connect(&app, "u1").await;
        let response = send(&app, "GET", "/hrv?user_id=u1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = json_body(response).await;
        assert_eq!(body.error, "No HRV data found");
        assert_eq!(body.candidates, Some(vec!["get_heart_rates".to_string()]));
    }

    #[tokio::test]
    async fn sync_route_requires_configured_secret() {
        let app = test_app(&[], sleepy);
        let response = send(&app, "POST", "/sync/sleep?user_id=u1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let app = test_app(&[("SYNC_SHARED_SECRET", "s3cret")], sleepy);
        connect(&app, "u1").await;

        let response = send(&app, "POST", "/sync/sleep?user_id=u1").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: ErrorBody = json_body(response).await;
        assert_eq!(body.error, "unauthorized");

        let request = Request::builder()
            .method("POST")
            .uri("/sync/sleep?user_id=u1")
            .header(handlers::SYNC_SECRET_HEADER, "s3cret")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: SleepResponse = json_body(response).await;
        assert_eq!(body.sleep, night());
    }

    #[tokio::test]
    async fn cors_allows_configured_origins_only() {
        let app = test_app(&[], sleepy);
        let request = |origin: &str| {
            Request::builder()
                .uri("/health")
                .header("origin", origin)
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(request("https://revluna.com")).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://revluna.com"
        );

        let response = app.clone().oneshot(request("https://evil.example")).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
