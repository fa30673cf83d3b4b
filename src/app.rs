use std::net::SocketAddr;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;
use crate::{analysis, logs, nutrition, profile, suggest};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1",
              Router::new()
                  .merge(profile::router())
                  .merge(nutrition::router())
                  .merge(logs::router())
                  .merge(suggest::router())
                  .merge(analysis::router())
                  .route("/health", get(|| async { "ok" }))
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod app_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::build_app;
    use crate::analysis::{ScriptedClient, ANALYSIS_FAILED_MESSAGE, TWO_ITEMS};
    use crate::camera::{fakes::FakeCamera, fakes::TINY_JPEG, CapturedImage, NoCamera};
    use crate::state::AppState;

    async fn call(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = build_app(state.clone())
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = call(&AppState::fake(), Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn profile_update_recomputes_targets() {
        let state = AppState::fake();
        let (_, before) = call(&state, Method::GET, "/api/v1/profile", None).await;
        assert_eq!(before["rda"]["calories"], 3087.0);

        let edited = json!({
            "age": 28, "sex": "male", "weight_kg": 75.0, "height_cm": 180.0,
            "activity_level": "moderate", "goal": "weight-loss"
        });
        let (status, after) = call(&state, Method::PUT, "/api/v1/profile", Some(edited)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(after["rda"]["calories"], 2287.0);
        assert_eq!(after["profile"]["goal"], "weight-loss");
    }

    #[tokio::test]
    async fn invalid_profile_is_rejected_and_kept() {
        let state = AppState::fake();
        let bad = json!({
            "age": 0, "sex": "female", "weight_kg": 60.0, "height_cm": 170.0,
            "activity_level": "light", "goal": "maintenance"
        });
        let (status, _) = call(&state, Method::PUT, "/api/v1/profile", Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.session.profile().age, 28);
    }

    #[tokio::test]
    async fn progress_reflects_todays_entries() {
        let state = AppState::fake();
        let today = state.session.today();
        let (status, body) = call(&state, Method::GET, "/api/v1/progress", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totals"]["calories"], today.calories);
        assert_eq!(body["progress"]["calories"]["remaining"], 3087.0 - today.calories);
        assert_eq!(body["progress"]["macros"][0]["label"], "Protein");
        assert_eq!(body["progress"]["macros"][0]["current"], today.protein.round());
    }

    #[tokio::test]
    async fn rda_exposes_targets_and_energy() {
        let (status, body) = call(&AppState::fake(), Method::GET, "/api/v1/rda", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targets"]["protein"], 193.0);
        assert_eq!(body["targets"]["fiber"], 30.0);
        let bmr = body["energy"]["bmr"].as_f64().unwrap();
        assert!((bmr - 1798.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn suggestions_and_apply() {
        let state = AppState::fake();
        let (_, body) = call(&state, Method::GET, "/api/v1/suggestions?q=2%20eggs,%20av", None).await;
        assert_eq!(body["suggestions"], json!(["Avocado"]));

        let (_, body) = call(
            &state,
            Method::POST,
            "/api/v1/suggestions/apply",
            Some(json!({"text": "2 eggs, av", "choice": "Avocado"})),
        )
        .await;
        assert_eq!(body["text"], "2 eggs, Avocado, ");
        assert_eq!(body["suggestions"], json!([]));
    }

    #[tokio::test]
    async fn analyze_then_confirm_grows_log_by_item_count() {
        let state = AppState::fake();
        let before = state.session.log().len();

        let (status, result) = call(
            &state,
            Method::POST,
            "/api/v1/analysis",
            Some(json!({"text": "2 scrambled eggs, avocado toast"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["items"].as_array().unwrap().len(), 2);
        assert_eq!(state.session.log().len(), before);

        let (status, pending) = call(&state, Method::GET, "/api/v1/analysis/pending", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pending["gapAnalysis"], "Add citrus for vitamin C.");

        let (status, confirmed) = call(&state, Method::POST, "/api/v1/analysis/confirm", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmed["added"].as_array().unwrap().len(), 2);
        assert_eq!(confirmed["log_len"], before + 2);
        assert_eq!(state.session.log().len(), before + 2);

        let (status, _) = call(&state, Method::POST, "/api/v1/analysis/confirm", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, logs) = call(&state, Method::GET, "/api/v1/logs", None).await;
        assert_eq!(logs.as_array().unwrap().len(), before + 2);
    }

    #[tokio::test]
    async fn empty_text_is_a_bad_request_without_service_call() {
        let client = ScriptedClient::replying(TWO_ITEMS);
        let state = AppState::fake_with(Arc::new(client.clone()), Arc::new(FakeCamera::default()));
        let (status, _) = call(&state, Method::POST, "/api/v1/analysis", Some(json!({"text": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_reply_is_a_gateway_failure_and_logs_nothing() {
        let client = ScriptedClient::replying(r#"{"items":[{"name":"Beef","portion":"100 g","calories":250}],"summary":"s","gapAnalysis":"g"}"#);
        let state = AppState::fake_with(Arc::new(client), Arc::new(FakeCamera::default()));
        let before = state.session.log().len();
        let (status, body) = call(&state, Method::POST, "/api/v1/analysis", Some(json!({"text": "beef"}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, ANALYSIS_FAILED_MESSAGE);
        assert!(state.session.pending().is_none());
        assert_eq!(state.session.log().len(), before);
        assert!(!state.session.is_analyzing());
    }

    #[tokio::test]
    async fn concurrent_submission_is_refused() {
        let client = ScriptedClient::replying(TWO_ITEMS).with_delay(Duration::from_millis(200));
        let state = AppState::fake_with(Arc::new(client.clone()), Arc::new(FakeCamera::default()));

        let first = {
            let state = state.clone();
            tokio::spawn(async move {
                call(&state, Method::POST, "/api/v1/analysis", Some(json!({"text": "salmon"}))).await
            })
        };
        while client.calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let (status, _) = call(&state, Method::POST, "/api/v1/analysis", Some(json!({"text": "rice"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = first.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(client.calls(), 1);
        assert!(!state.session.is_analyzing());
    }

    #[tokio::test]
    async fn base64_image_is_inlined() {
        let client = ScriptedClient::replying(TWO_ITEMS);
        let state = AppState::fake_with(Arc::new(client.clone()), Arc::new(FakeCamera::default()));
        let b64 = CapturedImage::from_jpeg(bytes::Bytes::from_static(TINY_JPEG)).unwrap().to_base64();

        let (status, _) = call(&state, Method::POST, "/api/v1/analysis/base64", Some(json!({"image_b64": b64}))).await;
        assert_eq!(status, StatusCode::OK);
        let sent = client.requests.lock().unwrap()[0].clone();
        assert_eq!(sent.parts.len(), 2);

        let (status, _) = call(&state, Method::POST, "/api/v1/analysis/base64", Some(json!({"image_b64": "aGVsbG8="}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn capture_uses_camera_and_releases_it() {
        let camera = FakeCamera::default();
        let state = AppState::fake_with(Arc::new(ScriptedClient::replying(TWO_ITEMS)), Arc::new(camera.clone()));
        let (status, _) = call(&state, Method::POST, "/api/v1/analysis/capture", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(camera.stops.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn capture_while_busy_leaves_camera_closed() {
        let client = ScriptedClient::replying(TWO_ITEMS);
        let camera = FakeCamera::default();
        let state = AppState::fake_with(Arc::new(client.clone()), Arc::new(camera.clone()));

        let in_flight = state.session.begin_analysis().unwrap();
        let (status, _) = call(&state, Method::POST, "/api/v1/analysis/capture", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(camera.stops.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(client.calls(), 0);
        drop(in_flight);

        let (status, _) = call(&state, Method::POST, "/api/v1/analysis/capture", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!state.session.is_analyzing());
    }

    #[tokio::test]
    async fn missing_camera_is_unavailable() {
        let state = AppState::fake_with(Arc::new(ScriptedClient::replying(TWO_ITEMS)), Arc::new(NoCamera));
        let (status, _) = call(&state, Method::POST, "/api/v1/analysis/capture", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(state.session.pending().is_none());
        assert!(!state.session.is_analyzing());
    }

    #[tokio::test]
    async fn dismiss_discards_pending() {
        let state = AppState::fake();
        call(&state, Method::POST, "/api/v1/analysis", Some(json!({"text": "latte"}))).await;
        let (_, body) = call(&state, Method::DELETE, "/api/v1/analysis/pending", None).await;
        assert_eq!(body["dismissed"], true);
        let (status, _) = call(&state, Method::GET, "/api/v1/analysis/pending", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
