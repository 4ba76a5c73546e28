//! Reqwest-based client for the remote execution service.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};

use super::{ExecutionRequest, ExecutionResult, SubmitError};
use crate::config::Config;

/// Where requests go. The controller only talks to this seam.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn submit(&self, request: &ExecutionRequest) -> Result<ExecutionResult, SubmitError>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.backend_url(), cfg.request_timeout())
    }

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn submit(&self, request: &ExecutionRequest) -> Result<ExecutionResult, SubmitError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        tracing::debug!(endpoint = %self.endpoint, debug = request.debug_mode, bytes = request.code.len(), "sending execution request");

        let resp = self
            .http
            .post(&self.endpoint)
            .headers(headers)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            // Body is deliberately left unread.
            return Err(SubmitError::Transport { status: status.as_u16() });
        }

        let result = resp.json::<ExecutionResult>().await?;
        tracing::debug!(success = result.success, "execution service replied");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::State,
        http::{HeaderMap as AxumHeaders, StatusCode},
        response::IntoResponse,
        routing::post,
        Json, Router,
    };
    use tokio::net::TcpListener;

    use super::*;
    use crate::execution::surface::recording::RecordingSurface;
    use crate::execution::{ExecutionController, Mode, Outcome};

    #[derive(Clone, Default)]
    struct Seen {
        bodies: Arc<Mutex<Vec<serde_json::Value>>>,
        content_types: Arc<Mutex<Vec<String>>>,
    }

    async fn spawn_service(
        status: StatusCode,
        reply: &'static str,
    ) -> anyhow::Result<(String, Seen)> {
        let seen = Seen::default();
        let app = Router::new()
            .route(
                "/",
                post(
                    move |State(seen): State<Seen>, headers: AxumHeaders, Json(body): Json<serde_json::Value>| async move {
                        seen.bodies.lock().unwrap().push(body);
                        let ct = headers
                            .get("content-type")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        seen.content_types.lock().unwrap().push(ct);
                        (status, [("content-type", "application/json")], reply).into_response()
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok((format!("http://{addr}/"), seen))
    }

    /// Accepts the request but answers only after `delay`.
    async fn spawn_slow_service(delay: Duration) -> anyhow::Result<String> {
        let app = Router::new().route(
            "/",
            post(move || async move {
                tokio::time::sleep(delay).await;
                Json(serde_json::json!({"success": true, "output": "late"}))
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{addr}/"))
    }

    fn backend(url: &str) -> HttpBackend {
        HttpBackend::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_json_body_and_decodes_result() -> anyhow::Result<()> {
        let (url, seen) = spawn_service(StatusCode::OK, r#"{"success":true,"output":"0"}"#).await?;
        let result = backend(&url)
            .submit(&ExecutionRequest::new("int main(){}", Mode::Run))
            .await?;

        assert_eq!(result, ExecutionResult { success: true, output: Some("0".into()), error: None });
        assert_eq!(
            seen.bodies.lock().unwrap().as_slice(),
            &[serde_json::json!({"code": "int main(){}", "debug": false})]
        );
        assert_eq!(seen.content_types.lock().unwrap()[0], "application/json");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() -> anyhow::Result<()> {
        // The body would decode fine; it must not be consulted.
        let (url, _) = spawn_service(StatusCode::SERVICE_UNAVAILABLE, r#"{"success":true,"output":"nope"}"#).await?;
        let err = backend(&url)
            .submit(&ExecutionRequest::new("x", Mode::Compile))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Transport { status: 503 }));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_network_error() -> anyhow::Result<()> {
        let (url, _) = spawn_service(StatusCode::OK, "not json").await?;
        let err = backend(&url)
            .submit(&ExecutionRequest::new("x", Mode::Run))
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Network(_)), "got {err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() -> anyhow::Result<()> {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let err = backend(&format!("http://{addr}/"))
            .submit(&ExecutionRequest::new("x", Mode::Run))
            .await
            .unwrap_err();
        match err {
            SubmitError::Network(msg) => assert!(!msg.is_empty()),
            other => panic!("expected network error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn request_timeout_renders_as_network_error() -> anyhow::Result<()> {
        let url = spawn_slow_service(Duration::from_secs(3)).await?;
        let controller = ExecutionController::new(HttpBackend::new(&url, Duration::from_millis(200))?);
        let mut surface = RecordingSurface::default();

        let started = std::time::Instant::now();
        let outcome = controller.execute(Mode::Run, "while(1);", &mut surface).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(outcome, Outcome::NetworkError);
        let (text, is_error) = surface.last_output().unwrap();
        assert!(text.starts_with("Network error:"), "got {text:?}");
        assert!(is_error);
        assert_eq!(surface.control_toggles(), vec![false, true]);
        Ok(())
    }
}
