//! Web server exposing the conversion entry points.
//!
//! Three contractual routes: start a project conversion (fire-and-forget),
//! poll its status, and request an advisory stop.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use portage_core::ConversionOrchestrator;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Web server configuration
#[derive(Debug, Clone)]
pub struct ConvertServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Conversion driver
    pub orchestrator: Arc<ConversionOrchestrator>,
}

/// Request to start a project conversion
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    /// Project identifier (directory name under the uploads directory)
    project_id: String,
}

/// Response from starting a conversion
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertStarted {
    message: String,
    project_id: String,
    total_files: usize,
}

/// Error payload for failed requests
#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Web server for the conversion pipeline
pub struct ConvertServer {
    config: ConvertServerConfig,
    state: AppState,
}

impl ConvertServer {
    /// Create a new server around an orchestrator
    pub fn new(config: ConvertServerConfig, orchestrator: Arc<ConversionOrchestrator>) -> Self {
        Self {
            config,
            state: AppState { orchestrator },
        }
    }

    /// Start the web server
    pub async fn start(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse::<SocketAddr>()?;
        let app = self.into_router();

        println!("Conversion server starting on http://{addr}");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Build the router with all routes
    pub fn into_router(self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/api/convert/all", post(start_conversion_handler))
            .route("/api/convert/status/:project_id", get(status_handler))
            .route("/api/convert/stop/:project_id", post(stop_handler))
            .with_state(self.state);

        if self.config.enable_cors {
            router = router.layer(ServiceBuilder::new().layer(CorsLayer::permissive()));
        }

        router
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Kick off a conversion in the background and acknowledge immediately
async fn start_conversion_handler(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> Response {
    if request.project_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Project ID is required");
    }

    match state.orchestrator.start_conversion(&request.project_id).await {
        Ok(total_files) => Json(ConvertStarted {
            message: "Conversion started".to_string(),
            project_id: request.project_id,
            total_files,
        })
        .into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, &e.to_string()),
    }
}

/// Non-blocking status poll
async fn status_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Response {
    Json(state.orchestrator.get_status(&project_id)).into_response()
}

/// Advisory stop request
async fn stop_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Response {
    state.orchestrator.stop(&project_id);
    Json(serde_json::json!({
        "message": "Stop requested",
        "projectId": project_id,
    }))
    .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use portage_core::{ConversionPhase, ConvertConfig, Converter, StatusStore};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    fn test_server(uploads: &std::path::Path) -> (ConvertServer, Arc<ConversionOrchestrator>) {
        let config = ConvertConfig {
            upload_dir: uploads.to_path_buf(),
            use_ai: false,
            chunk_size: 5,
            max_retries: 1,
        };
        let orchestrator = Arc::new(ConversionOrchestrator::new(
            config,
            Converter::local_only(),
            Arc::new(StatusStore::new()),
        ));
        let server = ConvertServer::new(ConvertServerConfig::default(), Arc::clone(&orchestrator));
        (server, orchestrator)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = TempDir::new().unwrap();
        let (server, _) = test_server(tmp.path());

        let response = server
            .into_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_status_for_unknown_project_is_synthesized() {
        let tmp = TempDir::new().unwrap();
        let (server, _) = test_server(tmp.path());

        let response = server
            .into_router()
            .oneshot(
                Request::get("/api/convert/status/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["progress"], 0);
        assert_eq!(json["currentStep"], "initializing");
    }

    #[tokio::test]
    async fn test_start_conversion_missing_project_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let (server, _) = test_server(tmp.path());

        let response = server
            .into_router()
            .oneshot(
                Request::post("/api/convert/all")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"projectId":"absent"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_then_poll_until_completed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::create_dir_all(tmp.path().join("demo"))
            .await
            .unwrap();
        tokio::fs::write(tmp.path().join("demo/hello.php"), "<?php echo 'hi';")
            .await
            .unwrap();
        let (server, orchestrator) = test_server(tmp.path());

        let response = server
            .into_router()
            .oneshot(
                Request::post("/api/convert/all")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"projectId":"demo"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["totalFiles"], 1);

        for _ in 0..200 {
            if orchestrator.get_status("demo").status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            orchestrator.get_status("demo").status,
            ConversionPhase::Completed
        );
    }

    #[tokio::test]
    async fn test_stop_endpoint_acks() {
        let tmp = TempDir::new().unwrap();
        let (server, orchestrator) = test_server(tmp.path());

        let response = server
            .into_router()
            .oneshot(
                Request::post("/api/convert/stop/demo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Stop requested");

        // Stop on a never-started project records a terminal status
        assert_eq!(
            orchestrator.get_status("demo").status,
            ConversionPhase::Stopped
        );
    }
}
