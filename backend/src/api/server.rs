//! HTTP Server for the camconv API.
//!
//! Provides REST endpoints for CSV conversion and serves the built
//! frontend from the same port.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | GET    | `/api/options`    | Selectable frames, datums, zones     |
//! | POST   | `/api/convert`    | Upload CSV + parameters, get CSV     |
//! | GET    | `/api/logs?job=`  | SSE stream of one job's logs         |
//! | GET    | `/*`              | Static frontend files                |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};

use super::logs::{JobLog, LOG_BROADCASTER};
use super::types::{error_response, pipeline_status, ConvertResponse, OptionsResponse};
use crate::config::AppConfig;
use crate::error::{ServerError, ServerResult};
use crate::geodesy::{CsrsEngine, TransformEngine};
use crate::transform::pipeline::{convert_bytes, ConversionContext, ConvertRequest};
use uuid::Uuid;

type ApiError = (StatusCode, Json<Value>);

/// Read-only state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<CsrsEngine>,
}

impl AppState {
    pub fn new(config: AppConfig, engine: CsrsEngine) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let body_limit = state.config.max_upload_bytes();
    let static_dir = state.config.static_dir.clone();

    let api = Router::new()
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/convert", post(convert_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let app = if static_dir.is_dir() {
        let index = static_dir.join("index.html");
        api.fallback_service(ServeDir::new(&static_dir).fallback(ServeFile::new(index)))
    } else {
        warn!(dir = %static_dir.display(), "Static directory not found, serving API only");
        api.route("/", get(health))
    };

    app.layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: AppConfig) -> ServerResult<()> {
    let models = config.grid_store().load_models()?;
    info!(grids = models.len(), dir = %config.grid_dir.display(), "Geoid grids loaded");
    let engine = CsrsEngine::new(models);

    let addr = config.addr();
    let state = AppState::new(config, engine);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "camconv server running");
    info!("POST /api/convert - Convert a CSV file");
    info!("GET  /api/options - Selectable parameters");
    info!("GET  /api/logs    - SSE log stream for one job");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "camconv",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "options": "GET /api/options",
            "convert": "POST /api/convert",
            "logs": "GET /api/logs?job=<id> (SSE)"
        }
    }))
}

/// Options endpoint: the closed sets the UI may offer
async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse::new(state.engine.name(), &state.engine.geoids().datums()))
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    job: Uuid,
}

/// SSE endpoint streaming the log entries of one job
async fn sse_logs(Query(query): Query<LogsQuery>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = LOG_BROADCASTER.job_stream(query.job).filter_map(|entry| {
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn bad_request(message: String, kind: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(error_response(&message, kind)))
}

/// Convert CSV endpoint
///
/// Multipart fields: `file` (the CSV) and `params` (JSON [`ConvertRequest`]).
async fn convert_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut request: Option<ConvertRequest> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Multipart error: {e}"), "request"))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Read error: {e}"), "request"))?;
                file_data = Some(bytes.to_vec());
            }
            "params" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Read error: {e}"), "request"))?;
                let parsed = serde_json::from_str::<ConvertRequest>(&text)
                    .map_err(|e| bad_request(format!("Invalid parameters: {e}"), "invalid_parameter"))?;
                request = Some(parsed);
            }
            _ => {}
        }
    }

    let bytes = file_data.ok_or_else(|| bad_request("No file provided".to_string(), "request"))?;
    let request = request.ok_or_else(|| bad_request("No parameters provided".to_string(), "request"))?;

    let parameters = request
        .parameters()
        .map_err(|e| bad_request(e.to_string(), "invalid_parameter"))?;
    let options = request.options(state.config.sample_rows);
    let mut ctx = ConversionContext::new(file_name, options, parameters);
    if let Some(job) = request.job_id {
        ctx = ctx.with_job_id(job);
    }

    JobLog::new(ctx.job_id).info(format!(
        "New upload: {} ({} bytes)",
        ctx.file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let engine = Arc::clone(&state.engine);
    let result = tokio::task::spawn_blocking(move || convert_bytes(&bytes, &ctx, engine))
        .await
        .map_err(|e| {
            error!(error = %e, "Conversion task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response("Internal server error", "internal")),
            )
        })?
        .map_err(|e| {
            warn!(kind = e.kind(), error = %e, "Conversion failed");
            (pipeline_status(&e), Json(error_response(&e.to_string(), e.kind())))
        })?;

    info!(job = %result.job_id, rows = result.table.row_count(), "Conversion finished");
    Ok(Json(ConvertResponse::from(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "camconv-test-boundary";
    const HEADER: &str = "Timestamp,Filename,Origin (Latitude[deg],Longitude[deg],Altitude[m]),Roll(X)[deg],Pitch(Y)[deg],Yaw(Z)[deg],Omega[deg],Phi[deg],Kappa[deg]";
    const PARAMS: &str = r#"{
        "source": {"refFrame": "NAD83CSRS", "coords": "Geographic", "epoch": 2010.0},
        "target": {"refFrame": "ITRF14", "coords": "Geographic", "epoch": 2023.0},
        "jobId": "123e4567-e89b-12d3-a456-426614174000"
    }"#;

    fn test_app() -> Router {
        let config = AppConfig {
            static_dir: "/nonexistent/camconv".into(),
            ..AppConfig::default()
        };
        router(AppState::new(config, CsrsEngine::without_geoids()))
    }

    /// `(field, file name, content)` parts as a multipart/form-data body
    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n"
                )),
                None => body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body.into_bytes()
    }

    async fn post_convert(parts: &[(&str, Option<&str>, &str)]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/convert")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "camconv");
    }

    #[tokio::test]
    async fn test_options_reflect_loaded_grids() {
        let state = AppState::new(AppConfig::default(), CsrsEngine::without_geoids());
        let Json(body) = options(State(state)).await;
        assert_eq!(body.engine, "csrs");
        assert!(body
            .vertical_datums
            .iter()
            .filter(|d| !d.ellipsoidal)
            .all(|d| !d.available));
    }

    #[test]
    fn test_router_builds_without_static_dir() {
        let config = AppConfig {
            static_dir: "/nonexistent/camconv".into(),
            ..AppConfig::default()
        };
        let _ = router(AppState::new(config, CsrsEngine::without_geoids()));
    }

    #[tokio::test]
    async fn test_convert_returns_csv_under_client_job_id() {
        let csv = format!("{HEADER}\n2023-06-01 12:00:00,CAM01,45.0,-75.0,100.0,0.5,-0.2,181.3,0.4,-0.1,1.2\n");
        let (status, body) = post_convert(&[("file", Some("flight_07.csv"), csv.as_str()), ("params", None, PARAMS)]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobId"], "123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(body["fileName"], "flight_07_converted.csv");
        assert_eq!(body["rowCount"], 1);
        assert_eq!(body["preview"][0]["Filename"], "CAM01");
    }

    #[tokio::test]
    async fn test_convert_without_file_is_bad_request() {
        let (status, body) = post_convert(&[("params", None, PARAMS)]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "request");
        assert_eq!(body["error"], "No file provided");
    }

    #[tokio::test]
    async fn test_convert_with_malformed_params() {
        let csv = format!("{HEADER}\n2023,a.iiq,45.0,-75.0,100.0,0,0,0,0,0,0\n");
        let (status, body) = post_convert(&[("file", Some("a.csv"), csv.as_str()), ("params", None, "{\"source\": ")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "invalid_parameter");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid parameters"));
    }

    #[tokio::test]
    async fn test_convert_with_missing_columns() {
        let csv = "Timestamp,Filename\n2023,a.iiq\n";
        let (status, body) = post_convert(&[("file", Some("short.csv"), csv), ("params", None, PARAMS)]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "missing_columns");
        assert!(body["error"].as_str().unwrap().contains("Kappa[deg]"));
    }

    #[tokio::test]
    async fn test_logs_require_a_job() {
        let request = Request::builder().uri("/api/logs").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
