use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paymeta_core::{
    constants::DEFAULT_ACTION, storage_kind_from_env_value, CoreConfig, CoreError, Document,
    MetadataService, S3Settings, StorageSettings,
};

/// Application state shared across REST API handlers
#[derive(Clone)]
struct AppState {
    service: Arc<MetadataService>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HealthRes {
    ok: bool,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SubmitReq {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    message: Option<String>,
    metadata: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubmitRes {
    id: String,
    url: String,
    description: String,
}

type ApiError = (StatusCode, &'static str);

/// Main entry point for the payment metadata server
///
/// # Environment Variables
/// - `PAYMETA_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `PAYMETA_PUBLIC_URL`: externally reachable base URL (default: "http://localhost:3000")
/// - `PAYMETA_STORAGE`: `local` or `s3` (default: `local`)
/// - `PAYMETA_DATA_DIR`: root directory for the local backend
/// - `S3_BUCKET`, `S3_REGION`, `S3_ENDPOINT`, `S3_ACCESS_KEY_ID`, `S3_SECRET_ACCESS_KEY`:
///   settings for the s3 backend
///
/// The environment is read here, once; everything below receives a [`CoreConfig`].
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paymeta_run=info".parse()?)
                .add_directive("paymeta_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PAYMETA_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = Arc::new(config_from_env()?);

    tracing::info!("++ Starting payment metadata REST on {}", addr);

    let service = MetadataService::open(cfg)?;
    let app = router(AppState {
        service: Arc::new(service),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn config_from_env() -> anyhow::Result<CoreConfig> {
    let kind = storage_kind_from_env_value(env_opt("PAYMETA_STORAGE"))?;
    let s3 = S3Settings {
        bucket: env_opt("S3_BUCKET").unwrap_or_default(),
        region: env_opt("S3_REGION"),
        endpoint: env_opt("S3_ENDPOINT"),
        access_key_id: env_opt("S3_ACCESS_KEY_ID"),
        secret_access_key: env_opt("S3_SECRET_ACCESS_KEY"),
    };
    let storage =
        StorageSettings::from_parts(kind, env_opt("PAYMETA_DATA_DIR").map(PathBuf::from), s3)?;
    let public_url =
        env_opt("PAYMETA_PUBLIC_URL").unwrap_or_else(|| "http://localhost:3000".into());

    Ok(CoreConfig::new(storage, public_url)?)
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metadata", get(list_metadata).post(create_metadata))
        .route("/metadata/:id", get(get_metadata))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps core failures onto HTTP status codes.
fn api_error(err: CoreError) -> ApiError {
    match err {
        CoreError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input"),
        CoreError::InvalidId(_) => (StatusCode::BAD_REQUEST, "Invalid identifier"),
        CoreError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
        CoreError::Store(e) => {
            tracing::error!("Storage error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// Health check endpoint for monitoring and load balancers.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "payment metadata service is alive".into(),
    })
}

/// Store a metadata document and return its identifier, URL and payment description.
///
/// # Errors
/// Returns `400 Bad Request` if `metadata` is not a JSON object or `action` is not a single
/// token, and `500 Internal Server Error` if the write fails.
async fn create_metadata(
    State(state): State<AppState>,
    Json(req): Json<SubmitReq>,
) -> Result<(StatusCode, Json<SubmitRes>), ApiError> {
    let document = Document::try_from(req.metadata)
        .map_err(|_| (StatusCode::BAD_REQUEST, "metadata must be a JSON object"))?;
    let action = req.action.as_deref().unwrap_or(DEFAULT_ACTION);

    let submission = state
        .service
        .submit(document, action, req.message.as_deref())
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitRes {
            id: submission.id.to_string(),
            url: submission.url,
            description: submission.description,
        }),
    ))
}

/// Fetch one metadata document.
///
/// # Errors
/// `400` for a malformed identifier, `404` if nothing is stored under it, `500` otherwise.
async fn get_metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    state.service.get(&id).await.map(Json).map_err(api_error)
}

/// List every stored document, newest first.
async fn list_metadata(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    state.service.list().await.map(Json).map_err(api_error)
}
