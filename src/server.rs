//! HTTP API over the [`Catalog`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/items` | All items in flat order |
//! | `GET`  | `/api/items/{id}` | One item |
//! | `POST` | `/api/items/{id}/progress` | Set progress (`{"progress": 0..=100}`) |
//! | `GET`  | `/api/items/{id}/content` | Raw PDF bytes, served inline |
//! | `GET`  | `/api/items/{id}/next` | The following item in flat order |
//! | `GET`  | `/api/items/group/{group_id}` | Items of one group |
//! | `GET`  | `/api/groups` | Group ids and names |
//! | `GET`  | `/health` | Health check with catalog counts |
//! | `GET`  | `/public/*` | Static assets, when `server.public_dir` is set |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "item 999 not found" } }
//! ```
//!
//! Error codes: `not_found`, `content_missing`, `no_successor` (404);
//! `invalid_argument`, `invalid_group` (400).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::{Body, Bytes},
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::CatalogError;
use crate::models::{CatalogItem, GroupSummary};

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
}

/// Indexes the configured groups and serves the API until the process ends.
///
/// Indexing finishes before the listener is bound, so no request ever sees a
/// partial catalog. An unreadable group directory is returned as an error.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::build(config)?;
    let stats = catalog.stats();
    tracing::info!(
        groups = stats.groups,
        items = stats.items,
        "catalog indexed"
    );

    let app = build_router(Arc::new(catalog), config.server.public_dir.clone());

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("catalog listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the router without binding, for embedding or custom listeners.
pub fn build_router(catalog: Arc<Catalog>, public_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/items", get(handle_list_items))
        .route("/api/items/{id}", get(handle_get_item))
        .route("/api/items/{id}/progress", post(handle_update_progress))
        .route("/api/items/{id}/content", get(handle_content))
        .route("/api/items/{id}/next", get(handle_next))
        .route("/api/items/group/{group_id}", get(handle_list_by_group))
        .route("/api/groups", get(handle_list_groups))
        .route("/health", get(handle_health));

    if let Some(dir) = public_dir {
        app = app.nest_service("/public", ServeDir::new(dir));
    }

    app.layer(cors).with_state(AppState { catalog })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::NotFound(_)
            | CatalogError::ContentMissing { .. }
            | CatalogError::NoSuccessor(_) => StatusCode::NOT_FOUND,
            CatalogError::InvalidArgument(_) | CatalogError::InvalidGroup(_) => {
                StatusCode::BAD_REQUEST
            }
            CatalogError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Item ids that do not parse are simply ids that do not exist.
fn parse_item_id(raw: &str) -> Result<u32, AppError> {
    raw.parse()
        .map_err(|_| AppError {
            status: StatusCode::NOT_FOUND,
            code: "not_found".to_string(),
            message: format!("item {} not found", raw),
        })
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    groups: usize,
    items: usize,
    completed: usize,
    indexed_at: DateTime<Utc>,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.catalog.stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        groups: stats.groups,
        items: stats.items,
        completed: stats.completed,
        indexed_at: stats.indexed_at,
    })
}

// ============ Items ============

async fn handle_list_items(State(state): State<AppState>) -> Json<Vec<CatalogItem>> {
    Json(state.catalog.list_all())
}

async fn handle_get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CatalogItem>, AppError> {
    let id = parse_item_id(&id)?;
    Ok(Json(state.catalog.get(id)?))
}

async fn handle_next(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CatalogItem>, AppError> {
    let id = parse_item_id(&id)?;
    Ok(Json(state.catalog.next(id)?))
}

#[derive(Deserialize)]
struct ProgressUpdate {
    progress: Option<i64>,
}

/// Handler for `POST /api/items/{id}/progress`.
///
/// The body is parsed here rather than by the `Json` extractor so that
/// malformed input reports `invalid_argument` like any other bad value.
async fn handle_update_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CatalogItem>, AppError> {
    let id = parse_item_id(&id)?;

    let update: ProgressUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            state.catalog.get(id)?;
            return Err(CatalogError::InvalidArgument(format!("invalid request body: {}", e)).into());
        }
    };

    Ok(Json(state.catalog.update_progress(id, update.progress)?))
}

/// Handler for `GET /api/items/{id}/content`.
///
/// Streams the PDF through `ServeFile`, which also answers range requests.
/// No `Content-Disposition` is set, so browsers render it inline.
async fn handle_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let id = parse_item_id(&id)?;
    let content = state.catalog.content(id).await?;

    let missing = || CatalogError::ContentMissing {
        id,
        path: content.path.clone(),
    };

    let response = ServeFile::new(&content.path)
        .try_call(request)
        .await
        .map_err(|e| {
            tracing::warn!(id, error = %e, "failed to serve content");
            missing()
        })?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(missing().into());
    }

    let mut response = response.map(Body::new);
    if response.status().is_success() {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PDF_CONTENT_TYPE),
        );
    }
    Ok(response)
}

// ============ Groups ============

async fn handle_list_groups(State(state): State<AppState>) -> Json<Vec<GroupSummary>> {
    Json(state.catalog.list_groups())
}

async fn handle_list_by_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<CatalogItem>>, AppError> {
    let group_id: u32 = group_id
        .parse()
        .map_err(|_| CatalogError::InvalidGroup(group_id.clone()))?;
    Ok(Json(state.catalog.list_by_group(group_id)?))
}
