// Budget Insight - Web Server
// REST API with Axum: one isolated record set per session

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use budget_insight::{
    AnalysisError, Insight, InsightConfig, InsightEngine, RecordSet, SessionError, SessionStore,
    VERSION,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
struct AppState {
    sessions: SessionStore,
    engine: Arc<InsightEngine>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        Self::with_status(StatusCode::OK, data)
    }

    fn with_status(status: StatusCode, data: T) -> Response {
        let body = ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        };
        (status, Json(body)).into_response()
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

fn session_error_response(err: SessionError) -> Response {
    match err {
        SessionError::NotFound(_) => error_response(StatusCode::NOT_FOUND, err.to_string()),
        SessionError::Analysis(AnalysisError::EmptyRecordSet) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
    }
}

#[derive(Serialize)]
struct SessionCreated {
    session_id: Uuid,
}

#[derive(Serialize)]
struct RecordsLoaded {
    session_id: Uuid,
    record_count: usize,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    ApiResponse::ok("OK")
}

/// POST /api/sessions - Open a new, empty session
async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.sessions.create();
    ApiResponse::with_status(StatusCode::CREATED, SessionCreated { session_id })
}

/// PUT /api/sessions/:id/records - Replace the session's records wholesale
async fn replace_records(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(session = %session_id, "undecodable upload: {}", rejection.body_text());
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("could not load data: {}", rejection.body_text()),
            );
        }
    };

    let records = match RecordSet::from_json_value(payload) {
        Ok(records) => records,
        Err(e) => {
            warn!(session = %session_id, "rejected upload: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    match state.sessions.replace_records(session_id, records) {
        Ok(record_count) => ApiResponse::ok(RecordsLoaded {
            session_id,
            record_count,
        }),
        Err(e) => session_error_response(e),
    }
}

/// POST /api/sessions/:id/ask - Answer a question against the current records
async fn ask(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    request: Result<Json<AskRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("invalid question request: {}", rejection.body_text()),
            )
        }
    };

    match state
        .sessions
        .ask(session_id, &state.engine, &request.question)
    {
        Ok(insight) => ApiResponse::<Insight>::ok(insight),
        Err(e) => session_error_response(e),
    }
}

/// DELETE /api/sessions/:id - Discard a session and its records
async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> impl IntoResponse {
    if state.sessions.remove(session_id) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        session_error_response(SessionError::NotFound(session_id))
    }
}

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/records", put(replace_records))
        .route("/sessions/:id/ask", post(ask))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = InsightConfig::resolve(None)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    println!("🌐 Budget Insight v{} - Web Server", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let state = AppState {
        sessions: SessionStore::from_ttl_secs(config.server.session_ttl_secs),
        engine: Arc::new(InsightEngine::with_fallback(config.insight.fallback)),
    };

    let listener = match tokio::net::TcpListener::bind(&config.server.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.server.bind, e);
            return Err(e.into());
        }
    };

    info!("listening on {}", config.server.bind);
    println!("\n🚀 Server running on http://{}", config.server.bind);
    println!("   API: POST /api/sessions, PUT /api/sessions/:id/records, POST /api/sessions/:id/ask");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
