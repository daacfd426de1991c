use crate::core::mailer::Mailer;
use crate::core::submission::SubmissionHandler;
use crate::domain::model::RegistrationInput;
use crate::utils::error::MailerError;
use crate::utils::validation::{require_text, validate_email};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub submission: Arc<SubmissionHandler>,
    pub mailer: Arc<Mailer>,
    pub ai_backends: Vec<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl From<MailerError> for ApiError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::ValidationError { .. } => ApiError::BadRequest(err.user_friendly_message()),
            MailerError::StoreError { message } => ApiError::Internal(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SendTestRequest {
    pub email: Option<String>,
    pub nombre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub services: Vec<String>,
    pub ai_providers: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/submit", post(submit_handler))
        .route("/api/send-test", post(send_test_handler))
        .route("/api/health", get(health_handler))
        .fallback(root_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn submit_handler(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    let response = state.submission.submit(input).await?;
    Ok((StatusCode::OK, Json(response)))
}

async fn send_test_handler(
    State(state): State<AppState>,
    payload: Result<Json<SendTestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let email = require_text("email", &request.email)?;
    validate_email("email", email)?;
    let name = request
        .nombre
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Usuario");

    tracing::info!("🧪 Test email requested for {}", email);
    let result = state.mailer.send_test(email, name).await;
    Ok((StatusCode::OK, Json(result)))
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        services: state.mailer.dispatcher().provider_names(),
        ai_providers: state.ai_backends.clone(),
    })
}

async fn root_handler() -> &'static str {
    "Vision Board 2026 API"
}

pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
