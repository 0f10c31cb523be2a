//! HTTP receiver for Jira webhooks.
//!
//! Jira pushes each event as a JSON body to `POST /webhook`. The receiver
//! decodes it, logs the outcome, and answers with a short summary; decoded
//! events are not kept.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use jirax_config::ReceiverConfig;
use jirax_core::{decode_event, DecodeError, EventKind, Strictness, WebhookEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

/// Server state shared across handlers.
struct AppState {
    strictness: Strictness,
}

/// Build the receiver's router, decoding with `strictness` unless a request
/// overrides it.
pub fn router(strictness: Strictness) -> Router {
    let state = Arc::new(AppState { strictness });

    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(receive))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the receiver on the configured address.
///
/// Runs until interrupted with Ctrl-C or SIGTERM.
///
/// # Errors
/// Returns error if the address is invalid, binding fails, or the server
/// encounters an error.
pub async fn serve(config: &ReceiverConfig) -> Result<()> {
    let addr = config.listen_addr()?;
    let app = router(config.decode.strictness);

    info!(address = %addr, strictness = %config.decode.strictness, "Starting webhook receiver");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook receiver failed")?;

    info!("Webhook receiver stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

// --- Request/Response types ---

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
struct WebhookQuery {
    /// `true`, `false`, or `none`; defaults to the configured strictness.
    #[serde(default)]
    strict: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeliveryResponse {
    delivery_id: Uuid,
    #[serde(rename = "type")]
    event_type: String,
    /// Event family, or `"generic"` for unknown event types.
    kind: &'static str,
    timestamp: DateTime<Utc>,
    extras: Vec<String>,
}

impl DeliveryResponse {
    fn new(delivery_id: Uuid, event: &WebhookEvent) -> Self {
        Self {
            delivery_id,
            event_type: event.event_type().to_string(),
            kind: event.kind().map_or("generic", EventKind::family),
            timestamp: event.timestamp(),
            extras: event.extras().keys().cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

// --- Handlers ---

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn receive(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WebhookQuery>,
    body: Bytes,
) -> Result<Json<DeliveryResponse>, AppError> {
    let delivery_id = Uuid::new_v4();

    let strictness = match query.strict.as_deref() {
        Some(strict) => strict
            .parse::<Strictness>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => state.strictness,
    };

    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("body is not JSON: {e}")))?;
    let Value::Object(raw) = payload else {
        return Err(AppError::BadRequest(
            "body must be a JSON object".to_string(),
        ));
    };

    let event = decode_event(&raw, strictness).map_err(|err| {
        warn!(%delivery_id, %strictness, field = %err.field_path(), error = %err, "Rejected webhook payload");
        AppError::Decode(err)
    })?;

    info!(
        %delivery_id,
        event_type = event.event_type(),
        timestamp = %event.timestamp(),
        extras = event.extras().len(),
        "Received webhook event"
    );

    Ok(Json(DeliveryResponse::new(delivery_id, &event)))
}

// --- Error handling ---

enum AppError {
    BadRequest(String),
    Decode(DecodeError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error,
                    kind: None,
                    field: None,
                },
            ),
            Self::Decode(err) => {
                let field = Some(err.field_path()).filter(|path| !path.is_empty());
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse {
                        error: err.to_string(),
                        kind: Some(err.kind()),
                        field,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
