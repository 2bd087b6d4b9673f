//! The HTTP registration endpoint.
//!
//! ```text
//! GET  /hello    → 200 "Hello, World!"
//! POST /players  {name} → 200 {name, password}
//!                         400 "AlreadyExists"   name is taken
//!                         400 <reason>          name fails validation
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use foyer_protocol::RegisterRequest;
use foyer_session::{Registrar, SessionError};
use foyer_store::DocumentStore;

/// Builds the registration router around a shared [`Registrar`].
pub fn registration_router<S: DocumentStore>(registrar: Arc<Registrar<S>>) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/players", post(register::<S>))
        .with_state(registrar)
}

async fn hello() -> &'static str {
    "Hello, World!"
}

async fn register<S: DocumentStore>(
    State(registrar): State<Arc<Registrar<S>>>,
    Json(request): Json<RegisterRequest>,
) -> Response {
    match registrar.register(&request).await {
        Ok(registration) => Json(registration).into_response(),
        Err(SessionError::AlreadyExists(name)) => {
            tracing::warn!(player = %name, "registration rejected, name taken");
            (StatusCode::BAD_REQUEST, "AlreadyExists").into_response()
        }
        Err(SessionError::Validation(reason)) => {
            tracing::warn!(%reason, "registration rejected");
            (StatusCode::BAD_REQUEST, reason).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "registration failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
