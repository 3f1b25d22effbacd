/**
 * Routes Module
 * HTTP handlers over the shared portfolio state
 */
pub mod auth;
pub mod comments;
pub mod content;
pub mod health;
pub mod settings;
pub mod share;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::app::{Persisted, Portfolio, PortfolioError};
use crate::auth::AuthError;
use crate::ingest::IngestError;

/// The one application state, shared by every handler.
///
/// The site is single-user: there is one session for the whole process, so
/// after an admin login every client is treated as the admin until logout.
pub type SharedPortfolio = Arc<Mutex<Portfolio>>;

/// Run a mutating operation on the blocking pool. Writes go through to the
/// Local Store, which may touch the disk, so they stay off the executor.
pub async fn mutate<T, F>(state: &SharedPortfolio, op: F) -> Result<T, PortfolioError>
where
    F: FnOnce(&mut Portfolio) -> Result<T, PortfolioError> + Send + 'static,
    T: Send + 'static,
{
    let mut portfolio = state.clone().lock_owned().await;
    tokio::task::spawn_blocking(move || op(&mut *portfolio))
        .await
        .map_err(|e| PortfolioError::Task(e.to_string()))?
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Plain acknowledgement, with a storage warning when the change was not saved.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl SuccessResponse {
    pub fn from_persisted(persisted: &Persisted) -> Self {
        Self {
            success: true,
            warning: persisted.warning(),
        }
    }
}

/// `?confirm=true` answers the yes/no gate in front of destructive actions.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            message: None,
        }),
    )
        .into_response()
}

pub fn confirmation_required(prompt: &str) -> Response {
    (
        StatusCode::PRECONDITION_REQUIRED,
        Json(ErrorResponse {
            error: "Confirmation required".to_string(),
            message: Some(prompt.to_string()),
        }),
    )
        .into_response()
}

fn status_for(err: &PortfolioError) -> StatusCode {
    match err {
        PortfolioError::Auth(auth) => match auth {
            AuthError::InvalidCredentials
            | AuthError::ResetMismatch
            | AuthError::WrongCurrentPassword
            | AuthError::AdminRequired
            | AuthError::LoginRequired => StatusCode::UNAUTHORIZED,
            AuthError::PasswordMismatch
            | AuthError::PasswordTooShort
            | AuthError::InvalidEmail => StatusCode::BAD_REQUEST,
        },
        PortfolioError::Ingest(IngestError::Task(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        PortfolioError::Ingest(_) => StatusCode::BAD_REQUEST,
        PortfolioError::Backup(_) | PortfolioError::Comment(_) => StatusCode::BAD_REQUEST,
        PortfolioError::Export(_) | PortfolioError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PortfolioError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let message = match &self {
            PortfolioError::Ingest(_) => Some("Failed to process uploaded file.".to_string()),
            _ => None,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
