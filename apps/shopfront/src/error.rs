//! # App Error Type
//!
//! Unified error type for the flow layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Keeper                                 │
//! │                                                                         │
//! │  UI gesture                     Flow layer                              │
//! │  ──────────                     ──────────                              │
//! │                                                                         │
//! │  add_stock("10")                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Flow Function                                                   │  │
//! │  │  Result<T, AppError>                                             │  │
//! │  │         │                                                        │  │
//! │  │  Validation Error? ── CoreError::Validation ──┐                 │  │
//! │  │         │                                     │                  │  │
//! │  │  Store Error? ─────── StoreError::WriteFailed ┼──► AppError ───►│  │
//! │  │         │                                     │                  │  │
//! │  │  Capture guard? ───── CoreError::CaptureInProgress ┘            │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  The UI switches on the machine-readable `code` and shows `message`.   │
//! │  Retry is always reattempt-driven; nothing auto-retries.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use keeper_backend::BackendError;
use keeper_core::{CoreError, ValidationError};
use keeper_store::StoreError;

/// Flow-layer error, serialized for the UI.
///
/// ```json
/// { "code": "CAPTURE_BUSY", "message": "Finish image capture first" }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for flow responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Document-store operation failed
    StoreError,

    /// HTTP collaborator failed
    BackendError,

    /// Business rule refused the operation
    BusinessLogic,

    /// Close refused: a capture is in flight
    CaptureBusy,

    /// Another submission of the same action is still running
    InFlight,

    /// No signed-in shop
    Unauthenticated,

    /// Internal error
    Internal,
}

impl AppError {
    /// Creates a new app error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{resource} not found: {id}"))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an in-flight guard error (the disabled-button rule).
    pub fn in_flight(action: &str) -> Self {
        AppError::new(
            ErrorCode::InFlight,
            format!("{action} is already running; wait for it to finish"),
        )
    }

    /// Creates an unauthenticated error.
    pub fn unauthenticated() -> Self {
        AppError::new(ErrorCode::Unauthenticated, "No shop is signed in")
    }
}

/// Converts core errors to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ItemNotFound(id) => AppError::not_found("Item", id),
            CoreError::CategoryNotFound(id) => AppError::not_found("Category", id),
            CoreError::CaptureInProgress { .. } => {
                AppError::new(ErrorCode::CaptureBusy, "Finish image capture first.")
            }
            CoreError::Validation(e) => AppError::validation(e.to_string()),
            CoreError::NotALeafCategory { .. }
            | CoreError::CategoryHoldsItems { .. }
            | CoreError::DuplicateName { .. }
            | CoreError::EmptyCart => AppError::new(ErrorCode::BusinessLogic, err.to_string()),
            _ => AppError::new(ErrorCode::Internal, err.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Converts store errors to app errors.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound { entity, id } => AppError::not_found(entity, id),
            StoreError::NotALeaf { .. } => {
                AppError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            StoreError::WriteFailed(e) | StoreError::ReadFailed(e) => {
                tracing::error!("store operation failed: {e}");
                AppError::new(ErrorCode::StoreError, err.to_string())
            }
            _ => AppError::new(ErrorCode::StoreError, err.to_string()),
        }
    }
}

/// Converts backend errors to app errors.
impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        tracing::error!("backend call failed: {err}");
        AppError::new(ErrorCode::BackendError, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for flow operations.
pub type AppResult<T> = Result<T, AppError>;
