//! # keeper-backend: HTTP Collaborators for Keeper
//!
//! Every network collaborator the client consumes, each behind a port
//! trait so flows can be tested against stubs:
//!
//! - [`recognition`] - frame → best visual match (`POST /sales`)
//! - [`notifier`] - queued fire-and-forget `POST /vectorize-item`
//! - [`embedder`] - best-effort `POST /itemEmbeder` item push
//! - [`image_host`] - multipart photo upload → durable secure URL
//! - [`identity`] - signed-in shop + staff attribution
//!
//! ## Failure Posture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  recognition / image host  → errors SURFACE; the user reattempts       │
//! │  notifier / embedder       → errors are LOGGED ONLY; the main flow     │
//! │                              never awaits or blocks on them            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod embedder;
pub mod error;
pub mod identity;
pub mod image_host;
pub mod notifier;
pub mod recognition;

// =============================================================================
// Re-exports
// =============================================================================

pub use embedder::{ItemEmbedPayload, ItemEmbedder, ItemEmbedderClient};
pub use error::{BackendError, BackendResult};
pub use identity::{IdentityProvider, StaticIdentity};
pub use image_host::{CapturedImage, ImageHost, ImageHostClient};
pub use notifier::{ImageSavedEvent, NotifierHandle, NotifierQueue, NotifierWorker};
pub use recognition::{encode_frame, RecognitionClient, Recognizer};
