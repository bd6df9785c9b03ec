//! Error types for the audio2midi library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ConversionError`] — **Contained**: a single conversion attempt
//!   failed (transport error, server rejection, unreadable body). The
//!   [`crate::controller::UploadController`] catches it, turns it into a
//!   user-facing message and moves to the `Failed` phase. It never
//!   propagates past the controller.
//!
//! * [`Audio2MidiError`] — **Fatal**: the outer surfaces (`convert*`
//!   functions, the CLI) cannot proceed at all: input file missing, output
//!   not writable, bad configuration, or the attempt ended in `Failed`.

use std::path::PathBuf;
use thiserror::Error;

/// Message shown when a failure carries no server-provided `detail`.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred during conversion. Please try again.";

/// All fatal errors returned by the audio2midi library.
#[derive(Debug, Error)]
pub enum Audio2MidiError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Audio file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but could not be read into memory.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The attempt finished in the `Failed` phase.
    ///
    /// `message` is exactly what the controller shows to the user: the
    /// server's `detail` or [`FALLBACK_ERROR_MESSAGE`].
    #[error("Conversion failed: {message}")]
    ConversionFailed { message: String },

    /// `convert*` was asked to run without a file selected.
    #[error("No file selected")]
    NoFileSelected,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output MIDI file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single conversion attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("server returned HTTP {status}{}", detail_suffix(.detail))]
    Server { status: u16, detail: Option<String> },

    /// A 2xx response whose body could not be read.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl ConversionError {
    /// The text displayed in the error area.
    ///
    /// Only a non-empty server-provided `detail` is shown verbatim; every
    /// other failure collapses to [`FALLBACK_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            ConversionError::Server {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Pull the `detail` string out of a JSON error body, if there is one.
///
/// Non-JSON bodies, non-object bodies, non-string and empty `detail`
/// values all yield `None`.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_slice(body).ok()?;
    parsed
        .get("detail")?
        .as_str()
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
}
