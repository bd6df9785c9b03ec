//! # audio2midi
//!
//! Upload an audio file to a remote transcription service and get a MIDI
//! file back.
//!
//! The transcription itself happens on the server. This crate owns the
//! client side: picking a file, one multipart upload, and the
//! idle → in-flight → succeeded/failed state machine a user interface is
//! rendered from.
//!
//! ## Flow
//!
//! ```text
//! audio file
//!  │
//!  ├─ 1. Select   SelectedFile + preview BlobHandle      (media, blob)
//!  ├─ 2. Begin    phase = InFlight                       (controller)
//!  ├─ 3. Upload   multipart POST, part "file"            (api)
//!  ├─ 4. Finish   Succeeded(result) | Failed(message)    (controller)
//!  └─ 5. Render   ViewState / write <stem>.mid            (view, convert)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use audio2midi::{convert_to_file, TranscriptionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranscriptionConfig::default();
//!     let summary = convert_to_file("song.mp3", "song.mid", &config).await?;
//!     eprintln!("{} bytes of MIDI", summary.midi_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Driving the controller from a UI
//!
//! ```rust,no_run
//! use audio2midi::{HttpTranscriptionApi, TranscriptionConfig, UploadController};
//!
//! # async fn run(bytes: Vec<u8>) -> Result<(), audio2midi::Audio2MidiError> {
//! let api = HttpTranscriptionApi::new(&TranscriptionConfig::default())?;
//! let mut controller = UploadController::new();
//! let size = bytes.len() as u64;
//! controller.select_file(bytes, "track.mp3", size, "audio/mpeg");
//! controller.start_conversion(&api).await;
//! let view = controller.view();
//! if let Some(link) = view.download {
//!     println!("download {} from {}", link.file_name, link.url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `audio2midi` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod blob;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod media;
pub mod output;
pub mod progress;
pub mod view;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{HttpTranscriptionApi, TranscriptionApi};
pub use blob::{BlobHandle, BlobStore};
pub use config::{
    TranscriptionConfig, TranscriptionConfigBuilder, ACCEPTED_EXTENSIONS, DEFAULT_ENDPOINT,
    DEFAULT_FIELD_NAME,
};
pub use controller::{
    CompletedConversion, ConversionResult, PendingConversion, RequestPhase, UploadController,
};
pub use convert::{convert, convert_sync, convert_to_file, convert_with, default_output_path};
pub use error::{Audio2MidiError, ConversionError, FALLBACK_ERROR_MESSAGE};
pub use media::{midi_file_name, FileSummary, SelectedFile};
pub use output::{ConversionOutput, ConversionSummary};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use view::{DownloadLink, ViewState};
