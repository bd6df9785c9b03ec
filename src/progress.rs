//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::TranscriptionConfigBuilder::progress_callback`] to hear
//! about each attempt the controller makes. The CLI uses it to drive a
//! spinner; a GUI host could use it to toggle a "Converting..." label.
//!
//! # Example
//!
//! ```rust
//! use audio2midi::{ConversionProgressCallback, TranscriptionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     uploads: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_upload_start(&self, file_name: &str, size_bytes: u64) {
//!         self.uploads.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("uploading {file_name} ({size_bytes} bytes)");
//!     }
//! }
//!
//! let config = TranscriptionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { uploads: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the controller as an attempt moves through its phases.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called when the request is about to be sent.
    fn on_upload_start(&self, file_name: &str, size_bytes: u64) {
        let _ = (file_name, size_bytes);
    }

    /// Called when the attempt ends in `Succeeded`.
    ///
    /// # Arguments
    /// * `download_name` — suggested file name for the MIDI result
    /// * `midi_len`      — byte length of the returned MIDI file
    fn on_conversion_complete(&self, download_name: &str, midi_len: usize) {
        let _ = (download_name, midi_len);
    }

    /// Called when the attempt ends in `Failed`.
    ///
    /// `message` is what the user is shown.
    fn on_conversion_error(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranscriptionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
