//! Render-ready snapshot of the controller.
//!
//! A rendering layer (terminal, web view, native toolkit) reads a
//! [`ViewState`] and never looks at controller internals. Each field maps to
//! exactly one widget.

use crate::media::FileSummary;
use serde::Serialize;

/// Submit button text while idle.
pub const SUBMIT_LABEL: &str = "Convert to MIDI";

/// Submit button text while a request is in flight.
pub const IN_FLIGHT_LABEL: &str = "Converting...";

/// Everything a rendering layer needs to draw the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    /// Name and size shown in the drop zone; `None` shows the placeholder.
    pub file: Option<FileSummary>,

    /// URL for the audio preview player.
    pub preview_url: Option<String>,

    /// Message for the error area.
    pub error: Option<String>,

    /// `false` when no file is selected or a request is in flight.
    pub submit_enabled: bool,

    /// Show the spinner and [`IN_FLIGHT_LABEL`].
    pub show_in_flight_label: bool,

    pub submit_label: &'static str,

    /// Present exactly when a result is available.
    pub download: Option<DownloadLink>,
}

/// The "Download MIDI" affordance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    pub url: String,
    pub file_name: String,
    pub size_bytes: usize,
}
