//! The upload/response state machine.
//!
//! ```text
//! Idle ──begin──▶ InFlight ──finish(Ok)──▶ Succeeded
//!                          └─finish(Err)─▶ Failed
//!
//! Succeeded | Failed ──begin──▶ InFlight
//! Succeeded | Failed ──select─▶ Idle
//! InFlight           ──select─▶ InFlight
//! ```
//!
//! `start_conversion` is `begin_conversion` → [`PendingConversion::send`]
//! → `finish`. Hosts that need to keep handling events while the request
//! is out (a new file dropped, say) drive the three steps themselves.
//!
//! Only one attempt may be in flight: `begin_conversion` returns `None`
//! while the phase is `InFlight`. A file selected meanwhile does not
//! affect the outstanding attempt; its response is applied when it lands.

use crate::api::TranscriptionApi;
use crate::blob::{BlobHandle, BlobStore};
use crate::error::ConversionError;
use crate::media::{midi_file_name, SelectedFile};
use crate::progress::ProgressCallback;
use crate::view::{DownloadLink, ViewState, IN_FLIGHT_LABEL, SUBMIT_LABEL};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Current stage of the conversion flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestPhase {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

impl RequestPhase {
    /// `Succeeded` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestPhase::Succeeded | RequestPhase::Failed)
    }
}

/// Downloadable MIDI bytes from a successful attempt.
#[derive(Debug)]
pub struct ConversionResult {
    handle: BlobHandle,
    download_name: String,
}

impl ConversionResult {
    pub fn url(&self) -> &str {
        self.handle.url()
    }

    pub fn bytes(&self) -> &[u8] {
        self.handle.bytes()
    }

    /// `<original name up to the first dot>.mid`
    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    pub fn len(&self) -> usize {
        self.handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_empty()
    }
}

// Result and error live inside the phase so they can never coexist.
#[derive(Debug)]
enum State {
    Idle,
    InFlight { attempt: u64 },
    Succeeded(ConversionResult),
    Failed(String),
}

/// An attempt that has entered `InFlight` but not yet been sent.
///
/// Owns a snapshot of the file, so the controller stays free for other
/// events while [`send`](Self::send) is awaited.
pub struct PendingConversion {
    attempt: u64,
    file: SelectedFile,
    progress: Option<ProgressCallback>,
}

impl PendingConversion {
    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    /// Perform the request. Never fails; the outcome is carried inside.
    pub async fn send<A: TranscriptionApi>(self, api: &A) -> CompletedConversion {
        if let Some(ref cb) = self.progress {
            cb.on_upload_start(self.file.name(), self.file.size());
        }
        let outcome = api.transcribe(&self.file).await;
        CompletedConversion {
            attempt: self.attempt,
            file_name: self.file.name().to_string(),
            outcome,
        }
    }
}

impl fmt::Debug for PendingConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingConversion")
            .field("attempt", &self.attempt)
            .field("file", &self.file)
            .finish()
    }
}

/// The response (or failure) for one attempt, ready for [`UploadController::finish`].
#[derive(Debug)]
pub struct CompletedConversion {
    attempt: u64,
    file_name: String,
    outcome: Result<Vec<u8>, ConversionError>,
}

impl CompletedConversion {
    pub fn outcome(&self) -> &Result<Vec<u8>, ConversionError> {
        &self.outcome
    }
}

/// Owns the selected file, its preview, and the conversion outcome.
pub struct UploadController {
    store: BlobStore,
    file: Option<SelectedFile>,
    preview: Option<BlobHandle>,
    state: State,
    last_attempt: u64,
    progress: Option<ProgressCallback>,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadController {
    pub fn new() -> Self {
        Self::with_store(BlobStore::new())
    }

    /// Mint preview and result handles from `store`.
    pub fn with_store(store: BlobStore) -> Self {
        Self {
            store,
            file: None,
            preview: None,
            state: State::Idle,
            last_attempt: 0,
            progress: None,
        }
    }

    pub fn with_progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    // ── Events ───────────────────────────────────────────────────────────

    /// Select a file from raw parts, as a picker or drop surface reports them.
    pub fn select_file(
        &mut self,
        bytes: impl Into<std::sync::Arc<[u8]>>,
        name: impl Into<String>,
        size: u64,
        media_type: impl Into<String>,
    ) {
        self.select(SelectedFile::new(bytes, name, size, media_type));
    }

    /// Replace the selected file. Never fails.
    ///
    /// Mints a fresh preview (revoking the previous one) and clears any
    /// result or error. An in-flight attempt keeps its phase.
    pub fn select(&mut self, file: SelectedFile) {
        if !file.has_accepted_extension() {
            debug!("Selected '{}' has an unlisted extension; accepting anyway", file.name());
        }
        info!("Selected {} ({})", file.name(), file.display_size());

        self.preview = Some(self.store.create(file.shared_bytes()));
        self.file = Some(file);
        if !matches!(self.state, State::InFlight { .. }) {
            self.state = State::Idle;
        }
    }

    /// Enter `InFlight` and hand back the request to perform.
    ///
    /// Returns `None`, leaving the phase untouched, when no file is
    /// selected or an attempt is already in flight.
    pub fn begin_conversion(&mut self) -> Option<PendingConversion> {
        let Some(file) = self.file.clone() else {
            debug!("Conversion requested with no file selected; ignoring");
            return None;
        };
        if let State::InFlight { attempt } = self.state {
            warn!("Attempt {} still in flight; ignoring new conversion request", attempt);
            return None;
        }

        self.last_attempt += 1;
        self.state = State::InFlight {
            attempt: self.last_attempt,
        };
        debug!("Attempt {} started for {}", self.last_attempt, file.name());

        Some(PendingConversion {
            attempt: self.last_attempt,
            file,
            progress: self.progress.clone(),
        })
    }

    /// Apply the outcome of an attempt, leaving the phase terminal.
    ///
    /// Completions that do not belong to the current in-flight attempt are
    /// dropped.
    pub fn finish(&mut self, completed: CompletedConversion) {
        match self.state {
            State::InFlight { attempt } if attempt == completed.attempt => {}
            _ => {
                warn!(
                    "Dropping response for attempt {}: not the attempt in flight",
                    completed.attempt
                );
                return;
            }
        }

        self.state = match completed.outcome {
            Ok(midi) => {
                let download_name = midi_file_name(&completed.file_name);
                info!("Conversion succeeded: {} ({} bytes)", download_name, midi.len());
                if let Some(ref cb) = self.progress {
                    cb.on_conversion_complete(&download_name, midi.len());
                }
                State::Succeeded(ConversionResult {
                    handle: self.store.create(midi.into()),
                    download_name,
                })
            }
            Err(e) => {
                let message = e.user_message();
                warn!("Conversion failed: {}", e);
                if let Some(ref cb) = self.progress {
                    cb.on_conversion_error(&message);
                }
                State::Failed(message)
            }
        };
    }

    /// Run one attempt end to end. No-op without a selected file.
    ///
    /// Returns the phase afterwards, which is terminal whenever an attempt
    /// was actually made.
    pub async fn start_conversion<A: TranscriptionApi>(&mut self, api: &A) -> RequestPhase {
        if let Some(pending) = self.begin_conversion() {
            let completed = pending.send(api).await;
            self.finish(completed);
        }
        self.phase()
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn phase(&self) -> RequestPhase {
        match self.state {
            State::Idle => RequestPhase::Idle,
            State::InFlight { .. } => RequestPhase::InFlight,
            State::Succeeded(_) => RequestPhase::Succeeded,
            State::Failed(_) => RequestPhase::Failed,
        }
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&BlobHandle> {
        self.preview.as_ref()
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        match &self.state {
            State::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            State::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, State::InFlight { .. })
    }

    /// Snapshot for the rendering layer.
    pub fn view(&self) -> ViewState {
        let in_flight = self.is_in_flight();
        ViewState {
            file: self.file.as_ref().map(SelectedFile::summary),
            preview_url: self.preview.as_ref().map(|p| p.url().to_string()),
            error: self.error().map(str::to_owned),
            submit_enabled: self.file.is_some() && !in_flight,
            show_in_flight_label: in_flight,
            submit_label: if in_flight { IN_FLIGHT_LABEL } else { SUBMIT_LABEL },
            download: self.result().map(|r| DownloadLink {
                url: r.url().to_string(),
                file_name: r.download_name().to_string(),
                size_bytes: r.len(),
            }),
        }
    }
}

impl fmt::Debug for UploadController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadController")
            .field("file", &self.file)
            .field("preview", &self.preview)
            .field("state", &self.state)
            .finish()
    }
}
