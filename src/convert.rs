//! One-shot conversion entry points.
//!
//! These drive an [`UploadController`] from file selection to a terminal
//! phase and turn the outcome into a `Result`. Hosts with their own event
//! loop (a GUI, a TUI) use the controller directly instead.

use crate::api::{HttpTranscriptionApi, TranscriptionApi};
use crate::config::TranscriptionConfig;
use crate::controller::UploadController;
use crate::error::{Audio2MidiError, FALLBACK_ERROR_MESSAGE};
use crate::media::{midi_file_name, SelectedFile};
use crate::output::{ConversionOutput, ConversionSummary};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Upload a local audio file and return the MIDI bytes.
///
/// # Errors
/// - input missing or unreadable
/// - HTTP client could not be built
/// - [`Audio2MidiError::ConversionFailed`] carrying the message a user
///   would see (server `detail` or the generic fallback)
pub async fn convert(
    input: impl AsRef<Path>,
    config: &TranscriptionConfig,
) -> Result<ConversionOutput, Audio2MidiError> {
    let api = HttpTranscriptionApi::new(config)?;
    convert_with(&api, input, config).await
}

/// Like [`convert`], but against any [`TranscriptionApi`].
pub async fn convert_with<A: TranscriptionApi>(
    api: &A,
    input: impl AsRef<Path>,
    config: &TranscriptionConfig,
) -> Result<ConversionOutput, Audio2MidiError> {
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());

    let file = SelectedFile::from_path(input).await?;

    let mut controller = UploadController::new();
    if let Some(ref cb) = config.progress_callback {
        controller = controller.with_progress_callback(cb.clone());
    }
    controller.select(file);

    let start = Instant::now();
    let phase = controller.start_conversion(api).await;
    let duration_ms = start.elapsed().as_millis() as u64;
    debug!("Attempt ended in {:?} after {}ms", phase, duration_ms);

    let file = controller
        .selected_file()
        .ok_or(Audio2MidiError::NoFileSelected)?;

    let Some(result) = controller.result() else {
        let message = controller
            .error()
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_string();
        return Err(Audio2MidiError::ConversionFailed { message });
    };

    let summary = ConversionSummary {
        input_name: file.name().to_string(),
        input_bytes: file.size(),
        media_type: file.media_type().to_string(),
        download_name: result.download_name().to_string(),
        midi_bytes: result.len(),
        endpoint: config.endpoint.clone(),
        duration_ms,
    };
    info!(
        "Conversion complete: {} → {} ({} bytes, {}ms)",
        summary.input_name, summary.download_name, summary.midi_bytes, duration_ms
    );

    Ok(ConversionOutput {
        midi: result.bytes().to_vec(),
        summary,
    })
}

/// Convert and write the MIDI file to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &TranscriptionConfig,
) -> Result<ConversionSummary, Audio2MidiError> {
    let output = convert(input, config).await?;
    write_midi(output_path.as_ref(), &output.midi).await?;
    Ok(output.summary)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &TranscriptionConfig,
) -> Result<ConversionOutput, Audio2MidiError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Audio2MidiError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input, config))
}

/// Where the MIDI lands when no output path is given: `<stem>.mid` next to
/// the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(midi_file_name(&name))
}

/// Atomically write `bytes` to `path`, creating parent directories.
pub async fn write_midi(path: &Path, bytes: &[u8]) -> Result<(), Audio2MidiError> {
    let write_err = |e| Audio2MidiError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("mid.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        if let Err(rm) = tokio::fs::remove_file(&tmp_path).await {
            debug!("Could not remove {}: {}", tmp_path.display(), rm);
        }
        return Err(write_err(e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
