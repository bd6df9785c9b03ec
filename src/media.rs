//! The user's chosen audio file and helpers derived from its name.

use crate::config::ACCEPTED_EXTENSIONS;
use crate::error::Audio2MidiError;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// An audio file handed to the controller by a file picker, drop surface or
/// the CLI.
#[derive(Clone)]
pub struct SelectedFile {
    bytes: Arc<[u8]>,
    name: String,
    size: u64,
    media_type: String,
}

impl SelectedFile {
    /// Wrap bytes supplied by the host. `size` is taken as reported.
    pub fn new(
        bytes: impl Into<Arc<[u8]>>,
        name: impl Into<String>,
        size: u64,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            name: name.into(),
            size,
            media_type: media_type.into(),
        }
    }

    /// Read a local file, inferring the media type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Audio2MidiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Audio2MidiError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Audio2MidiError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Audio2MidiError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        let media_type = media_type_for(&name).to_string();
        debug!("Read {} ({} bytes, {})", path.display(), bytes.len(), media_type);

        let size = bytes.len() as u64;
        Ok(Self::new(bytes, name, size, media_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Size as shown under the file name, e.g. `1.00 MB`.
    pub fn display_size(&self) -> String {
        format_megabytes(self.size)
    }

    /// Whether the extension is one the file picker offers.
    pub fn has_accepted_extension(&self) -> bool {
        has_accepted_extension(&self.name)
    }

    pub fn summary(&self) -> FileSummary {
        FileSummary {
            name: self.name.clone(),
            size_bytes: self.size,
            display_size: self.display_size(),
            media_type: self.media_type.clone(),
        }
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("media_type", &self.media_type)
            .finish()
    }
}

/// What the drop zone shows once a file is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size_bytes: u64,
    pub display_size: String,
    pub media_type: String,
}

/// Suggested download name for the MIDI result.
///
/// Everything from the first `.` onwards is dropped, so `my.song.wav`
/// becomes `my.mid`. A name starting with a dot yields `.mid`.
pub fn midi_file_name(original: &str) -> String {
    let stem = original.split('.').next().unwrap_or_default();
    format!("{stem}.mid")
}

/// `true` when the name ends in one of [`ACCEPTED_EXTENSIONS`] (case-insensitive).
pub fn has_accepted_extension(name: &str) -> bool {
    extension(name).is_some_and(|ext| {
        ACCEPTED_EXTENSIONS
            .iter()
            .any(|accepted| ext.eq_ignore_ascii_case(accepted))
    })
}

/// Best-effort media type from the file extension.
pub fn media_type_for(name: &str) -> &'static str {
    match extension(name).map(str::to_ascii_lowercase).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}

fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}
