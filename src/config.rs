//! Configuration for talking to the transcription service.
//!
//! Everything the client needs to know about the remote end lives in
//! [`TranscriptionConfig`], built via its [`TranscriptionConfigBuilder`].
//! The defaults reproduce the fixed contract of the hosted service: one
//! multipart part named `file`, POSTed to the `/api/v1/transcribe` route,
//! no timeout, no retries.

use crate::error::Audio2MidiError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::time::Duration;

/// Hosted transcription endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://audiotomidi-server.onrender.com/api/v1/transcribe";

/// Multipart part name the server reads the upload from.
pub const DEFAULT_FIELD_NAME: &str = "file";

/// Extensions the file picker offers. A hint, never enforced.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a"];

/// Configuration for an audio-to-MIDI conversion.
///
/// # Example
/// ```rust
/// use audio2midi::TranscriptionConfig;
///
/// let config = TranscriptionConfig::builder()
///     .endpoint("http://localhost:8000/api/v1/transcribe")
///     .timeout_secs(300)
///     .build()
///     .unwrap();
/// assert_eq!(config.field_name, "file");
/// ```
#[derive(Clone)]
pub struct TranscriptionConfig {
    /// Absolute http/https URL the upload is POSTed to.
    pub endpoint: String,

    /// Name of the multipart part carrying the audio bytes. Default: `file`.
    pub field_name: String,

    /// Whole-request timeout. Default: none.
    ///
    /// Transcription of a long track can take minutes on a cold server, so
    /// the client waits indefinitely unless told otherwise.
    pub timeout: Option<Duration>,

    /// `User-Agent` header sent with the upload.
    pub user_agent: String,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            timeout: None,
            user_agent: concat!("audio2midi/", env!("CARGO_PKG_VERSION")).to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranscriptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionConfig")
            .field("endpoint", &self.endpoint)
            .field("field_name", &self.field_name)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl TranscriptionConfig {
    /// Create a new builder for `TranscriptionConfig`.
    pub fn builder() -> TranscriptionConfigBuilder {
        TranscriptionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranscriptionConfig`].
#[derive(Debug)]
pub struct TranscriptionConfigBuilder {
    config: TranscriptionConfig,
}

impl TranscriptionConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.config.field_name = name.into();
        self
    }

    /// A value of 0 means "no timeout".
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranscriptionConfig, Audio2MidiError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.endpoint).map_err(|e| {
            Audio2MidiError::InvalidConfig(format!("endpoint '{}' is not a URL: {e}", c.endpoint))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Audio2MidiError::InvalidConfig(format!(
                "endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.field_name.trim().is_empty() {
            return Err(Audio2MidiError::InvalidConfig(
                "multipart field name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
