//! The transcription service boundary.
//!
//! [`TranscriptionApi`] is the only way the rest of the crate talks to the
//! network. [`HttpTranscriptionApi`] is the real implementation; tests and
//! embedders can supply their own without touching the controller.
//!
//! ## Wire contract
//!
//! ```text
//! POST <endpoint>
//! Content-Type: multipart/form-data
//!   part "file": <audio bytes>, filename = original name, type = media type
//!
//! 2xx      → body is the MIDI file
//! non-2xx  → body may be JSON {"detail": "<message>"}
//! ```
//!
//! One request per attempt. No retries, no auth.

use crate::config::TranscriptionConfig;
use crate::error::{extract_detail, Audio2MidiError, ConversionError};
use crate::media::SelectedFile;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use tracing::{debug, info, warn};

/// Uploads one audio file and returns the MIDI bytes.
pub trait TranscriptionApi: Send + Sync {
    /// Send `file` for transcription.
    ///
    /// Every failure is reported as a [`ConversionError`]; nothing panics
    /// and nothing is retried.
    fn transcribe(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<Vec<u8>, ConversionError>> + Send;
}

/// reqwest-backed [`TranscriptionApi`].
#[derive(Debug, Clone)]
pub struct HttpTranscriptionApi {
    client: reqwest::Client,
    endpoint: String,
    field_name: String,
}

impl HttpTranscriptionApi {
    pub fn new(config: &TranscriptionConfig) -> Result<Self, Audio2MidiError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Audio2MidiError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            field_name: config.field_name.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(&self, file: &SelectedFile) -> Form {
        let media_type = file.media_type();
        let untyped = || Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string());

        let part = if is_media_type(media_type) {
            // mime_str consumes the part, so a late rejection costs a rebuild.
            untyped().mime_str(media_type).unwrap_or_else(|e| {
                debug!("Ignoring media type '{}': {}", media_type, e);
                untyped()
            })
        } else {
            debug!("Ignoring media type '{}': not type/subtype", media_type);
            untyped()
        };
        Form::new().part(self.field_name.clone(), part)
    }
}

/// `type/subtype[; params]` with RFC 7230 token characters on both sides.
fn is_media_type(s: &str) -> bool {
    fn is_token(t: &str) -> bool {
        !t.is_empty()
            && t.bytes().all(|b| {
                b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
            })
    }

    let essence = s.split(';').next().unwrap_or_default().trim_end();
    match essence.split_once('/') {
        Some((ty, sub)) => is_token(ty) && is_token(sub),
        None => false,
    }
}

impl TranscriptionApi for HttpTranscriptionApi {
    async fn transcribe(&self, file: &SelectedFile) -> Result<Vec<u8>, ConversionError> {
        info!(
            "Uploading {} ({} bytes) to {}",
            file.name(),
            file.bytes().len(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(self.build_form(file))
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", self.endpoint, e);
                ConversionError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            // The body only matters for its `detail`; an unreadable body
            // just means there is none.
            let body = response.bytes().await.unwrap_or_default();
            let detail = extract_detail(&body);
            warn!("Server returned HTTP {} (detail: {:?})", status, detail);
            return Err(ConversionError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ConversionError::MalformedResponse(e.to_string()))?;
        if body.is_empty() {
            warn!("Server returned HTTP {} with an empty body", status);
        }

        debug!("Received {} bytes of MIDI", body.len());
        Ok(body.to_vec())
    }
}
