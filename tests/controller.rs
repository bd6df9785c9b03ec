//! Scenario tests for the upload controller.
//!
//! The network is replaced by [`ScriptedApi`], which answers every upload
//! with a fixed outcome and records what it was sent.

use audio2midi::{
    convert_with, Audio2MidiError, BlobStore, ConversionError, ConversionProgressCallback,
    RequestPhase, SelectedFile, TranscriptionApi, TranscriptionConfig, UploadController,
    FALLBACK_ERROR_MESSAGE,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

struct ScriptedApi {
    outcome: Result<Vec<u8>, ConversionError>,
    uploads: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn ok(midi: &[u8]) -> Self {
        Self::with(Ok(midi.to_vec()))
    }

    fn err(e: ConversionError) -> Self {
        Self::with(Err(e))
    }

    fn with(outcome: Result<Vec<u8>, ConversionError>) -> Self {
        Self {
            outcome,
            uploads: Mutex::new(Vec::new()),
        }
    }

    fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

impl TranscriptionApi for ScriptedApi {
    async fn transcribe(&self, file: &SelectedFile) -> Result<Vec<u8>, ConversionError> {
        self.uploads.lock().unwrap().push(file.name().to_string());
        self.outcome.clone()
    }
}

const MIDI: &[u8] = b"MThd\x00\x00\x00\x06\x00\x00\x00\x01\x01\xe0";

fn select(c: &mut UploadController, name: &str, size: usize) {
    c.select_file(vec![0u8; size], name, size as u64, "audio/mpeg");
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mp3_success_offers_download() {
    let api = ScriptedApi::ok(MIDI);
    let mut c = UploadController::new();
    select(&mut c, "track.mp3", 1024 * 1024);

    let phase = c.start_conversion(&api).await;

    assert_eq!(phase, RequestPhase::Succeeded);
    let result = c.result().expect("result present");
    assert_eq!(result.download_name(), "track.mid");
    assert_eq!(result.bytes(), MIDI);
    assert!(c.error().is_none());
    assert_eq!(api.uploads(), vec!["track.mp3".to_string()]);

    let view = c.view();
    let link = view.download.expect("download enabled");
    assert_eq!(link.file_name, "track.mid");
    assert_eq!(link.size_bytes, MIDI.len());
    assert!(view.submit_enabled);
    assert!(!view.show_in_flight_label);
    assert_eq!(view.file.unwrap().display_size, "1.00 MB");
}

#[tokio::test]
async fn server_detail_is_displayed() {
    let api = ScriptedApi::err(ConversionError::Server {
        status: 500,
        detail: Some("unsupported sample rate".into()),
    });
    let mut c = UploadController::new();
    select(&mut c, "track.wav", 16);

    let phase = c.start_conversion(&api).await;

    assert_eq!(phase, RequestPhase::Failed);
    assert_eq!(c.error(), Some("unsupported sample rate"));
    assert!(c.result().is_none());
    assert_eq!(c.view().error.as_deref(), Some("unsupported sample rate"));
    assert!(c.view().download.is_none());
}

#[tokio::test]
async fn transport_failure_uses_fallback() {
    let api = ScriptedApi::err(ConversionError::Transport("connection reset".into()));
    let mut c = UploadController::new();
    select(&mut c, "track.flac", 16);

    let phase = c.start_conversion(&api).await;

    assert_eq!(phase, RequestPhase::Failed);
    assert_eq!(c.error(), Some(FALLBACK_ERROR_MESSAGE));
}

#[tokio::test]
async fn server_failure_without_detail_uses_fallback() {
    let api = ScriptedApi::err(ConversionError::Server {
        status: 503,
        detail: None,
    });
    let mut c = UploadController::new();
    select(&mut c, "track.m4a", 16);

    c.start_conversion(&api).await;
    assert_eq!(c.error(), Some(FALLBACK_ERROR_MESSAGE));
}

#[tokio::test]
async fn blank_server_detail_uses_fallback() {
    let api = ScriptedApi::err(ConversionError::Server {
        status: 500,
        detail: audio2midi::error::extract_detail(br#"{"detail":""}"#),
    });
    let mut c = UploadController::new();
    select(&mut c, "track.wav", 16);

    let phase = c.start_conversion(&api).await;

    assert_eq!(phase, RequestPhase::Failed);
    assert_eq!(c.error(), Some(FALLBACK_ERROR_MESSAGE));
    assert_eq!(c.view().error.as_deref(), Some(FALLBACK_ERROR_MESSAGE));
}

#[tokio::test]
async fn no_file_means_no_request() {
    let api = ScriptedApi::ok(MIDI);
    let mut c = UploadController::new();

    let phase = c.start_conversion(&api).await;

    assert_eq!(phase, RequestPhase::Idle);
    assert!(api.uploads().is_empty());
    assert!(!c.view().submit_enabled);
}

#[tokio::test]
async fn every_attempt_ends_terminal_and_exclusive() {
    let outcomes = vec![
        Ok(MIDI.to_vec()),
        Err(ConversionError::Transport("dns".into())),
        Err(ConversionError::Server {
            status: 400,
            detail: Some("bad".into()),
        }),
        Err(ConversionError::MalformedResponse("connection closed mid-body".into())),
    ];

    for outcome in outcomes {
        let api = ScriptedApi::with(outcome);
        let mut c = UploadController::new();
        select(&mut c, "a.mp3", 4);

        let phase = c.start_conversion(&api).await;

        assert!(phase.is_terminal(), "phase {phase:?}");
        assert!(
            !(c.result().is_some() && c.error().is_some()),
            "result and error must not coexist"
        );
        assert_eq!(c.result().is_some(), phase == RequestPhase::Succeeded);
        assert_eq!(c.error().is_some(), phase == RequestPhase::Failed);
    }
}

#[tokio::test]
async fn selecting_a_file_clears_result_and_error() {
    let mut c = UploadController::new();

    select(&mut c, "one.mp3", 4);
    c.start_conversion(&ScriptedApi::ok(MIDI)).await;
    assert!(c.result().is_some());
    select(&mut c, "two.mp3", 4);
    assert!(c.result().is_none());
    assert!(c.error().is_none());
    assert_eq!(c.phase(), RequestPhase::Idle);

    c.start_conversion(&ScriptedApi::err(ConversionError::Transport("x".into())))
        .await;
    assert!(c.error().is_some());
    select(&mut c, "three.mp3", 4);
    assert!(c.error().is_none());
    assert!(c.result().is_none());
    assert_eq!(c.phase(), RequestPhase::Idle);
}

#[tokio::test]
async fn retry_after_failure_clears_error() {
    let mut c = UploadController::new();
    select(&mut c, "take.wav", 4);

    c.start_conversion(&ScriptedApi::err(ConversionError::Server {
        status: 500,
        detail: Some("busy".into()),
    }))
    .await;
    assert_eq!(c.error(), Some("busy"));

    let pending = c.begin_conversion().expect("retry allowed after failure");
    assert!(c.error().is_none(), "error cleared on start");
    assert_eq!(c.phase(), RequestPhase::InFlight);

    let completed = pending.send(&ScriptedApi::ok(MIDI)).await;
    c.finish(completed);
    assert_eq!(c.phase(), RequestPhase::Succeeded);
    assert!(c.error().is_none());
}

#[tokio::test]
async fn new_selection_during_flight_does_not_cancel_response() {
    let api = ScriptedApi::ok(MIDI);
    let mut c = UploadController::new();
    select(&mut c, "a.mp3", 4);

    let pending = c.begin_conversion().unwrap();
    select(&mut c, "b.wav", 8);
    assert_eq!(c.phase(), RequestPhase::InFlight, "selection keeps in-flight phase");
    assert!(c.begin_conversion().is_none(), "second attempt is refused");
    assert!(!c.view().submit_enabled);

    let completed = pending.send(&api).await;
    c.finish(completed);

    assert_eq!(c.phase(), RequestPhase::Succeeded);
    assert_eq!(c.selected_file().unwrap().name(), "b.wav");
    // The download is named after the file that was actually uploaded.
    assert_eq!(c.result().unwrap().download_name(), "a.mid");
    assert_eq!(api.uploads(), vec!["a.mp3".to_string()]);
}

#[tokio::test]
async fn superseded_handles_are_released() {
    let store = BlobStore::new();
    let mut c = UploadController::with_store(store.clone());
    select(&mut c, "a.mp3", 4);
    assert_eq!(store.live_count(), 1, "preview");

    c.start_conversion(&ScriptedApi::ok(MIDI)).await;
    let result_url = c.result().unwrap().url().to_string();
    assert_eq!(store.live_count(), 2, "preview + result");

    c.begin_conversion().unwrap();
    assert!(!store.is_live(&result_url), "result revoked on new attempt");
    assert_eq!(store.live_count(), 1);

    drop(c);
    assert_eq!(store.live_count(), 0);
}

#[derive(Default)]
struct CountingCallback {
    uploads: AtomicUsize,
    completes: AtomicUsize,
    errors: AtomicUsize,
}

impl ConversionProgressCallback for CountingCallback {
    fn on_upload_start(&self, _file_name: &str, _size_bytes: u64) {
        self.uploads.fetch_add(1, Ordering::SeqCst);
    }

    fn on_conversion_complete(&self, download_name: &str, _midi_len: usize) {
        assert!(download_name.ends_with(".mid"));
        self.completes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_conversion_error(&self, _message: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn progress_callback_sees_each_attempt() {
    let cb = Arc::new(CountingCallback::default());
    let mut c = UploadController::new().with_progress_callback(cb.clone());
    select(&mut c, "a.mp3", 4);

    c.start_conversion(&ScriptedApi::ok(MIDI)).await;
    c.start_conversion(&ScriptedApi::err(ConversionError::Transport("x".into())))
        .await;

    assert_eq!(cb.uploads.load(Ordering::SeqCst), 2);
    assert_eq!(cb.completes.load(Ordering::SeqCst), 1);
    assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
}

// ── One-shot API ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_with_reads_file_and_returns_midi() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("my.song.wav");
    std::fs::write(&input, vec![7u8; 64]).unwrap();

    let api = ScriptedApi::ok(MIDI);
    let output = convert_with(&api, &input, &TranscriptionConfig::default())
        .await
        .expect("conversion succeeds");

    assert_eq!(output.midi, MIDI);
    assert_eq!(output.summary.download_name, "my.mid");
    assert_eq!(output.summary.input_bytes, 64);
    assert_eq!(output.summary.media_type, "audio/wav");
}

#[tokio::test]
async fn convert_with_maps_failure_to_displayed_message() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("track.wav");
    std::fs::write(&input, b"RIFF").unwrap();

    let api = ScriptedApi::err(ConversionError::Server {
        status: 500,
        detail: Some("unsupported sample rate".into()),
    });
    let err = convert_with(&api, &input, &TranscriptionConfig::default())
        .await
        .unwrap_err();

    match err {
        Audio2MidiError::ConversionFailed { message } => {
            assert_eq!(message, "unsupported sample rate")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn convert_with_missing_input() {
    let api = ScriptedApi::ok(MIDI);
    let err = convert_with(&api, "/no/such/file.mp3", &TranscriptionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Audio2MidiError::FileNotFound { .. }));
    assert!(api.uploads().is_empty());
}

#[test]
fn controller_is_usable_from_sync_code() {
    let mut c = UploadController::new();
    select(&mut c, "a.mp3", 4);
    let phase = tokio_test::block_on(c.start_conversion(&ScriptedApi::ok(MIDI)));
    assert_eq!(phase, RequestPhase::Succeeded);
}
