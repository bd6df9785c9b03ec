//! Output types returned by the `convert*` entry points.

use serde::{Deserialize, Serialize};

/// The MIDI file plus a summary of how it was obtained.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Raw MIDI bytes as returned by the server.
    pub midi: Vec<u8>,
    pub summary: ConversionSummary,
}

/// Serialisable record of one successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Name of the uploaded audio file.
    pub input_name: String,
    pub input_bytes: u64,
    pub media_type: String,
    /// Suggested file name for the MIDI result.
    pub download_name: String,
    pub midi_bytes: usize,
    pub endpoint: String,
    /// Wall-clock time from upload start to response.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serialises_to_json() {
        let s = ConversionSummary {
            input_name: "track.mp3".into(),
            input_bytes: 1_048_576,
            media_type: "audio/mpeg".into(),
            download_name: "track.mid".into(),
            midi_bytes: 512,
            endpoint: "http://localhost/api/v1/transcribe".into(),
            duration_ms: 1200,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains(r#""download_name":"track.mid""#), "got: {json}");
        let back: ConversionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
