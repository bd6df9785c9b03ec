//! CLI binary for audio2midi.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `TranscriptionConfig` and writes the MIDI file.

use anyhow::{Context, Result};
use audio2midi::{
    convert, default_output_path, ConversionProgressCallback, ProgressCallback,
    TranscriptionConfig, DEFAULT_ENDPOINT,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the upload is in flight.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_upload_start(&self, file_name: &str, size_bytes: u64) {
        self.bar.set_prefix("Converting...");
        self.bar.set_message(format!(
            "{file_name} {}",
            dim(&format!("({:.2} MB)", size_bytes as f64 / 1024.0 / 1024.0))
        ));
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_conversion_complete(&self, download_name: &str, midi_len: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} Conversion complete: {} {}",
            green("✔"),
            bold(download_name),
            dim(&format!("({midi_len} bytes)"))
        );
    }

    fn on_conversion_error(&self, _message: &str) {
        // main reports the error once the conversion returns.
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert next to the input (writes song.mid)
  audio2midi song.mp3

  # Choose the output path
  audio2midi take.wav -o midi/take.mid

  # Use a self-hosted transcription server
  audio2midi --endpoint http://localhost:8000/api/v1/transcribe song.flac

  # JSON summary on stdout
  audio2midi --json song.m4a

SUPPORTED INPUT:
  .mp3 .wav .flac .m4a are what the service is built for. Other files are
  uploaded as-is; the server decides whether it can read them.

ENVIRONMENT VARIABLES:
  AUDIO2MIDI_ENDPOINT     Transcription endpoint URL
  AUDIO2MIDI_OUTPUT       Output MIDI path
  AUDIO2MIDI_TIMEOUT      Request timeout in seconds (0 = none)
  RUST_LOG                Overrides the log filter
"#;

/// Convert audio files to MIDI using a remote transcription service.
#[derive(Parser, Debug)]
#[command(
    name = "audio2midi",
    version,
    about = "Convert audio files to MIDI using a remote transcription service",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Audio file to convert (mp3, wav, flac, m4a).
    input: PathBuf,

    /// Write MIDI to this file instead of `<stem>.mid` next to the input.
    #[arg(short, long, env = "AUDIO2MIDI_OUTPUT")]
    output: Option<PathBuf>,

    /// Transcription endpoint.
    #[arg(long, env = "AUDIO2MIDI_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds; 0 waits indefinitely.
    #[arg(long, env = "AUDIO2MIDI_TIMEOUT", default_value_t = 0)]
    timeout: u64,

    /// Print a JSON summary (ConversionSummary) on stdout.
    #[arg(long, env = "AUDIO2MIDI_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "AUDIO2MIDI_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "AUDIO2MIDI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "AUDIO2MIDI_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers what INFO logs would say.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    // The error already reads "Conversion failed: <message>".
    let output = convert(&cli.input, &config).await?;

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    audio2midi::convert::write_midi(&output_path, &output.midi)
        .await
        .context("Failed to save MIDI file")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output.summary)
            .context("Failed to serialise summary")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else if !cli.quiet {
        eprintln!(
            "{}  {} → {}  {}",
            green("✔"),
            output.summary.input_name,
            bold(&output_path.display().to_string()),
            dim(&format!("{}ms", output.summary.duration_ms)),
        );
    }

    Ok(())
}

/// Map CLI args to `TranscriptionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<TranscriptionConfig> {
    let mut builder = TranscriptionConfig::builder()
        .endpoint(cli.endpoint.clone())
        .timeout_secs(cli.timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
