//! `spikepack` binary: lossless compression of 16-bit mono PCM WAV files.
//!
//! # Usage
//!
//! ```bash
//! # Encode a recording (the WAV header is kept, samples are compressed)
//! spikepack encode --input data/recording.wav --output recording.spk
//!
//! # Decode it back, byte for byte
//! spikepack decode --input recording.spk --output restored.wav
//!
//! # Pipes work too; logs go to stderr
//! cat recording.wav | spikepack encode | spikepack decode > restored.wav
//!
//! # Summarize an encoded file without decoding it
//! spikepack inspect --input recording.spk
//!
//! # Print every sample of a plain WAV file as a 16-digit binary word
//! spikepack dump --input data/recording.wav
//! ```
//!
//! Encoder and decoder must run with the same `--config`.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;

use spikepack::bridge::{self, StreamInfo, WavHeader, WavReader};
use spikepack::CodecConfig;

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "spikepack",
    version = spikepack::VERSION,
    about = "Adaptive frequency-cache codec for 16-bit mono PCM WAV files",
    long_about = None,
)]
struct Cli {
    /// JSON codec configuration. Missing fields take their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error. `RUST_LOG` overrides it.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a WAV file.
    Encode(IoArgs),
    /// Restore a WAV file from its compressed form.
    Decode(IoArgs),
    /// Print the structure of a compressed file as JSON.
    Inspect {
        /// Input path (default: stdin).
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Print the samples of an uncompressed WAV file, one binary word per line.
    Dump(IoArgs),
}

#[derive(Args, Debug)]
struct IoArgs {
    /// Input path (default: stdin).
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Output path (default: stdout).
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct InspectReport<'a> {
    header: &'a WavHeader,
    stream: &'a StreamInfo,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    log::debug!("spikepack {}", spikepack::VERSION);

    let config = match &cli.config {
        Some(path) => CodecConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => CodecConfig::default(),
    };
    log::debug!("codec config: {}", serde_json::to_string(&config)?);

    match cli.command {
        Command::Encode(args) => {
            let input = open_input(args.input.as_deref())?;
            let mut output = open_output(args.output.as_deref())?;
            let stats = bridge::encode_wav(input, &mut output, &config).context("encode failed")?;
            output.flush()?;
            log::info!("encoder stats: {}", serde_json::to_string(&stats)?);
        }
        Command::Decode(args) => {
            let input = open_input(args.input.as_deref())?;
            let mut output = open_output(args.output.as_deref())?;
            let stats = bridge::decode_wav(input, &mut output, &config).context("decode failed")?;
            output.flush()?;
            log::info!("decoder stats: {}", serde_json::to_string(&stats)?);
        }
        Command::Inspect { input } => {
            let mut bytes = Vec::new();
            open_input(input.as_deref())?.read_to_end(&mut bytes)?;

            let mut cursor = bytes.as_slice();
            let header = WavHeader::read_from(&mut cursor).context("missing WAV header")?;
            let stream = bridge::analyze_stream(cursor).context("inspect failed")?;

            let report = InspectReport {
                header: &header,
                stream: &stream,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Dump(args) => {
            let reader = WavReader::new(open_input(args.input.as_deref())?)
                .context("missing WAV header")?;
            let mut output = open_output(args.output.as_deref())?;
            let mut count = 0usize;
            for sample in reader {
                writeln!(output, "{:016b}", sample.context("dump failed")?)?;
                count += 1;
            }
            output.flush()?;
            log::info!("dumped {} samples", count);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Installs `env_logger` on stderr with a `[LEVEL] message` format.
fn init_logging(level: &str) -> Result<()> {
    let level: LevelFilter = level
        .parse()
        .with_context(|| format!("invalid log level: {}", level))?;

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    builder.target(env_logger::Target::Stderr);
    builder.try_init()?;
    Ok(())
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin().lock())),
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}
