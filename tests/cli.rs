//! End-to-end tests for the `spikepack` binary.
//!
//! Tests cover:
//! - Encode and decode through files and through stdin/stdout
//! - A shared `--config` file on both sides
//! - `inspect` JSON output and `dump` sample listing
//! - Non-zero exit status on bad input

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use spikepack::bridge::{WavHeader, WavWriter};
use spikepack::Sample;

fn spikepack() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_spikepack"));
    cmd.arg("--log-level").arg("warn");
    cmd
}

/// A slowly drifting signal with repeats, so both run kinds appear.
fn recording() -> Vec<Sample> {
    (0..3_000u32).map(|i| (2_048 + (i / 7) % 40) as Sample).collect()
}

fn make_wav(samples: &[Sample]) -> Vec<u8> {
    let header = WavHeader::mono_pcm16(19_531, samples.len()).unwrap();
    let mut writer = WavWriter::new(header, Vec::new());
    writer.write_header().unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.into_inner().unwrap()
}

/// Runs `cmd` with `input` on stdin and returns its output.
fn run_piped(cmd: &mut Command, input: &[u8]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    child.wait_with_output().unwrap()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "spikepack failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn encode_file(config: Option<&Path>, input: &Path, output: &Path) {
    let mut cmd = spikepack();
    if let Some(config) = config {
        cmd.arg("--config").arg(config);
    }
    let out = cmd
        .arg("encode")
        .arg("--input")
        .arg(input)
        .arg("--output")
        .arg(output)
        .output()
        .unwrap();
    assert_success(&out);
}

#[test]
fn test_encode_file_then_decode_pipe() {
    // 1. Arrange
    let dir = tempfile::tempdir().unwrap();
    let wav = make_wav(&recording());
    let wav_path = dir.path().join("recording.wav");
    let spk_path = dir.path().join("recording.spk");
    fs::write(&wav_path, &wav).unwrap();

    // 2. Act
    encode_file(None, &wav_path, &spk_path);
    let encoded = fs::read(&spk_path).unwrap();
    let decoded = run_piped(spikepack().arg("decode"), &encoded);

    // 3. Assert
    assert_success(&decoded);
    assert_eq!(&encoded[..44], &wav[..44], "header is copied verbatim");
    assert!(encoded.len() < wav.len());
    assert_eq!(decoded.stdout, wav);
}

#[test]
fn test_shared_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("codec.json");
    fs::write(
        &config_path,
        r#"{ "cache_size": 64, "encoded_seq_max_len": 500, "write_end_marker": true }"#,
    )
    .unwrap();

    let wav = make_wav(&recording());
    let wav_path = dir.path().join("in.wav");
    let spk_path = dir.path().join("in.spk");
    fs::write(&wav_path, &wav).unwrap();

    encode_file(Some(&config_path), &wav_path, &spk_path);
    let encoded = fs::read(&spk_path).unwrap();
    assert_eq!(&encoded[encoded.len() - 2..], &[0, 0], "end marker written");

    let decoded = run_piped(
        spikepack().arg("--config").arg(&config_path).arg("decode"),
        &encoded,
    );
    assert_success(&decoded);
    assert_eq!(decoded.stdout, wav);
}

#[test]
fn test_inspect_reports_json() {
    let samples = recording();
    let encoded = run_piped(spikepack().arg("encode"), &make_wav(&samples));
    assert_success(&encoded);

    let inspected = run_piped(spikepack().arg("inspect"), &encoded.stdout);
    assert_success(&inspected);

    let report: serde_json::Value = serde_json::from_slice(&inspected.stdout).unwrap();
    assert_eq!(report["header"]["num_channels"], 1);
    assert_eq!(report["header"]["sample_rate"], 19_531);
    assert_eq!(report["stream"]["num_samples"], samples.len());
}

#[test]
fn test_dump_prints_binary_words() {
    let samples: Vec<Sample> = vec![0, 1, 0x8000, 0xFFFF];
    let out = run_piped(spikepack().arg("dump"), &make_wav(&samples));
    assert_success(&out);

    let text = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "0000000000000000",
            "0000000000000001",
            "1000000000000000",
            "1111111111111111",
        ]
    );
}

#[test]
fn test_bad_input_fails() {
    let out = run_piped(spikepack().arg("encode"), b"definitely not a wav file, just text");
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());

    let dir = tempfile::tempdir().unwrap();
    let out = spikepack()
        .arg("decode")
        .arg("--input")
        .arg(dir.path().join("missing.spk"))
        .output()
        .unwrap();
    assert!(!out.status.success());
}
