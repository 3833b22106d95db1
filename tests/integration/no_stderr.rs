// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, hline, make_raw_recording, tone};

#[test]
fn test_help_no_stderr() {
    let cmd = hline().arg("--help").ok();
    assert!(cmd.is_ok());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stdout.contains("spectrogram"), "{stdout}");
    assert!(stdout.contains("vna-corrections"), "{stdout}");
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_spectrogram_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let recording = make_raw_recording(tmp_dir.path(), "rec.iq", &tone(256, 1.0));
    let output = tmp_dir.path().join("spectrogram.fits");

    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "spectrogram",
            "-i", &format!("{}", recording.display()),
            "-s", "2000",
            "-w", "32",
            "--overlap", "8",
            "--output-fits", &format!("{}", output.display()),
            "-vv",
        ])
        .ok();
    assert!(cmd.is_ok(), "spectrogram failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_vna_corrections_no_stderr() {
    let cmd = hline().args(["vna-corrections", "--s21", "-42"]).ok();
    assert!(cmd.is_ok(), "vna-corrections failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_no_args_is_an_error() {
    let cmd = hline().ok();
    assert!(cmd.is_err());
}
