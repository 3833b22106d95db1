// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::Path;

use approx::assert_abs_diff_eq;
use fitsio::{hdu::HduInfo, FitsFile};
use tempfile::TempDir;

use crate::{get_cmd_output, hline, make_raw_recording, make_wav_recording, tone};

/// Read the calibrated power out of a spectrogram FITS file, as
/// `(rows, cols, data)`.
fn read_power(file: &Path) -> (usize, usize, Vec<f64>) {
    let mut fptr = FitsFile::open(file).unwrap();
    let hdu = fptr.hdu("SPECTROGRAM").unwrap();
    let (rows, cols) = match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => (shape[0], shape[1]),
        _ => panic!("SPECTROGRAM isn't an image"),
    };
    let data: Vec<f64> = hdu.read_image(&mut fptr).unwrap();
    (rows, cols, data)
}

#[test]
fn test_raw_recording_to_fits() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    // 640 complex samples, window 64, step 32 -> 18 segments.
    let recording = make_raw_recording(tmp_dir.path(), "rec.iq", &tone(640, 5.0));
    let output = tmp_dir.path().join("spectrogram.fits");

    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "spectrogram",
            "--input", &format!("{}", recording.display()),
            "--sample-rate", "64000",
            "--window-size", "64",
            "--overlap", "32",
            "--output-fits", &format!("{}", output.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "spectrogram failed: {}", cmd.err().unwrap());
    assert!(output.exists());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(
        stdout.contains("640 complex samples at 64000 Hz"),
        "unexpected sample count in log: {stdout}"
    );

    let (rows, cols, data) = read_power(&output);
    assert_eq!((rows, cols), (64, 18));
    // The tone sits 5 bins above the centre of every column.
    for i_col in 0..cols {
        let column: Vec<f64> = (0..rows).map(|i_row| data[i_row * cols + i_col]).collect();
        let peak = column
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 37, "column {i_col}");
    }

    let mut fptr = FitsFile::open(&output).unwrap();
    let hdu = fptr.hdu("FREQ").unwrap();
    let freq: Vec<f64> = hdu.read_image(&mut fptr).unwrap();
    assert_abs_diff_eq!(freq[0], 1420.405751e6 - 64000.0, epsilon = 1e-3);
    assert_abs_diff_eq!(freq[63], 1420.405751e6 + 64000.0, epsilon = 1e-3);
}

#[test]
fn test_wav_recording_uses_header_sample_rate() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let recording = make_wav_recording(tmp_dir.path(), "rec.wav", &tone(256, 3.0), 8000);
    let output = tmp_dir.path().join("spectrogram.fits");

    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "spectrogram",
            "-i", &format!("{}", recording.display()),
            "-w", "64",
            "--overlap", "0",
            "--output-fits", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "spectrogram failed: {}", cmd.err().unwrap());

    let mut fptr = FitsFile::open(&output).unwrap();
    let hdu = fptr.primary_hdu().unwrap();
    let srate: i64 = hdu.read_key(&mut fptr, "SRATE").unwrap();
    let duration: f64 = hdu.read_key(&mut fptr, "DURATION").unwrap();
    assert_eq!(srate, 8000);
    assert_abs_diff_eq!(duration, 256.0 / 8000.0, epsilon = 1e-12);

    let (rows, cols, _) = read_power(&output);
    // (256 - 64) / 64 = 3
    assert_eq!((rows, cols), (64, 3));
}

#[test]
fn test_short_recording_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let recording = make_raw_recording(tmp_dir.path(), "rec.cf32", &tone(32, 1.0));
    let output = tmp_dir.path().join("spectrogram.fits");

    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "spectrogram",
            "-i", &format!("{}", recording.display()),
            "-s", "1000",
            "-w", "64",
            "--overlap", "32",
            "--output-fits", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "spectrogram failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("empty"), "{stdout}");
    assert!(!output.exists());
}

#[test]
fn test_raw_recording_needs_sample_rate() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let recording = make_raw_recording(tmp_dir.path(), "rec.bin", &tone(128, 1.0));

    let cmd = hline()
        .args(["spectrogram", "-i", &format!("{}", recording.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("--sample-rate"), "{stderr}");
    assert!(stderr.contains("Input recordings"), "{stderr}");
}

#[test]
fn test_odd_sample_count() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let mut samples = tone(128, 1.0);
    samples.push(0.5);
    let recording = make_raw_recording(tmp_dir.path(), "rec.raw", &samples);
    let output = tmp_dir.path().join("spectrogram.fits");

    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "spectrogram",
            "-i", &format!("{}", recording.display()),
            "-s", "1000",
            "-w", "16",
            "--overlap", "8",
            "--output-fits", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Input recordings"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn test_save_toml_then_reuse() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let recording = make_raw_recording(tmp_dir.path(), "rec.iq", &tone(256, 2.0));
    let output = tmp_dir.path().join("spectrogram.fits");
    let toml = tmp_dir.path().join("args.toml");

    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "spectrogram",
            "-i", &format!("{}", recording.display()),
            "-s", "1000",
            "-w", "32",
            "--overlap", "16",
            "--s21", "-40",
            "--output-fits", &format!("{}", output.display()),
            "--save-toml", &format!("{}", toml.display()),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "spectrogram failed: {}", cmd.err().unwrap());
    assert!(toml.exists());
    assert!(!output.exists());

    let cmd = hline()
        .args(["spectrogram", &format!("{}", toml.display())])
        .ok();
    assert!(cmd.is_ok(), "spectrogram failed: {}", cmd.err().unwrap());
    assert!(output.exists());

    let mut fptr = FitsFile::open(&output).unwrap();
    let hdu = fptr.primary_hdu().unwrap();
    let gaincorr: f64 = hdu.read_key(&mut fptr, "GAINCORR").unwrap();
    let winsize: i64 = hdu.read_key(&mut fptr, "WINSIZE").unwrap();
    assert_abs_diff_eq!(gaincorr, -40.0, epsilon = 1e-12);
    assert_eq!(winsize, 32);
}

#[test]
#[cfg(feature = "plotting")]
fn test_plot() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let recording = make_raw_recording(tmp_dir.path(), "rec.iq", &tone(640, 5.0));
    let plot = tmp_dir.path().join("spectrogram.png");

    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "spectrogram",
            "-i", &format!("{}", recording.display()),
            "-s", "64000",
            "-w", "64",
            "--overlap", "32",
            "--output-plot", &format!("{}", plot.display()),
            "--plot-size", "400", "300",
        ])
        .ok();
    assert!(cmd.is_ok(), "spectrogram failed: {}", cmd.err().unwrap());
    assert!(plot.exists());
}

#[test]
fn test_non_finite_recording_is_zeroed_with_a_warning() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let recording = make_raw_recording(tmp_dir.path(), "nan.iq", &vec![f32::NAN; 2 * 640]);
    let output = tmp_dir.path().join("spectrogram.fits");

    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "spectrogram",
            "--input", &format!("{}", recording.display()),
            "--sample-rate", "64000",
            "--window-size", "64",
            "--overlap", "32",
            "--output-fits", &format!("{}", output.display()),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "spectrogram failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(
        stdout.contains("non-finite I/Q samples were replaced with zeros"),
        "no non-finite warning: {stdout}"
    );

    // Zeroed samples are finite, so every segment survives.
    let (rows, cols, _) = read_power(&output);
    assert_eq!((rows, cols), (64, 18));
}
