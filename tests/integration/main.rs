// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod no_stderr;
mod spectrogram;
mod vna_corrections;

use std::{
    f64::consts::TAU,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use byteorder::{LittleEndian, WriteBytesExt};

fn hline() -> Command {
    Command::cargo_bin("hline").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Interleaved I/Q values of a complex tone `bin` FFT bins (of a 64-sample
/// window) away from the centre.
fn tone(num_samples: usize, bin: f64) -> Vec<f32> {
    (0..num_samples)
        .flat_map(|i| {
            let phase = TAU * bin * i as f64 / 64.0;
            [phase.cos() as f32, phase.sin() as f32]
        })
        .collect()
}

/// Write a headerless recording.
fn make_raw_recording(dir: &Path, name: &str, samples: &[f32]) -> PathBuf {
    let file = dir.join(name);
    let mut f = BufWriter::new(File::create(&file).expect("couldn't make file"));
    for &s in samples {
        f.write_f32::<LittleEndian>(s).unwrap();
    }
    f.flush().unwrap();
    file
}

/// Write a WAV recording of stereo float samples with a canonical 44-byte
/// header.
fn make_wav_recording(dir: &Path, name: &str, samples: &[f32], sample_rate: u32) -> PathBuf {
    let file = dir.join(name);
    let mut f = BufWriter::new(File::create(&file).expect("couldn't make file"));
    let data_len = (samples.len() * 4) as u32;
    f.write_all(b"RIFF").unwrap();
    f.write_u32::<LittleEndian>(36 + data_len).unwrap();
    f.write_all(b"WAVEfmt ").unwrap();
    f.write_u32::<LittleEndian>(16).unwrap();
    // IEEE float, 2 channels
    f.write_u16::<LittleEndian>(3).unwrap();
    f.write_u16::<LittleEndian>(2).unwrap();
    f.write_u32::<LittleEndian>(sample_rate).unwrap();
    f.write_u32::<LittleEndian>(sample_rate * 8).unwrap();
    f.write_u16::<LittleEndian>(8).unwrap();
    f.write_u16::<LittleEndian>(32).unwrap();
    f.write_all(b"data").unwrap();
    f.write_u32::<LittleEndian>(data_len).unwrap();
    for &s in samples {
        f.write_f32::<LittleEndian>(s).unwrap();
    }
    f.flush().unwrap();
    file
}
