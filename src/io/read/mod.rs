// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read I/Q recordings.
//!
//! Recordings are interleaved little-endian `f32` values `[I0, Q0, I1, Q1,
//! ...]`. WAV recordings have a 44-byte header that is skipped wholesale; the
//! sample rate comes from that header. Headerless recordings need their sample
//! rate supplied.

mod error;

pub use error::IqReadError;

use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    str::FromStr,
};

use byteorder::{ByteOrder, LittleEndian};
use itertools::Itertools;
use log::{debug, trace};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::WAV_HEADER_BYTES;

lazy_static::lazy_static! {
    pub(crate) static ref IQ_FILE_EXTENSIONS: String = IqFileType::iter().join(", ");
}

/// The supported I/Q recording types, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum IqFileType {
    #[strum(serialize = "wav")]
    Wav,

    #[strum(serialize = "iq")]
    Iq,

    #[strum(serialize = "cf32")]
    Cf32,

    #[strum(serialize = "bin")]
    Bin,

    #[strum(serialize = "raw")]
    Raw,

    #[strum(serialize = "dat")]
    Dat,
}

impl IqFileType {
    pub fn from_path(file: &Path) -> Option<IqFileType> {
        file.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| IqFileType::from_str(&e).ok())
    }

    /// Does this type of file carry its own sample rate?
    pub fn has_header(self) -> bool {
        matches!(self, IqFileType::Wav)
    }
}

/// A decoded I/Q recording.
#[derive(Debug, Clone)]
pub struct IqRecording {
    pub file: PathBuf,

    pub file_type: IqFileType,

    /// Interleaved I and Q values. There is always an even number of them.
    pub samples: Vec<f32>,

    /// \[Hz\]
    pub sample_rate: u32,
}

impl IqRecording {
    /// The number of complex samples.
    pub fn num_samples(&self) -> usize {
        self.samples.len() / 2
    }

    /// \[seconds\]
    pub fn duration(&self) -> f64 {
        self.num_samples() as f64 / f64::from(self.sample_rate)
    }
}

/// Read an I/Q recording. If `sample_rate` is supplied, it is used instead of
/// any sample rate in the file.
pub fn read_iq_file(file: &Path, sample_rate: Option<u32>) -> Result<IqRecording, IqReadError> {
    if !file.exists() {
        return Err(IqReadError::DoesNotExist(file.to_path_buf()));
    }
    let file_type = IqFileType::from_path(file)
        .ok_or_else(|| IqReadError::NotRecognised(file.to_path_buf()))?;
    debug!("Reading '{}' as a {file_type} I/Q file", file.display());

    let (header_sample_rate, skip) = if file_type.has_header() {
        let reader = hound::WavReader::open(file).map_err(|err| IqReadError::WavHeader {
            file: file.to_path_buf(),
            err,
        })?;
        let spec = reader.spec();
        trace!("WAV spec: {spec:?}");
        (Some(spec.sample_rate), WAV_HEADER_BYTES)
    } else {
        (None, 0)
    };

    let sample_rate = match (sample_rate, header_sample_rate) {
        (Some(user), Some(header)) => {
            if user != header {
                debug!("Using the supplied sample rate {user} Hz instead of the header's {header} Hz");
            }
            user
        }
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => return Err(IqReadError::NoSampleRate(file.to_path_buf())),
    };
    if sample_rate == 0 {
        return Err(IqReadError::ZeroSampleRate(file.to_path_buf()));
    }

    let samples = read_f32s(file, skip)?;
    if samples.len() % 2 != 0 {
        return Err(IqReadError::OddSampleCount {
            file: file.to_path_buf(),
            count: samples.len(),
        });
    }
    debug!(
        "Read {} I/Q samples ({} Hz)",
        samples.len() / 2,
        sample_rate
    );

    Ok(IqRecording {
        file: file.to_path_buf(),
        file_type,
        samples,
        sample_rate,
    })
}

/// Read little-endian `f32`s after skipping `skip` bytes. Trailing bytes that
/// don't make up a whole `f32` are ignored.
fn read_f32s(file: &Path, skip: u64) -> Result<Vec<f32>, IqReadError> {
    let mut reader = BufReader::new(File::open(file)?);
    reader.seek(SeekFrom::Start(skip))?;
    let mut bytes = vec![];
    reader.read_to_end(&mut bytes)?;

    let num_floats = bytes.len() / std::mem::size_of::<f32>();
    if bytes.len() % std::mem::size_of::<f32>() != 0 {
        trace!(
            "Ignoring {} trailing bytes",
            bytes.len() % std::mem::size_of::<f32>()
        );
    }
    let mut floats = vec![0.0; num_floats];
    LittleEndian::read_f32_into(
        &bytes[..num_floats * std::mem::size_of::<f32>()],
        &mut floats,
    );
    Ok(floats)
}
