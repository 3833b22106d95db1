// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all hline-related errors. This should be the *only* error
//! enum that is publicly visible from the command line.

use thiserror::Error;

use super::{common::VnaArgsError, spectrogram::SpectrogramArgsError};
use crate::{
    calibration::CalibrationError,
    io::{FileWriteError, IqReadError, SpectrogramWriteError},
    params::SpectrogramRunError,
    plotting::PlotError,
    spectrogram::SpectrogramError,
};

/// The *only* publicly visible error from hline. Each error message should
/// point at the relevant section of the README, unless it's "generic".
#[derive(Error, Debug)]
pub enum HlineError {
    /// An error related to the spectrogram parameters.
    #[error("{0}\n\nSee the \"Spectrogram parameters\" section of the README for more info.")]
    Spectrogram(String),

    /// An error related to VNA measurements.
    #[error("{0}\n\nSee the \"VNA measurements\" section of the README for more info.")]
    Calibration(String),

    /// An error related to reading I/Q recordings.
    #[error("{0}\n\nSee the \"Input recordings\" section of the README for more info.")]
    IqRead(String),

    /// An error related to writing outputs.
    #[error("{0}\n\nSee the \"Outputs\" section of the README for more info.")]
    Write(String),

    /// An error related to plotting.
    #[error("{0}\n\nSee the \"Plotting\" section of the README for more info.")]
    Plot(String),

    /// An error related to argument files.
    #[error("{0}\n\nSee the \"Argument files\" section of the README for more info.")]
    ArgFile(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv) and maybe disabling progress bars.")]
    Cfitsio(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Binary sub-command errors.

impl From<SpectrogramArgsError> for HlineError {
    fn from(e: SpectrogramArgsError) -> Self {
        let s = e.to_string();
        match e {
            SpectrogramArgsError::NoInput
            | SpectrogramArgsError::BadPlotSize { .. }
            | SpectrogramArgsError::BadHydrogenFreq(_)
            | SpectrogramArgsError::BadOutlierThreshold(_) => Self::Spectrogram(s),
            SpectrogramArgsError::InputDoesNotExist(_)
            | SpectrogramArgsError::InputNotRecognised(_)
            | SpectrogramArgsError::NoSampleRate(_)
            | SpectrogramArgsError::ZeroSampleRate => Self::IqRead(s),
            SpectrogramArgsError::OutputFitsExt(_) => Self::Write(s),
        }
    }
}

impl From<VnaArgsError> for HlineError {
    fn from(e: VnaArgsError) -> Self {
        let s = e.to_string();
        match e {
            VnaArgsError::BadImpedance { .. } => Self::Calibration(s),
            VnaArgsError::Calibration(e) => Self::from(e),
        }
    }
}

impl From<SpectrogramRunError> for HlineError {
    fn from(e: SpectrogramRunError) -> Self {
        match e {
            SpectrogramRunError::IqRead(e) => Self::from(e),
            SpectrogramRunError::Spectrogram(e) => Self::from(e),
            SpectrogramRunError::Write(e) => Self::from(e),
            SpectrogramRunError::Plot(e) => Self::from(e),
        }
    }
}

// Library code errors.

impl From<CalibrationError> for HlineError {
    fn from(e: CalibrationError) -> Self {
        Self::Calibration(e.to_string())
    }
}

impl From<SpectrogramError> for HlineError {
    fn from(e: SpectrogramError) -> Self {
        let s = e.to_string();
        match e {
            SpectrogramError::OddSampleCount(_) | SpectrogramError::ZeroSampleRate => {
                Self::IqRead(s)
            }
            SpectrogramError::ZeroWindowSize | SpectrogramError::OverlapTooLarge { .. } => {
                Self::Spectrogram(s)
            }
            SpectrogramError::Calibration(e) => Self::from(e),
        }
    }
}

impl From<IqReadError> for HlineError {
    fn from(e: IqReadError) -> Self {
        let s = e.to_string();
        match e {
            IqReadError::DoesNotExist(_)
            | IqReadError::NotRecognised(_)
            | IqReadError::NoSampleRate(_)
            | IqReadError::ZeroSampleRate(_)
            | IqReadError::OddSampleCount { .. }
            | IqReadError::WavHeader { .. } => Self::IqRead(s),
            IqReadError::IO(e) => Self::from(e),
        }
    }
}

impl From<SpectrogramWriteError> for HlineError {
    fn from(e: SpectrogramWriteError) -> Self {
        let s = e.to_string();
        match e {
            SpectrogramWriteError::UnsupportedExt { .. } => Self::Write(s),
            SpectrogramWriteError::Fitsio(_) => Self::Cfitsio(s),
            SpectrogramWriteError::IO(e) => Self::from(e),
        }
    }
}

impl From<FileWriteError> for HlineError {
    fn from(e: FileWriteError) -> Self {
        Self::Write(e.to_string())
    }
}

impl From<PlotError> for HlineError {
    fn from(e: PlotError) -> Self {
        let s = e.to_string();
        match e {
            PlotError::IO(e) => Self::from(e),
            _ => Self::Plot(s),
        }
    }
}

impl From<std::io::Error> for HlineError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
