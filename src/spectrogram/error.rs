// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from setting up a spectrogram. Nothing inside the numeric pipeline
//! itself fails; non-finite data is neutralised instead.

use thiserror::Error;

use crate::calibration::CalibrationError;

#[derive(Error, Debug)]
pub enum SpectrogramError {
    #[error("The raw sample buffer has an odd number of values ({0}); I/Q samples must come in pairs")]
    OddSampleCount(usize),

    #[error("The window size cannot be 0")]
    ZeroWindowSize,

    #[error("The window overlap ({overlap}) must be smaller than the window size ({window_size})")]
    OverlapTooLarge { window_size: usize, overlap: usize },

    #[error("The sample rate cannot be 0")]
    ZeroSampleRate,

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
