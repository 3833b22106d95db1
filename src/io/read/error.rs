// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from reading I/Q recordings.

use std::path::PathBuf;

use thiserror::Error;

use super::IQ_FILE_EXTENSIONS;

#[derive(Error, Debug)]
pub enum IqReadError {
    #[error("File not found: {0}")]
    DoesNotExist(PathBuf),

    #[error("The file '{0}' doesn't have a recognised I/Q file extension; supported extensions are: {}", *IQ_FILE_EXTENSIONS)]
    NotRecognised(PathBuf),

    #[error("The raw I/Q file '{0}' has no header, so a sample rate must be supplied")]
    NoSampleRate(PathBuf),

    #[error("The sample rate of '{0}' is 0")]
    ZeroSampleRate(PathBuf),

    #[error("'{file}' contains an odd number of float values ({count}); I/Q samples must come in pairs")]
    OddSampleCount { file: PathBuf, count: usize },

    #[error("Couldn't read the WAV header of '{file}': {err}")]
    WavHeader { file: PathBuf, err: hound::Error },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
