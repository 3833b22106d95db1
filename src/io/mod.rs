// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! File stuff (input/output, reading/writing), for I/Q recordings and
//! spectrogram products.

pub mod read;
pub mod write;

pub use read::{read_iq_file, IqFileType, IqReadError, IqRecording};
pub use write::{can_write_to_file, write_spectrogram_fits, FileWriteError, SpectrogramWriteError};
