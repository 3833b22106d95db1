// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibrated hydrogen-line spectrograms from recorded I/Q data.
//!
//! The numeric core lives in [`calibration`] and [`spectrogram`]; everything
//! else reads recordings, writes products and drives the command line.

pub mod calibration;
mod cli;
pub mod constants;
pub mod io;
mod math;
mod params;
pub mod plotting;
pub mod spectrogram;

use crossbeam_utils::atomic::AtomicCell;

// Re-exports.
pub use calibration::{CalibrationCoefficients, CalibrationError, VnaMeasurements};
pub use cli::{Hline, HlineError};
pub use spectrogram::{
    Spectrogram, SpectrogramAxes, SpectrogramConfig, SpectrogramError, SanitisationReport,
};

#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;

/// Should we draw progress bars? Progress bars are off by default; the CLI
/// turns them on unless the user asks otherwise.
pub static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
