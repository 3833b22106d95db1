// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `hline` should do as many
calculations as possible in double precision before converting to a lower
precision, if it is ever required.
 */

/// The rest frequency of the neutral hydrogen 21cm line \[Hz\].
pub const HYDROGEN_LINE_FREQ_HZ: f64 = 1420.405751e6;

/// The characteristic impedance of the measurement system \[Ohms\].
pub const SYSTEM_IMPEDANCE_OHMS: f64 = 50.0;

/// The number of samples in each FFT window.
pub const DEFAULT_WINDOW_SIZE: usize = 4096;

/// The number of samples shared by consecutive windows.
pub const DEFAULT_OVERLAP: usize = 3024;

/// Phase-corrected samples with a magnitude larger than this are zeroed.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 1e5;

/// Added to each segment's reference level so that normalisation never
/// divides by zero.
pub const REFERENCE_LEVEL_EPSILON: f64 = 1e-10;

/// The number of header bytes skipped in WAV recordings before the raw samples
/// begin.
pub const WAV_HEADER_BYTES: u64 = 44;

/// Bench VNA measurement of the receive chain's return loss \[dB\].
pub const DEFAULT_S11_DB: f64 = -16.88;

/// Bench VNA measurement of the receive chain's insertion loss \[dB\].
pub const DEFAULT_S21_DB: f64 = -44.86;

/// Bench VNA measurement of the antenna impedance, real part \[Ohms\].
pub const DEFAULT_IMPEDANCE_RE_OHMS: f64 = 66.3;

/// Bench VNA measurement of the antenna impedance, imaginary part \[Ohms\].
pub const DEFAULT_IMPEDANCE_IM_OHMS: f64 = 13.6;

/// Percentiles of the finite spectrogram values used as the colour-scale
/// limits of plots.
pub const PLOT_PERCENTILES: (f64, f64) = (10.0, 99.0);

/// The default size of spectrogram plots \[pixels\].
pub const DEFAULT_PLOT_SIZE: (u32, u32) = (1200, 600);
