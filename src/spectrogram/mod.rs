// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The calibrated spectrogram pipeline.
//!
//! Raw interleaved samples are paired into complex I/Q samples, cleaned of
//! non-finite values, phase corrected (and cleaned of outliers), then cut into
//! overlapping Hamming-windowed segments. Each segment is Fourier transformed,
//! normalised by its own median magnitude and offset by the calibration's gain
//! and efficiency corrections. Segments become the columns of the output
//! matrix; rows are frequency bins with DC in the middle.
//!
//! Note that the calibration offsets \[dB\] are *added* to a linearly
//! normalised magnitude; no logarithm of the magnitude is taken.

mod error;

pub use error::SpectrogramError;

use std::sync::Arc;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, trace};
use ndarray::prelude::*;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::{
    c64,
    calibration::{CalibrationCoefficients, VnaMeasurements},
    constants::{
        DEFAULT_OUTLIER_THRESHOLD, DEFAULT_OVERLAP, DEFAULT_WINDOW_SIZE, HYDROGEN_LINE_FREQ_HZ,
        REFERENCE_LEVEL_EPSILON,
    },
    math::{hamming, median},
    PROGRESS_BARS,
};

/// Everything the engine needs to know that isn't data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrogramConfig {
    /// The number of samples per FFT (and therefore the number of frequency
    /// bins).
    pub window_size: usize,

    /// The number of samples shared between consecutive windows.
    pub overlap: usize,

    /// The frequency that the frequency axis is offset by \[Hz\].
    pub hydrogen_freq_hz: f64,

    /// Phase-corrected samples with a larger magnitude are zeroed.
    pub outlier_threshold: f64,

    /// Added to each segment's median magnitude.
    pub reference_epsilon: f64,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            overlap: DEFAULT_OVERLAP,
            hydrogen_freq_hz: HYDROGEN_LINE_FREQ_HZ,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            reference_epsilon: REFERENCE_LEVEL_EPSILON,
        }
    }
}

impl SpectrogramConfig {
    /// A config with the supplied window parameters and defaults for
    /// everything else.
    pub fn new(window_size: usize, overlap: usize) -> Result<SpectrogramConfig, SpectrogramError> {
        let config = SpectrogramConfig {
            window_size,
            overlap,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SpectrogramError> {
        if self.window_size == 0 {
            return Err(SpectrogramError::ZeroWindowSize);
        }
        if self.overlap >= self.window_size {
            return Err(SpectrogramError::OverlapTooLarge {
                window_size: self.window_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }

    /// The number of samples between the starts of consecutive windows.
    pub fn step(&self) -> usize {
        self.window_size - self.overlap
    }

    /// The number of segments a signal of `num_samples` is cut into. A signal
    /// that is only one window long (or shorter) has no segments.
    pub fn num_segments(&self, num_samples: usize) -> usize {
        num_samples.saturating_sub(self.window_size) / self.step()
    }
}

/// How many samples were neutralised on the way through the pipeline, and how
/// many segments were dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitisationReport {
    /// Samples that were NaN or infinite after pairing.
    pub non_finite_zeroed: usize,

    /// Samples that were too large after phase correction.
    pub outliers_zeroed: usize,

    /// Segments with no finite values after windowing.
    pub segments_skipped: usize,
}

/// What became of a single segment.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentOutcome {
    /// The segment's calibrated power, one value per frequency bin.
    Accepted(Array1<f64>),

    /// The windowed segment had no finite values; it contributes no column.
    Skipped,
}

/// Pair up interleaved `[I0, Q0, I1, Q1, ...]` values into complex samples.
/// Any sample with a non-finite component is replaced with zero. Also returns
/// how many samples were replaced.
pub fn assemble_complex_signal(raw: &[f32]) -> Result<(Array1<c64>, usize), SpectrogramError> {
    if raw.len() % 2 != 0 {
        return Err(SpectrogramError::OddSampleCount(raw.len()));
    }

    let mut num_zeroed = 0;
    let signal = raw
        .chunks_exact(2)
        .map(|iq| {
            let sample = c64::new(f64::from(iq[0]), f64::from(iq[1]));
            if sample.is_finite() {
                sample
            } else {
                num_zeroed += 1;
                c64::default()
            }
        })
        .collect::<Array1<_>>();
    Ok((signal, num_zeroed))
}

/// Rotate every sample by the calibration's phase correction, zeroing anything
/// whose magnitude then exceeds `outlier_threshold`. Returns how many samples
/// were zeroed.
pub fn apply_calibration(
    mut signal: ArrayViewMut1<c64>,
    coefficients: &CalibrationCoefficients,
    outlier_threshold: f64,
) -> usize {
    let rotor = coefficients.phase_correction;
    let mut num_zeroed = 0;
    signal.iter_mut().for_each(|sample| {
        *sample *= rotor;
        // Non-finite products (from overflow) are outliers too.
        if !sample.is_finite() || sample.norm() > outlier_threshold {
            *sample = c64::default();
            num_zeroed += 1;
        }
    });
    num_zeroed
}

/// Window, transform, normalise and calibrate a single segment.
pub fn process_segment(
    segment: ArrayView1<c64>,
    window: ArrayView1<f64>,
    fft: &dyn Fft<f64>,
    coefficients: &CalibrationCoefficients,
    reference_epsilon: f64,
) -> SegmentOutcome {
    let mut spectrum: Vec<c64> = segment
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s * w)
        .collect();
    if !spectrum.iter().any(|s| s.is_finite()) {
        return SegmentOutcome::Skipped;
    }

    fft.process(&mut spectrum);
    // Move the zero-frequency bin to the middle.
    let n = spectrum.len();
    spectrum.rotate_right(n / 2);

    let mut finite_mags: Vec<f64> = spectrum
        .iter()
        .filter(|s| s.is_finite())
        .map(|s| s.norm())
        .collect();
    let reference_level = median(&mut finite_mags) + reference_epsilon;

    let gain_correction_db = coefficients.gain_correction_db;
    let efficiency_db = coefficients.efficiency_db();
    SegmentOutcome::Accepted(
        spectrum
            .into_iter()
            .map(|s| s.norm() / reference_level + gain_correction_db + efficiency_db)
            .collect(),
    )
}

/// Compute the calibrated power matrix of `signal`. The number of skipped
/// segments is also returned.
///
/// The matrix has `window_size` rows only if at least one segment was
/// accepted; it is then `(window_size, num_accepted_segments)`. If no segments
/// were accepted (the signal is shorter than a window, or every segment was
/// skipped), the matrix is `(0, 0)`, not `(window_size, 0)`.
pub fn compute_spectrogram(
    signal: ArrayView1<c64>,
    coefficients: &CalibrationCoefficients,
    config: &SpectrogramConfig,
) -> Result<(Array2<f64>, usize), SpectrogramError> {
    config.validate()?;
    let SpectrogramConfig {
        window_size,
        reference_epsilon,
        ..
    } = *config;
    let step = config.step();
    let num_segments = config.num_segments(signal.len());
    debug!(
        "Cutting {} samples into {num_segments} segments (window {window_size}, step {step})",
        signal.len()
    );

    let window = hamming(window_size);
    let fft: Arc<dyn Fft<f64>> = FftPlanner::<f64>::new().plan_fft_forward(window_size);

    let progress = ProgressBar::with_draw_target(
        Some(num_segments as _),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::with_template(
            "{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} segments ({elapsed_precise}<{eta_precise})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    )
    .with_position(0)
    .with_message("Spectrogram");

    let outcomes: Vec<SegmentOutcome> = (0..num_segments)
        .into_par_iter()
        .progress_with(progress.clone())
        .map(|i_segment| {
            let start = i_segment * step;
            process_segment(
                signal.slice(s![start..start + window_size]),
                window.view(),
                fft.as_ref(),
                coefficients,
                reference_epsilon,
            )
        })
        .collect();
    progress.finish();

    let mut columns = Vec::with_capacity(outcomes.len());
    let mut num_skipped = 0;
    for (i_segment, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            SegmentOutcome::Accepted(column) => columns.push(column),
            SegmentOutcome::Skipped => {
                trace!("Segment {i_segment} has no finite values; skipping");
                num_skipped += 1;
            }
        }
    }

    let matrix = if columns.is_empty() {
        Array2::zeros((0, 0))
    } else {
        let mut matrix = Array2::zeros((window_size, columns.len()));
        for (mut out, column) in matrix.axis_iter_mut(Axis(1)).zip(columns) {
            out.assign(&column);
        }
        matrix
    };
    Ok((matrix, num_skipped))
}

/// The axes of a spectrogram matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramAxes {
    /// One time per column \[seconds\].
    pub time_s: Array1<f64>,

    /// One frequency per row \[Hz\].
    pub freq_hz: Array1<f64>,
}

/// Generate the time and frequency axes of `matrix`. Times span the whole
/// recording. Frequencies span twice the sample rate (from `-sample_rate` to
/// `+sample_rate`) about `hydrogen_freq_hz`.
pub fn build_axes(
    matrix: ArrayView2<f64>,
    sample_rate: u32,
    duration_sec: f64,
    hydrogen_freq_hz: f64,
) -> SpectrogramAxes {
    let (num_rows, num_cols) = matrix.dim();
    let sample_rate = f64::from(sample_rate);
    SpectrogramAxes {
        time_s: Array1::linspace(0.0, duration_sec, num_cols),
        freq_hz: Array1::linspace(-sample_rate, sample_rate, num_rows) + hydrogen_freq_hz,
    }
}

/// A finished, calibrated spectrogram and everything used to make it.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Calibrated power, indexed `[frequency bin, time bin]`.
    pub power: Array2<f64>,

    pub axes: SpectrogramAxes,

    /// \[Hz\]
    pub sample_rate: u32,

    /// The length of the (complex) signal divided by the sample rate
    /// \[seconds\].
    pub duration_sec: f64,

    pub config: SpectrogramConfig,

    pub coefficients: CalibrationCoefficients,

    pub report: SanitisationReport,
}

impl Spectrogram {
    /// Run the whole pipeline on a raw interleaved I/Q buffer.
    pub fn compute(
        raw: &[f32],
        sample_rate: u32,
        vna: &VnaMeasurements,
        config: SpectrogramConfig,
    ) -> Result<Spectrogram, SpectrogramError> {
        if sample_rate == 0 {
            return Err(SpectrogramError::ZeroSampleRate);
        }
        config.validate()?;
        let coefficients = CalibrationCoefficients::new(vna)?;
        debug!("Calibration coefficients: {coefficients:?}");

        let (mut signal, non_finite_zeroed) = assemble_complex_signal(raw)?;
        let duration_sec = signal.len() as f64 / f64::from(sample_rate);
        let outliers_zeroed =
            apply_calibration(signal.view_mut(), &coefficients, config.outlier_threshold);

        let (power, segments_skipped) = compute_spectrogram(signal.view(), &coefficients, &config)?;
        let axes = build_axes(
            power.view(),
            sample_rate,
            duration_sec,
            config.hydrogen_freq_hz,
        );

        Ok(Spectrogram {
            power,
            axes,
            sample_rate,
            duration_sec,
            config,
            coefficients,
            report: SanitisationReport {
                non_finite_zeroed,
                outliers_zeroed,
                segments_skipped,
            },
        })
    }

    /// (frequency bins, time bins)
    pub fn dim(&self) -> (usize, usize) {
        self.power.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}
