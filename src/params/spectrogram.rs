// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use log::{debug, info};
use thiserror::Error;

use crate::{
    calibration::VnaMeasurements,
    cli::{display_warnings, Warn},
    io::{read_iq_file, write_spectrogram_fits, IqReadError, SpectrogramWriteError},
    plotting::{plot_spectrogram, PlotError},
    spectrogram::{SanitisationReport, Spectrogram, SpectrogramConfig, SpectrogramError},
};

pub(crate) struct SpectrogramParams {
    pub(crate) input: PathBuf,

    /// Overrides any sample rate in the recording's header \[Hz\].
    pub(crate) sample_rate: Option<u32>,

    pub(crate) vna: VnaMeasurements,

    pub(crate) config: SpectrogramConfig,

    pub(crate) output_fits: Option<PathBuf>,

    pub(crate) output_plot: Option<PathBuf>,

    /// (width, height) \[pixels\]
    pub(crate) plot_size: (u32, u32),
}

impl SpectrogramParams {
    pub(crate) fn run(&self) -> Result<Spectrogram, SpectrogramRunError> {
        let SpectrogramParams {
            input,
            sample_rate,
            vna,
            config,
            output_fits,
            output_plot,
            plot_size,
        } = self;

        info!("Reading {}", input.display());
        let recording = read_iq_file(input, *sample_rate)?;
        info!(
            "{} complex samples at {} Hz ({:.3} s)",
            recording.num_samples(),
            recording.sample_rate,
            recording.duration()
        );

        let spectrogram = Spectrogram::compute(
            &recording.samples,
            recording.sample_rate,
            vna,
            *config,
        )?;
        let (num_freqs, num_times) = spectrogram.dim();
        info!("Spectrogram has {num_freqs} frequency bins and {num_times} time bins");
        debug!("{:?}", spectrogram.report);

        for warning in sanitisation_warnings(&spectrogram.report, config.outlier_threshold) {
            warning.warn();
        }

        if let Some(output_fits) = output_fits {
            write_spectrogram_fits(output_fits, &spectrogram)?;
            if !spectrogram.is_empty() {
                info!("Wrote {}", output_fits.display());
            }
        }
        if let Some(output_plot) = output_plot {
            plot_spectrogram(output_plot, &spectrogram, *plot_size)?;
            if !spectrogram.is_empty() {
                info!("Wrote {}", output_plot.display());
            }
        }
        display_warnings();

        Ok(spectrogram)
    }
}

/// Describe everything that was zeroed or dropped while making a spectrogram.
fn sanitisation_warnings(report: &SanitisationReport, outlier_threshold: f64) -> Vec<String> {
    let mut warnings = vec![];
    if report.non_finite_zeroed > 0 {
        warnings.push(format!(
            "{} non-finite I/Q samples were replaced with zeros",
            report.non_finite_zeroed
        ));
    }
    if report.outliers_zeroed > 0 {
        warnings.push(format!(
            "{} samples above the outlier threshold ({outlier_threshold:e}) were zeroed",
            report.outliers_zeroed
        ));
    }
    if report.segments_skipped > 0 {
        warnings.push(format!(
            "{} segments had no finite values and were dropped",
            report.segments_skipped
        ));
    }
    warnings
}

#[derive(Error, Debug)]
pub(crate) enum SpectrogramRunError {
    #[error(transparent)]
    IqRead(#[from] IqReadError),

    #[error(transparent)]
    Spectrogram(#[from] SpectrogramError),

    #[error(transparent)]
    Write(#[from] SpectrogramWriteError),

    #[error(transparent)]
    Plot(#[from] PlotError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitisation_warnings() {
        assert!(sanitisation_warnings(&SanitisationReport::default(), 1e5).is_empty());

        let report = SanitisationReport {
            non_finite_zeroed: 6000,
            outliers_zeroed: 2,
            segments_skipped: 3,
        };
        let warnings = sanitisation_warnings(&report, 1e5);
        assert_eq!(
            warnings,
            vec![
                "6000 non-finite I/Q samples were replaced with zeros".to_string(),
                "2 samples above the outlier threshold (1e5) were zeroed".to_string(),
                "3 segments had no finite values and were dropped".to_string(),
            ]
        );
    }
}
