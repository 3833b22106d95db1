// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Make a calibrated spectrogram from an I/Q recording.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{display_warnings, InfoPrinter, VnaArgs, ARG_FILE_HELP};
use crate::{
    constants::{
        DEFAULT_OUTLIER_THRESHOLD, DEFAULT_OVERLAP, DEFAULT_PLOT_SIZE, DEFAULT_WINDOW_SIZE,
        HYDROGEN_LINE_FREQ_HZ, REFERENCE_LEVEL_EPSILON,
    },
    io::{can_write_to_file, read::IQ_FILE_EXTENSIONS, IqFileType},
    params::SpectrogramParams,
    spectrogram::SpectrogramConfig,
    HlineError,
};

const DEFAULT_OUTPUT_PLOT_FILENAME: &str = "hline_spectrogram.png";
const DEFAULT_OUTPUT_FITS_FILENAME: &str = "hline_spectrogram.fits";

lazy_static::lazy_static! {
    static ref INPUT_HELP: String =
        format!("Path to the I/Q recording. Supported formats: {}. WAV recordings carry their own sample rate; the others are headerless interleaved little-endian f32", *IQ_FILE_EXTENSIONS);

    static ref WINDOW_SIZE_HELP: String =
        format!("The number of samples in each FFT window (and therefore the number of frequency bins). Default: {DEFAULT_WINDOW_SIZE}");

    static ref OVERLAP_HELP: String =
        format!("The number of samples shared by consecutive windows. Must be less than the window size. Default: {DEFAULT_OVERLAP}");

    static ref HYDROGEN_FREQ_HELP: String =
        format!("The frequency that the frequency axis is centred on [MHz]. Default: {}", HYDROGEN_LINE_FREQ_HZ / 1e6);

    static ref OUTLIER_THRESHOLD_HELP: String =
        format!("Phase-corrected samples with a larger magnitude than this are zeroed. Default: {DEFAULT_OUTLIER_THRESHOLD:e}");

    static ref OUTPUT_PLOT_HELP: String =
        format!("Path to the output PNG plot. Only available if compiled with the \"plotting\" feature. If no outputs are specified, the default is {DEFAULT_OUTPUT_PLOT_FILENAME} (or {DEFAULT_OUTPUT_FITS_FILENAME} without plotting)");

    static ref PLOT_SIZE_HELP: String =
        format!("The width and height of the plot [pixels]. Default: {} {}", DEFAULT_PLOT_SIZE.0, DEFAULT_PLOT_SIZE.1);
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SpectrogramCliArgs {
    #[clap(short, long, help = INPUT_HELP.as_str(), help_heading = "INPUT FILES")]
    pub(super) input: Option<PathBuf>,

    /// The sample rate of the recording [Hz]. Required for headerless
    /// recordings. For WAV recordings, this overrides the header's sample
    /// rate.
    #[clap(short, long, help_heading = "INPUT FILES")]
    pub(super) sample_rate: Option<u32>,

    #[clap(short, long, help = WINDOW_SIZE_HELP.as_str(), help_heading = "SPECTROGRAM PARAMETERS")]
    pub(super) window_size: Option<usize>,

    #[clap(long, help = OVERLAP_HELP.as_str(), help_heading = "SPECTROGRAM PARAMETERS")]
    pub(super) overlap: Option<usize>,

    #[clap(long, help = HYDROGEN_FREQ_HELP.as_str(), help_heading = "SPECTROGRAM PARAMETERS")]
    pub(super) hydrogen_freq: Option<f64>,

    #[clap(long, help = OUTLIER_THRESHOLD_HELP.as_str(), help_heading = "SPECTROGRAM PARAMETERS")]
    pub(super) outlier_threshold: Option<f64>,

    /// Path to the output FITS file, containing the calibrated power matrix,
    /// its axes and metadata.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) output_fits: Option<PathBuf>,

    #[clap(long, help = OUTPUT_PLOT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output_plot: Option<PathBuf>,

    #[clap(
        long, help = PLOT_SIZE_HELP.as_str(), help_heading = "OUTPUT FILES",
        number_of_values = 2,
        value_names = &["WIDTH", "HEIGHT"]
    )]
    pub(super) plot_size: Option<Vec<u32>>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SpectrogramArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "vna")]
    #[serde(default)]
    pub(super) vna_args: VnaArgs,

    #[clap(flatten)]
    #[serde(rename = "spectrogram")]
    #[serde(default)]
    pub(super) spectrogram_args: SpectrogramCliArgs,
}

impl SpectrogramArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<SpectrogramArgs, HlineError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let SpectrogramArgs {
                args_file: _,
                vna_args,
                spectrogram_args,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(SpectrogramArgs {
                args_file: None,
                vna_args: cli_args.vna_args.merge(vna_args),
                spectrogram_args: cli_args.spectrogram_args.merge(spectrogram_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<SpectrogramParams, HlineError> {
        debug!("{:#?}", self);

        // Expose all the struct fields to ensure they're all used.
        let SpectrogramArgs {
            args_file: _,
            vna_args,
            spectrogram_args:
                SpectrogramCliArgs {
                    input,
                    sample_rate,
                    window_size,
                    overlap,
                    hydrogen_freq,
                    outlier_threshold,
                    output_fits,
                    output_plot,
                    plot_size,
                },
        } = self;

        let input = input.ok_or(SpectrogramArgsError::NoInput)?;
        if !input.exists() {
            return Err(SpectrogramArgsError::InputDoesNotExist(input).into());
        }
        let file_type = IqFileType::from_path(&input)
            .ok_or_else(|| SpectrogramArgsError::InputNotRecognised(input.clone()))?;
        match (sample_rate, file_type.has_header()) {
            (Some(0), _) => return Err(SpectrogramArgsError::ZeroSampleRate.into()),
            (None, false) => return Err(SpectrogramArgsError::NoSampleRate(input).into()),
            _ => (),
        }
        let mut input_printer = InfoPrinter::new("Input recording".into());
        input_printer.push_block(vec![
            format!("{}", input.display()).into(),
            format!("Type: {file_type}").into(),
            match sample_rate {
                Some(s) => format!("Sample rate: {s} Hz").into(),
                None => "Sample rate: from the WAV header".into(),
            },
        ]);
        input_printer.display();

        let (vna, _) = vna_args.parse()?;

        let hydrogen_freq_hz = match hydrogen_freq {
            Some(f) if f.is_finite() && f > 0.0 => f * 1e6, // MHz -> Hz
            Some(f) => return Err(SpectrogramArgsError::BadHydrogenFreq(f).into()),
            None => HYDROGEN_LINE_FREQ_HZ,
        };
        let outlier_threshold = match outlier_threshold {
            Some(t) if t > 0.0 && !t.is_nan() => t,
            Some(t) => return Err(SpectrogramArgsError::BadOutlierThreshold(t).into()),
            None => DEFAULT_OUTLIER_THRESHOLD,
        };
        let config = SpectrogramConfig {
            window_size: window_size.unwrap_or(DEFAULT_WINDOW_SIZE),
            overlap: overlap.unwrap_or(DEFAULT_OVERLAP),
            hydrogen_freq_hz,
            outlier_threshold,
            reference_epsilon: REFERENCE_LEVEL_EPSILON,
        };
        config.validate()?;
        let mut config_printer = InfoPrinter::new("Spectrogram parameters".into());
        config_printer.push_block(vec![
            format!("Window size: {} samples", config.window_size).into(),
            format!("Overlap:     {} samples", config.overlap).into(),
            format!("Step:        {} samples", config.step()).into(),
        ]);
        config_printer.push_line(
            format!(
                "Centred on {:.6} MHz",
                config.hydrogen_freq_hz / 1e6
            )
            .into(),
        );
        config_printer.push_line(format!("Outlier threshold: {:e}", config.outlier_threshold).into());
        config_printer.display();

        let (output_fits, output_plot) = match (output_fits, output_plot) {
            (None, None) => {
                if cfg!(feature = "plotting") {
                    (None, Some(PathBuf::from(DEFAULT_OUTPUT_PLOT_FILENAME)))
                } else {
                    (Some(PathBuf::from(DEFAULT_OUTPUT_FITS_FILENAME)), None)
                }
            }
            outputs => outputs,
        };
        trace!("Outputs: {output_fits:?} {output_plot:?}");
        #[cfg(not(feature = "plotting"))]
        if output_plot.is_some() {
            return Err(crate::plotting::PlotError::NoPlottingFeature.into());
        }
        let plot_size = match plot_size.as_deref() {
            None => DEFAULT_PLOT_SIZE,
            Some(&[width, height]) if width > 0 && height > 0 => (width, height),
            Some(_) => {
                return Err(SpectrogramArgsError::BadPlotSize {
                    size: plot_size.unwrap_or_default(),
                }
                .into())
            }
        };

        let mut output_printer = InfoPrinter::new("Outputs".into());
        if let Some(output_fits) = &output_fits {
            let is_fits = output_fits
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("fits"))
                .unwrap_or(false);
            if !is_fits {
                return Err(SpectrogramArgsError::OutputFitsExt(output_fits.clone()).into());
            }
            can_write_to_file(output_fits)?;
            output_printer.push_line(format!("FITS: {}", output_fits.display()).into());
        }
        if let Some(output_plot) = &output_plot {
            can_write_to_file(output_plot)?;
            output_printer.push_line(
                format!(
                    "Plot: {} ({}x{} pixels)",
                    output_plot.display(),
                    plot_size.0,
                    plot_size.1
                )
                .into(),
            );
        }
        output_printer.display();

        display_warnings();

        Ok(SpectrogramParams {
            input,
            sample_rate,
            vna,
            config,
            output_fits,
            output_plot,
            plot_size,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), HlineError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

impl SpectrogramCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            input: self.input.or(other.input),
            sample_rate: self.sample_rate.or(other.sample_rate),
            window_size: self.window_size.or(other.window_size),
            overlap: self.overlap.or(other.overlap),
            hydrogen_freq: self.hydrogen_freq.or(other.hydrogen_freq),
            outlier_threshold: self.outlier_threshold.or(other.outlier_threshold),
            output_fits: self.output_fits.or(other.output_fits),
            output_plot: self.output_plot.or(other.output_plot),
            plot_size: self.plot_size.or(other.plot_size),
        }
    }
}

#[derive(Error, Debug)]
pub(super) enum SpectrogramArgsError {
    #[error("No input recording was supplied")]
    NoInput,

    #[error("Input recording '{0}' doesn't exist")]
    InputDoesNotExist(PathBuf),

    #[error("Input recording '{0}' doesn't have a recognised file extension; supported extensions are: {}", *IQ_FILE_EXTENSIONS)]
    InputNotRecognised(PathBuf),

    #[error("Input recording '{0}' has no header, so a sample rate must be supplied with --sample-rate")]
    NoSampleRate(PathBuf),

    #[error("The sample rate cannot be 0")]
    ZeroSampleRate,

    #[error("The hydrogen-line frequency must be positive and finite, but got {0} MHz")]
    BadHydrogenFreq(f64),

    #[error("The outlier threshold must be positive, but got {0}")]
    BadOutlierThreshold(f64),

    #[error("Plot size specified as {size:?}, not [<Width>, <Height>] with non-zero values")]
    BadPlotSize { size: Vec<u32> },

    #[error("Output FITS file '{0}' must have a .fits extension")]
    OutputFitsExt(PathBuf),
}
