// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both the `spectrogram` and
//! `vna-corrections` subcommands take VNA measurements, so the same arguments
//! are shared between them.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
    calibration::{CalibrationCoefficients, CalibrationError, VnaMeasurements},
    constants::{
        DEFAULT_IMPEDANCE_IM_OHMS, DEFAULT_IMPEDANCE_RE_OHMS, DEFAULT_S11_DB, DEFAULT_S21_DB,
    },
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref S11_HELP: String =
        format!("The VNA-measured return loss (S11) of the receive chain [dB]. Default: {DEFAULT_S11_DB}");

    static ref S21_HELP: String =
        format!("The VNA-measured insertion loss (S21) of the receive chain [dB]. This is used directly as the gain correction. Default: {DEFAULT_S21_DB}");

    static ref IMPEDANCE_HELP: String =
        format!("The VNA-measured antenna impedance, real and imaginary parts [Ohms]. Default: {DEFAULT_IMPEDANCE_RE_OHMS} {DEFAULT_IMPEDANCE_IM_OHMS}");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(HlineError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(HlineError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(HlineError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// VNA measurements of the receive chain. Anything not specified takes the
/// bench defaults.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct VnaArgs {
    #[clap(long = "s11", help = S11_HELP.as_str(), allow_hyphen_values = true, help_heading = "VNA MEASUREMENTS")]
    pub(super) s11: Option<f64>,

    #[clap(long = "s21", help = S21_HELP.as_str(), allow_hyphen_values = true, help_heading = "VNA MEASUREMENTS")]
    pub(super) s21: Option<f64>,

    #[clap(
        long, help = IMPEDANCE_HELP.as_str(), help_heading = "VNA MEASUREMENTS",
        number_of_values = 2,
        allow_hyphen_values = true,
        value_names = &["RE_OHMS", "IM_OHMS"]
    )]
    pub(super) impedance: Option<Vec<f64>>,
}

impl VnaArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            s11: self.s11.or(other.s11),
            s21: self.s21.or(other.s21),
            impedance: self.impedance.or(other.impedance),
        }
    }

    /// Turn the arguments into measurements, checking that they make physical
    /// sense. The derived coefficients are displayed.
    pub(super) fn parse(
        self,
    ) -> Result<(VnaMeasurements, CalibrationCoefficients), VnaArgsError> {
        let Self {
            s11,
            s21,
            impedance,
        } = self;

        let (impedance_re_ohms, impedance_im_ohms) = match impedance.as_deref() {
            Some(&[re, im]) => (re, im),
            Some(_) => {
                return Err(VnaArgsError::BadImpedance {
                    impedance: impedance.unwrap_or_default(),
                })
            }
            None => (DEFAULT_IMPEDANCE_RE_OHMS, DEFAULT_IMPEDANCE_IM_OHMS),
        };
        let vna = VnaMeasurements {
            s11_db: s11.unwrap_or(DEFAULT_S11_DB),
            s21_db: s21.unwrap_or(DEFAULT_S21_DB),
            impedance_re_ohms,
            impedance_im_ohms,
        };
        debug!("VNA measurements: {vna:?}");
        let coefficients = CalibrationCoefficients::new(&vna)?;

        let mut printer = InfoPrinter::new("VNA calibration".into());
        printer.push_block(vec![
            format!("S11: {} dB", vna.s11_db).into(),
            format!("S21: {} dB", vna.s21_db).into(),
            format!(
                "Antenna impedance: {} {:+}j Ohms",
                vna.impedance_re_ohms, vna.impedance_im_ohms
            )
            .into(),
        ]);
        printer.push_block(vec![
            format!(
                "Efficiency:        {:.4} ({:.4} dB)",
                coefficients.efficiency,
                coefficients.efficiency_db()
            )
            .into(),
            format!("Gain correction:   {:.4} dB", coefficients.gain_correction_db).into(),
            format!(
                "Phase correction:  {:.4}°",
                coefficients.phase_correction.arg().to_degrees()
            )
            .into(),
            format!("Power offset:      {:.4} dB", coefficients.power_offset_db()).into(),
        ]);
        printer.display();

        Ok((vna, coefficients))
    }
}

#[derive(Error, Debug)]
pub(super) enum VnaArgsError {
    #[error("Impedance specified as {impedance:?}, not [<Real>, <Imaginary>]")]
    BadImpedance { impedance: Vec<f64> },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
