// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Print the calibration coefficients derived from VNA measurements.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, VnaArgs, Warn, ARG_FILE_HELP};
use crate::HlineError;

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct VnaCorrectionsArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "vna")]
    #[serde(default)]
    pub(super) vna_args: VnaArgs,
}

impl VnaCorrectionsArgs {
    pub(super) fn merge(self) -> Result<VnaCorrectionsArgs, HlineError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let VnaCorrectionsArgs {
                args_file: _,
                vna_args,
            } = unpack_arg_file!(arg_file);

            Ok(VnaCorrectionsArgs {
                args_file: None,
                vna_args: cli_args.vna_args.merge(vna_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), HlineError> {
        debug!("{:#?}", self);

        // Parsing the measurements displays the coefficients.
        let (_, coefficients) = self.vna_args.parse()?;
        if coefficients.efficiency < 0.5 {
            format!(
                "Less than half of the incident power reaches the receiver ({:.1}%)",
                coefficients.efficiency * 100.0
            )
            .warn();
        }
        display_warnings();

        if dry_run {
            info!("Dry run -- exiting now.");
        }
        Ok(())
    }
}
