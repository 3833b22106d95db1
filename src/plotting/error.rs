// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[cfg(not(feature = "plotting"))]
    #[error("hline was not compiled with the \"plotting\" feature.\nYou need to compile hline from source with this feature to plot spectrograms.")]
    NoPlottingFeature,

    #[cfg(feature = "plotting")]
    #[error("Plot dimensions must be non-zero, but got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[cfg(feature = "plotting")]
    #[error("While plotting the spectrogram: {0}")]
    Spectrogram(String),

    #[cfg(feature = "plotting")]
    #[error("While plotting the colour bar: {0}")]
    ColourBar(String),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
