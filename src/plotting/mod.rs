// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to plot spectrograms.
//!
//! Plotting is an optional feature, because the C dependencies needed for
//! rendering text can't be compiled statically. Without the "plotting"
//! feature, asking for a plot is an error.

mod error;
#[cfg(test)]
mod tests;

pub use error::PlotError;

use std::path::Path;

use ndarray::prelude::*;

use crate::{constants::PLOT_PERCENTILES, math::finite_percentile, spectrogram::Spectrogram};

#[cfg(feature = "plotting")]
pub(crate) const PLOT_TITLE: &str = "Hydrogen Line Spectrogram (Full Frequency Range)";

/// The colour-scale limits of a plot of `power`: the 10th and 99th percentiles
/// of its finite values. If there are no finite values, the limits are (0, 1).
pub fn colour_limits(power: ArrayView2<f64>) -> (f64, f64) {
    let (lower, upper) = PLOT_PERCENTILES;
    match (
        finite_percentile(power.iter().copied(), lower),
        finite_percentile(power.iter().copied(), upper),
    ) {
        (Some(vmin), Some(vmax)) => (vmin, vmax),
        _ => (0.0, 1.0),
    }
}

/// Map a value onto 0 to 1 given colour-scale limits. Values outside the
/// limits are clamped. If the limits are the same, everything is in the
/// middle.
pub fn normalise(value: f64, (vmin, vmax): (f64, f64)) -> f64 {
    if vmax > vmin {
        ((value - vmin) / (vmax - vmin)).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// An approximation of matplotlib's "inferno" colour map. `t` is clamped to
/// 0 to 1.
pub fn inferno(t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let r = (t * (1.132 + t * (0.737 + t * (-0.972 + t * 0.441)))).clamp(0.0, 1.0);
    let g = (t * (0.142 + t * (1.746 + t * (-1.834 + t * 0.926)))).clamp(0.0, 1.0);
    let b = (0.016 + t * (1.980 + t * (-2.897 + t * (2.182 - t * 0.565)))).clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

/// Average `matrix` over blocks of `(row_stride, col_stride)` elements,
/// ignoring non-finite values. Blocks with no finite values are NaN. The last
/// block along each axis may be smaller than the strides.
#[cfg(feature = "plotting")]
pub(crate) fn decimate(matrix: ArrayView2<f64>, row_stride: usize, col_stride: usize) -> Array2<f64> {
    let (num_rows, num_cols) = matrix.dim();
    let row_stride = row_stride.max(1);
    let col_stride = col_stride.max(1);
    let out_dim = (
        (num_rows + row_stride - 1) / row_stride,
        (num_cols + col_stride - 1) / col_stride,
    );
    Array2::from_shape_fn(out_dim, |(i, j)| {
        let block = matrix.slice(s![
            i * row_stride..((i + 1) * row_stride).min(num_rows),
            j * col_stride..((j + 1) * col_stride).min(num_cols)
        ]);
        let (sum, count) = block
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0_u32), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / f64::from(count)
        }
    })
}

/// Render `spectrogram` to a PNG. An empty spectrogram isn't plotted (a
/// warning is issued instead).
#[cfg(feature = "plotting")]
pub fn plot_spectrogram(
    file: &Path,
    spectrogram: &Spectrogram,
    (width, height): (u32, u32),
) -> Result<(), PlotError> {
    use crate::cli::Warn;

    if width == 0 || height == 0 {
        return Err(PlotError::ZeroSize { width, height });
    }
    if spectrogram.is_empty() {
        format!(
            "The spectrogram is empty; not plotting '{}'",
            file.display()
        )
        .warn();
        return Ok(());
    }
    render::plot(file, spectrogram, (width, height))?;
    log::debug!("Plotted spectrogram to '{}'", file.display());
    Ok(())
}

#[cfg(not(feature = "plotting"))]
pub fn plot_spectrogram(
    _file: &Path,
    _spectrogram: &Spectrogram,
    _size: (u32, u32),
) -> Result<(), PlotError> {
    Err(PlotError::NoPlottingFeature)
}

#[cfg(feature = "plotting")]
mod render {
    use std::path::Path;

    use log::trace;
    use ndarray::ArrayView1;
    use plotters::{coord::Shift, prelude::*};

    use super::{
        colour_limits, decimate, inferno, normalise, PlotError, Spectrogram, PLOT_TITLE,
    };

    /// The width of the area given to the colour bar and its labels
    /// \[pixels\].
    const COLOUR_BAR_AREA_WIDTH: u32 = 130;

    /// The number of distinct colours drawn in the colour bar.
    const COLOUR_BAR_STEPS: usize = 256;

    /// The spacing between the values of an axis, or `fallback` if there are
    /// fewer than two values.
    fn spacing(axis: ArrayView1<f64>, fallback: f64) -> f64 {
        match axis.as_slice() {
            Some([a, b, ..]) => b - a,
            _ => fallback,
        }
    }

    pub(super) fn plot(
        file: &Path,
        spectrogram: &Spectrogram,
        (width, height): (u32, u32),
    ) -> Result<(), PlotError> {
        let power = spectrogram.power.view();
        let (num_rows, num_cols) = power.dim();
        let limits = colour_limits(power);
        trace!("Colour limits: {limits:?}");

        // There's no point drawing more cells than there are pixels.
        let row_stride = (num_rows + height as usize - 1) / height as usize;
        let col_stride = (num_cols + width as usize - 1) / width as usize;
        let cells = decimate(power, row_stride, col_stride);

        // Cells are centred on their axis values.
        let time = spectrogram.axes.time_s.view();
        let freq_mhz = spectrogram.axes.freq_hz.mapv(|f| f / 1e6);
        let dt = spacing(
            time,
            if spectrogram.duration_sec > 0.0 {
                spectrogram.duration_sec
            } else {
                1.0
            },
        );
        let df = spacing(freq_mhz.view(), 1.0);
        let x_range = (time[0] - dt / 2.0)..(time[num_cols - 1] + dt / 2.0);
        let y_range = (freq_mhz[0] - df / 2.0)..(freq_mhz[num_rows - 1] + df / 2.0);

        let root = BitMapBackend::new(file, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::Spectrogram(e.to_string()))?;
        let (main_area, bar_area) =
            root.split_horizontally(width.saturating_sub(COLOUR_BAR_AREA_WIDTH));

        let mut chart = ChartBuilder::on(&main_area)
            .caption(PLOT_TITLE, ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| PlotError::Spectrogram(e.to_string()))?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("Time [s]")
            .y_desc("Frequency [MHz]")
            .draw()
            .map_err(|e| PlotError::Spectrogram(e.to_string()))?;

        chart
            .draw_series(cells.indexed_iter().filter_map(|((i, j), &value)| {
                if !value.is_finite() {
                    return None;
                }
                let first_row = i * row_stride;
                let last_row = ((i + 1) * row_stride).min(num_rows) - 1;
                let first_col = j * col_stride;
                let last_col = ((j + 1) * col_stride).min(num_cols) - 1;
                let [r, g, b] = inferno(normalise(value, limits));
                Some(Rectangle::new(
                    [
                        (time[first_col] - dt / 2.0, freq_mhz[first_row] - df / 2.0),
                        (time[last_col] + dt / 2.0, freq_mhz[last_row] + df / 2.0),
                    ],
                    RGBColor(r, g, b).filled(),
                ))
            }))
            .map_err(|e| PlotError::Spectrogram(e.to_string()))?;

        draw_colour_bar(&bar_area, limits)?;

        root.present()
            .map_err(|e| PlotError::Spectrogram(e.to_string()))?;
        Ok(())
    }

    fn draw_colour_bar<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        (vmin, vmax): (f64, f64),
    ) -> Result<(), PlotError> {
        // A bar needs some height.
        let (lower, upper) = if vmax > vmin {
            (vmin, vmax)
        } else {
            (vmin - 0.5, vmin + 0.5)
        };

        let mut bar = ChartBuilder::on(area)
            .margin_top(44)
            .margin_bottom(50)
            .margin_right(10)
            .right_y_label_area_size(80)
            .build_cartesian_2d(0.0..1.0, lower..upper)
            .map_err(|e| PlotError::ColourBar(e.to_string()))?;
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_desc("Power [dB]")
            .draw()
            .map_err(|e| PlotError::ColourBar(e.to_string()))?;

        let step = (upper - lower) / COLOUR_BAR_STEPS as f64;
        bar.draw_series((0..COLOUR_BAR_STEPS).map(|i| {
            let bottom = lower + step * i as f64;
            let [r, g, b] = inferno(normalise(bottom + step / 2.0, (vmin, vmax)));
            Rectangle::new([(0.0, bottom), (1.0, bottom + step)], RGBColor(r, g, b).filled())
        }))
        .map_err(|e| PlotError::ColourBar(e.to_string()))?;
        Ok(())
    }
}
