// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_colour_limits_ignore_nan() {
    let mut power = Array2::from_shape_fn((10, 11), |(i, j)| (i * 11 + j) as f64);
    let (vmin, vmax) = colour_limits(power.view());
    assert_abs_diff_eq!(vmin, 10.9, epsilon = 1e-9);
    assert_abs_diff_eq!(vmax, 107.91, epsilon = 1e-9);

    power[(0, 0)] = f64::NAN;
    power[(9, 10)] = f64::NAN;
    let (vmin, vmax) = colour_limits(power.view());
    assert!(vmin.is_finite());
    assert!(vmax.is_finite());
    assert!(vmin < vmax);

    let all_nan = Array2::from_elem((3, 3), f64::NAN);
    assert_eq!(colour_limits(all_nan.view()), (0.0, 1.0));
}

#[test]
fn test_normalise() {
    assert_abs_diff_eq!(normalise(5.0, (0.0, 10.0)), 0.5);
    assert_abs_diff_eq!(normalise(-5.0, (0.0, 10.0)), 0.0);
    assert_abs_diff_eq!(normalise(50.0, (0.0, 10.0)), 1.0);
    assert_abs_diff_eq!(normalise(3.0, (2.0, 2.0)), 0.5);
}

#[test]
fn test_inferno_ends() {
    // Black-ish at the bottom, pale yellow at the top.
    let [r, g, b] = inferno(0.0);
    assert_eq!((r, g), (0, 0));
    assert!(b < 10);
    let [r, g, b] = inferno(1.0);
    assert!(r > 240);
    assert!(g > 230);
    assert!(b > 150);
    // Out-of-range values are clamped.
    assert_eq!(inferno(-1.0), inferno(0.0));
    assert_eq!(inferno(2.0), inferno(1.0));
}

#[test]
#[cfg(feature = "plotting")]
fn test_decimate() {
    let mut matrix = Array2::from_shape_fn((5, 4), |(i, j)| (i * 4 + j) as f64);
    let cells = decimate(matrix.view(), 1, 1);
    assert_eq!(cells, matrix);

    let cells = decimate(matrix.view(), 2, 2);
    assert_eq!(cells.dim(), (3, 2));
    assert_abs_diff_eq!(cells[(0, 0)], (0.0 + 1.0 + 4.0 + 5.0) / 4.0);
    // The last row of blocks only has one row.
    assert_abs_diff_eq!(cells[(2, 1)], (18.0 + 19.0) / 2.0);

    matrix.slice_mut(s![0..2, 0..2]).fill(f64::NAN);
    matrix[(2, 2)] = f64::INFINITY;
    let cells = decimate(matrix.view(), 2, 2);
    assert!(cells[(0, 0)].is_nan());
    assert_abs_diff_eq!(cells[(1, 1)], (11.0 + 14.0 + 15.0) / 3.0);
}

#[cfg(feature = "plotting")]
#[test]
fn test_plot_rejects_zero_size() {
    use crate::{calibration::VnaMeasurements, spectrogram::SpectrogramConfig};

    let spectrogram = Spectrogram::compute(
        &[0.0; 64],
        100,
        &VnaMeasurements::default(),
        SpectrogramConfig::new(8, 4).unwrap(),
    )
    .unwrap();
    let tmp_dir = tempfile::TempDir::new().expect("Couldn't make tmp dir");
    let file = tmp_dir.path().join("spectrogram.png");
    let result = plot_spectrogram(&file, &spectrogram, (0, 600));
    assert!(matches!(
        result,
        Err(PlotError::ZeroSize {
            width: 0,
            height: 600
        })
    ));
    assert!(!file.exists());
}

#[cfg(feature = "plotting")]
#[test]
fn test_empty_spectrogram_isnt_plotted() {
    use crate::{calibration::VnaMeasurements, spectrogram::SpectrogramConfig};

    let spectrogram = Spectrogram::compute(
        &[0.0; 8],
        100,
        &VnaMeasurements::default(),
        SpectrogramConfig::new(8, 4).unwrap(),
    )
    .unwrap();
    assert!(spectrogram.is_empty());
    let tmp_dir = tempfile::TempDir::new().expect("Couldn't make tmp dir");
    let file = tmp_dir.path().join("spectrogram.png");
    plot_spectrogram(&file, &spectrogram, (1200, 600)).unwrap();
    assert!(!file.exists());
}

#[cfg(not(feature = "plotting"))]
#[test]
fn test_plotting_needs_feature() {
    use crate::{calibration::VnaMeasurements, spectrogram::SpectrogramConfig};

    let spectrogram = Spectrogram::compute(
        &[0.0; 64],
        100,
        &VnaMeasurements::default(),
        SpectrogramConfig::new(8, 4).unwrap(),
    )
    .unwrap();
    let result = plot_spectrogram(Path::new("spectrogram.png"), &spectrogram, (1200, 600));
    assert!(matches!(result, Err(PlotError::NoPlottingFeature)));
}
