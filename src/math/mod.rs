// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use std::f64::consts::TAU;

use ndarray::Array1;

/// A Hamming window of length `n` (symmetric, i.e. the first and last
/// coefficients are both 0.08). A window of length 1 is `[1.0]`.
pub(crate) fn hamming(n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::ones(1),
        _ => {
            let denom = (n - 1) as f64;
            Array1::from_iter((0..n).map(|i| 0.54 - 0.46 * (TAU * i as f64 / denom).cos()))
        }
    }
}

/// The median of the supplied values. Even-length inputs get the mean of the
/// two middle values. The contents of `values` are reordered. An empty slice
/// has no median, so NaN is returned.
pub(crate) fn median(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }

    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        upper
    } else {
        // The largest element below the pivot is the other middle value.
        let lower = lower
            .iter()
            .copied()
            .max_by(f64::total_cmp)
            .unwrap_or(upper);
        (lower + upper) / 2.0
    }
}

/// The `q`th percentile (0 to 100) of the finite values in the iterator,
/// linearly interpolating between the closest ranks. Returns `None` if there
/// are no finite values.
pub(crate) fn finite_percentile<I>(values: I, q: f64) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_unstable_by(f64::total_cmp);

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (finite.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    let frac = rank - below as f64;
    Some(finite[below] + (finite[above] - finite[below]) * frac)
}
