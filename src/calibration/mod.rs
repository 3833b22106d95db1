// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Corrections derived from vector network analyser (VNA) measurements of the
//! receive chain.
//!
//! Three quantities are derived from four scalar measurements:
//! - the radiation efficiency, from the return loss (S11);
//! - a gain correction, from the insertion loss (S21);
//! - a phase rotor that cancels the phase of the reflection coefficient
//!   introduced by the impedance mismatch against a 50 Ohm system.
//!
//! The free functions in this module are pure; they do no validation and will
//! happily return non-physical values. [`CalibrationCoefficients::new`]
//! validates the measurements before anything is computed.

mod error;

pub use error::CalibrationError;

use serde::{Deserialize, Serialize};

use crate::{
    c64,
    constants::{
        DEFAULT_IMPEDANCE_IM_OHMS, DEFAULT_IMPEDANCE_RE_OHMS, DEFAULT_S11_DB, DEFAULT_S21_DB,
        SYSTEM_IMPEDANCE_OHMS,
    },
};

/// Scalar VNA measurements of the receive chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VnaMeasurements {
    /// Return loss \[dB\]. Expected to be negative.
    pub s11_db: f64,

    /// Insertion loss \[dB\]. Expected to be negative.
    pub s21_db: f64,

    /// The measured impedance, real part \[Ohms\].
    pub impedance_re_ohms: f64,

    /// The measured impedance, imaginary part \[Ohms\].
    pub impedance_im_ohms: f64,
}

impl Default for VnaMeasurements {
    fn default() -> Self {
        Self {
            s11_db: DEFAULT_S11_DB,
            s21_db: DEFAULT_S21_DB,
            impedance_re_ohms: DEFAULT_IMPEDANCE_RE_OHMS,
            impedance_im_ohms: DEFAULT_IMPEDANCE_IM_OHMS,
        }
    }
}

impl VnaMeasurements {
    pub fn impedance(&self) -> c64 {
        c64::new(self.impedance_re_ohms, self.impedance_im_ohms)
    }
}

/// The magnitude of the reflection coefficient implied by a return loss.
pub fn reflection_magnitude(s11_db: f64) -> f64 {
    10_f64.powf(s11_db / 20.0)
}

/// The fraction of power delivered past the mismatch, `1 - |Γ|²`.
pub fn efficiency(s11_db: f64) -> f64 {
    let gamma_mag = reflection_magnitude(s11_db);
    1.0 - gamma_mag * gamma_mag
}

/// The gain correction \[dB\] for an insertion loss. This goes to a linear
/// gain and back again, so for well-formed input it is the input.
pub fn gain_correction_db(s21_db: f64) -> f64 {
    let s21_gain = 10_f64.powf(-s21_db / 10.0);
    -10.0 * s21_gain.log10()
}

/// The complex reflection coefficient of `impedance` against the system
/// impedance.
pub fn reflection_coefficient(impedance: c64) -> c64 {
    (impedance - SYSTEM_IMPEDANCE_OHMS) / (impedance + SYSTEM_IMPEDANCE_OHMS)
}

/// A unit-magnitude rotor `exp(-j arg(Γ))`.
pub fn phase_correction(impedance: c64) -> c64 {
    let gamma = reflection_coefficient(impedance);
    c64::from_polar(1.0, -gamma.arg())
}

/// Validated correction coefficients. These are computed once and shared
/// read-only by everything downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationCoefficients {
    /// Unitless, in (0, 1].
    pub efficiency: f64,

    /// \[dB\]
    pub gain_correction_db: f64,

    /// Unit magnitude.
    pub phase_correction: c64,
}

impl CalibrationCoefficients {
    pub fn new(vna: &VnaMeasurements) -> Result<CalibrationCoefficients, CalibrationError> {
        let VnaMeasurements {
            s11_db,
            s21_db,
            impedance_re_ohms,
            impedance_im_ohms,
        } = *vna;

        for (name, value) in [
            ("S11", s11_db),
            ("S21", s21_db),
            ("impedance (real)", impedance_re_ohms),
            ("impedance (imag)", impedance_im_ohms),
        ] {
            if !value.is_finite() {
                return Err(CalibrationError::NonFinite { name, value });
            }
        }

        let gamma_mag = reflection_magnitude(s11_db);
        if gamma_mag >= 1.0 {
            return Err(CalibrationError::NonPhysicalReflection { s11_db, gamma_mag });
        }

        let impedance = vna.impedance();
        if (impedance + SYSTEM_IMPEDANCE_OHMS).norm_sqr() == 0.0 {
            return Err(CalibrationError::SingularImpedance {
                re: impedance_re_ohms,
                im: impedance_im_ohms,
            });
        }

        Ok(CalibrationCoefficients {
            efficiency: efficiency(s11_db),
            gain_correction_db: gain_correction_db(s21_db),
            phase_correction: phase_correction(impedance),
        })
    }

    /// Build coefficients without any validation. Useful for exercising the
    /// engine with deliberately broken inputs.
    pub fn new_unchecked(vna: &VnaMeasurements) -> CalibrationCoefficients {
        CalibrationCoefficients {
            efficiency: efficiency(vna.s11_db),
            gain_correction_db: gain_correction_db(vna.s21_db),
            phase_correction: phase_correction(vna.impedance()),
        }
    }

    /// The efficiency expressed in dB. Negative for any efficiency below 1.
    pub fn efficiency_db(&self) -> f64 {
        10.0 * self.efficiency.log10()
    }

    /// The additive correction applied to every spectrogram bin \[dB\].
    pub fn power_offset_db(&self) -> f64 {
        self.gain_correction_db + self.efficiency_db()
    }
}
