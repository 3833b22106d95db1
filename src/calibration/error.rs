// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from validating VNA measurements.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("The VNA {name} measurement is not finite ({value})")]
    NonFinite { name: &'static str, value: f64 },

    #[error("S11 of {s11_db} dB implies a reflection coefficient magnitude of {gamma_mag}; this must be less than 1 for a physical efficiency")]
    NonPhysicalReflection { s11_db: f64, gamma_mag: f64 },

    #[error("An impedance of ({re} + {im}j) Ohms makes the reflection coefficient undefined")]
    SingularImpedance { re: f64, im: f64 },
}
