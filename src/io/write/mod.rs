// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to write out spectrogram products.
//!
//! The FITS layout is:
//! - the primary HDU carries the metadata keys (no data);
//! - a `SPECTROGRAM` image HDU with dimensions `[frequency bins, time bins]`;
//! - `TIME` \[seconds\] and `FREQ` \[Hz\] image HDUs for the axes.

mod error;

pub use error::{FileWriteError, SpectrogramWriteError};

use std::path::Path;

use fitsio::{
    images::{ImageDescription, ImageType},
    FitsFile,
};
use log::{debug, trace};
use ndarray::prelude::*;

use crate::{cli::Warn, spectrogram::Spectrogram};

/// Write a spectrogram and its metadata to a FITS file. An existing file is
/// overwritten. If the spectrogram has no data, nothing is written (and a
/// warning is issued).
pub fn write_spectrogram_fits(
    file: &Path,
    spectrogram: &Spectrogram,
) -> Result<(), SpectrogramWriteError> {
    match file.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("fits") => (),
        ext => {
            return Err(SpectrogramWriteError::UnsupportedExt {
                ext: ext.unwrap_or_default().to_string(),
            })
        }
    }
    if spectrogram.is_empty() {
        format!(
            "The spectrogram is empty; not writing '{}'",
            file.display()
        )
        .warn();
        return Ok(());
    }

    if file.exists() {
        std::fs::remove_file(file)?;
    }
    let mut fptr = FitsFile::create(file).open()?;
    let hdu = fptr.primary_hdu()?;

    let Spectrogram {
        power,
        axes,
        sample_rate,
        duration_sec,
        config,
        coefficients,
        report,
    } = spectrogram;

    hdu.write_key(&mut fptr, "HFREQ", config.hydrogen_freq_hz)?;
    hdu.write_key(&mut fptr, "SRATE", i64::from(*sample_rate))?;
    hdu.write_key(&mut fptr, "DURATION", *duration_sec)?;
    hdu.write_key(&mut fptr, "WINSIZE", config.window_size as i64)?;
    hdu.write_key(&mut fptr, "OVERLAP", config.overlap as i64)?;
    hdu.write_key(&mut fptr, "OUTLIER", config.outlier_threshold)?;
    hdu.write_key(&mut fptr, "EFFIC", coefficients.efficiency)?;
    hdu.write_key(&mut fptr, "GAINCORR", coefficients.gain_correction_db)?;
    // Stored as an angle \[radians\]; the correction is a unit rotor.
    hdu.write_key(&mut fptr, "PHASECOR", coefficients.phase_correction.arg())?;
    hdu.write_key(&mut fptr, "ZERONF", report.non_finite_zeroed as i64)?;
    hdu.write_key(&mut fptr, "ZEROOUT", report.outliers_zeroed as i64)?;
    hdu.write_key(&mut fptr, "SKIPSEG", report.segments_skipped as i64)?;
    hdu.write_key(
        &mut fptr,
        "SOFTWARE",
        format!(
            "Created by {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ),
    )?;

    let (num_rows, num_cols) = power.dim();
    trace!("Writing a {num_rows}x{num_cols} spectrogram");
    write_image(&mut fptr, "SPECTROGRAM", &[num_rows, num_cols], power.view())?;
    write_image(&mut fptr, "TIME", &[num_cols], axes.time_s.view())?;
    write_image(&mut fptr, "FREQ", &[num_rows], axes.freq_hz.view())?;

    debug!("Wrote spectrogram to '{}'", file.display());
    Ok(())
}

fn write_image<D: Dimension>(
    fptr: &mut FitsFile,
    name: &str,
    dimensions: &[usize],
    data: ArrayView<f64, D>,
) -> Result<(), SpectrogramWriteError> {
    let image_description = ImageDescription {
        data_type: ImageType::Double,
        dimensions,
    };
    let hdu = fptr.create_image(name, &image_description)?;
    // FITS images are written in row-major order.
    let data: Vec<f64> = data.iter().copied().collect();
    hdu.write_image(fptr, &data)?;
    Ok(())
}

/// Check that a file can be written to. If the file exists, a warning is
/// issued that it will be overwritten. Directories leading up to the file are
/// created if they don't exist.
pub fn can_write_to_file(file: &Path) -> Result<(), FileWriteError> {
    trace!("Testing whether we can write to {}", file.display());

    let file_exists = file.exists();
    match std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(file)
        .map_err(|e| e.kind())
    {
        // File is writable.
        Ok(_) => {
            // If the file didn't already exist, `OpenOptions` created it as
            // part of its work. Don't keep the 0-sized file.
            if file_exists {
                format!("Will overwrite the existing file '{}'", file.display()).warn();
            } else {
                std::fs::remove_file(file)?;
            }
        }

        // Attempt to make the directories leading up to the file; if this
        // fails, then we can't write the file anyway.
        Err(std::io::ErrorKind::NotFound) => {
            if let Some(p) = file.parent() {
                match std::fs::DirBuilder::new()
                    .recursive(true)
                    .create(p)
                    .map_err(|e| e.kind())
                {
                    Ok(()) => (),
                    Err(std::io::ErrorKind::PermissionDenied) => {
                        return Err(FileWriteError::NewDirectory(p.to_path_buf()))
                    }
                    Err(e) => return Err(FileWriteError::IO(e.into())),
                }
            }
        }

        Err(std::io::ErrorKind::PermissionDenied) => {
            return Err(FileWriteError::FileNotWritable {
                file: file.display().to_string(),
            })
        }

        Err(e) => return Err(FileWriteError::IO(e.into())),
    }

    Ok(())
}
