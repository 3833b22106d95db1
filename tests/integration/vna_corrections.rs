// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{get_cmd_output, hline};

#[test]
fn test_vna_corrections_defaults() {
    let cmd = hline().arg("vna-corrections").ok();
    assert!(cmd.is_ok(), "vna-corrections failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Efficiency"), "{stdout}");
    assert!(stdout.contains("0.9795"), "{stdout}");
    assert!(stdout.contains("-44.8600 dB"), "{stdout}");
}

#[test]
fn test_vna_corrections_matched_load() {
    #[rustfmt::skip]
    let cmd = hline()
        .args([
            "vna-corrections",
            "--s11", "-30",
            "--impedance", "50", "0",
        ])
        .ok();
    assert!(cmd.is_ok(), "vna-corrections failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Phase correction:"), "{stdout}");
    assert!(stdout.contains("0.0000°"), "{stdout}");
}

#[test]
fn test_vna_corrections_non_physical() {
    let cmd = hline().args(["vna-corrections", "--s11", "2"]).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
    assert!(stderr.contains("VNA measurements"), "{stderr}");
}

#[test]
fn test_vna_corrections_singular_impedance() {
    let cmd = hline()
        .args(["vna-corrections", "--impedance", "-50", "0"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("VNA measurements"), "{stderr}");
}
