// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information.
//!
//! Lines are grouped into blocks and drawn as a tree under a bold title:
//!
//! ```text
//! VNA calibration
//! ├ S11: -16.88 dB
//! │ S21: -44.86 dB
//! └ Efficiency: 0.9795
//! ```

use std::{
    borrow::Cow,
    sync::{Mutex, MutexGuard},
};

use log::Level;

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Vec<Vec<Cow<'static, str>>>> = Mutex::new(vec![]);
}

/// Draw blocks of lines under a title at the given log level.
fn draw_tree(level: Level, title: &str, blocks: &[Vec<Cow<'static, str>>]) {
    log::log!(level, "{}", console::style(title).bold());
    let num_blocks = blocks.len();
    for (i_block, block) in blocks.iter().enumerate() {
        let num_lines = block.len();
        for (i_line, line) in block.iter().enumerate() {
            let symbol = match (i_line, i_line + 1 == num_lines, i_block + 1 == num_blocks) {
                (0, true, true) => UP_AND_RIGHT,
                (0, _, _) => VERTICAL_AND_RIGHT,
                _ => VERTICAL,
            };
            log::log!(level, "{symbol} {line}");
        }
    }
    log::log!(level, "");
}

pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Vec<Cow<'static, str>>>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Vec<Cow<'static, str>>) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        draw_tree(Level::Info, &self.title, &self.blocks);
    }
}

/// Something that can be deferred as a warning, to be displayed with all
/// other warnings by [`display_warnings`].
pub(crate) trait Warn {
    fn warn(self);
}

fn warnings() -> MutexGuard<'static, Vec<Vec<Cow<'static, str>>>> {
    WARNINGS.lock().unwrap_or_else(|e| e.into_inner())
}

impl Warn for &'static str {
    fn warn(self) {
        warnings().push(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        warnings().push(vec![self.into()]);
    }
}

impl Warn for Cow<'static, str> {
    fn warn(self) {
        warnings().push(vec![self]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        warnings().push(self);
    }
}

/// Print out any warnings that have been collected, then forget them. This
/// should be called once arguments have been parsed into parameters, and
/// again after a run.
pub(crate) fn display_warnings() {
    let mut warnings = warnings();
    log::debug!("Displaying warnings");
    if warnings.is_empty() {
        return;
    }
    draw_tree(Level::Warn, "Warnings", &warnings);
    warnings.clear();
}
