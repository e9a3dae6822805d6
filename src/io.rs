//! Box-list input parsing.
//!
//! One candidate box per line: three whitespace-separated positive integers
//! in `width height length` order. A line that does not decode that way is
//! skipped locally — bad lines are expected in real inputs and are not an
//! error. Failing to open or read the file is fatal.

use crate::boxes::BoxItem;
use crate::error::NpStackError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads a box list from a file.
pub fn read_boxes<P: AsRef<Path>>(path: P) -> Result<Vec<BoxItem>, NpStackError> {
    let file = File::open(path)?;
    parse_boxes(BufReader::new(file))
}

/// Parses a box list from any buffered reader.
///
/// Lines that do not contain exactly three positive integers are silently
/// skipped; a single debug-level count of skipped lines is emitted at the
/// end. Only an I/O failure while reading is an error.
pub fn parse_boxes<R: BufRead>(reader: R) -> Result<Vec<BoxItem>, NpStackError> {
    let mut boxes = Vec::new();
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        match parse_line(&line) {
            Some(b) => boxes.push(b),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("skipped {skipped} unparseable line(s) in box list");
    }
    Ok(boxes)
}

/// Decodes one line into a box, or `None` if it is not exactly three
/// positive integers.
fn parse_line(line: &str) -> Option<BoxItem> {
    let mut fields = line.split_whitespace();
    let width = parse_dim(fields.next()?)?;
    let height = parse_dim(fields.next()?)?;
    let length = parse_dim(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Some(BoxItem::new(width, height, length))
}

fn parse_dim(field: &str) -> Option<u32> {
    match field.parse::<u32>() {
        Ok(v) if v >= 1 => Some(v),
        _ => None,
    }
}
