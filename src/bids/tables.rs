//! Table conversion for BIDS derivatives: the container emits QC and volume
//! tables as CSV, BIDS wants TSV with underscore-joined column names.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Convert a CSV table to a BIDS TSV: commas become tabs, and spaces in the
/// header row become underscores.
pub fn csv_to_bids_tsv(input: &Path, output: &Path) -> Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let mut row = line.trim_end().replace(',', "\t");
        if idx == 0 {
            row = row.replace(' ', "_");
        }
        writeln!(writer, "{}", row)?;
    }

    writer.flush()?;
    Ok(())
}
