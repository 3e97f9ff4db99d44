//! CSV export of output rows.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use revscrape_core::OutputRow;

/// UTF-8 signature so spreadsheet tools pick the right encoding.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// `avis_<YYYYmmdd_HHMMSS>.csv` in the working directory.
pub(crate) fn default_output_path(now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!("avis_{}.csv", now.format("%Y%m%d_%H%M%S")))
}

/// Validates a delimiter given on the command line.
///
/// # Errors
///
/// Returns an error for non-ASCII characters and for `"` and line breaks.
pub(crate) fn delimiter_byte(delimiter: char) -> anyhow::Result<u8> {
    let byte = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| anyhow::anyhow!("delimiter must be a single ASCII character"))?;
    if matches!(byte, b'"' | b'\n' | b'\r') {
        anyhow::bail!("delimiter {delimiter:?} is not allowed");
    }
    Ok(byte)
}

/// Writes a BOM, a header row, and one line per row.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub(crate) fn write_rows<W: Write>(
    mut writer: W,
    rows: &[OutputRow],
    delimiter: u8,
) -> anyhow::Result<()> {
    writer.write_all(UTF8_BOM)?;
    let mut csv = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    if rows.is_empty() {
        csv.write_record(OutputRow::COLUMNS)?;
    }
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Creates (or truncates) `path` and writes `rows` to it.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub(crate) fn export_csv(path: &Path, rows: &[OutputRow], delimiter: u8) -> anyhow::Result<()> {
    let file = File::create(path)
        .map_err(|e| anyhow::anyhow!("could not create {}: {e}", path.display()))?;
    write_rows(BufWriter::new(file), rows, delimiter)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "export written");
    Ok(())
}
