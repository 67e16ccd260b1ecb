//! CSV export of the filtered and sorted list.
//!
//! The whole filtered set is written, not just the visible page. Every field is
//! quoted, embedded quotes are doubled and missing values become empty fields.
//! Delimiters must be single ASCII characters.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::table::ListView;

/// Configuration for writing CSV output.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Write a header row with column labels when true.
    pub include_header: bool,
    /// Delimiter to use between fields.
    pub delimiter: char,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            delimiter: ',',
        }
    }
}

fn delimiter_byte(delimiter: char) -> io::Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("delimiter '{}' is not a single ASCII character", delimiter),
            )
        })
}

/// Writes every filtered record using the schema's columns. Returns the number
/// of data rows written.
pub fn write_csv<W: Write>(list: &ListView, options: &CsvOptions, out: W) -> io::Result<usize> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter_byte(options.delimiter)?)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    let columns = list.schema().columns();
    if options.include_header {
        writer.write_record(columns.iter().map(|c| c.label()))?;
    }

    let records = list.filtered();
    for record in &records {
        writer.write_record(columns.iter().map(|c| record.get(&c.field).display_text()))?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Creates (or truncates) `path` and writes the export into it.
pub fn export_to_path(list: &ListView, options: &CsvOptions, path: &Path) -> io::Result<usize> {
    let file = File::create(path)?;
    let rows = write_csv(list, options, file)?;
    info!(path = %path.display(), rows, "exported CSV");
    Ok(rows)
}
