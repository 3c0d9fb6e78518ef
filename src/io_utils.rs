//! File I/O helpers shared by the loader, the CSV cache and the report writer.
//!
//! - **Input kind**: extension-based detection of the CSV cache vs. the JSON dump.
//! - **CSV reader/writer construction** with the settings the cache uses.
//! - **stdout**: the `-` path convention routes CSV output through standard out.

use std::{
    fs::{self, File},
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::QuoteStyle;

pub const CSV_DELIMITER: u8 = b',';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn is_csv_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("csv")
    )
}

pub fn open_csv_reader<R>(reader: R) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(CSV_DELIMITER)
        .double_quote(true)
        .flexible(false);
    builder.from_reader(reader)
}

pub fn open_csv_writer(path: &Path) -> Result<csv::Writer<Box<dyn Write>>> {
    let writer: Box<dyn Write> = if is_dash(path) {
        Box::new(std::io::stdout())
    } else {
        Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
        ))
    };
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(CSV_DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(writer))
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("Creating directory {path:?}"))
}

pub fn write_text_file(path: &Path, contents: &str) -> Result<()> {
    let mut file =
        BufWriter::new(File::create(path).with_context(|| format!("Creating file {path:?}"))?);
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Writing file {path:?}"))?;
    file.flush().with_context(|| format!("Flushing file {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_detection_is_case_insensitive() {
        assert!(is_csv_path(Path::new("beatmaps.CSV")));
        assert!(!is_csv_path(Path::new("maps.json")));
        assert!(!is_csv_path(Path::new("maps")));
    }
}
