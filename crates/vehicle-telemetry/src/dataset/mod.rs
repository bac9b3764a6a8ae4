//! Flat-file storage for telemetry datasets.
//!
//! Datasets are stored as one CSV file whose header is fixed by [`schema`].
//! Writes go to a temporary file next to the destination and are persisted
//! over it in a single rename, so readers never observe a partial file.
//! Reads validate the header up front and keep every row, well-formed or not,
//! for the metrics calculator to validate.

pub mod schema;

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::Duration;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{RawRecord, TelemetryRecord};

/// Outcome of writing a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Destination path.
    pub path: PathBuf,
    /// Data rows written, header excluded.
    pub rows: usize,
    /// BLAKE3 digest of the file contents, hex encoded.
    pub digest: String,
}

/// Write records to `path`, replacing any existing file atomically.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns [`Error::Write`] with the destination path if any step fails. The
/// temporary file is removed and an existing dataset is left untouched.
pub fn write(path: impl AsRef<Path>, records: &[TelemetryRecord]) -> Result<WriteSummary> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|source| Error::write(path, source))?;
    }

    debug!("Writing {} rows via temporary file in {}", records.len(), dir.display());
    let mut temp = NamedTempFile::new_in(dir).map_err(|source| Error::write(path, source))?;

    let digest = {
        let sink = DigestWriter::new(BufWriter::new(temp.as_file_mut()));
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(sink);
        writer
            .write_record(schema::COLUMNS)
            .map_err(|err| Error::write(path, err.into()))?;
        for record in records {
            writer
                .write_record(record.to_csv_row())
                .map_err(|err| Error::write(path, err.into()))?;
        }
        let sink = writer
            .into_inner()
            .map_err(|err| Error::write(path, err.into_error()))?;
        sink.finish().map_err(|source| Error::write(path, source))?
    };

    temp.as_file().sync_all().map_err(|source| Error::write(path, source))?;
    temp.persist(path).map_err(|err| Error::write(path, err.error))?;

    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(WriteSummary {
        path: path.to_path_buf(),
        rows: records.len(),
        digest,
    })
}

/// BLAKE3 digest of a file's contents, hex encoded.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file cannot be read.
pub fn digest_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let read_err = |source| Error::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(read_err)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher).map_err(read_err)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Writer adapter that hashes everything passing through it.
struct DigestWriter<W: Write> {
    inner: W,
    hasher: blake3::Hasher,
}

impl<W: Write> DigestWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
        }
    }

    /// Flush the inner writer and return the hex digest.
    fn finish(mut self) -> io::Result<String> {
        self.inner.flush()?;
        Ok(self.hasher.finalize().to_hex().to_string())
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A dataset as read from disk, rows not yet validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<RawRecord>,
}

impl Dataset {
    /// Open and read the dataset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the file cannot be opened,
    /// [`Error::SchemaMismatch`] if the header differs from the schema, and
    /// [`Error::Csv`] if the file cannot be decoded at all.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading dataset from {}", path.display());
        let file = File::open(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        info!("Loaded {} rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Read a dataset from any CSV source.
    ///
    /// Rows with too few or too many cells, or invalid UTF-8, are kept and
    /// surface later as malformed records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaMismatch`] on header drift and [`Error::Csv`] on
    /// I/O failure while reading.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        schema::validate_header(reader.headers()?)?;

        let mut rows = Vec::new();
        for (line, result) in (1..).zip(reader.byte_records()) {
            let row = StringRecord::from_byte_record_lossy(result?);
            rows.push(RawRecord::from_csv(line, &row));
        }
        Ok(Self { rows })
    }

    /// Build a dataset from in-memory records.
    #[must_use]
    pub fn from_records(records: &[TelemetryRecord]) -> Self {
        let rows = records
            .iter()
            .zip(1..)
            .map(|(record, line)| RawRecord::from_record(line, record))
            .collect();
        Self { rows }
    }

    /// Build a dataset from raw rows.
    #[must_use]
    pub fn from_rows(rows: Vec<RawRecord>) -> Self {
        Self { rows }
    }

    /// All rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sampling interval inferred from the first two timestamped rows.
    #[must_use]
    pub fn infer_interval(&self) -> Option<Duration> {
        let mut timestamps = self.rows.iter().filter_map(|row| row.timestamp);
        let first = timestamps.next()?;
        let second = timestamps.next()?;
        let interval = second - first;
        (interval > Duration::zero()).then_some(interval)
    }
}
