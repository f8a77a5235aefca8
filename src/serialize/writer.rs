use std::io::{self, Write};

use clap::ValueEnum;

/// Output framing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One object per line.
    #[default]
    Lines,
    /// A single top-level JSON array.
    Array,
}

/// Writes serialized rows with array or line framing.
///
/// Call [`JsonWriter::begin`] once, [`JsonWriter::write_object`] per row and
/// [`JsonWriter::finish`] at the end, including after a cancelled export, so
/// the file is always well-formed.
pub struct JsonWriter<W: Write> {
    inner: W,
    format: OutputFormat,
    rows: u64,
}

impl<W: Write> JsonWriter<W> {
    /// A writer that has not written the opening bracket yet.
    pub fn new(inner: W, format: OutputFormat) -> Self {
        Self {
            inner,
            format,
            rows: 0,
        }
    }

    /// Rows written so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Writes the opening bracket in array mode.
    pub fn begin(&mut self) -> io::Result<()> {
        if self.format == OutputFormat::Array {
            self.inner.write_all(b"[\n")?;
        }
        Ok(())
    }

    /// Writes one serialized object with its leading separator.
    pub fn write_object(&mut self, object: &str) -> io::Result<()> {
        if self.rows > 0 {
            let separator: &[u8] = match self.format {
                OutputFormat::Array => b",\n",
                OutputFormat::Lines => b"\n",
            };
            self.inner.write_all(separator)?;
        }
        self.inner.write_all(object.as_bytes())?;
        self.rows += 1;
        Ok(())
    }

    /// Closes the framing, flushes, and returns the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.rows > 0 {
            self.inner.write_all(b"\n")?;
        }
        if self.format == OutputFormat::Array {
            self.inner.write_all(b"]\n")?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}
