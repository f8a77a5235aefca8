//! Output destinations.

use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::error_handling::{ConfigError, ExportError};

/// Where a job's JSON goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Standard output (`--file -`).
    Stdout,
    /// A file, created or truncated.
    File(PathBuf),
}

impl Destination {
    /// `<directory>/<table><extension>`.
    pub fn for_table(directory: &Path, table: &str, extension: &str) -> Self {
        Destination::File(directory.join(format!("{}{}", table, extension)))
    }

    /// An explicit `--file` argument, `-` meaning stdout.
    pub fn from_arg(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            Destination::Stdout
        } else {
            Destination::File(path.to_path_buf())
        }
    }

    /// File path, `None` for stdout.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Destination::Stdout => None,
            Destination::File(path) => Some(path),
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Stdout => write!(f, "<stdout>"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Wrapper around a Write that ignores broken pipe errors (EPIPE).
/// This allows graceful handling when stdout is piped to a command that exits early.
pub struct IgnoreBrokenPipe<W: Write> {
    inner: W,
}

impl<W: Write> IgnoreBrokenPipe<W> {
    /// Wraps `inner`.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for IgnoreBrokenPipe<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                Ok(buf.len())
            } else {
                Err(e)
            }
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().or_else(|e| {
            if e.kind() == ErrorKind::BrokenPipe {
                Ok(())
            } else {
                Err(e)
            }
        })
    }
}

/// Makes sure `directory` exists and is a writable directory.
///
/// # Errors
///
/// Returns a configuration error if the path is a file or read-only, and an
/// I/O error if it cannot be created or inspected.
pub async fn prepare_directory(directory: &Path) -> Result<(), ExportError> {
    match tokio::fs::metadata(directory).await {
        Ok(meta) if !meta.is_dir() => {
            return Err(ConfigError::NotADirectory(directory.to_path_buf()).into())
        }
        Ok(meta) if meta.permissions().readonly() => {
            return Err(ConfigError::DirectoryNotWritable(directory.to_path_buf()).into())
        }
        Ok(_) => return Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(ExportError::io(directory.display(), e)),
    }

    tokio::fs::create_dir_all(directory).await.map_err(|e| {
        error!("Failed to create directory {}: {e}", directory.display());
        ExportError::io(directory.display(), e)
    })?;
    info!("Created output directory {}", directory.display());
    Ok(())
}

/// Opens a destination for writing.
pub async fn open_destination(
    destination: &Destination,
) -> Result<Box<dyn Write + Send>, ExportError> {
    match destination {
        Destination::Stdout => Ok(Box::new(IgnoreBrokenPipe::new(io::stdout()))),
        Destination::File(path) => {
            let file = tokio::fs::File::create(path).await.map_err(|e| {
                error!("Failed to create {}: {e}", path.display());
                ExportError::io(path.display(), e)
            })?;
            Ok(Box::new(BufWriter::new(file.into_std().await)))
        }
    }
}
