use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Error that occurs when opening a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Error that occurs when reading a file fails.
///
/// The underlying [`io::ErrorKind`] is preserved, so callers can tell a
/// missing file from a permission problem.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file `{path}`: {source}")]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FileReadError {
    /// Returns the [`io::ErrorKind`] of the underlying error.
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// # Errors
///
/// Returns a [`FileOpenError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use cgmeter::fsutil;
/// let reader = fsutil::open_file_reader("/some/file.txt")?;
/// # Ok::<(), fsutil::FileOpenError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileOpenError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileOpenError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads a file in one pass and returns its content as a list of lines,
/// without trailing newlines.
///
/// Kernel pseudo-files report a size of zero but are readable, so the file
/// is drained through [`Read::read_to_string`] rather than sized from its
/// metadata. An empty file yields an empty list, not an error.
///
/// # Errors
///
/// Returns a [`FileReadError`] if the file cannot be opened or read; the
/// original [`io::ErrorKind`] stays accessible through the source error.
pub fn read_lines(path: impl AsRef<Path>) -> Result<Vec<String>, FileReadError> {
    let path = path.as_ref();
    let wrap = |source| FileReadError {
        path: path.to_path_buf(),
        source,
    };

    let mut content = String::new();
    File::open(path)
        .map_err(wrap)?
        .read_to_string(&mut content)
        .map_err(wrap)?;

    Ok(content.lines().map(str::to_owned).collect())
}
