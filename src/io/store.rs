use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::parse::serialize_lines;

/// Error type for store I/O
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    Unavailable { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },
}

impl StoreError {
    /// True when the file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Unavailable { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// A 1-based line number past the end of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no line {line} (store has {len})")]
pub struct LineOutOfRange {
    pub line: usize,
    pub len: usize,
}

/// A line-oriented flat file: `todo.txt` or `done.txt`.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every line, in file order. Line endings are dropped.
    pub fn load(&self) -> Result<Vec<String>, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::Unavailable {
            path: self.path.clone(),
            source: e,
        })?;
        let lines: Vec<String> = content.lines().map(|l| l.to_string()).collect();
        tracing::debug!(path = %self.path.display(), lines = lines.len(), "loaded store");
        Ok(lines)
    }

    /// Like [`Store::load`], but a missing file reads as an empty store.
    pub fn load_or_empty(&self) -> Result<Vec<String>, StoreError> {
        match self.load() {
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    /// Replace the whole file with `lines`, atomically. A file written
    /// with CRLF endings keeps them.
    pub fn overwrite(&self, lines: &[String]) -> Result<(), StoreError> {
        let eol = line_ending(&self.path).map_err(|e| StoreError::Unavailable {
            path: self.path.clone(),
            source: e,
        })?;
        let content = serialize_lines(lines, eol);
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StoreError::WriteFailed {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), lines = lines.len(), "rewrote store");
        Ok(())
    }

    /// Append one line, creating the file if needed. A missing final
    /// newline in the existing file is repaired first.
    pub fn append_line(&self, text: &str) -> Result<(), StoreError> {
        self.append_inner(text).map_err(|e| StoreError::WriteFailed {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), "appended line");
        Ok(())
    }

    fn append_inner(&self, text: &str) -> io::Result<()> {
        let eol = line_ending(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut needs_newline = false;
        if file.metadata()?.len() > 0 {
            file.seek(SeekFrom::End(-1))?;
            let mut last = [0u8; 1];
            file.read_exact(&mut last)?;
            needs_newline = last[0] != b'\n';
        }

        let mut out = String::with_capacity(text.len() + 4);
        if needs_newline {
            out.push_str(eol);
        }
        out.push_str(text);
        out.push_str(eol);
        file.write_all(out.as_bytes())?;
        file.flush()
    }
}

/// `\r\n` when the file's first line ends with it, else `\n`. A missing
/// file reads as `\n`.
fn line_ending(path: &Path) -> io::Result<&'static str> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok("\n"),
        Err(e) => return Err(e),
    };
    let mut first = Vec::new();
    BufReader::new(file).read_until(b'\n', &mut first)?;
    Ok(if first.ends_with(b"\r\n") { "\r\n" } else { "\n" })
}

/// Take line `line` (1-based) out of `lines`.
///
/// Returns the removed line and the remaining lines in their original order.
pub fn extract(
    mut lines: Vec<String>,
    line: usize,
) -> Result<(String, Vec<String>), LineOutOfRange> {
    let len = lines.len();
    if line < 1 || line > len {
        return Err(LineOutOfRange { line, len });
    }
    let removed = lines.remove(line - 1);
    Ok((removed, lines))
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
