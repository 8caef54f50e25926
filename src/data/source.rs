use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::data::error::{DataError, Result};

/// Sentinel path meaning "read standard input".
pub const STDIN_PATH: &str = "-";

/// Raw bytes backing a table: either a read-only mapping of the input
/// file, or an owned buffer (stdin cannot be mapped; zero-byte files are
/// kept as an empty buffer rather than an empty mapping).
///
/// The source is immutable for its whole lifetime. Every `FieldSpan`
/// produced by parsing is an offset range into these bytes.
pub enum DataSource {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl DataSource {
    /// Open a file path, or stdin when `path` is `-`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path == Path::new(STDIN_PATH) {
            return Self::read_stdin();
        }

        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(DataSource::Buffered(Vec::new()));
        }

        // Read-only private mapping; the fd can be dropped once mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!("mapped {} ({} bytes)", path.display(), len);
        Ok(DataSource::Mapped(mmap))
    }

    fn read_stdin() -> Result<Self> {
        let mut buf = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buf)?;
        if buf.is_empty() {
            return Err(DataError::EmptyInput);
        }
        debug!("buffered {} bytes from stdin", buf.len());
        Ok(DataSource::Buffered(buf))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            DataSource::Mapped(m) => m.as_ref(),
            DataSource::Buffered(v) => v.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
