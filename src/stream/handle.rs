use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{LoadError, Result};

use super::handler::ResourceStat;
use super::mode::StreamOption;

/// The pipe a handle's bytes flow through on their way to the caller.
///
/// Filters wrap the current channel, so the outermost reader sees the
/// output of every filter beneath it.
pub type ReadChannel = Box<dyn Read + Send>;

/// One opened resource.
///
/// Owns the real primitive and the read channel layered over it. The
/// channel starts out as the raw bytes; [`OpenHandle::append_filter`] wraps
/// it, one filter at a time. Metadata queries and options go straight to
/// the primitive and never through the channel.
pub struct OpenHandle {
    path: PathBuf,
    file: Arc<File>,
    channel: ReadChannel,
    filters: Vec<String>,
    exhausted: bool,
}

struct RawChannel {
    file: Arc<File>,
}

impl Read for RawChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (&*self.file).read(buf)
    }
}

impl OpenHandle {
    pub(crate) fn new(path: &Path, file: File, buffer: Option<usize>) -> Self {
        let file = Arc::new(file);
        let raw = RawChannel {
            file: Arc::clone(&file),
        };
        let channel: ReadChannel = match buffer {
            Some(capacity) => Box::new(BufReader::with_capacity(capacity, raw)),
            None => Box::new(raw),
        };
        OpenHandle {
            path: path.to_path_buf(),
            file,
            channel,
            filters: Vec::new(),
            exhausted: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Layer a named filter over the current channel. Later reads pass
    /// through it after every filter attached before it.
    pub fn append_filter<F>(&mut self, name: &str, wrap: F)
    where
        F: FnOnce(ReadChannel) -> ReadChannel,
    {
        let inner = mem::replace(&mut self.channel, Box::new(io::empty()));
        self.channel = wrap(inner);
        self.filters.push(name.to_string());
    }

    /// Names of the attached filters, innermost first.
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// True once a read has observed the end of the data. Stays false
    /// before the first read, even for an empty resource.
    pub fn eof(&self) -> bool {
        self.exhausted
    }

    /// Metadata for the already-open primitive. Bypasses the channel and
    /// any filters on it, so the numbers describe the resource on disk,
    /// not the transformed output.
    pub fn stat(&self) -> Result<ResourceStat> {
        self.file
            .metadata()
            .map(|meta| ResourceStat::from(&meta))
            .map_err(|source| LoadError::Metadata {
                path: self.path.clone(),
                source,
            })
    }

    /// Forward an option to the real primitive. Returns whether the
    /// primitive honored it. Local files already read blocking, so only
    /// `Blocking(true)` reports success; timeouts and buffer changes after
    /// open are not supported there.
    pub fn set_option(&mut self, option: StreamOption) -> bool {
        match option {
            StreamOption::Blocking(blocking) => blocking,
            StreamOption::ReadTimeout(_) => false,
            StreamOption::ReadBuffer(_) => false,
        }
    }
}

/// Reads drain the channel: raw bytes for an ordinary open, the filtered
/// output when a chain is attached. A short or zero read follows the usual
/// `Read` contract; a zero read on a non-empty buffer marks the handle
/// exhausted.
impl Read for OpenHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.channel.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.exhausted = true;
        }
        Ok(n)
    }
}

impl fmt::Debug for OpenHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenHandle")
            .field("path", &self.path)
            .field("filters", &self.filters)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
