use std::time::Duration;

use crate::error::{LoadError, Result};

bitflags::bitflags! {
    /// Flags qualifying why a resource is being opened.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OpenFlags: u32 {
        /// The content is being loaded to run as code. This is the one
        /// signal that makes the interceptor attach its transformer chain.
        const CODE_LOAD = 1 << 0;
    }
}

/// A parsed fopen-style mode string.
///
/// The base letter picks the shape (`r`, `w`, `a`, `x`, `c`), a trailing
/// `+` adds the other direction, and `b`/`t` are accepted and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    read: bool,
    write: bool,
    append: bool,
    create: bool,
    create_new: bool,
    truncate: bool,
}

impl OpenMode {
    /// Plain `"r"`.
    pub const fn read_only() -> Self {
        OpenMode {
            read: true,
            write: false,
            append: false,
            create: false,
            create_new: false,
            truncate: false,
        }
    }

    /// Parse a mode string such as `"r"`, `"rb"` or `"w+"`.
    pub fn parse(mode: &str) -> Result<Self> {
        let invalid = || LoadError::InvalidMode {
            mode: mode.to_string(),
        };

        let mut chars = mode.chars();
        let mut parsed = match chars.next() {
            Some('r') => Self::read_only(),
            Some('w') => OpenMode {
                read: false,
                write: true,
                append: false,
                create: true,
                create_new: false,
                truncate: true,
            },
            Some('a') => OpenMode {
                read: false,
                write: true,
                append: true,
                create: true,
                create_new: false,
                truncate: false,
            },
            Some('x') => OpenMode {
                read: false,
                write: true,
                append: false,
                create: false,
                create_new: true,
                truncate: false,
            },
            Some('c') => OpenMode {
                read: false,
                write: true,
                append: false,
                create: true,
                create_new: false,
                truncate: false,
            },
            _ => return Err(invalid()),
        };
        for c in chars {
            match c {
                '+' => {
                    parsed.read = true;
                    parsed.write = true;
                }
                'b' | 't' => {}
                _ => return Err(invalid()),
            }
        }
        Ok(parsed)
    }

    pub const fn read(&self) -> bool {
        self.read
    }

    pub const fn write(&self) -> bool {
        self.write
    }

    pub const fn append(&self) -> bool {
        self.append
    }

    pub const fn create(&self) -> bool {
        self.create
    }

    pub const fn create_new(&self) -> bool {
        self.create_new
    }

    pub const fn truncate(&self) -> bool {
        self.truncate
    }
}

/// Per-handle options forwarded to the real primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOption {
    /// Blocking or non-blocking reads.
    Blocking(bool),
    /// Give up on a read after this long.
    ReadTimeout(Duration),
    /// Capacity of the raw read buffer, applied at open time.
    ReadBuffer(usize),
}

/// Ambient context a caller can hand to an open.
///
/// Mirrors the option bag of the underlying platform: a plain container of
/// [`StreamOption`]s the governing handler applies where the primitive
/// supports them.
#[derive(Debug, Clone, Default)]
pub struct StreamContext {
    options: Vec<StreamOption>,
}

impl StreamContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, option: StreamOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(&self) -> &[StreamOption] {
        &self.options
    }
}
