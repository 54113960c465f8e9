use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use tracing::trace;

use crate::error::{LoadError, Result};

use super::broker::StreamBroker;
use super::handle::OpenHandle;
use super::handler::{ResourceStat, StreamHandler};
use super::mode::{OpenFlags, OpenMode, StreamContext, StreamOption};

/// The platform default for the `file` scheme: real files via `std::fs`.
///
/// Ignores [`OpenFlags`] entirely; flags only mean something to handlers
/// that sit in front of this one.
#[derive(Debug, Default)]
pub struct LocalHandler;

impl LocalHandler {
    pub fn new() -> Self {
        LocalHandler
    }
}

impl StreamHandler for LocalHandler {
    fn name(&self) -> &str {
        "local"
    }

    fn open(
        &self,
        _streams: &StreamBroker,
        path: &Path,
        mode: OpenMode,
        _flags: OpenFlags,
        ctx: Option<&StreamContext>,
    ) -> Result<OpenHandle> {
        let file = OpenOptions::new()
            .read(mode.read())
            .write(mode.write())
            .append(mode.append())
            .create(mode.create())
            .create_new(mode.create_new())
            .truncate(mode.truncate())
            .open(path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => LoadError::NotFound {
                    path: path.to_path_buf(),
                },
                _ => LoadError::Open {
                    path: path.to_path_buf(),
                    source,
                },
            })?;

        // The raw buffer has to be sized at open time; every other option
        // is forwarded to the handle after it exists.
        let buffer = ctx.and_then(|ctx| {
            ctx.options().iter().rev().find_map(|option| match option {
                StreamOption::ReadBuffer(capacity) => Some(*capacity),
                _ => None,
            })
        });

        let mut handle = OpenHandle::new(path, file, buffer);
        if let Some(ctx) = ctx {
            for option in ctx.options() {
                if matches!(option, StreamOption::ReadBuffer(_)) {
                    continue;
                }
                if !handle.set_option(*option) {
                    trace!(?option, path = %path.display(), "option not honored by local file");
                }
            }
        }
        Ok(handle)
    }

    fn url_stat(
        &self,
        _streams: &StreamBroker,
        path: &Path,
        quiet: bool,
    ) -> Result<Option<ResourceStat>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(ResourceStat::from(&meta))),
            Err(_) if quiet => Ok(None),
            Err(source) => Err(LoadError::Metadata {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
