use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::Result;

use super::broker::StreamBroker;
use super::handle::OpenHandle;
use super::mode::{OpenFlags, OpenMode, StreamContext};

/// What kind of resource a metadata query found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    File,
    Directory,
    Symlink,
}

/// The answer to a metadata query, for an open handle or a bare path.
#[derive(Debug, Clone, Copy)]
pub struct ResourceStat {
    pub len: u64,
    pub resource_type: ResourceType,
    pub readonly: bool,
    pub modified: Option<SystemTime>,
}

impl ResourceStat {
    pub fn is_file(&self) -> bool {
        matches!(self.resource_type, ResourceType::File)
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.resource_type, ResourceType::Directory)
    }
}

impl From<&fs::Metadata> for ResourceStat {
    fn from(meta: &fs::Metadata) -> Self {
        let resource_type = if meta.is_dir() {
            ResourceType::Directory
        } else if meta.file_type().is_symlink() {
            ResourceType::Symlink
        } else {
            ResourceType::File
        };
        ResourceStat {
            len: meta.len(),
            resource_type,
            readonly: meta.permissions().readonly(),
            modified: meta.modified().ok(),
        }
    }
}

/// The handler contract for one resource-access scheme.
///
/// Exactly one handler governs a scheme at any instant; the broker resolves
/// which one at dispatch time. Every call receives the broker so a handler
/// that needs the non-intercepted behavior mid-call can displace itself
/// with [`StreamBroker::bypass`] and re-enter through the broker's
/// `dispatch_*` methods.
pub trait StreamHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Open `path` under `mode`, honoring `ctx` when one is supplied.
    fn open(
        &self,
        streams: &StreamBroker,
        path: &Path,
        mode: OpenMode,
        flags: OpenFlags,
        ctx: Option<&StreamContext>,
    ) -> Result<OpenHandle>;

    /// Metadata for `path` without opening it. Quiet queries report
    /// failure as `Ok(None)` instead of raising.
    fn url_stat(
        &self,
        streams: &StreamBroker,
        path: &Path,
        quiet: bool,
    ) -> Result<Option<ResourceStat>>;
}
