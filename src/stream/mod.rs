//! The governed resource-access protocol: the broker and its per-scheme
//! handler slots, the handler contract, open handles, and the platform
//! default for local files.

mod broker;
mod handle;
mod handler;
mod local;
mod mode;

pub use broker::{BypassGuard, StreamBroker, FILE_SCHEME};
pub use handle::{OpenHandle, ReadChannel};
pub use handler::{ResourceStat, ResourceType, StreamHandler};
pub use local::LocalHandler;
pub use mode::{OpenFlags, OpenMode, StreamContext, StreamOption};
