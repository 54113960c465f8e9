use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::error::{LoadError, Result};

use super::handle::OpenHandle;
use super::handler::{ResourceStat, StreamHandler};
use super::local::LocalHandler;
use super::mode::{OpenFlags, OpenMode, StreamContext};

/// The scheme that governs bare paths with no `scheme://` prefix.
pub const FILE_SCHEME: &str = "file";

struct ProtocolSlot {
    default: Arc<dyn StreamHandler>,
    installed: Option<Arc<dyn StreamHandler>>,
}

impl ProtocolSlot {
    fn governing(&self) -> Arc<dyn StreamHandler> {
        match &self.installed {
            Some(handler) => Arc::clone(handler),
            None => Arc::clone(&self.default),
        }
    }
}

/// Owns the handler slot for each registered scheme and routes every
/// access to whichever handler currently governs it.
///
/// Each slot holds the platform default plus at most one installed
/// handler; the installed one governs while present. The public entry
/// points serialize through an access gate held for the whole call, so the
/// window in which a handler has bypassed itself is never visible to
/// another caller. Handlers re-entering the broker mid-call use the
/// gate-free `dispatch_*` methods instead.
pub struct StreamBroker {
    slots: RwLock<HashMap<String, ProtocolSlot>>,
    gate: Mutex<()>,
}

impl StreamBroker {
    /// A broker with [`LocalHandler`] as the platform default for the
    /// `file` scheme.
    pub fn new() -> Self {
        Self::with_default(FILE_SCHEME, Arc::new(LocalHandler::new()))
    }

    /// A broker governing a single scheme with the given platform default.
    pub fn with_default(scheme: &str, default: Arc<dyn StreamHandler>) -> Self {
        let broker = StreamBroker {
            slots: RwLock::new(HashMap::new()),
            gate: Mutex::new(()),
        };
        broker.add_protocol(scheme, default);
        broker
    }

    /// Register one more scheme with its platform default handler.
    pub fn add_protocol(&self, scheme: &str, default: Arc<dyn StreamHandler>) {
        let mut slots = self.slots.write();
        slots.insert(
            scheme.to_string(),
            ProtocolSlot {
                default,
                installed: None,
            },
        );
    }

    /// Put `handler` in charge of `scheme`, displacing the platform
    /// default until [`StreamBroker::restore`]. Installing over an already
    /// installed handler replaces it.
    pub fn install(&self, scheme: &str, handler: Arc<dyn StreamHandler>) -> Result<()> {
        let mut slots = self.slots.write();
        let slot = slots
            .get_mut(scheme)
            .ok_or_else(|| LoadError::UnknownScheme {
                scheme: scheme.to_string(),
            })?;
        debug!(scheme, handler = handler.name(), "installing stream handler");
        slot.installed = Some(handler);
        Ok(())
    }

    /// Put the platform default back in charge of `scheme`. Idempotent
    /// when the default already governs.
    pub fn restore(&self, scheme: &str) -> Result<()> {
        let mut slots = self.slots.write();
        let slot = slots
            .get_mut(scheme)
            .ok_or_else(|| LoadError::UnknownScheme {
                scheme: scheme.to_string(),
            })?;
        if slot.installed.take().is_some() {
            debug!(scheme, "restored platform default handler");
        }
        Ok(())
    }

    /// Whether an installed handler, rather than the platform default,
    /// currently governs `scheme`.
    pub fn is_intercepted(&self, scheme: &str) -> bool {
        self.slots
            .read()
            .get(scheme)
            .is_some_and(|slot| slot.installed.is_some())
    }

    /// Displace the installed handler for as long as the guard lives.
    /// While it does, dispatch on `scheme` reaches the platform default;
    /// dropping the guard reinstates the displaced handler on every exit
    /// path, early returns and unwinds included.
    pub fn bypass(&self, scheme: &str) -> BypassGuard<'_> {
        let displaced = {
            let mut slots = self.slots.write();
            slots.get_mut(scheme).and_then(|slot| slot.installed.take())
        };
        trace!(scheme, bypassed = displaced.is_some(), "bypass window opened");
        BypassGuard {
            broker: self,
            scheme: scheme.to_string(),
            displaced,
        }
    }

    /// Open a resource through whichever handler governs its scheme.
    ///
    /// This is the entry point for ordinary callers and holds the access
    /// gate across the whole call.
    pub fn open(
        &self,
        url: &str,
        mode: OpenMode,
        flags: OpenFlags,
        ctx: Option<&StreamContext>,
    ) -> Result<OpenHandle> {
        let _gate = self.gate.lock();
        let (scheme, path) = split_scheme(url);
        self.dispatch_open(scheme, path, mode, flags, ctx)
    }

    /// Metadata through whichever handler governs the scheme, holding the
    /// access gate.
    pub fn url_stat(&self, url: &str, quiet: bool) -> Result<Option<ResourceStat>> {
        let _gate = self.gate.lock();
        let (scheme, path) = split_scheme(url);
        self.dispatch_url_stat(scheme, path, quiet)
    }

    /// Gate-free open dispatch for a handler re-entering the broker.
    ///
    /// The governing handler is resolved at call time: a handler that
    /// bypassed itself reaches the platform default here, while one that
    /// forgot would call straight back into itself.
    pub fn dispatch_open(
        &self,
        scheme: &str,
        path: &Path,
        mode: OpenMode,
        flags: OpenFlags,
        ctx: Option<&StreamContext>,
    ) -> Result<OpenHandle> {
        let handler = self.governing(scheme)?;
        trace!(scheme, handler = handler.name(), path = %path.display(), "dispatching open");
        handler.open(self, path, mode, flags, ctx)
    }

    /// Gate-free metadata dispatch; see [`StreamBroker::dispatch_open`].
    pub fn dispatch_url_stat(
        &self,
        scheme: &str,
        path: &Path,
        quiet: bool,
    ) -> Result<Option<ResourceStat>> {
        let handler = self.governing(scheme)?;
        trace!(scheme, handler = handler.name(), path = %path.display(), quiet, "dispatching url_stat");
        handler.url_stat(self, path, quiet)
    }

    // Clones the governing handler out so no slot lock is held across the
    // handler call. Handlers mutate the slot when they bypass themselves.
    fn governing(&self, scheme: &str) -> Result<Arc<dyn StreamHandler>> {
        let slots = self.slots.read();
        let slot = slots.get(scheme).ok_or_else(|| LoadError::UnknownScheme {
            scheme: scheme.to_string(),
        })?;
        Ok(slot.governing())
    }
}

impl Default for StreamBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped displacement of an installed handler, handed out by
/// [`StreamBroker::bypass`]. Exists so the reinstall cannot be forgotten:
/// it happens in `Drop`, whatever path control leaves the scope by.
pub struct BypassGuard<'a> {
    broker: &'a StreamBroker,
    scheme: String,
    displaced: Option<Arc<dyn StreamHandler>>,
}

impl Drop for BypassGuard<'_> {
    fn drop(&mut self) {
        if let Some(handler) = self.displaced.take() {
            let mut slots = self.broker.slots.write();
            if let Some(slot) = slots.get_mut(&self.scheme) {
                slot.installed = Some(handler);
            }
            trace!(scheme = %self.scheme, "bypass window closed, handler reinstated");
        }
    }
}

/// Split a URL into its scheme and path. Anything without a `scheme://`
/// prefix, including Windows drive letters, belongs to the `file` scheme.
fn split_scheme(url: &str) -> (&str, &Path) {
    if let Some((scheme, rest)) = url.split_once("://") {
        let plausible = scheme.len() >= 2
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if plausible {
            return (scheme, Path::new(rest));
        }
    }
    (FILE_SCHEME, Path::new(url))
}
