use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{LoadError, Result};
use crate::stream::{
    OpenFlags, OpenHandle, OpenMode, ResourceStat, StreamBroker, StreamContext, StreamHandler,
    FILE_SCHEME,
};
use crate::transform::TransformerRegistry;

/// Intercepts every access on one scheme and attaches the registered
/// transformer chain to the reads that load code.
///
/// The interceptor is itself a [`StreamHandler`]; installing it displaces
/// the scheme's platform default. For the real I/O it bypasses its own
/// installation and re-enters the broker, which then resolves to the
/// default handler. Re-entering without the bypass would dispatch straight
/// back here, so every real access runs inside a [`StreamBroker::bypass`]
/// window, and the guard reinstates the interceptor before the call
/// returns, on failures too.
///
/// Clones share the transformer registry, so the copy handed to the broker
/// by [`LoadInterceptor::intercept`] sees every later registration.
#[derive(Clone)]
pub struct LoadInterceptor {
    scheme: String,
    transformers: Arc<TransformerRegistry>,
}

impl LoadInterceptor {
    /// An interceptor for the `file` scheme.
    pub fn new(transformers: Arc<TransformerRegistry>) -> Self {
        Self::for_scheme(FILE_SCHEME, transformers)
    }

    /// An interceptor governing some other scheme.
    pub fn for_scheme(scheme: &str, transformers: Arc<TransformerRegistry>) -> Self {
        LoadInterceptor {
            scheme: scheme.to_string(),
            transformers,
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn transformers(&self) -> &TransformerRegistry {
        &self.transformers
    }

    /// Take over the scheme. Idempotent when already installed.
    pub fn intercept(&self, streams: &StreamBroker) -> Result<()> {
        streams.install(&self.scheme, Arc::new(self.clone()))
    }

    /// Hand the scheme back to its platform default. Idempotent when
    /// nothing is installed.
    pub fn restore(&self, streams: &StreamBroker) -> Result<()> {
        streams.restore(&self.scheme)
    }
}

impl StreamHandler for LoadInterceptor {
    fn name(&self) -> &str {
        "load-interceptor"
    }

    fn open(
        &self,
        streams: &StreamBroker,
        path: &Path,
        mode: OpenMode,
        flags: OpenFlags,
        ctx: Option<&StreamContext>,
    ) -> Result<OpenHandle> {
        // A read of something that does not exist fails here, before any
        // handler toggling, so the failure has no side effects to undo.
        // Modes that may create the resource always reach the primitive.
        if mode.read() && !mode.create() && !mode.create_new() && !path.exists() {
            debug!(path = %path.display(), "read-mode open of a missing resource");
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let bypass = streams.bypass(&self.scheme);
        let mut handle = streams.dispatch_open(&self.scheme, path, mode, flags, ctx)?;

        if flags.contains(OpenFlags::CODE_LOAD) {
            for transformer in self.transformers.all() {
                trace!(name = transformer.name(), "attaching transformer");
                handle.append_filter(transformer.name(), |channel| transformer.attach(channel));
            }
            debug!(
                path = %path.display(),
                chain = ?handle.filters(),
                "code load runs through transformer chain"
            );
        }

        drop(bypass);
        Ok(handle)
    }

    fn url_stat(
        &self,
        streams: &StreamBroker,
        path: &Path,
        quiet: bool,
    ) -> Result<Option<ResourceStat>> {
        let bypass = streams.bypass(&self.scheme);
        let result = streams.dispatch_url_stat(&self.scheme, path, quiet);
        drop(bypass);

        match result {
            Ok(stat) => Ok(stat),
            Err(err) if quiet => {
                debug!(path = %path.display(), error = %err, "quiet stat reports no metadata");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
