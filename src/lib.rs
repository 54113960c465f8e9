//! srcpatch: load-time source rewriting behind a stream protocol
//!
//! This library puts an interceptor in front of a resource-access scheme.
//! Opens that load code get the registered transformer chain spliced into
//! their read path; every other access passes through to the platform
//! default untouched. The interceptor performs its own I/O by bypassing
//! itself and re-entering the broker, so it never recurses into itself.

/// Structured errors for the load path
pub mod error;

/// The interceptor that splices transformers into code loads
pub mod interceptor;

/// Scheme dispatch, handler contract and open handles
pub mod stream;

/// Named transformers and their registry
pub mod transform;

pub use error::{LoadError, Result};
pub use interceptor::LoadInterceptor;
pub use stream::StreamBroker;
pub use transform::{Transformer, TransformerRegistry};
