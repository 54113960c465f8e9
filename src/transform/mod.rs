//! Named source transformers and the registry that orders them.

mod registry;
mod subst;

pub use registry::TransformerRegistry;
pub use subst::{Substitution, SubstitutionTransformer};

use crate::stream::ReadChannel;

/// A named, chainable rewrite of a read channel.
///
/// Transformers work incrementally: `attach` wraps the channel it is given
/// and returns the wrapped one, and the rewrite happens as bytes are pulled
/// through. A chain therefore applies in attachment order, with the last
/// attached transformer seeing the output of all the earlier ones.
pub trait Transformer: Send + Sync {
    /// Stable identity. Registering another transformer under the same
    /// name replaces this one.
    fn name(&self) -> &str;

    /// Wrap `channel` so reads pass through this transformer.
    fn attach(&self, channel: ReadChannel) -> ReadChannel;
}
