use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::Transformer;

/// Insertion-ordered collection of transformers.
///
/// Registration order is attachment order on code loads. Registering under
/// a name that already exists replaces that entry where it stands, so a
/// transformer keeps its position in the chain across replacement.
#[derive(Default)]
pub struct TransformerRegistry {
    entries: RwLock<Vec<Arc<dyn Transformer>>>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transformer, or replace the one already registered under the
    /// same name.
    pub fn register(&self, transformer: Arc<dyn Transformer>) {
        let mut entries = self.entries.write();
        match entries.iter().position(|t| t.name() == transformer.name()) {
            Some(i) => {
                debug!(name = transformer.name(), "replacing registered transformer");
                entries[i] = transformer;
            }
            None => {
                debug!(name = transformer.name(), "registering transformer");
                entries.push(transformer);
            }
        }
    }

    /// Snapshot of the transformers in registration order.
    pub fn all(&self) -> Vec<Arc<dyn Transformer>> {
        self.entries.read().clone()
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
