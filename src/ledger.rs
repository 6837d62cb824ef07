use crate::uniq_id::UniqID;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A live visual element: progress bars, local or delegated to a remote
/// renderer.
pub trait ActiveElement: Send + Sync {
    /// Redraw only. Idempotent.
    fn render(&self);
    /// Release the element. Idempotent.
    fn end(&self);
}

/// Every active element of one reporter, keyed by a stable handle.
///
/// Callers take a snapshot (or drain) before invoking `render`/`end`, so an
/// element can unregister itself from inside `end` without re-entering the
/// ledger lock.
#[derive(Default)]
pub struct Ledger {
    elements: BTreeMap<UniqID, Arc<dyn ActiveElement>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: UniqID, element: Arc<dyn ActiveElement>) {
        self.elements.insert(id, element);
    }

    /// Returns false when the element was already gone.
    pub fn unregister(&mut self, id: UniqID) -> bool {
        self.elements.remove(&id).is_some()
    }

    pub fn contains(&self, id: UniqID) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn snapshot(&self) -> Vec<Arc<dyn ActiveElement>> {
        self.elements.values().cloned().collect()
    }

    pub fn drain(&mut self) -> Vec<Arc<dyn ActiveElement>> {
        std::mem::take(&mut self.elements).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
