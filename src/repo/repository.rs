use crate::store::{Store, StoreRef};

use super::{Model, ModelRepository};

/// Shared entry point to the document store.
///
/// Cheap to clone: every clone refers to the same underlying store handle.
#[derive(Clone)]
pub struct Repository {
    store: StoreRef,
}

impl Repository {
    pub fn new(store: StoreRef) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Get a typed accessor for the collection of `M`.
    pub fn model<M: Model>(&self) -> ModelRepository<'_, M> {
        ModelRepository::new(self)
    }
}
