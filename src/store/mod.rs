//! # Store Module
//!
//! The [`Store`] trait is the only seam between this crate and the external document
//! database. Each method maps to exactly one request/response exchange with the
//! database and works on raw BSON [`Document`]s, leaving typing to the `repo` layer.
//!
//! Two backends are provided:
//!
//! * [`MongoStore`], backed by the official MongoDB driver;
//! * [`MemoryStore`], an in-process stand-in with the same matching semantics,
//!   used by tests and for local experiments.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::Document;

use crate::query::{Filter, Query, ReturnDocument, Update};

mod memory;
pub use memory::MemoryStore;

mod mongo;
pub use mongo::MongoStore;

/// Shared handle to the store, established once and cloned into every consumer.
pub type StoreRef = Arc<dyn Store>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("driver error :: {0}")]
    DriverError(#[from] mongodb::error::Error),
    #[error("duplicate key `{0}` in collection `{1}`")]
    DuplicateKey(String, String),
    #[error("query error :: {0}")]
    QueryError(#[from] crate::query::Error),
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a single document. A missing `_id` is assigned by the store.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), Error>;

    /// Inserts a batch of documents.
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), Error>;

    /// Returns every document matching the query filter, after applying the
    /// query options (sort, limit, excluded fields).
    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, Error>;

    /// Returns the first document matching `filter`, in natural order.
    async fn find_one(&self, collection: &str, filter: &Filter)
    -> Result<Option<Document>, Error>;

    /// Applies `update` to the first document matching `filter` and returns
    /// it as it was `Before` or `After` the update.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        returned: ReturnDocument,
    ) -> Result<Option<Document>, Error>;

    /// Replaces the first document matching `filter`, keeping its `_id`.
    /// Returns the number of matched documents (0 or 1).
    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> Result<u64, Error>;

    /// Removes the first document matching `filter` and returns it.
    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, Error>;

    /// Removes every document matching `filter`, returning how many were removed.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, Error>;
}
