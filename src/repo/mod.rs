//! Typed access to the document store.
//!
//! [`Repository`] owns the shared store handle and hands out typed
//! [`ModelRepository`] accessors, which encode and decode records and keep the
//! version key consistent. Application-level operations live in [`facades`].

mod model;
pub use model::*;

mod repository;
pub use repository::*;

pub mod facades;
pub use facades::*;

use crate::{store, types};
use mongodb::bson;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store error :: {0}")]
    StoreError(#[from] store::Error),
    #[error("document encoding error :: {0}")]
    EncodeError(#[from] bson::ser::Error),
    #[error("document decoding error :: {0}")]
    DecodeError(#[from] bson::de::Error),
    #[error("validation error :: {0}")]
    ValidationError(#[from] types::ValidationError),
    #[error("unable to find {collection}:{id}")]
    NotFound { collection: String, id: String },
    #[error("stale document {collection}:{id}, version {version} is no longer current")]
    StaleDocument {
        collection: String,
        id: String,
        version: i32,
    },
}
