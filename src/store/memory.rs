//! MemoryStore - HashMap-backed document store for testing and development.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::trace;
use mongodb::bson::{Bson, Document, oid::ObjectId};

use super::{Error, Store};
use crate::query::{self, Filter, ID_FIELD, Matcher, Query, ReturnDocument, Update};

type Collections = HashMap<String, Vec<Document>>;

/// In-memory document store.
///
/// Collections keep documents in insertion order, which is the natural order used
/// by `find_one` and by unsorted `find`s. Every call takes the lock for its whole
/// duration, so each call is atomic. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Collections>, Error> {
        self.collections
            .read()
            .map_err(|_| Error::LockPoisoned(operation))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Collections>, Error> {
        self.collections
            .write()
            .map_err(|_| Error::LockPoisoned(operation))
    }

    /// Number of documents currently held by `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

/// Ensures the document carries an `_id`, assigning a fresh ObjectId if needed.
fn with_id(mut document: Document) -> (Bson, Document) {
    let id = match document.get(ID_FIELD) {
        Some(id) => id.clone(),
        None => {
            let id = Bson::ObjectId(ObjectId::new());
            document.insert(ID_FIELD, id.clone());
            id
        }
    };
    (id, document)
}

fn position(docs: &[Document], matcher: &Matcher<'_>) -> Option<usize> {
    docs.iter().position(|d| matcher.matches(d))
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), Error> {
        self.insert_many(collection, vec![document]).await
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), Error> {
        let mut collections = self.write("insert")?;
        let docs = collections.entry(collection.to_owned()).or_default();

        let mut seen: HashSet<String> = docs
            .iter()
            .filter_map(|d| d.get(ID_FIELD))
            .map(ToString::to_string)
            .collect();

        // Check the whole batch before writing so a rejected batch leaves no trace
        let mut batch = Vec::with_capacity(documents.len());
        for document in documents {
            let (id, document) = with_id(document);
            if !seen.insert(id.to_string()) {
                return Err(Error::DuplicateKey(id.to_string(), collection.to_owned()));
            }
            batch.push(document);
        }

        trace!("inserting {} documents into `{}`", batch.len(), collection);
        docs.extend(batch);
        Ok(())
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, Error> {
        let matcher = Matcher::new(query.filter());
        let collections = self.read("find")?;

        let found: Vec<Document> = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matcher.matches(d)).cloned().collect())
            .unwrap_or_default();

        Ok(query::apply_options(found, query.options()))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, Error> {
        let matcher = Matcher::new(filter);
        let collections = self.read("find_one")?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matcher.matches(d)).cloned()))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        returned: ReturnDocument,
    ) -> Result<Option<Document>, Error> {
        let matcher = Matcher::new(filter);
        if update.is_empty() {
            return Err(query::Error::EmptyUpdate.into());
        }

        let mut collections = self.write("find_one_and_update")?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(idx) = position(docs, &matcher) else {
            return Ok(None);
        };

        let before = docs[idx].clone();
        query::apply_update(&mut docs[idx], update)?;

        Ok(Some(match returned {
            ReturnDocument::Before => before,
            ReturnDocument::After => docs[idx].clone(),
        }))
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        mut replacement: Document,
    ) -> Result<u64, Error> {
        let matcher = Matcher::new(filter);

        let mut collections = self.write("replace_one")?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let Some(idx) = position(docs, &matcher) else {
            return Ok(0);
        };

        if let Some(id) = docs[idx].get(ID_FIELD) {
            replacement.insert(ID_FIELD, id.clone());
        }
        docs[idx] = replacement;

        Ok(1)
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, Error> {
        let matcher = Matcher::new(filter);

        let mut collections = self.write("find_one_and_delete")?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };

        Ok(position(docs, &matcher).map(|idx| docs.remove(idx)))
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, Error> {
        let matcher = Matcher::new(filter);

        let mut collections = self.write("delete_many")?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|d| !matcher.matches(d));

        Ok((before - docs.len()) as u64)
    }
}
