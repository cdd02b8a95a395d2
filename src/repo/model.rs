use std::marker::PhantomData;

use log::trace;
use mongodb::bson::{self, Document, oid::ObjectId};
use serde::{Serialize, de::DeserializeOwned};

use super::{Error, Repository};
use crate::query::{Filter, Op, Query, ReturnDocument, Update, Value};
use crate::types::Person;

/// Document field holding the version key.
pub const VERSION_KEY: &str = "__v";

/// Trait for records stored as documents in a collection.
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    /// The collection holding records of this type.
    const COLLECTION: &'static str;

    /// The identifier stored under `_id`.
    fn object_id(&self) -> ObjectId;

    /// The value of the version key.
    fn version(&self) -> i32;

    fn set_version(&mut self, version: i32);
}

impl Model for Person {
    const COLLECTION: &'static str = "people";

    fn object_id(&self) -> ObjectId {
        self.id.as_object_id()
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn set_version(&mut self, version: i32) {
        self.version = version;
    }
}

fn decode<M: Model>(docs: Vec<Document>) -> Result<Vec<M>, Error> {
    docs.into_iter()
        .map(|doc| bson::from_document(doc).map_err(Error::from))
        .collect()
}

fn decode_one<M: Model>(doc: Option<Document>) -> Result<Option<M>, Error> {
    doc.map(bson::from_document)
        .transpose()
        .map_err(Error::from)
}

/// Matches the stored version key against `version`. A missing key counts as 0.
fn version_guard(version: i32) -> Op<Value> {
    if version == 0 {
        Op::In(vec![Value::Integer(0), Value::Null])
    } else {
        Op::Eq(version.into())
    }
}

/// Typed accessor for the collection of a [`Model`].
///
/// Every method performs a single store call.
pub struct ModelRepository<'a, M> {
    repo: &'a Repository,
    _marker: PhantomData<M>,
}

impl<'a, M: Model> ModelRepository<'a, M> {
    pub fn new(repo: &'a Repository) -> Self {
        Self {
            repo,
            _marker: PhantomData,
        }
    }

    /// Insert a new record.
    pub async fn create(&self, model: &M) -> Result<(), Error> {
        let doc = bson::to_document(model)?;
        self.repo.store().insert_one(M::COLLECTION, doc).await?;
        Ok(())
    }

    /// Insert a batch of records with a single store call.
    pub async fn create_many(&self, models: &[M]) -> Result<(), Error> {
        let docs = models
            .iter()
            .map(bson::to_document)
            .collect::<Result<Vec<_>, _>>()?;

        trace!("inserting {} records into `{}`", docs.len(), M::COLLECTION);
        self.repo.store().insert_many(M::COLLECTION, docs).await?;
        Ok(())
    }

    pub async fn find(&self, query: &Query) -> Result<Vec<M>, Error> {
        let docs = self.repo.store().find(M::COLLECTION, query).await?;
        decode(docs)
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<M>, Error> {
        let doc = self.repo.store().find_one(M::COLLECTION, filter).await?;
        decode_one(doc)
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<M>, Error> {
        self.find_one(&Filter::by_id(id)).await
    }

    pub async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        returned: ReturnDocument,
    ) -> Result<Option<M>, Error> {
        let doc = self
            .repo
            .store()
            .find_one_and_update(M::COLLECTION, filter, update, returned)
            .await?;
        decode_one(doc)
    }

    /// Persist a record previously read from the store.
    ///
    /// The write only applies if the stored version key still equals the one of
    /// `model`; on success the version key of `model` is incremented, otherwise
    /// `model` is left untouched and [`Error::StaleDocument`] is returned.
    /// Documents stored without a version key are at version 0.
    pub async fn save(&self, model: &mut M) -> Result<(), Error> {
        let version = model.version();
        let filter = Filter::by_id(model.object_id()).with(VERSION_KEY, version_guard(version));

        model.set_version(version + 1);
        let matched = match self.replace(&filter, model).await {
            Ok(matched) => matched,
            Err(err) => {
                model.set_version(version);
                return Err(err);
            }
        };

        if matched == 0 {
            model.set_version(version);
            return Err(Error::StaleDocument {
                collection: M::COLLECTION.to_owned(),
                id: model.object_id().to_hex(),
                version,
            });
        }

        Ok(())
    }

    async fn replace(&self, filter: &Filter, model: &M) -> Result<u64, Error> {
        let doc = bson::to_document(model)?;
        Ok(self
            .repo
            .store()
            .replace_one(M::COLLECTION, filter, doc)
            .await?)
    }

    pub async fn find_by_id_and_delete(&self, id: ObjectId) -> Result<Option<M>, Error> {
        let doc = self
            .repo
            .store()
            .find_one_and_delete(M::COLLECTION, &Filter::by_id(id))
            .await?;
        decode_one(doc)
    }

    /// Removes every record matching `filter`, returning how many were removed.
    pub async fn delete_many(&self, filter: &Filter) -> Result<u64, Error> {
        Ok(self
            .repo
            .store()
            .delete_many(M::COLLECTION, filter)
            .await?)
    }
}
