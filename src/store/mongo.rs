//! MongoDB backend for the [`Store`] trait.
//!
//! Filters, options and updates are compiled into query documents with
//! [`DocumentCompiler`] and sent through the official driver. Connection pooling,
//! server selection and retries are left entirely to the driver.

use async_trait::async_trait;
use futures::TryStreamExt;
use log::{debug, info, trace};
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc},
    options,
};

use super::{Error, Store};
use crate::query::{
    DocumentCompiler, Filter, Query, ReturnDocument, Update, projection_document, sort_document,
    update_document,
};

pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connects to the deployment at `uri` and selects `database`.
    ///
    /// A `ping` is issued so that an unreachable deployment is reported here,
    /// once, instead of on the first operation.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, Error> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database);

        database.run_command(doc! { "ping": 1 }).await?;
        info!("connected to database `{}`", database.name());

        Ok(Self::from_database(database))
    }

    /// Wraps an already configured driver database handle.
    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }

    /// Drops the whole database. Meant for disposable test databases.
    pub async fn drop_database(&self) -> Result<(), Error> {
        debug!("dropping database `{}`", self.database.name());
        self.database.drop().await?;
        Ok(())
    }
}

fn compile(filter: &Filter) -> Document {
    let compiled = DocumentCompiler::new().filter(filter).compile();
    trace!("compiled filter: {}", compiled);
    compiled
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), Error> {
        self.collection(collection).insert_one(document).await?;
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<(), Error> {
        self.collection(collection).insert_many(documents).await?;
        Ok(())
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>, Error> {
        let filter = compile(query.filter());
        let opts = query.options();

        let coll = self.collection(collection);
        let mut find = coll.find(filter);
        if !opts.sort.is_empty() {
            find = find.sort(sort_document(&opts.sort));
        }
        if let Some(limit) = opts.limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        if !opts.exclude.is_empty() {
            find = find.projection(projection_document(&opts.exclude));
        }

        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, Error> {
        let filter = compile(filter);
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
        returned: ReturnDocument,
    ) -> Result<Option<Document>, Error> {
        let filter = compile(filter);
        let update = update_document(update)?;
        let returned = match returned {
            ReturnDocument::Before => options::ReturnDocument::Before,
            ReturnDocument::After => options::ReturnDocument::After,
        };

        Ok(self
            .collection(collection)
            .find_one_and_update(filter, update)
            .return_document(returned)
            .await?)
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Filter,
        replacement: Document,
    ) -> Result<u64, Error> {
        let filter = compile(filter);
        let result = self
            .collection(collection)
            .replace_one(filter, replacement)
            .await?;
        Ok(result.matched_count)
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, Error> {
        let filter = compile(filter);
        Ok(self
            .collection(collection)
            .find_one_and_delete(filter)
            .await?)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, Error> {
        let filter = compile(filter);
        let result = self.collection(collection).delete_many(filter).await?;
        Ok(result.deleted_count)
    }
}
