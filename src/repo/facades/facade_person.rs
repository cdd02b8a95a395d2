use log::{info, trace, warn};

use super::{FacadeError, failed};
use crate::{
    params,
    query::{Filter, Order, Query, ReturnDocument, Update},
    repo::{self, Model},
    types::{DeleteSummary, NewPerson, Person, PersonId},
};

/// Facade exposing the person operations.
///
/// Each operation performs exactly one round trip to the store (edit-then-save
/// performs two: a lookup and a persist) and never retries or caches.
#[derive(Clone)]
pub struct FacadePerson {
    repo: repo::Repository,
}

impl FacadePerson {
    pub fn new(repo: repo::Repository) -> Self {
        Self { repo }
    }

    /// Direct typed access to the people collection.
    pub fn model(&self) -> repo::ModelRepository<'_, Person> {
        self.repo.model()
    }

    pub async fn create_one(&self, person: NewPerson) -> Result<Person, FacadeError> {
        info!("creating person `{}`", person.name);

        let person = person.into_person().map_err(failed("create_one"))?;
        self.model()
            .create(&person)
            .await
            .map_err(failed("create_one"))?;

        trace!("created person {}", person.id);
        Ok(person)
    }

    /// Inserts all the field-sets or none of them.
    pub async fn create_many(&self, people: Vec<NewPerson>) -> Result<Vec<Person>, FacadeError> {
        info!("creating {} people", people.len());

        if people.is_empty() {
            return Ok(Vec::new());
        }

        let people = people
            .into_iter()
            .map(NewPerson::into_person)
            .collect::<Result<Vec<_>, _>>()
            .map_err(failed("create_many"))?;

        self.model()
            .create_many(&people)
            .await
            .map_err(failed("create_many"))?;

        Ok(people)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Person>, FacadeError> {
        trace!("searching people named `{}`", name);

        let query = Query::new(Filter::new().eq(Person::NAME, name));
        self.model()
            .find(&query)
            .await
            .map_err(failed("find_by_name"))
    }

    pub async fn find_one_by_food(&self, food: &str) -> Result<Option<Person>, FacadeError> {
        trace!("searching a person liking `{}`", food);

        let filter = Filter::new().eq(Person::FAVORITE_FOODS, food);
        self.model()
            .find_one(&filter)
            .await
            .map_err(failed("find_one_by_food"))
    }

    pub async fn find_by_id(&self, id: &PersonId) -> Result<Option<Person>, FacadeError> {
        trace!("searching person {}", id);

        self.model()
            .find_by_id(id.as_object_id())
            .await
            .map_err(failed("find_by_id"))
    }

    /// Appends [`params::FOOD_TO_ADD`] to the favorite foods of a person and
    /// persists the result. Fails if the person does not exist or was modified
    /// between the lookup and the persist.
    pub async fn edit_then_save(&self, id: &PersonId) -> Result<Person, FacadeError> {
        info!("adding `{}` to person {}", params::FOOD_TO_ADD, id);

        let people = self.model();

        let mut person = people
            .find_by_id(id.as_object_id())
            .await
            .map_err(failed("edit_then_save"))?
            .ok_or_else(|| not_found(id))
            .map_err(failed("edit_then_save"))?;

        person.favorite_foods.push(params::FOOD_TO_ADD.to_owned());
        person.validate().map_err(failed("edit_then_save"))?;

        people
            .save(&mut person)
            .await
            .map_err(failed("edit_then_save"))?;

        trace!("person {} now at version {}", person.id, person.version());
        Ok(person)
    }

    /// Sets the age of the first person named `name` to [`params::AGE_TO_SET`],
    /// returning the updated record.
    pub async fn find_and_update(&self, name: &str) -> Result<Option<Person>, FacadeError> {
        info!("setting age of `{}` to {}", name, params::AGE_TO_SET);

        let filter = Filter::new().eq(Person::NAME, name);
        let update = Update::new().set(Person::AGE, params::AGE_TO_SET);

        self.model()
            .find_one_and_update(&filter, &update, ReturnDocument::After)
            .await
            .map_err(failed("find_and_update"))
    }

    /// Removes a person, returning the removed record. Removing a person that
    /// does not exist is a failure.
    pub async fn remove_by_id(&self, id: &PersonId) -> Result<Person, FacadeError> {
        warn!("requested removal of person {}", id);

        let person = self
            .model()
            .find_by_id_and_delete(id.as_object_id())
            .await
            .map_err(failed("remove_by_id"))?
            .ok_or_else(|| not_found(id))
            .map_err(failed("remove_by_id"))?;

        warn!("person {} removed", person.id);
        Ok(person)
    }

    /// Removes every person named [`params::NAME_TO_REMOVE`].
    pub async fn remove_many(&self) -> Result<DeleteSummary, FacadeError> {
        warn!("requested removal of people named `{}`", params::NAME_TO_REMOVE);

        let filter = Filter::new().eq(Person::NAME, params::NAME_TO_REMOVE);
        let deleted = self
            .model()
            .delete_many(&filter)
            .await
            .map_err(failed("remove_many"))?;

        warn!("{} people removed", deleted);
        Ok(deleted.into())
    }

    /// People liking `food`, sorted by name, at most [`params::QUERY_CHAIN_LIMIT`]
    /// of them, without their age.
    pub async fn chained_query(&self, food: &str) -> Result<Vec<Person>, FacadeError> {
        trace!("chained query on `{}`", food);

        let query = Query::new(Filter::new().eq(Person::FAVORITE_FOODS, food))
            .sort(Person::NAME, Order::Asc)
            .limit(params::QUERY_CHAIN_LIMIT)
            .exclude(Person::AGE);

        self.model()
            .find(&query)
            .await
            .map_err(failed("chained_query"))
    }
}

fn not_found(id: &PersonId) -> repo::Error {
    repo::Error::NotFound {
        collection: Person::COLLECTION.to_owned(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::store::{MemoryStore, Store};

    fn facade() -> FacadePerson {
        let store = Arc::new(MemoryStore::new());
        FacadePerson::new(repo::Repository::new(store))
    }

    fn seed() -> Vec<NewPerson> {
        vec![
            NewPerson::new("Mary")
                .with_age(17)
                .with_favorite_foods(["burrito", "pizza"]),
            NewPerson::new("Zoe")
                .with_age(33)
                .with_favorite_foods(["burrito"]),
            NewPerson::new("Ann")
                .with_age(29)
                .with_favorite_foods(["sushi", "burrito"]),
            NewPerson::new("Mary").with_favorite_foods(["salad"]),
        ]
    }

    #[tokio::test]
    async fn create_one_then_find_by_id() {
        let facade = facade();

        let created = facade.create_one(NewPerson::sample()).await.unwrap();
        let found = facade.find_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(found.name, "name");
        assert_eq!(found.age, Some(45.0));
        assert_eq!(found.favorite_foods, vec![String::new()]);
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn create_one_requires_a_name() {
        let facade = facade();

        let result = facade.create_one(NewPerson::new("")).await;

        assert_eq!(result, Err(FacadeError));
        assert!(facade.find_by_name("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_many_assigns_distinct_ids() {
        let facade = facade();

        let people = facade.create_many(seed()).await.unwrap();

        assert_eq!(people.len(), 4);
        let ids: HashSet<PersonId> = people.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 4);

        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mary", "Zoe", "Ann", "Mary"]);
    }

    #[tokio::test]
    async fn create_many_is_all_or_nothing() {
        let store = Arc::new(MemoryStore::new());
        let facade = FacadePerson::new(repo::Repository::new(store.clone()));

        let mut people = seed();
        people.push(NewPerson::new(" "));

        assert_eq!(facade.create_many(people).await, Err(FacadeError));
        assert!(store.is_empty(Person::COLLECTION));
    }

    #[tokio::test]
    async fn create_many_of_nothing() {
        assert_eq!(facade().create_many(Vec::new()).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn find_by_name() {
        let facade = facade();
        facade.create_many(seed()).await.unwrap();

        let marys = facade.find_by_name("Mary").await.unwrap();
        assert_eq!(marys.len(), 2);
        assert!(marys.iter().all(|p| p.name == "Mary"));

        let nobody = facade.find_by_name("Nobody").await;
        assert_eq!(nobody, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn find_one_by_food() {
        let facade = facade();
        facade.create_many(seed()).await.unwrap();

        let person = facade.find_one_by_food("sushi").await.unwrap().unwrap();
        assert_eq!(person.name, "Ann");

        assert_eq!(facade.find_one_by_food("tofu").await, Ok(None));
    }

    #[tokio::test]
    async fn find_by_id_of_a_missing_person() {
        let facade = facade();
        assert_eq!(facade.find_by_id(&PersonId::new()).await, Ok(None));
    }

    #[tokio::test]
    async fn edit_then_save_appends_one_food() {
        let facade = facade();
        let people = facade.create_many(seed()).await.unwrap();
        let mary = &people[0];

        let edited = facade.edit_then_save(&mary.id).await.unwrap();

        assert_eq!(edited.favorite_foods, vec!["burrito", "pizza", "hamburger"]);
        assert_eq!(edited.version(), 1);

        let stored = facade.find_by_id(&mary.id).await.unwrap().unwrap();
        assert_eq!(stored, edited);

        let edited = facade.edit_then_save(&mary.id).await.unwrap();
        assert_eq!(
            edited.favorite_foods,
            vec!["burrito", "pizza", "hamburger", "hamburger"]
        );
        assert_eq!(edited.version(), 2);
    }

    #[tokio::test]
    async fn edit_then_save_of_a_document_without_version() {
        let store = Arc::new(MemoryStore::new());
        let facade = FacadePerson::new(repo::Repository::new(store.clone()));

        let id = mongodb::bson::oid::ObjectId::new();
        store
            .insert_one(
                Person::COLLECTION,
                mongodb::bson::doc! { "_id": id, "name": "Ann", "favoriteFoods": ["sushi"] },
            )
            .await
            .unwrap();

        let edited = facade.edit_then_save(&PersonId::from(id)).await.unwrap();
        assert_eq!(edited.favorite_foods, vec!["sushi", "hamburger"]);
        assert_eq!(edited.version(), 1);

        let edited = facade.edit_then_save(&PersonId::from(id)).await.unwrap();
        assert_eq!(edited.favorite_foods, vec!["sushi", "hamburger", "hamburger"]);
        assert_eq!(edited.version(), 2);
    }

    #[tokio::test]
    async fn fractional_ages_are_read_back() {
        let store = Arc::new(MemoryStore::new());
        let facade = FacadePerson::new(repo::Repository::new(store.clone()));

        store
            .insert_one(
                Person::COLLECTION,
                mongodb::bson::doc! { "name": "Ann", "age": 45.5, "favoriteFoods": ["sushi"] },
            )
            .await
            .unwrap();
        facade
            .create_one(NewPerson::new("Ann").with_age(29.5))
            .await
            .unwrap();

        let people = facade.find_by_name("Ann").await.unwrap();
        let ages: Vec<Option<f64>> = people.iter().map(|p| p.age).collect();
        assert_eq!(ages, vec![Some(45.5), Some(29.5)]);

        let person = facade.find_one_by_food("sushi").await.unwrap().unwrap();
        assert_eq!(person.age, Some(45.5));
    }

    #[tokio::test]
    async fn edit_then_save_of_a_missing_person() {
        assert_eq!(
            facade().edit_then_save(&PersonId::new()).await,
            Err(FacadeError)
        );
    }

    #[tokio::test]
    async fn find_and_update_returns_the_updated_record() {
        let facade = facade();
        let created = facade
            .create_one(NewPerson::new("Zoe").with_age(33))
            .await
            .unwrap();

        let updated = facade.find_and_update("Zoe").await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.age, Some(20.0));

        let stored = facade.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.age, Some(20.0));

        assert_eq!(facade.find_and_update("Nobody").await, Ok(None));
    }

    #[tokio::test]
    async fn remove_by_id() {
        let facade = facade();
        let created = facade.create_one(NewPerson::sample()).await.unwrap();

        let removed = facade.remove_by_id(&created.id).await.unwrap();
        assert_eq!(removed, created);
        assert_eq!(facade.find_by_id(&created.id).await, Ok(None));

        assert_eq!(facade.remove_by_id(&created.id).await, Err(FacadeError));
    }

    #[tokio::test]
    async fn remove_many() {
        let facade = facade();
        facade.create_many(seed()).await.unwrap();

        let summary = facade.remove_many().await.unwrap();
        assert_eq!(summary.deleted_count, 2);
        assert!(facade.find_by_name("Mary").await.unwrap().is_empty());
        assert_eq!(facade.find_by_name("Ann").await.unwrap().len(), 1);

        let summary = facade.remove_many().await.unwrap();
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn chained_query() {
        let facade = facade();
        facade.create_many(seed()).await.unwrap();

        let people = facade.chained_query("burrito").await.unwrap();

        let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Mary"]);
        assert!(people.iter().all(|p| p.age.is_none()));
        assert!(
            people
                .iter()
                .all(|p| p.favorite_foods.iter().any(|f| f == "burrito"))
        );

        assert_eq!(facade.chained_query("tofu").await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn model_gives_direct_access() {
        let facade = facade();
        let created = facade.create_one(NewPerson::new("Ann")).await.unwrap();

        let stored = facade
            .model()
            .find_by_id(created.id.as_object_id())
            .await
            .unwrap();
        assert_eq!(stored, Some(created));
    }

    #[tokio::test]
    async fn failures_are_opaque() {
        let store = Arc::new(MemoryStore::new());
        let facade = FacadePerson::new(repo::Repository::new(store.clone()));

        // An age that is not a number cannot be decoded into a person
        store
            .insert_one(
                Person::COLLECTION,
                mongodb::bson::doc! { "name": "Ann", "age": "old", "favoriteFoods": ["sushi"] },
            )
            .await
            .unwrap();

        assert_eq!(facade.find_by_name("Ann").await, Err(FacadeError));
        assert_eq!(facade.find_one_by_food("sushi").await, Err(FacadeError));
        assert_eq!(facade.find_by_name("Zoe").await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn operations_run_concurrently() {
        let facade = facade();
        let created = facade.create_many(seed()).await.unwrap();

        let handles: Vec<_> = created
            .iter()
            .map(|p| {
                let facade = facade.clone();
                let id = p.id;
                tokio::spawn(async move { facade.find_by_id(&id).await })
            })
            .collect();

        for (handle, person) in handles.into_iter().zip(&created) {
            let found = handle.await.unwrap().unwrap().unwrap();
            assert_eq!(&found, person);
        }
    }
}
