use std::str::FromStr;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::{Error, ValidationError};

/// Identifier assigned to a [`Person`] on creation, stable for the record's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(ObjectId);

impl PersonId {
    /// Generates a fresh identifier.
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for PersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for PersonId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl From<PersonId> for ObjectId {
    fn from(value: PersonId) -> Self {
        value.0
    }
}

impl FromStr for PersonId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(value)
            .map(Self)
            .map_err(|_| Error::BadIdentifier(value.to_owned()))
    }
}

impl std::fmt::Display for PersonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// A person document as stored in the `people` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: PersonId,

    pub name: String,

    /// Absent when unknown or when excluded by the query projection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,

    #[serde(rename = "favoriteFoods", default)]
    pub favorite_foods: Vec<String>,

    /// Document version key, bumped on every save
    #[serde(rename = "__v", default)]
    pub(crate) version: i32,
}

impl Person {
    pub const NAME: &'static str = "name";
    pub const AGE: &'static str = "age";
    pub const FAVORITE_FOODS: &'static str = "favoriteFoods";

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Checks the same constraints enforced on creation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }
}

/// The field-set used to create a [`Person`]; only `name` is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,

    #[serde(rename = "favoriteFoods", default)]
    pub favorite_foods: Vec<String>,
}

impl NewPerson {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_age(mut self, age: impl Into<f64>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_favorite_foods<I, S>(mut self, foods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.favorite_foods = foods.into_iter().map(Into::into).collect();
        self
    }

    /// The stock record created by the walkthrough: `name`, aged 45, with a single
    /// empty favorite food.
    pub fn sample() -> Self {
        Self::new("name").with_age(45).with_favorite_foods([""])
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }

    /// Validates the field-set and turns it into a record with a fresh identifier.
    pub fn into_person(self) -> Result<Person, ValidationError> {
        self.validate()?;

        Ok(Person {
            id: PersonId::new(),
            name: self.name,
            age: self.age,
            favorite_foods: self.favorite_foods,
            version: 0,
        })
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required(Person::NAME));
    }
    Ok(())
}
