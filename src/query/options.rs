use super::{Filter, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// Numeric direction used by document stores (`1` ascending, `-1` descending).
    pub fn direction(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Options applied to a `find` after filtering: ordering, result cap and
/// excluded fields, applied in this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub sort: Vec<(String, Order)>,
    pub limit: Option<u64>,
    pub exclude: Vec<String>,
}

/// A filter plus its [`FindOptions`], built by chaining.
///
/// ```
/// use people_facade::query::{Filter, Order, Query};
///
/// let query = Query::new(Filter::new().eq("favoriteFoods", "burrito"))
///     .sort("name", Order::Asc)
///     .limit(2)
///     .exclude("age");
///
/// assert_eq!(query.options().limit, Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filter: Filter,
    options: FindOptions,
}

impl Query {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            options: FindOptions::default(),
        }
    }

    pub fn sort(mut self, field: impl Into<String>, order: Order) -> Self {
        self.options.sort.push((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.options.exclude.push(field.into());
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    pub fn into_parts(self) -> (Filter, FindOptions) {
        (self.filter, self.options)
    }
}

impl From<Filter> for Query {
    fn from(filter: Filter) -> Self {
        Self::new(filter)
    }
}

/// Which version of a document a find-and-modify returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnDocument {
    Before,
    After,
}

/// Field assignments applied by a find-and-modify.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Vec<(String, Value)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field` to `value`, creating the field if absent.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn assignments(&self) -> &[(String, Value)] {
        &self.set
    }
}
