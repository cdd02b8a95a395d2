//! In-process evaluation of [`Filter`]s, [`FindOptions`] and [`Update`]s over
//! documents, following document-store semantics:
//!
//! * numbers compare by value regardless of their width (`Int32(20) == Double(20.0)`);
//! * an expression on a sequence field holds when any element satisfies it;
//! * a `null` operand matches a missing field as well as an explicit `null`;
//! * missing fields sort before present ones.

use std::cmp::Ordering;

use mongodb::bson::{Bson, Document};

use super::{Error, Filter, FindOptions, Op, Order, Update, Value};

/// A [`Filter`] ready to be evaluated against documents.
pub struct Matcher<'a> {
    filter: &'a Filter,
}

impl<'a> Matcher<'a> {
    pub fn new(filter: &'a Filter) -> Self {
        Self { filter }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filter
            .iter()
            .all(|expr| eval(doc.get(expr.field()), expr.op()))
    }
}

fn eval(field: Option<&Bson>, op: &Op<Value>) -> bool {
    match op {
        Op::Eq(v) => holds(field, v),
        Op::In(items) => items.iter().any(|v| holds(field, v)),
    }
}

fn holds(field: Option<&Bson>, value: &Value) -> bool {
    let value = Bson::from(value);
    match field {
        None => value == Bson::Null,
        field => any_element(field, |x| equals(x, &value)),
    }
}

/// Applies `pred` to the field or, for arrays, to each of its elements.
fn any_element(field: Option<&Bson>, pred: impl Fn(&Bson) -> bool) -> bool {
    match field {
        None => false,
        Some(Bson::Array(items)) => items.iter().any(pred),
        Some(value) => pred(value),
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Orders two values of the same kind; values of different kinds are incomparable.
pub fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (as_number(a), as_number(b)) {
        return a.partial_cmp(&b);
    }

    match (a, b) {
        (Bson::String(a), Bson::String(b)) => Some(a.cmp(b)),
        (Bson::Boolean(a), Bson::Boolean(b)) => Some(a.cmp(b)),
        (Bson::ObjectId(a), Bson::ObjectId(b)) => Some(a.bytes().cmp(&b.bytes())),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn equals(a: &Bson, b: &Bson) -> bool {
    match compare(a, b) {
        Some(ord) => ord == Ordering::Equal,
        None => a == b,
    }
}

/// Sorts `docs` in place; the sort is stable so ties keep insertion order.
pub fn sort_documents(docs: &mut [Document], sort: &[(String, Order)]) {
    if sort.is_empty() {
        return;
    }

    docs.sort_by(|a, b| {
        for (field, order) in sort {
            let ord = match (a.get(field), b.get(field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
            };
            let ord = match order {
                Order::Asc => ord,
                Order::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

/// Applies sort, limit and field exclusion to an already filtered result set.
pub fn apply_options(mut docs: Vec<Document>, options: &FindOptions) -> Vec<Document> {
    sort_documents(&mut docs, &options.sort);

    if let Some(limit) = options.limit {
        docs.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    if !options.exclude.is_empty() {
        for doc in &mut docs {
            for field in &options.exclude {
                doc.remove(field);
            }
        }
    }

    docs
}

pub fn apply_update(doc: &mut Document, update: &Update) -> Result<(), Error> {
    if update.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    for (field, value) in update.assignments() {
        doc.insert(field.clone(), Bson::from(value));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn people() -> Vec<Document> {
        vec![
            doc! { "name": "Mary", "age": 17, "favoriteFoods": ["burrito", "pizza"], "__v": 2 },
            doc! { "name": "Ann", "favoriteFoods": ["burrito"], "__v": 0 },
            doc! { "name": "John", "age": 40.0, "favoriteFoods": [] },
        ]
    }

    fn names(filter: &Filter) -> Vec<String> {
        let matcher = Matcher::new(filter);
        people()
            .iter()
            .filter(|d| matcher.matches(d))
            .map(|d| d.get_str("name").unwrap().to_owned())
            .collect()
    }

    #[test]
    fn eq_on_sequence_means_contains() {
        assert_eq!(
            names(&Filter::new().eq("favoriteFoods", "burrito")),
            vec!["Mary", "Ann"]
        );
        assert!(names(&Filter::new().eq("favoriteFoods", "sushi")).is_empty());
    }

    #[test]
    fn numbers_compare_across_widths() {
        assert_eq!(names(&Filter::new().eq("age", 40)), vec!["John"]);
        assert_eq!(names(&Filter::new().eq("age", 17.0)), vec!["Mary"]);
    }

    #[test]
    fn null_matches_missing_fields() {
        assert_eq!(names(&Filter::new().eq("age", Value::Null)), vec!["Ann"]);

        let unversioned = Filter::new().with("__v", Op::In(vec![Value::Integer(0), Value::Null]));
        assert_eq!(names(&unversioned), vec!["Ann", "John"]);

        assert!(names(&Filter::new().eq("__v", 0)).contains(&"Ann".to_owned()));
        assert!(!names(&Filter::new().eq("__v", 0)).contains(&"John".to_owned()));
    }

    #[test]
    fn in_set() {
        let filter = Filter::new().with("name", Op::In(vec!["Ann".into(), "John".into()]));
        assert_eq!(names(&filter), vec!["Ann", "John"]);
    }

    #[test]
    fn conjunction() {
        let filter = Filter::new().eq("favoriteFoods", "burrito").eq("name", "Ann");
        assert_eq!(names(&filter), vec!["Ann"]);
    }

    #[test]
    fn options_sort_limit_exclude() {
        let options = FindOptions {
            sort: vec![("name".to_owned(), Order::Asc)],
            limit: Some(2),
            exclude: vec!["age".to_owned()],
        };

        let result = apply_options(people(), &options);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].get_str("name").unwrap(), "Ann");
        assert_eq!(result[1].get_str("name").unwrap(), "John");
        assert!(result.iter().all(|d| !d.contains_key("age")));
    }

    #[test]
    fn missing_sort_keys_come_first() {
        let mut docs = people();
        sort_documents(&mut docs, &[("age".to_owned(), Order::Asc)]);

        let order: Vec<&str> = docs.iter().map(|d| d.get_str("name").unwrap()).collect();
        assert_eq!(order, vec!["Ann", "Mary", "John"]);

        sort_documents(&mut docs, &[("age".to_owned(), Order::Desc)]);
        let order: Vec<&str> = docs.iter().map(|d| d.get_str("name").unwrap()).collect();
        assert_eq!(order, vec!["John", "Mary", "Ann"]);
    }

    #[test]
    fn update_sets_fields() {
        let mut doc = doc! { "name": "Ann" };
        apply_update(&mut doc, &Update::new().set("age", 20.0)).unwrap();
        assert_eq!(doc.get_f64("age").unwrap(), 20.0);

        assert!(apply_update(&mut doc, &Update::new()).is_err());
    }
}
