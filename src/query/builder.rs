use mongodb::bson::{Bson, Document};

use super::{Error, Filter, Op, Order, Update, Value};

/// Compiles [`Filter`]s into query documents understood by document stores.
///
/// Expressions on the same field are merged into a single operator document
/// (`{__v: {$eq: 1}}`). When the same operator is repeated on a field the whole
/// filter is emitted as an explicit `$and` list instead.
#[derive(Default)]
pub struct DocumentCompiler {
    exprs: Vec<(String, &'static str, Bson)>,
}

impl DocumentCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expr(mut self, field: &str, op: &Op<Value>) -> Self {
        let (operator, operand): (&'static str, Bson) = match op {
            Op::Eq(v) => ("$eq", v.into()),
            Op::In(items) => ("$in", Bson::Array(items.iter().map(Bson::from).collect())),
        };

        self.exprs.push((field.to_owned(), operator, operand));
        self
    }

    pub fn filter(mut self, filter: &Filter) -> Self {
        for expr in filter {
            self = self.expr(expr.field(), expr.op());
        }
        self
    }

    pub fn compile(self) -> Document {
        let mut result = Document::new();
        let mut repeated = false;

        for (field, operator, operand) in &self.exprs {
            let entry = result
                .entry(field.clone())
                .or_insert_with(|| Bson::Document(Document::new()));

            if let Bson::Document(ops) = entry {
                if ops.contains_key(*operator) {
                    repeated = true;
                    break;
                }
                ops.insert(*operator, operand.clone());
            }
        }

        if !repeated {
            return result;
        }

        let clauses: Vec<Bson> = self
            .exprs
            .into_iter()
            .map(|(field, operator, operand)| {
                let mut ops = Document::new();
                ops.insert(operator, operand);
                let mut clause = Document::new();
                clause.insert(field, ops);
                Bson::Document(clause)
            })
            .collect();

        let mut result = Document::new();
        result.insert("$and", clauses);
        result
    }
}

pub fn sort_document(sort: &[(String, Order)]) -> Document {
    sort.iter()
        .map(|(field, order)| (field.clone(), Bson::Int32(order.direction())))
        .collect()
}

pub fn projection_document(exclude: &[String]) -> Document {
    exclude
        .iter()
        .map(|field| (field.clone(), Bson::Int32(0)))
        .collect()
}

pub fn update_document(update: &Update) -> Result<Document, Error> {
    if update.is_empty() {
        return Err(Error::EmptyUpdate);
    }

    let set: Document = update
        .assignments()
        .iter()
        .map(|(field, value)| (field.clone(), Bson::from(value)))
        .collect();

    let mut result = Document::new();
    result.insert("$set", set);
    Ok(result)
}
