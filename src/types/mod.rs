mod person;
pub use person::*;

mod delete_summary;
pub use delete_summary::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid identifier `{0}`")]
    BadIdentifier(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("path `{0}` is required")]
    Required(&'static str),
}
