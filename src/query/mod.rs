//! Store-independent query primitives.
//!
//! Filters, query chains and updates are described here once and then either
//! compiled into query documents ([`DocumentCompiler`]) for a remote document
//! store, or evaluated in process ([`Matcher`]).

mod builder;
pub use builder::*;

mod filter;
pub use filter::*;

mod matcher;
pub use matcher::*;

mod options;
pub use options::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("update without any assignment")]
    EmptyUpdate,
}
