//! # Facade Module
//!
//! This module implements the **Facade** pattern, serving as the logic layer between
//! the application's public interface and the underlying document store.
//!
//! * **Store Abstraction:** Facades interact with records without exposing which
//!   [`crate::store::Store`] backend holds them.
//! * **Uniform Outcome:** Every facade operation reports either its payload or an
//!   opaque [`FacadeError`]. The cause of a failure is logged, never returned.
//! * **Encapsulation:** The rest of the system deals with high-level entities like
//!   [`crate::types::Person`] rather than raw documents.

mod facade_error;
pub use facade_error::*;

mod facade_person;
pub use facade_person::*;
