use log::debug;

use crate::repo;

/// Failure of a facade operation.
///
/// Deliberately carries no detail: not-found, validation and store failures are
/// indistinguishable to the caller.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation failed")]
pub struct FacadeError;

/// Logs the cause of a failed operation and collapses it into a [`FacadeError`].
pub(super) fn failed<E>(operation: &'static str) -> impl FnOnce(E) -> FacadeError
where
    E: Into<repo::Error>,
{
    move |err| {
        let err: repo::Error = err.into();
        debug!("operation `{}` failed: {}", operation, err);
        FacadeError
    }
}
