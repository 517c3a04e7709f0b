//! [`Handler`] abstractions shared by commands, queries and storage
//! operations.

use std::future::Future;

/// Asynchronous operation accepting `Args` and resolving into a [`Result`].
///
/// Commands and queries are executed by a service, while storage operations
/// are executed by a database, all through this same trait.
pub trait Handler<Args = ()> {
    /// Value produced on success.
    type Ok;

    /// Error produced on failure.
    type Err;

    /// Runs this [`Handler`] on the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
