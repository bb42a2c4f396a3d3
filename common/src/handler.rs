//! [`Handler`] abstraction shared by commands, queries and storage.

use std::future::Future;

/// Something executing `Args` asynchronously.
///
/// Service commands, service queries and storage operations are all
/// [`Handler`]s, differing only in what `Args` they accept.
pub trait Handler<Args = ()> {
    /// Successful result.
    type Ok;

    /// Error of the execution.
    type Err;

    /// Executes the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
