//! Classification of [`Service`] errors.
//!
//! [`Service`]: crate::Service

use derive_more::Display;
use tracerr::Traced;

use crate::infra::database;

/// Kind of a failed operation, stable across commands and queries.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Kind {
    /// No credential was presented, or it could not be parsed.
    #[display("unauthenticated")]
    Unauthenticated,

    /// Credential is forged, expired or does not match.
    #[display("invalid credential")]
    InvalidCredential,

    /// Caller is authenticated, but has the wrong role or does not own the
    /// resource.
    #[display("forbidden")]
    Forbidden,

    /// Referenced entity does not exist.
    #[display("not found")]
    NotFound,

    /// Uniqueness of some value would be violated.
    #[display("conflict")]
    Conflict,

    /// Provided value is malformed or outside of the allowed set.
    #[display("invalid argument")]
    InvalidArgument,

    /// Current state of an entity forbids the requested change.
    #[display("invalid transition")]
    InvalidTransition,

    /// Underlying storage, or another infrastructure dependency, failed.
    ///
    /// Details are never shown to the caller.
    #[display("store unavailable")]
    StoreUnavailable,
}

/// Error that can be classified into a [`Kind`].
pub trait AsKind {
    /// Returns the [`Kind`] of this error.
    fn kind(&self) -> Kind;
}

impl<E: AsKind> AsKind for Traced<E> {
    fn kind(&self) -> Kind {
        self.as_ref().kind()
    }
}

impl AsKind for database::Error {
    fn kind(&self) -> Kind {
        Kind::StoreUnavailable
    }
}
