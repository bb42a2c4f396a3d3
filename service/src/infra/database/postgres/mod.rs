//! Postgres [`Database`] implementation.

/// Implements [`Connection`] for the provided type by forwarding every
/// statement to the `target` expression evaluated over `this`.
///
/// Must stay above the module declarations to be visible in them.
macro_rules! impl_connection {
    (
        $ty:ty,
        |$this:ident| $target:expr,
        exec = $exec:ident,
        map_err = [$($map:expr),+ $(,)?] $(,)?
    ) => {
        impl $crate::infra::postgres::Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<
                Vec<::tokio_postgres::Row>,
                ::tracerr::Traced<$crate::infra::database::Error>,
            >
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                let $this = self;
                $target.query(stmt, params).await$(.map_err($map))+
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<
                Option<::tokio_postgres::Row>,
                ::tracerr::Traced<$crate::infra::database::Error>,
            >
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                let $this = self;
                $target.query_opt(stmt, params).await$(.map_err($map))+
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ::tokio_postgres::types::ToSql + Sync)],
            ) -> Result<u64, ::tracerr::Traced<$crate::infra::database::Error>>
            where
                T: ::tokio_postgres::ToStatement + ?Sized,
            {
                let $this = self;
                $target.$exec(stmt, params).await$(.map_err($map))+
            }
        }
    };
}

pub mod client;
pub mod connection;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::{error::SqlState, NoTls};
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use deadpool_postgres::{Config, PoolConfig};
pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
};

/// Postgres [`Database`] client, either [`NonTx`] or [`Tx`].
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<C = NonTx>(C);

impl Postgres {
    /// Creates a new [`Postgres`] client connecting lazily with the provided
    /// [`Config`].
    ///
    /// # Errors
    ///
    /// If the [`Config`] doesn't describe a valid connection pool.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        conf.create_pool(Some(Runtime::Tokio1), NoTls)
            .map(|pool| Self(NonTx::new(pool)))
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Statement failed.
    #[display("Postgres statement failed: {_0}")]
    Statement(connection::Error),

    /// [`connection::Pool`] could not be created.
    #[display("Failed to create the Postgres `Pool`: {_0}")]
    PoolCreation(connection::PoolCreationError),

    /// [`connection::Pool`] gave no connection.
    #[display("Postgres `Pool` gave no connection: {_0}")]
    Pool(connection::PoolError),
}

impl Error {
    /// Checks if this [`Error`] is a violation of the specified uniqueness
    /// `constraint`, or of any one if [`None`].
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        let Self::Statement(e) = self else {
            return false;
        };
        e.code() == Some(&SqlState::UNIQUE_VIOLATION)
            && constraint.map_or(true, |c| {
                e.as_db_error().and_then(|e| e.constraint()) == Some(c)
            })
    }
}
