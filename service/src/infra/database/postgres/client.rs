//! Postgres database clients.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection as _},
};

/// Non-transactional Postgres database client.
///
/// Clones share a single pooled connection, taken on the first statement.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to take connections from.
    pub(crate) pool: connection::Pool,

    /// Shared pooled connection, if already taken.
    conn: Arc<RwLock<Option<connection::NonTx>>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over the provided
    /// [`connection::Pool`].
    #[must_use]
    pub(crate) fn new(pool: connection::Pool) -> Self {
        Self {
            pool,
            conn: Arc::default(),
        }
    }

    /// Returns the shared pooled connection, taking it on the first call.
    async fn conn(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        {
            let conn = self.conn.read().await;
            if conn.is_some() {
                return Ok(RwLockReadGuard::map(conn, |c| {
                    c.as_ref().expect("checked above")
                }));
            }
        }

        let mut conn = self.conn.write().await;
        if conn.is_none() {
            *conn = Some(take(&self.pool).await?);
        }
        Ok(RwLockReadGuard::map(conn.downgrade(), |c| {
            c.as_ref().expect("initialized above")
        }))
    }
}

/// Transactional Postgres database client.
///
/// Clones share a single transaction, opened on the first statement in a
/// separate pooled connection.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to take the connection from.
    pool: connection::Pool,

    /// Shared open transaction, if already opened.
    tx: Arc<RwLock<Option<connection::Tx>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client over the provided [`connection::Pool`].
    #[must_use]
    pub fn new(pool: connection::Pool) -> Self {
        Self {
            pool,
            tx: Arc::default(),
        }
    }

    /// Returns the open transaction, opening it on the first call.
    async fn tx(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        {
            let tx = self.tx.read().await;
            if tx.is_some() {
                return Ok(RwLockReadGuard::map(tx, |t| {
                    t.as_ref().expect("checked above")
                }));
            }
        }

        let mut tx = self.tx.write().await;
        if tx.is_none() {
            let conn = take(&self.pool).await?;
            *tx = Some(
                connection::Tx::begin(conn)
                    .await
                    .map_err(tracerr::wrap!())?,
            );
        }
        Ok(RwLockReadGuard::map(tx.downgrade(), |t| {
            t.as_ref().expect("initialized above")
        }))
    }

    /// Commits the transaction of this [`Tx`] client.
    ///
    /// Committing a [`Tx`] client that ran no statements is a no-op.
    ///
    /// # Errors
    ///
    /// If the `COMMIT` statement fails.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        let Some(tx) = self.tx.write().await.take() else {
            return Ok(());
        };
        tx.commit().await.map_err(tracerr::wrap!())
    }
}

/// Takes a connection from the provided [`connection::Pool`].
async fn take(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

impl_connection!(
    NonTx,
    |this| this.conn().await.map_err(tracerr::wrap!())?,
    exec = exec,
    map_err = [tracerr::wrap!()],
);

impl_connection!(
    Tx,
    |this| this.tx().await.map_err(tracerr::wrap!())?,
    exec = exec,
    map_err = [tracerr::wrap!()],
);
