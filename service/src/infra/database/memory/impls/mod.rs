//! [`Database`] implementations.

use std::sync::Arc;

use common::operations::{Commit, Transact};
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::infra::{database, Database};

use super::{Memory, NonTx, Tx};

/// Implements `Insert`, `Update` and `Lock` of an entity kept in a table
/// keyed by its `id`.
macro_rules! impl_upsert {
    ($entity:ty, $id:ty, $table:ident) => {
        impl<C> $crate::infra::Database<::common::operations::Insert<$entity>>
            for $crate::infra::Memory<C>
        {
            type Ok = ();
            type Err = ::tracerr::Traced<$crate::infra::database::Error>;

            async fn execute(
                &self,
                ::common::operations::Insert(entity):
                    ::common::operations::Insert<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                self.execute(::common::operations::Update(entity))
                    .await
                    .map_err(::tracerr::wrap!())
            }
        }

        impl<C> $crate::infra::Database<::common::operations::Update<$entity>>
            for $crate::infra::Memory<C>
        {
            type Ok = ();
            type Err = ::tracerr::Traced<$crate::infra::database::Error>;

            async fn execute(
                &self,
                ::common::operations::Update(entity):
                    ::common::operations::Update<$entity>,
            ) -> Result<Self::Ok, Self::Err> {
                drop(
                    self.tables.$table.write().await.insert(entity.id, entity),
                );
                Ok(())
            }
        }

        impl<C>
            $crate::infra::Database<
                ::common::operations::Lock<
                    ::common::operations::By<$entity, $id>,
                >,
            > for $crate::infra::Memory<C>
        {
            type Ok = ();
            type Err = ::tracerr::Traced<$crate::infra::database::Error>;

            /// Transactions are serialized as a whole, so rows need no
            /// separate locking.
            async fn execute(
                &self,
                _: ::common::operations::Lock<
                    ::common::operations::By<$entity, $id>,
                >,
            ) -> Result<Self::Ok, Self::Err> {
                Ok(())
            }
        }
    };
}

mod maintenance;
mod message;
mod payment;
mod property;
mod rent_application;
mod user;

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = Arc::clone(&self.tables.tx).lock_owned().await;
        Ok(Memory {
            tables: Arc::clone(&self.tables),
            client: Tx {
                guard: Arc::new(Mutex::new(Some(guard))),
            },
        })
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        drop(self.client.guard.lock().await.take());
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::{Commit, Transact};
    use tokio::time;

    use crate::infra::{Database as _, Memory};

    const WAIT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn transactions_are_serialized() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        let second = time::timeout(WAIT, db.execute(Transact));
        assert!(second.await.is_err(), "second transaction must wait");

        tx.execute(Commit).await.unwrap();
        let second = time::timeout(WAIT, db.execute(Transact));
        assert!(second.await.is_ok(), "lock must be released on commit");
    }

    #[tokio::test]
    async fn dropped_transaction_releases_lock() {
        let db = Memory::new();

        drop(db.execute(Transact).await.unwrap());
        let next = time::timeout(WAIT, db.execute(Transact));
        assert!(next.await.is_ok());
    }
}
