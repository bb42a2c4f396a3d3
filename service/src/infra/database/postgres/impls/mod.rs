//! [`Database`] implementations.

#![allow(
    clippy::items_after_statements,
    reason = "`const SQL` after statements"
)]
#![allow(clippy::too_many_lines, reason = "SQL-related code a bit verbose")]

mod maintenance;
mod message;
mod migration;
mod payment;
mod property;
mod rent_application;
mod user;

use common::operations::{Commit, Transact};
use postgres_types::ToSql;
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    read,
};

use super::{NonTx, Postgres, Tx};

/// Builds a `WHERE` condition selecting rows in the provided [`read::Scope`]
/// along with its single parameter.
///
/// Expects `tenant_id` and `property_id` columns.
fn scope_condition(
    scope: read::Scope,
) -> (&'static str, Box<dyn ToSql + Send + Sync>) {
    match scope {
        read::Scope::Tenant(id) => ("tenant_id = $1::UUID", Box::new(id)),
        read::Scope::Properties(ids) => (
            "property_id = ANY($1::UUID[])",
            Box::new(ids.into_iter().collect::<Vec<_>>()),
        ),
    }
}

impl Database<Transact> for Postgres<NonTx> {
    type Ok = Postgres<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Postgres(Tx::new(self.0.pool.clone())))
    }
}

impl Database<Transact> for Postgres<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Postgres<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.commit().await.map_err(tracerr::wrap!())
    }
}
