//! [`Payment`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{payment, Payment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::scope_condition;

/// Selects [`Payment`]s by the provided `WHERE` condition with its
/// parameters.
async fn select<C: Connection>(
    db: &Postgres<C>,
    condition: &str,
    params: &[&(dyn postgres_types::ToSql + Sync)],
) -> Result<Vec<Payment>, Traced<database::Error>> {
    let sql = format!(
        "SELECT id, tenant_id, property_id, \
                amount, amount_currency, status, method, due_at, \
                created_at, updated_at \
         FROM payments \
         WHERE {condition} \
         ORDER BY created_at DESC, id DESC",
    );
    Ok(db
        .query(&sql, params)
        .await
        .map_err(tracerr::wrap!())?
        .into_iter()
        .map(|row| Payment {
            id: row.get("id"),
            tenant_id: row.get("tenant_id"),
            property_id: row.get("property_id"),
            amount: Money {
                amount: row.get("amount"),
                currency: row.get("amount_currency"),
            },
            status: row.get("status"),
            method: row.get("method"),
            due_at: row.get("due_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
        .collect())
}

impl<C> Database<Select<By<Option<Payment>, payment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(select(self, "id = $1::UUID", &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .pop())
    }
}

impl<C> Database<Select<By<Vec<Payment>, read::Scope>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, read::Scope>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (condition, param) = scope_condition(by.into_inner());
        select(self, condition, &[&*param])
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            tenant_id,
            property_id,
            amount,
            status,
            method,
            due_at,
            created_at,
            updated_at,
        } = payment;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, tenant_id, property_id, \
                amount, amount_currency, status, method, due_at, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::NUMERIC, $5::INT2, $6::INT2, $7::VARCHAR, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ, $10::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &tenant_id,
                &property_id,
                &amount.amount,
                &amount.currency,
                &status,
                &method,
                &due_at,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
