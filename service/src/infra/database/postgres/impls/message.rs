//! [`Message`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::Message,
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::scope_condition;

impl<C> Database<Select<By<Vec<Message>, read::Scope>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Message>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Message>, read::Scope>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (condition, param) = scope_condition(by.into_inner());

        let sql = format!(
            "SELECT id, tenant_id, property_id, sender, recipient, text, \
                    created_at \
             FROM messages \
             WHERE {condition} \
             ORDER BY created_at, id",
        );
        Ok(self
            .query(&sql, &[&*param])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Message {
                id: row.get("id"),
                tenant_id: row.get("tenant_id"),
                property_id: row.get("property_id"),
                from: row.get("sender"),
                to: row.get("recipient"),
                text: row.get("text"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

impl<C> Database<Insert<Message>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(message): Insert<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        let Message {
            id,
            tenant_id,
            property_id,
            from,
            to,
            text,
            created_at,
        } = message;

        const SQL: &str = "\
            INSERT INTO messages (\
                id, tenant_id, property_id, sender, recipient, text, \
                created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, $5::INT2, \
                $6::VARCHAR, $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[&id, &tenant_id, &property_id, &from, &to, &text, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
