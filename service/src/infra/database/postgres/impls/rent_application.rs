//! [`RentApplication`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{rent_application, RentApplication},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::scope_condition;

/// Columns of the `rent_applications` table.
const COLUMNS: &str =
    "id, tenant_id, property_id, status, submitted_at, updated_at";

/// Reads a [`RentApplication`] from the provided [`Row`].
fn from_row(row: &Row) -> RentApplication {
    RentApplication {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        property_id: row.get("property_id"),
        status: row.get("status"),
        submitted_at: row.get("submitted_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<RentApplication>, rent_application::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<RentApplication>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentApplication>, rent_application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rent_applications \
             WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<RentApplication>, read::Scope>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<RentApplication>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<RentApplication>, read::Scope>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (condition, param) = scope_condition(by.into_inner());

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM rent_applications \
             WHERE {condition} \
             ORDER BY submitted_at DESC, id DESC",
        );
        Ok(self
            .query(&sql, &[&*param])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<RentApplication>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<RentApplication>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(application): Insert<RentApplication>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(application))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<RentApplication>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(application): Update<RentApplication>,
    ) -> Result<Self::Ok, Self::Err> {
        let RentApplication {
            id,
            tenant_id,
            property_id,
            status,
            submitted_at,
            updated_at,
        } = application;

        const SQL: &str = "\
            INSERT INTO rent_applications (\
                id, tenant_id, property_id, status, submitted_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::INT2, \
                $5::TIMESTAMPTZ, $6::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET status = EXCLUDED.status, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &tenant_id,
                &property_id,
                &status,
                &submitted_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<RentApplication, rent_application::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<RentApplication, rent_application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM rent_applications \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
