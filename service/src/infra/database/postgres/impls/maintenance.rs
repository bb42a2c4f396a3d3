//! [`MaintenanceRequest`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{maintenance, MaintenanceRequest},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

use super::scope_condition;

/// Columns of the `maintenance_requests` table.
const COLUMNS: &str = "\
    id, tenant_id, property_id, title, description, status, priority, \
    requested_at, resolved_at, updated_at, deleted_at";

/// Reads a [`MaintenanceRequest`] from the provided [`Row`], attaching the
/// provided `comments` to it.
#[expect(unsafe_code, reason = "invariants are preserved")]
fn from_row(
    row: &Row,
    comments: Vec<maintenance::Comment>,
) -> MaintenanceRequest {
    // SAFETY: Rows are written from valid `MaintenanceRequest`s only.
    unsafe {
        MaintenanceRequest::from_parts(
            row.get("id"),
            row.get("tenant_id"),
            row.get("property_id"),
            row.get("title"),
            row.get("description"),
            row.get("status"),
            row.get("priority"),
            comments,
            row.get("requested_at"),
            row.get("resolved_at"),
            row.get("updated_at"),
            row.get("deleted_at"),
        )
    }
}

/// Selects [`MaintenanceRequest`]s by the provided `WHERE` condition with
/// its parameters, loading their comments.
async fn select<C: Connection>(
    db: &Postgres<C>,
    condition: &str,
    params: &[&(dyn postgres_types::ToSql + Sync)],
) -> Result<Vec<MaintenanceRequest>, Traced<database::Error>> {
    let sql = format!(
        "SELECT {COLUMNS} \
         FROM maintenance_requests \
         WHERE {condition} \
           AND deleted_at IS NULL \
         ORDER BY requested_at DESC, id DESC",
    );
    let rows = db.query(&sql, params).await.map_err(tracerr::wrap!())?;
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let ids = rows
        .iter()
        .map(|r| r.get("id"))
        .collect::<Vec<maintenance::Id>>();
    const SQL: &str = "\
        SELECT request_id, text, author_id, created_at \
        FROM maintenance_comments \
        WHERE request_id = ANY($1::UUID[]) \
        ORDER BY request_id, idx";
    let mut comments = HashMap::<maintenance::Id, Vec<_>>::new();
    for row in db.query(SQL, &[&ids]).await.map_err(tracerr::wrap!())? {
        comments
            .entry(row.get("request_id"))
            .or_default()
            .push(maintenance::Comment {
                text: row.get("text"),
                author_id: row.get("author_id"),
                created_at: row.get("created_at"),
            });
    }

    Ok(rows
        .iter()
        .map(|row| {
            let id: maintenance::Id = row.get("id");
            from_row(row, comments.remove(&id).unwrap_or_default())
        })
        .collect())
}

impl<C> Database<Select<By<Option<MaintenanceRequest>, maintenance::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<MaintenanceRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<MaintenanceRequest>, maintenance::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(select(self, "id = $1::UUID", &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .pop())
    }
}

impl<C> Database<Select<By<Vec<MaintenanceRequest>, read::Scope>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<MaintenanceRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<MaintenanceRequest>, read::Scope>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (condition, param) = scope_condition(by.into_inner());
        select(self, condition, &[&*param])
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<MaintenanceRequest>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Update<MaintenanceRequest>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(request): Insert<MaintenanceRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(request))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<MaintenanceRequest>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    /// Comments are append-only, so only new ones are written.
    async fn execute(
        &self,
        Update(request): Update<MaintenanceRequest>,
    ) -> Result<Self::Ok, Self::Err> {
        let (status, resolved_at) = (request.status(), request.resolved_at());

        const SQL: &str = "\
            INSERT INTO maintenance_requests (\
                id, tenant_id, property_id, title, description, \
                status, priority, \
                requested_at, resolved_at, updated_at, deleted_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::VARCHAR, $5::VARCHAR, \
                $6::INT2, $7::INT2, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ, \
                $10::TIMESTAMPTZ, $11::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET title = EXCLUDED.title, \
                description = EXCLUDED.description, \
                status = EXCLUDED.status, \
                priority = EXCLUDED.priority, \
                resolved_at = EXCLUDED.resolved_at, \
                updated_at = EXCLUDED.updated_at, \
                deleted_at = EXCLUDED.deleted_at";
        _ = self
            .exec(
                SQL,
                &[
                    &request.id,
                    &request.tenant_id,
                    &request.property_id,
                    &request.title,
                    &request.description,
                    &status,
                    &request.priority,
                    &request.requested_at,
                    &resolved_at,
                    &request.updated_at,
                    &request.deleted_at,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?;

        const COMMENT_SQL: &str = "\
            INSERT INTO maintenance_comments (\
                request_id, idx, text, author_id, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::INT4, $3::VARCHAR, $4::UUID, $5::TIMESTAMPTZ\
            ) \
            ON CONFLICT (request_id, idx) DO NOTHING";
        for (idx, comment) in (0_i32..).zip(request.comments()) {
            _ = self
                .exec(
                    COMMENT_SQL,
                    &[
                        &request.id,
                        &idx,
                        &comment.text,
                        &comment.author_id,
                        &comment.created_at,
                    ],
                )
                .await
                .map_err(tracerr::wrap!())?;
        }
        Ok(())
    }
}

impl<C> Database<Lock<By<MaintenanceRequest, maintenance::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<MaintenanceRequest, maintenance::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM maintenance_requests \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
