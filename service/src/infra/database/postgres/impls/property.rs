//! [`Property`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Columns of the `properties` table, in the order [`from_row()`] expects.
const COLUMNS: &str = "\
    id, owner_id, occupant_id, \
    bhk, rent, rent_currency, size, floor, area_type, locality, city, \
    furnishing_status, tenant_preferred, bathrooms, contact, image, \
    posted_at, deleted_at";

/// Reads a [`Property`] from the provided [`Row`] selected with [`COLUMNS`].
fn from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        occupant_id: row.get("occupant_id"),
        details: property::Details {
            bhk: u16::try_from(row.get::<_, i32>("bhk"))
                .expect("`bhk` is checked by the table constraint"),
            rent: Money {
                amount: row.get("rent"),
                currency: row.get("rent_currency"),
            },
            size: u32::try_from(row.get::<_, i64>("size"))
                .expect("`size` is checked by the table constraint"),
            floor: row.get("floor"),
            area_type: row.get("area_type"),
            locality: row.get("locality"),
            city: row.get("city"),
            furnishing_status: row.get("furnishing_status"),
            tenant_preferred: row.get("tenant_preferred"),
            bathrooms: u16::try_from(row.get::<_, i32>("bathrooms"))
                .expect("`bathrooms` is checked by the table constraint"),
            contact: row.get("contact"),
            image: row.get("image"),
        },
        posted_at: row.get("posted_at"),
        deleted_at: row.get("deleted_at"),
    }
}

/// Binds the provided `param` as the next one in `ps`, substituting its
/// placeholder into the `?` of the provided `condition`.
fn bind<'p>(
    ps: &mut Vec<&'p (dyn ToSql + Sync)>,
    condition: &str,
    param: &'p (dyn ToSql + Sync),
) -> String {
    ps.push(param);
    condition.replace('?', &format!("${}", ps.len()))
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE id = $1::UUID \
               AND deleted_at IS NULL",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Property>, read::property::Filter>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, read::property::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::property::Filter {
            owner_id,
            occupant_id,
            city,
            bhk,
            furnishing_status,
            tenant_preferred,
            area_type,
            locality,
            min_rent,
            max_rent,
        } = by.into_inner();
        let bhk = bhk.map(i32::from);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![];
        let mut conditions = vec![];
        if let Some(id) = &owner_id {
            conditions.push(bind(&mut ps, "owner_id = ?::UUID", id));
        }
        if let Some(id) = &occupant_id {
            conditions.push(bind(&mut ps, "occupant_id = ?::UUID", id));
        }
        if let Some(c) = &city {
            conditions.push(bind(&mut ps, "city = ?::VARCHAR", c));
        }
        if let Some(b) = &bhk {
            conditions.push(bind(&mut ps, "bhk = ?::INT4", b));
        }
        if let Some(f) = &furnishing_status {
            conditions.push(bind(
                &mut ps,
                "furnishing_status = ?::VARCHAR",
                f,
            ));
        }
        if let Some(t) = &tenant_preferred {
            conditions.push(bind(
                &mut ps,
                "tenant_preferred = ?::VARCHAR",
                t,
            ));
        }
        if let Some(a) = &area_type {
            conditions.push(bind(&mut ps, "area_type = ?::VARCHAR", a));
        }
        if let Some(l) = &locality {
            conditions.push(bind(
                &mut ps,
                "LOWER(locality) = LOWER(?::VARCHAR)",
                l,
            ));
        }
        for (m, op) in [(&min_rent, ">="), (&max_rent, "<=")] {
            if let Some(Money { amount, currency }) = m {
                let rent = format!("rent {op} ?::NUMERIC");
                conditions.push(bind(
                    &mut ps,
                    "rent_currency = ?::INT2",
                    currency,
                ));
                conditions.push(bind(&mut ps, &rent, amount));
            }
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE deleted_at IS NULL \
                   {conditions} \
             ORDER BY posted_at DESC, id DESC",
            conditions = conditions
                .iter()
                .format_with("", |c, f| f(&format_args!("AND {c} "))),
        );
        Ok(self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<read::property::FilterOptions, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::FilterOptions;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::property::FilterOptions, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT \
                ARRAY(SELECT DISTINCT city FROM properties \
                      WHERE deleted_at IS NULL ORDER BY 1) AS cities, \
                ARRAY(SELECT DISTINCT bhk FROM properties \
                      WHERE deleted_at IS NULL ORDER BY 1) AS bhk_options, \
                ARRAY(SELECT DISTINCT furnishing_status FROM properties \
                      WHERE deleted_at IS NULL ORDER BY 1) \
                    AS furnishing_statuses, \
                ARRAY(SELECT DISTINCT tenant_preferred FROM properties \
                      WHERE deleted_at IS NULL ORDER BY 1) \
                    AS tenant_preferences, \
                ARRAY(SELECT DISTINCT area_type FROM properties \
                      WHERE deleted_at IS NULL ORDER BY 1) AS area_types";
        let row = self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .expect("always exists");

        Ok(read::property::FilterOptions {
            cities: row.get("cities"),
            bhk_options: row
                .get::<_, Vec<i32>>("bhk_options")
                .into_iter()
                .map(|b| {
                    u16::try_from(b)
                        .expect("`bhk` is checked by the table constraint")
                })
                .collect(),
            furnishing_statuses: row.get("furnishing_statuses"),
            tenant_preferences: row.get("tenant_preferences"),
            area_types: row.get("area_types"),
        })
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            owner_id,
            occupant_id,
            details,
            posted_at,
            deleted_at,
        } = property;
        let property::Details {
            bhk,
            rent,
            size,
            floor,
            area_type,
            locality,
            city,
            furnishing_status,
            tenant_preferred,
            bathrooms,
            contact,
            image,
        } = details;
        let (bhk, size, bathrooms) =
            (i32::from(bhk), i64::from(size), i32::from(bathrooms));

        const SQL: &str = "\
            INSERT INTO properties (\
                id, owner_id, occupant_id, \
                bhk, rent, rent_currency, size, floor, area_type, \
                locality, city, furnishing_status, tenant_preferred, \
                bathrooms, contact, image, \
                posted_at, deleted_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::INT4, $5::NUMERIC, $6::INT2, $7::INT8, \
                $8::VARCHAR, $9::VARCHAR, \
                $10::VARCHAR, $11::VARCHAR, $12::VARCHAR, $13::VARCHAR, \
                $14::INT4, $15::VARCHAR, $16::VARCHAR, \
                $17::TIMESTAMPTZ, $18::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET occupant_id = EXCLUDED.occupant_id, \
                bhk = EXCLUDED.bhk, \
                rent = EXCLUDED.rent, \
                rent_currency = EXCLUDED.rent_currency, \
                size = EXCLUDED.size, \
                floor = EXCLUDED.floor, \
                area_type = EXCLUDED.area_type, \
                locality = EXCLUDED.locality, \
                city = EXCLUDED.city, \
                furnishing_status = EXCLUDED.furnishing_status, \
                tenant_preferred = EXCLUDED.tenant_preferred, \
                bathrooms = EXCLUDED.bathrooms, \
                contact = EXCLUDED.contact, \
                image = EXCLUDED.image, \
                deleted_at = EXCLUDED.deleted_at";
        self.exec(
            SQL,
            &[
                &id,
                &owner_id,
                &occupant_id,
                &bhk,
                &rent.amount,
                &rent.currency,
                &size,
                &floor,
                &area_type,
                &locality,
                &city,
                &furnishing_status,
                &tenant_preferred,
                &bathrooms,
                &contact,
                &image,
                &posted_at,
                &deleted_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
