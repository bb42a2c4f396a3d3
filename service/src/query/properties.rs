//! [`Query`] collection related to the multiple [`Property`]s.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{user, Property},
    infra::{database, Database},
    read, Query, Service,
};

use super::DatabaseQuery;

/// Searches [`Property`]s passing a [`read::property::Filter`], newest
/// first.
pub type Search = DatabaseQuery<By<Vec<Property>, read::property::Filter>>;

/// Queries [`read::property::FilterOptions`] across all [`Property`]s.
pub type FilterOptions = DatabaseQuery<By<read::property::FilterOptions, ()>>;

/// [`Query`] listing [`Property`]s of a landlord, newest first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ByOwner(pub user::Id);

impl<Db> Query<ByOwner> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Property>, read::property::Filter>>,
        Ok = Vec<Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        ByOwner(owner_id): ByOwner,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(By::new(read::property::Filter::owned_by(
                owner_id,
            ))))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;

    use crate::{
        domain::{property, user},
        query::properties,
        read::property::Filter,
        spec::{list_property, register, service},
        Query as _,
    };

    #[tokio::test]
    async fn search_without_filters_lists_everything() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let first =
            list_property(&svc, landlord, "Salt Lake", "Kolkata", "9000INR")
                .await;
        let second =
            list_property(&svc, landlord, "Andheri", "Mumbai", "30000INR")
                .await;

        let found = svc
            .execute(properties::Search::by(Filter::default()))
            .await
            .unwrap();
        let ids = found.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, [second.id, first.id]);

        let owned = svc
            .execute(properties::ByOwner(landlord.user_id))
            .await
            .unwrap();
        assert_eq!(owned.len(), 2);
    }

    #[tokio::test]
    async fn locality_is_matched_whole_ignoring_case() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let salt_lake =
            list_property(&svc, landlord, "Salt Lake", "Kolkata", "9000INR")
                .await;
        drop(
            list_property(
                &svc,
                landlord,
                "Salt Lake Sector V",
                "Kolkata",
                "12000INR",
            )
            .await,
        );

        let search = |locality: &str| {
            properties::Search::by(Filter {
                locality: property::Locality::new(locality),
                ..Filter::default()
            })
        };

        let found = svc.execute(search("salt LAKE")).await.unwrap();
        let ids = found.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, [salt_lake.id]);

        let found = svc.execute(search("Salt")).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn rent_range_and_options() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let cheap =
            list_property(&svc, landlord, "Salt Lake", "Kolkata", "9000INR")
                .await;
        drop(
            list_property(&svc, landlord, "Andheri", "Mumbai", "30000INR")
                .await,
        );

        let found = svc
            .execute(properties::Search::by(Filter {
                max_rent: Some(Money::from_str("9000INR").unwrap()),
                ..Filter::default()
            }))
            .await
            .unwrap();
        let ids = found.iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, [cheap.id]);

        let options = svc
            .execute(properties::FilterOptions::by(()))
            .await
            .unwrap();
        let cities =
            options.cities.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(cities, ["Kolkata", "Mumbai"]);
        assert_eq!(options.bhk_options, [2]);
    }
}
