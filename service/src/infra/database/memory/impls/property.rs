//! [`Property`]-related [`Database`] implementations.

use std::collections::BTreeSet;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{property, Property},
    infra::{database, Database, Memory},
    read,
};

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Memory<C> {
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .tables
            .properties
            .read()
            .await
            .get(&id)
            .filter(|p| p.deleted_at.is_none())
            .cloned())
    }
}

impl<C> Database<Select<By<Vec<Property>, read::property::Filter>>>
    for Memory<C>
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, read::property::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut properties = self
            .tables
            .properties
            .read()
            .await
            .values()
            .filter(|p| p.deleted_at.is_none() && filter.matches(p))
            .cloned()
            .collect::<Vec<_>>();
        properties.sort_by(|a, b| {
            b.posted_at.cmp(&a.posted_at).then(b.id.cmp(&a.id))
        });
        Ok(properties)
    }
}

impl<C> Database<Select<By<read::property::FilterOptions, ()>>> for Memory<C> {
    type Ok = read::property::FilterOptions;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::property::FilterOptions, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let properties = self.tables.properties.read().await;
        let details = properties
            .values()
            .filter(|p| p.deleted_at.is_none())
            .map(|p| &p.details);

        let mut cities = BTreeSet::new();
        let mut bhk_options = BTreeSet::new();
        let mut furnishing_statuses = BTreeSet::new();
        let mut tenant_preferences = BTreeSet::new();
        let mut area_types = BTreeSet::new();
        for d in details {
            _ = cities.insert(d.city.clone());
            _ = bhk_options.insert(d.bhk);
            _ = furnishing_statuses.insert(d.furnishing_status.clone());
            _ = tenant_preferences.insert(d.tenant_preferred.clone());
            _ = area_types.insert(d.area_type.clone());
        }

        Ok(read::property::FilterOptions {
            cities: cities.into_iter().collect(),
            bhk_options: bhk_options.into_iter().collect(),
            furnishing_statuses: furnishing_statuses.into_iter().collect(),
            tenant_preferences: tenant_preferences.into_iter().collect(),
            area_types: area_types.into_iter().collect(),
        })
    }
}

impl_upsert!(Property, property::Id, properties);
