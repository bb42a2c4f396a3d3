//! [`RentApplication`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{rent_application, RentApplication},
    infra::{database, Database, Memory},
    read,
};

impl<C> Database<Select<By<Option<RentApplication>, rent_application::Id>>>
    for Memory<C>
{
    type Ok = Option<RentApplication>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<RentApplication>, rent_application::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.tables.rent_applications.read().await.get(&id).cloned())
    }
}

impl<C> Database<Select<By<Vec<RentApplication>, read::Scope>>> for Memory<C> {
    type Ok = Vec<RentApplication>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<RentApplication>, read::Scope>>,
    ) -> Result<Self::Ok, Self::Err> {
        let scope = by.into_inner();
        let mut applications = self
            .tables
            .rent_applications
            .read()
            .await
            .values()
            .filter(|a| scope.contains(a.tenant_id, Some(a.property_id)))
            .cloned()
            .collect::<Vec<_>>();
        applications.sort_by(|a, b| {
            b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id))
        });
        Ok(applications)
    }
}

impl_upsert!(RentApplication, rent_application::Id, rent_applications);
