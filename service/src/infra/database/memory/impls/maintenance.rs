//! [`MaintenanceRequest`]-related [`Database`] implementations.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{maintenance, MaintenanceRequest},
    infra::{database, Database, Memory},
    read,
};

impl<C> Database<Select<By<Option<MaintenanceRequest>, maintenance::Id>>>
    for Memory<C>
{
    type Ok = Option<MaintenanceRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<MaintenanceRequest>, maintenance::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .tables
            .maintenance_requests
            .read()
            .await
            .get(&id)
            .filter(|r| r.deleted_at.is_none())
            .cloned())
    }
}

impl<C> Database<Select<By<Vec<MaintenanceRequest>, read::Scope>>>
    for Memory<C>
{
    type Ok = Vec<MaintenanceRequest>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<MaintenanceRequest>, read::Scope>>,
    ) -> Result<Self::Ok, Self::Err> {
        let scope = by.into_inner();
        let mut requests = self
            .tables
            .maintenance_requests
            .read()
            .await
            .values()
            .filter(|r| {
                r.deleted_at.is_none()
                    && scope.contains(r.tenant_id, Some(r.property_id))
            })
            .cloned()
            .collect::<Vec<_>>();
        requests.sort_by(|a, b| {
            b.requested_at.cmp(&a.requested_at).then(b.id.cmp(&a.id))
        });
        Ok(requests)
    }
}

impl_upsert!(MaintenanceRequest, maintenance::Id, maintenance_requests);
