//! [`Payment`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{payment, Payment},
    infra::{database, Database, Memory},
    read,
};

impl<C> Database<Select<By<Option<Payment>, payment::Id>>> for Memory<C> {
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, payment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.tables.payments.read().await.get(&id).cloned())
    }
}

impl<C> Database<Select<By<Vec<Payment>, read::Scope>>> for Memory<C> {
    type Ok = Vec<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Payment>, read::Scope>>,
    ) -> Result<Self::Ok, Self::Err> {
        let scope = by.into_inner();
        let mut payments = self
            .tables
            .payments
            .read()
            .await
            .values()
            .filter(|p| scope.contains(p.tenant_id, Some(p.property_id)))
            .cloned()
            .collect::<Vec<_>>();
        payments.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
        });
        Ok(payments)
    }
}

impl<C> Database<Insert<Payment>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.tables.payments.write().await.insert(payment.id, payment));
        Ok(())
    }
}
