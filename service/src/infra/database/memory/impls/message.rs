//! [`Message`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::Message,
    infra::{database, Database, Memory},
    read,
};

impl<C> Database<Select<By<Vec<Message>, read::Scope>>> for Memory<C> {
    type Ok = Vec<Message>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Message>, read::Scope>>,
    ) -> Result<Self::Ok, Self::Err> {
        let scope = by.into_inner();
        let mut messages = self
            .tables
            .messages
            .read()
            .await
            .iter()
            .filter(|m| scope.contains(m.tenant_id, m.property_id))
            .cloned()
            .collect::<Vec<_>>();
        // Stable, so equal timestamps keep the order of sending.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}

impl<C> Database<Insert<Message>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(message): Insert<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        self.tables.messages.write().await.push(message);
        Ok(())
    }
}
