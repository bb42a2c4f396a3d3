//! [`User`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, memory, USERS_EMAIL_CONSTRAINT},
        Database, Memory,
    },
};

impl<C, IDs> Database<Select<By<HashMap<user::Id, User>, IDs>>> for Memory<C>
where
    IDs: AsRef<[user::Id]>,
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let users = self.tables.users.read().await;
        Ok(ids
            .as_ref()
            .iter()
            .filter_map(|id| users.get(id))
            .filter(|u| u.deleted_at.is_none())
            .map(|u| (u.id, u.clone()))
            .collect())
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Memory<C> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .tables
            .users
            .read()
            .await
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned())
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Email>>> for Memory<C> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .tables
            .users
            .read()
            .await
            .values()
            .find(|u| u.deleted_at.is_none() && u.email == *email)
            .cloned())
    }
}

impl<C> Database<Select<By<Vec<User>, ()>>> for Memory<C> {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<User>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut users = self
            .tables
            .users
            .read()
            .await
            .values()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect::<Vec<_>>();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }
}

impl<C> Database<Insert<User>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<User>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut users = self.tables.users.write().await;

        let occupied = user.deleted_at.is_none()
            && users.values().any(|u| {
                u.id != user.id
                    && u.deleted_at.is_none()
                    && u.email == user.email
            });
        if occupied {
            return Err(tracerr::new!(database::Error::from(
                memory::Error::UniqueViolation(USERS_EMAIL_CONSTRAINT),
            )));
        }

        drop(users.insert(user.id, user));
        Ok(())
    }
}

impl<C> Database<Lock<By<User, user::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}
