//! [`Command`] for updating the profile of the signed in [`User`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Address, Avatar, Name, Phone};
use crate::{
    domain::{user, user::Session, User},
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating the profile of the signed in [`User`].
///
/// Only the provided fields change.
#[derive(Clone, Debug)]
pub struct UpdateUserProfile {
    /// [`Session`] of the [`User`] updating their profile.
    pub initiator: Session,

    /// New [`Name`].
    pub name: Option<user::Name>,

    /// New [`Phone`].
    pub phone: Option<user::Phone>,

    /// New [`Address`].
    pub address: Option<user::Address>,

    /// New [`Avatar`] path.
    pub avatar: Option<user::Avatar>,
}

impl<Db> Command<UpdateUserProfile> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<User, user::Id>>, Err = Traced<database::Error>>
        + Database<Update<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateUserProfile,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserProfile {
            initiator,
            name,
            phone,
            address,
            avatar,
        } = cmd;
        let user_id = initiator.user_id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;
        if name.is_none()
            && phone.is_none()
            && address.is_none()
            && avatar.is_none()
        {
            return Ok(user);
        }

        if let Some(name) = name {
            user.name = name;
        }
        user.phone = phone.or(user.phone);
        user.address = address.or(user.address);
        user.avatar = avatar.or(user.avatar);
        user.updated_at = DateTime::now().coerce();

        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(user)
    }
}

/// Error of [`UpdateUserProfile`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::UserNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{Command as _, UpdateUserProfile},
        domain::user,
        spec::{register, service},
    };

    #[tokio::test]
    async fn changes_only_provided_fields() {
        let svc = service();
        let (before, session) =
            register(&svc, "asha@example.com", user::Role::Tenant).await;

        let after = svc
            .execute(UpdateUserProfile {
                initiator: session,
                name: None,
                phone: user::Phone::new("+91 98765 43210"),
                address: user::Address::new("12 Park Street, Kolkata"),
                avatar: None,
            })
            .await
            .unwrap();

        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.phone, user::Phone::new("+91 98765 43210"));
        assert_eq!(
            after.address,
            user::Address::new("12 Park Street, Kolkata"),
        );
        assert!(after.avatar.is_none());
        assert!(after.updated_at >= before.updated_at);
    }
}
