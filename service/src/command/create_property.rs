//! [`Command`] for listing a new [`Property`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property,
        user::{self, session, Session},
        Property,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Property`] owned by the initiating
/// landlord.
#[derive(Clone, Debug)]
pub struct CreateProperty {
    /// [`Session`] of the landlord listing the [`Property`].
    pub initiator: Session,

    /// [`property::Details`] of the new [`Property`].
    pub details: property::Details,
}

impl<Db> Command<CreateProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateProperty { initiator, details } = cmd;
        initiator
            .require_role(user::Role::Landlord)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let property = Property {
            id: property::Id::new(),
            owner_id: initiator.user_id,
            occupant_id: None,
            details,
            posted_at: DateTime::now().coerce(),
            deleted_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`CreateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is not a landlord.
    #[display("{_0}")]
    Forbidden(session::Forbidden),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::user,
        spec::{list_property, register, service},
    };

    #[tokio::test]
    async fn landlord_owns_listed_property() {
        let svc = service();
        let (landlord, session) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;

        let property =
            list_property(&svc, session, "Bandel", "Kolkata", "9000INR").await;

        assert_eq!(property.owner_id, landlord.id);
        assert!(property.occupant_id.is_none());
        assert_eq!(property.title(), "2 BHK in Bandel, Kolkata");
    }
}
