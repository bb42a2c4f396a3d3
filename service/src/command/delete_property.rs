//! [`Command`] for removing a [`Property`] listing.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property,
        user::{session, Session},
        Property,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for removing a [`Property`] listing.
#[derive(Clone, Copy, Debug)]
pub struct DeleteProperty {
    /// [`Session`] of the landlord removing the [`Property`].
    pub initiator: Session,

    /// ID of the [`Property`] to remove.
    pub property_id: property::Id,
}

impl<Db> Command<DeleteProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteProperty {
            initiator,
            property_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        initiator
            .require_ownership(property.owner_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        property.deleted_at = Some(DateTime::now().coerce());
        tx.execute(Update(property))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(())
    }
}

/// Error of [`DeleteProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator does not own the [`Property`].
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::PropertyNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{Command as _, DeleteProperty},
        domain::{property, user},
        error::{AsKind as _, Kind},
        query::{properties, property as by_id},
        read,
        spec::{list_property, register, service},
        Query as _,
    };

    #[tokio::test]
    async fn deleted_listing_disappears() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let gone =
            list_property(&svc, landlord, "Bandel", "Kolkata", "9000INR").await;
        let kept =
            list_property(&svc, landlord, "Garia", "Kolkata", "7000INR").await;

        svc.execute(DeleteProperty {
            initiator: landlord,
            property_id: gone.id,
        })
        .await
        .unwrap();

        let found = svc.execute(by_id::ById::by(gone.id)).await.unwrap();
        assert!(found.is_none());
        let listed = svc
            .execute(properties::Search::by(read::property::Filter::default()))
            .await
            .unwrap();
        assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), [kept.id]);

        let err = svc
            .execute(DeleteProperty {
                initiator: landlord,
                property_id: gone.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }

    #[tokio::test]
    async fn only_owner_deletes() {
        let svc = service();
        let (_, owner) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (_, other) =
            register(&svc, "other@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let listed =
            list_property(&svc, owner, "Bandel", "Kolkata", "9000INR").await;

        for initiator in [other, tenant] {
            let err = svc
                .execute(DeleteProperty {
                    initiator,
                    property_id: listed.id,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Forbidden);
        }

        let err = svc
            .execute(DeleteProperty {
                initiator: owner,
                property_id: property::Id::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);

        let found = svc.execute(by_id::ById::by(listed.id)).await.unwrap();
        assert!(found.is_some());
    }
}
