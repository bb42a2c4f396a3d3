//! [`Command`] for applying to rent a [`Property`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property, rent_application,
        user::{self, session, Session},
        Property, RentApplication,
    },
    error::{AsKind, Kind},
    event,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for applying to rent a [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct SubmitRentApplication {
    /// [`Session`] of the applying tenant.
    pub initiator: Session,

    /// ID of the [`Property`] to rent.
    pub property_id: property::Id,
}

impl<Db> Command<SubmitRentApplication> for Service<Db>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<RentApplication>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = RentApplication;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitRentApplication,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitRentApplication {
            initiator,
            property_id,
        } = cmd;
        initiator
            .require_role(user::Role::Tenant)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let property = self
            .database()
            .execute(Select(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let application = RentApplication {
            id: rent_application::Id::new(),
            tenant_id: initiator.user_id,
            property_id,
            status: rent_application::Status::Pending,
            submitted_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(application.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.notify(event::RentApplicationChanged {
            application_id: application.id,
            tenant_id: application.tenant_id,
            landlord_id: property.owner_id,
        });

        Ok(application)
    }
}

/// Error of [`SubmitRentApplication`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is not a tenant.
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
        command::{Command as _, SubmitRentApplication},
        domain::{property, rent_application, user},
        error::{AsKind as _, Kind},
        spec::{list_property, register, service},
    };

    #[tokio::test]
    async fn starts_pending_and_notifies() {
        let svc = service();
        let (landlord, owner) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (tenant, session) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let property =
            list_property(&svc, owner, "Bandel", "Kolkata", "9000INR").await;
        let mut events = svc.subscribe();

        let app = svc
            .execute(SubmitRentApplication {
                initiator: session,
                property_id: property.id,
            })
            .await
            .unwrap();

        assert_eq!(app.status, rent_application::Status::Pending);
        assert_eq!(app.tenant_id, tenant.id);
        assert_eq!(
            app.submitted_at.coerce::<()>(),
            app.updated_at.coerce::<()>(),
        );

        let event = events.try_recv().unwrap();
        assert_eq!(event.application_id, app.id);
        assert!(event.concerns(tenant.id));
        assert!(event.concerns(landlord.id));
    }

    #[tokio::test]
    async fn requires_tenant_and_existing_property() {
        let svc = service();
        let (_, owner) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let property =
            list_property(&svc, owner, "Bandel", "Kolkata", "9000INR").await;

        let err = svc
            .execute(SubmitRentApplication {
                initiator: owner,
                property_id: property.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Forbidden);

        let err = svc
            .execute(SubmitRentApplication {
                initiator: tenant,
                property_id: property::Id::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
