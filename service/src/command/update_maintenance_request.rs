//! [`Command`] for updating a [`MaintenanceRequest`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        maintenance, property,
        user::{session, Session},
        MaintenanceRequest, Property,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`MaintenanceRequest`] by the landlord owning
/// its [`Property`].
///
/// Only the provided fields change.
#[derive(Clone, Debug)]
pub struct UpdateMaintenanceRequest {
    /// [`Session`] of the landlord owning the [`Property`].
    pub initiator: Session,

    /// ID of the [`MaintenanceRequest`] to update.
    pub request_id: maintenance::Id,

    /// New [`maintenance::Status`].
    pub status: Option<maintenance::Status>,

    /// New [`maintenance::Description`].
    pub description: Option<maintenance::Description>,

    /// New [`maintenance::Priority`].
    pub priority: Option<maintenance::Priority>,
}

impl<Db> Command<UpdateMaintenanceRequest> for Service<Db>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<MaintenanceRequest>, maintenance::Id>>,
            Ok = Option<MaintenanceRequest>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<MaintenanceRequest, maintenance::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Update<MaintenanceRequest>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = MaintenanceRequest;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateMaintenanceRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateMaintenanceRequest {
            initiator,
            request_id,
            status,
            description,
            priority,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(request_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut request = tx
            .execute(Select(By::<Option<MaintenanceRequest>, _>::new(
                request_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RequestNotExists(request_id))
            .map_err(tracerr::wrap!())?;

        let owner_id = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(
                request.property_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .map(|p| p.owner_id);
        owner_id
            .map_or(Err(session::Forbidden(initiator.user_id)), |id| {
                initiator.require_ownership(id)
            })
            .map_err(tracerr::from_and_wrap!(=> E))?;

        if let Some(status) = status {
            request.set_status(status);
        }
        if let Some(description) = description {
            request.description = description;
        }
        if let Some(priority) = priority {
            request.priority = priority;
        }
        request.updated_at = DateTime::now().coerce();

        tx.execute(Update(request.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(request)
    }
}

/// Error of [`UpdateMaintenanceRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator does not own the [`Property`].
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// [`MaintenanceRequest`] doesn't exist.
    #[display("`MaintenanceRequest(id: {_0})` does not exist")]
    #[from(ignore)]
    RequestNotExists(#[error(not(source))] maintenance::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::RequestNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{
            Command as _, SubmitMaintenanceRequest, UpdateMaintenanceRequest,
        },
        domain::{maintenance, user, MaintenanceRequest},
        error::{AsKind as _, Kind},
        infra::Memory,
        spec::{list_property, register, service},
        Service,
    };

    async fn filed(
        svc: &Service<Memory>,
    ) -> (user::Session, user::Session, MaintenanceRequest) {
        let (_, landlord) =
            register(svc, "owner@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(svc, "t1@example.com", user::Role::Tenant).await;
        let property =
            list_property(svc, landlord, "Bandel", "Kolkata", "9000INR").await;
        let request = svc
            .execute(SubmitMaintenanceRequest {
                initiator: tenant,
                property_id: property.id,
                title: maintenance::Title::new("Leaking tap").unwrap(),
                description: maintenance::Description::new("Drips all night")
                    .unwrap(),
                priority: None,
            })
            .await
            .unwrap();
        (landlord, tenant, request)
    }

    fn update(
        initiator: user::Session,
        request: &MaintenanceRequest,
        status: maintenance::Status,
    ) -> UpdateMaintenanceRequest {
        UpdateMaintenanceRequest {
            initiator,
            request_id: request.id,
            status: Some(status),
            description: None,
            priority: None,
        }
    }

    #[tokio::test]
    async fn status_only_update_keeps_the_rest() {
        let svc = service();
        let (landlord, _, request) = filed(&svc).await;
        assert_eq!(request.priority, maintenance::Priority::Medium);

        let updated = svc
            .execute(update(
                landlord,
                &request,
                maintenance::Status::InProgress,
            ))
            .await
            .unwrap();

        assert_eq!(updated.status(), maintenance::Status::InProgress);
        assert_eq!(updated.priority, maintenance::Priority::Medium);
        assert_eq!(updated.description, request.description);
        assert_eq!(updated.title, request.title);
        assert!(updated.resolved_at().is_none());
    }

    #[tokio::test]
    async fn resolution_time_survives_reopening() {
        let svc = service();
        let (landlord, _, request) = filed(&svc).await;
        assert!(request.resolved_at().is_none());

        let resolved = svc
            .execute(update(landlord, &request, maintenance::Status::Resolved))
            .await
            .unwrap();
        let resolved_at = resolved.resolved_at().unwrap();

        let reopened = svc
            .execute(update(landlord, &request, maintenance::Status::Pending))
            .await
            .unwrap();
        assert_eq!(reopened.resolved_at(), Some(resolved_at));

        let again = svc
            .execute(update(landlord, &request, maintenance::Status::Resolved))
            .await
            .unwrap();
        assert_eq!(again.resolved_at(), Some(resolved_at));
    }

    #[tokio::test]
    async fn only_owning_landlord_updates() {
        let svc = service();
        let (_, tenant, request) = filed(&svc).await;
        let (_, other) =
            register(&svc, "other@example.com", user::Role::Landlord).await;

        for initiator in [tenant, other] {
            let err = svc
                .execute(update(
                    initiator,
                    &request,
                    maintenance::Status::Resolved,
                ))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Forbidden);
        }
    }
}
