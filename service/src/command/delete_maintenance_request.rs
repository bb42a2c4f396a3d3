//! [`Command`] for withdrawing a [`MaintenanceRequest`].

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

/// [`Command`] for withdrawing a [`MaintenanceRequest`], either by the filing
/// tenant or by the landlord owning the [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteMaintenanceRequest {
    /// [`Session`] of the withdrawing user.
    pub initiator: Session,

    /// ID of the [`MaintenanceRequest`] to withdraw.
    pub request_id: maintenance::Id,
}

impl<Db> Command<DeleteMaintenanceRequest> for Service<Db>
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
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteMaintenanceRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteMaintenanceRequest {
            initiator,
            request_id,
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

        if initiator.user_id != request.tenant_id {
            self.database()
                .execute(Select(By::<Option<Property>, _>::new(
                    request.property_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .map_or(Err(session::Forbidden(initiator.user_id)), |p| {
                    initiator.require_ownership(p.owner_id)
                })
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }

        request.deleted_at = Some(DateTime::now().coerce());
        tx.execute(Update(request))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteMaintenanceRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is neither the filing tenant nor the owning landlord.
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
            Command as _, DeleteMaintenanceRequest, SubmitMaintenanceRequest,
        },
        domain::{maintenance, user, MaintenanceRequest},
        error::{AsKind as _, Kind},
        infra::Memory,
        query::ListMaintenanceRequests,
        read::Participant,
        spec::{list_property, register, service},
        Query as _, Service,
    };

    struct Parties {
        landlord: user::Session,
        tenant: user::Session,
        stranger: user::Session,
        request: MaintenanceRequest,
    }

    async fn filed(svc: &Service<Memory>) -> Parties {
        let (_, landlord) =
            register(svc, "owner@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(svc, "t1@example.com", user::Role::Tenant).await;
        let (_, stranger) =
            register(svc, "other@example.com", user::Role::Landlord).await;
        let property =
            list_property(svc, landlord, "Bandel", "Kolkata", "9000INR").await;
        let request = svc
            .execute(SubmitMaintenanceRequest {
                initiator: tenant,
                property_id: property.id,
                title: maintenance::Title::new("Leaking tap").unwrap(),
                description: maintenance::Description::new("Kitchen").unwrap(),
                priority: None,
            })
            .await
            .unwrap();
        Parties {
            landlord,
            tenant,
            stranger,
            request,
        }
    }

    async fn listed(
        svc: &Service<Memory>,
        tenant: user::Session,
    ) -> Vec<MaintenanceRequest> {
        svc.execute(ListMaintenanceRequests::new(
            tenant,
            Participant::Tenant(tenant.user_id),
        ))
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn filing_tenant_withdraws() {
        let svc = service();
        let Parties {
            tenant, request, ..
        } = filed(&svc).await;
        assert_eq!(listed(&svc, tenant).await.len(), 1);

        svc.execute(DeleteMaintenanceRequest {
            initiator: tenant,
            request_id: request.id,
        })
        .await
        .unwrap();
        assert!(listed(&svc, tenant).await.is_empty());

        let err = svc
            .execute(DeleteMaintenanceRequest {
                initiator: tenant,
                request_id: request.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }

    #[tokio::test]
    async fn owning_landlord_withdraws_others_are_forbidden() {
        let svc = service();
        let Parties {
            landlord,
            tenant,
            stranger,
            request,
        } = filed(&svc).await;
        let (_, neighbour) =
            register(&svc, "t2@example.com", user::Role::Tenant).await;

        for initiator in [stranger, neighbour] {
            let err = svc
                .execute(DeleteMaintenanceRequest {
                    initiator,
                    request_id: request.id,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Forbidden);
        }
        assert_eq!(listed(&svc, tenant).await.len(), 1);

        svc.execute(DeleteMaintenanceRequest {
            initiator: landlord,
            request_id: request.id,
        })
        .await
        .unwrap();
        assert!(listed(&svc, tenant).await.is_empty());
    }
}
