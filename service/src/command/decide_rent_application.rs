//! [`Command`] for approving or rejecting a [`RentApplication`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property,
        rent_application::{self, Decision},
        user::{session, Session},
        Property, RentApplication,
    },
    error::{AsKind, Kind},
    event,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for approving or rejecting a pending [`RentApplication`].
///
/// Approval makes the applicant the occupant of the [`Property`].
#[derive(Clone, Copy, Debug)]
pub struct DecideRentApplication {
    /// [`Session`] of the landlord owning the applied [`Property`].
    pub initiator: Session,

    /// ID of the [`RentApplication`] to decide upon.
    pub application_id: rent_application::Id,

    /// [`Decision`] to make.
    pub decision: Decision,
}

impl<Db> Command<DecideRentApplication> for Service<Db>
where
    Db: Database<
            Select<By<Option<RentApplication>, rent_application::Id>>,
            Ok = Option<RentApplication>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<RentApplication>, rent_application::Id>>,
            Ok = Option<RentApplication>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<RentApplication, rent_application::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<RentApplication>, Err = Traced<database::Error>>
        + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = RentApplication;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DecideRentApplication,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DecideRentApplication {
            initiator,
            application_id,
            decision,
        } = cmd;

        let application = self
            .database()
            .execute(Select(By::<Option<RentApplication>, _>::new(
                application_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ApplicationNotExists(application_id))
            .map_err(tracerr::wrap!())?;
        let property_id = application.property_id;
        let property = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        initiator
            .require_ownership(property.owner_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Concurrent decisions must observe each other.
        tx.execute(Lock(By::<RentApplication, _>::new(application_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut application = tx
            .execute(Select(By::<Option<RentApplication>, _>::new(
                application_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ApplicationNotExists(application_id))
            .map_err(tracerr::wrap!())?;
        application
            .decide(decision)
            .map_err(|e| E::AlreadyDecided(e.0))
            .map_err(tracerr::wrap!())?;

        if decision == Decision::Approved {
            tx.execute(Lock(By::<Property, _>::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            let mut property = tx
                .execute(Select(By::<Option<Property>, _>::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?;
            match property.occupant_id {
                Some(id) if id != application.tenant_id => {
                    return Err(tracerr::new!(E::PropertyOccupied(
                        property_id
                    )));
                }
                Some(_) | None => {}
            }
            property.occupant_id = Some(application.tenant_id);
            tx.execute(Update(property))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
        }

        tx.execute(Update(application.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            application.id = %application.id,
            application.status = %application.status,
            "decided",
        );
        self.notify(event::RentApplicationChanged {
            application_id,
            tenant_id: application.tenant_id,
            landlord_id: initiator.user_id,
        });

        Ok(application)
    }
}

/// Error of [`DecideRentApplication`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator does not own the applied [`Property`].
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// [`RentApplication`] doesn't exist.
    #[display("`RentApplication(id: {_0})` does not exist")]
    #[from(ignore)]
    ApplicationNotExists(#[error(not(source))] rent_application::Id),

    /// Applied [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),

    /// [`RentApplication`] has been decided upon already.
    #[display("`RentApplication` is already {_0}")]
    #[from(ignore)]
    AlreadyDecided(#[error(not(source))] rent_application::Status),

    /// Applied [`Property`] is occupied by another tenant.
    #[display("`Property(id: {_0})` is occupied by another tenant")]
    #[from(ignore)]
    PropertyOccupied(#[error(not(source))] property::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::ApplicationNotExists(_) | Self::PropertyNotExists(_) => {
                Kind::NotFound
            }
            Self::AlreadyDecided(_) => Kind::InvalidTransition,
            Self::PropertyOccupied(_) => Kind::Conflict,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::{Command as _, DecideRentApplication, SubmitRentApplication},
        domain::{
            rent_application::{Decision, Status},
            user::{self, Session},
            Property, RentApplication,
        },
        error::{AsKind as _, Kind},
        infra::{Database as _, Memory},
        spec::{list_property, register, service},
        Service,
    };

    async fn submitted(
        svc: &Service<Memory>,
    ) -> (Session, Session, Property, RentApplication) {
        let (_, landlord) =
            register(svc, "owner@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(svc, "t1@example.com", user::Role::Tenant).await;
        let property =
            list_property(svc, landlord, "Bandel", "Kolkata", "9000INR").await;
        let app = svc
            .execute(SubmitRentApplication {
                initiator: tenant,
                property_id: property.id,
            })
            .await
            .unwrap();
        (landlord, tenant, property, app)
    }

    #[tokio::test]
    async fn second_decision_is_invalid_transition() {
        for first in [Decision::Approved, Decision::Rejected] {
            for second in [Decision::Approved, Decision::Rejected] {
                let svc = service();
                let (landlord, _, _, app) = submitted(&svc).await;

                let decided = svc
                    .execute(DecideRentApplication {
                        initiator: landlord,
                        application_id: app.id,
                        decision: first,
                    })
                    .await
                    .unwrap();
                assert_eq!(decided.status, Status::from(first));

                let err = svc
                    .execute(DecideRentApplication {
                        initiator: landlord,
                        application_id: app.id,
                        decision: second,
                    })
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), Kind::InvalidTransition);

                let stored = svc
                    .database()
                    .execute(Select(By::<Option<RentApplication>, _>::new(
                        app.id,
                    )))
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(stored.status, Status::from(first));
            }
        }
    }

    #[tokio::test]
    async fn concurrent_decisions_observe_each_other() {
        let svc = service();
        let (landlord, _, _, app) = submitted(&svc).await;
        let decide = |decision: Decision| {
            svc.execute(DecideRentApplication {
                initiator: landlord,
                application_id: app.id,
                decision,
            })
        };

        let (approve, reject) = tokio::join!(
            decide(Decision::Approved),
            decide(Decision::Rejected),
        );

        let (decided, err) = match (approve, reject) {
            (Ok(decided), Err(err)) | (Err(err), Ok(decided)) => {
                (decided, err)
            }
            (first, second) => {
                panic!("expected exactly one decision: {first:?}, {second:?}")
            }
        };
        assert_eq!(err.kind(), Kind::InvalidTransition);

        let stored = svc
            .database()
            .execute(Select(By::<Option<RentApplication>, _>::new(app.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, decided.status);
    }

    #[tokio::test]
    async fn approval_assigns_occupant() {
        let svc = service();
        let (landlord, tenant, property, app) = submitted(&svc).await;

        drop(
            svc.execute(DecideRentApplication {
                initiator: landlord,
                application_id: app.id,
                decision: Decision::Approved,
            })
            .await
            .unwrap(),
        );

        let stored = svc
            .database()
            .execute(Select(By::<Option<Property>, _>::new(property.id)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.occupant_id, Some(tenant.user_id));
    }

    #[tokio::test]
    async fn approval_of_occupied_property_conflicts() {
        let svc = service();
        let (landlord, _, property, first) = submitted(&svc).await;
        let (_, other) =
            register(&svc, "t2@example.com", user::Role::Tenant).await;
        let second = svc
            .execute(SubmitRentApplication {
                initiator: other,
                property_id: property.id,
            })
            .await
            .unwrap();
        drop(
            svc.execute(DecideRentApplication {
                initiator: landlord,
                application_id: first.id,
                decision: Decision::Approved,
            })
            .await
            .unwrap(),
        );

        let err = svc
            .execute(DecideRentApplication {
                initiator: landlord,
                application_id: second.id,
                decision: Decision::Approved,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Conflict);

        let rejected = svc
            .execute(DecideRentApplication {
                initiator: landlord,
                application_id: second.id,
                decision: Decision::Rejected,
            })
            .await
            .unwrap();
        assert_eq!(rejected.status, Status::Rejected);
    }

    #[tokio::test]
    async fn only_owner_decides() {
        let svc = service();
        let (_, tenant, _, app) = submitted(&svc).await;
        let (_, other) =
            register(&svc, "other@example.com", user::Role::Landlord).await;

        for initiator in [tenant, other] {
            let err = svc
                .execute(DecideRentApplication {
                    initiator,
                    application_id: app.id,
                    decision: Decision::Approved,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Forbidden);
        }
    }
}
