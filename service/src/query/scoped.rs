//! [`Query`] of records visible to a single participant.

use std::{fmt, marker::PhantomData};

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        maintenance, payment, property, rent_application,
        user::{self, session, Session},
        MaintenanceRequest, Payment, Property, RentApplication,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    read::{self, Participant},
    Query, Service,
};

/// [`Query`] listing `T` records of a [`Participant`], newest first.
///
/// Only the [`Participant`] themselves may ask: a tenant sees their own
/// records, a landlord sees the records about the [`Property`]s they own.
///
/// Works for every [`Record`].
#[derive(Debug)]
pub struct List<T> {
    /// [`Session`] of the asking user.
    pub initiator: Session,

    /// [`Participant`] whose records are listed.
    pub of: Participant,

    /// Type of the listed records.
    _record: PhantomData<fn() -> T>,
}

impl<T> List<T> {
    /// Creates a new [`List`] of the records of the provided [`Participant`].
    #[must_use]
    pub fn new(initiator: Session, of: Participant) -> Self {
        Self {
            initiator,
            of,
            _record: PhantomData,
        }
    }
}

impl<T> Clone for List<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for List<T> {}

impl<Db, T> Query<List<T>> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Property>, read::property::Filter>>,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<T>, read::Scope>>,
            Ok = Vec<T>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<T>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: List<T>) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let List { initiator, of, .. } = query;
        initiator
            .require_role(of.role())
            .and_then(|()| initiator.require_ownership(of.id()))
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let scope = match of {
            Participant::Tenant(id) => read::Scope::Tenant(id),
            Participant::Landlord(id) => {
                let owned = self
                    .database()
                    .execute(Select(By::new(
                        read::property::Filter::owned_by(id),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if owned.is_empty() {
                    return Ok(vec![]);
                }
                read::Scope::Properties(
                    owned.into_iter().map(|p| p.id).collect(),
                )
            }
        };

        self.database()
            .execute(Select(By::new(scope)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Record of a tenant's dealings about a [`Property`].
pub trait Record {
    /// Name of this [`Record`] in messages.
    const NAME: &'static str;

    /// ID of this [`Record`].
    type Id: Copy + fmt::Display;

    /// ID of the tenant this [`Record`] is about.
    fn tenant_id(&self) -> user::Id;

    /// ID of the [`Property`] this [`Record`] is about.
    fn property_id(&self) -> property::Id;
}

impl Record for RentApplication {
    const NAME: &'static str = "RentApplication";
    type Id = rent_application::Id;

    fn tenant_id(&self) -> user::Id {
        self.tenant_id
    }

    fn property_id(&self) -> property::Id {
        self.property_id
    }
}

impl Record for MaintenanceRequest {
    const NAME: &'static str = "MaintenanceRequest";
    type Id = maintenance::Id;

    fn tenant_id(&self) -> user::Id {
        self.tenant_id
    }

    fn property_id(&self) -> property::Id {
        self.property_id
    }
}

impl Record for Payment {
    const NAME: &'static str = "Payment";
    type Id = payment::Id;

    fn tenant_id(&self) -> user::Id {
        self.tenant_id
    }

    fn property_id(&self) -> property::Id {
        self.property_id
    }
}

/// [`Query`] fetching a single `T` [`Record`] by its ID.
///
/// Visible to the tenant it is about and to the landlord owning its
/// [`Property`].
#[derive(Debug)]
pub struct ById<T: Record> {
    /// [`Session`] of the asking user.
    pub initiator: Session,

    /// ID of the fetched [`Record`].
    pub id: T::Id,
}

impl<T: Record> Clone for ById<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Record> Copy for ById<T> {}

impl<Db, T> Query<ById<T>> for Service<Db>
where
    T: Record,
    Db: Database<
            Select<By<Option<T>, T::Id>>,
            Ok = Option<T>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = T;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: ById<T>) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ById { initiator, id } = query;

        let record = self
            .database()
            .execute(Select(By::<Option<T>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::RecordNotExists {
                name: T::NAME,
                id: id.to_string(),
            })
            .map_err(tracerr::wrap!())?;
        if record.tenant_id() == initiator.user_id {
            return Ok(record);
        }

        let owner_id = self
            .database()
            .execute(Select(By::<Option<Property>, _>::new(
                record.property_id(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .map(|p| p.owner_id);
        owner_id
            .ok_or(session::Forbidden(initiator.user_id))
            .and_then(|owner| initiator.require_ownership(owner))
            .map_err(tracerr::from_and_wrap!(=> E))?;

        Ok(record)
    }
}

/// Error of [`List`] and [`ById`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is not allowed to see the records.
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// Requested [`Record`] doesn't exist.
    #[display("`{name}(id: {id})` does not exist")]
    #[from(ignore)]
    RecordNotExists {
        /// [`Record::NAME`] of the requested [`Record`].
        name: &'static str,

        /// ID of the requested [`Record`].
        id: String,
    },
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::RecordNotExists { .. } => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;

    use crate::{
        command::{
            Command as _, RecordPayment, SubmitMaintenanceRequest,
            SubmitRentApplication,
        },
        domain::{maintenance, property, rent_application, user},
        error::{AsKind as _, Kind},
        infra::Memory,
        query::{
            ListMaintenanceRequests, ListPayments, ListRentApplications,
            MaintenanceRequestById, PaymentById, RentApplicationById,
        },
        read::Participant,
        spec::{list_property, register, service},
        Query as _, Service,
    };

    /// Files an application, a maintenance request and a payment of the
    /// provided tenant about the provided property.
    async fn fill(
        svc: &Service<Memory>,
        landlord: user::Session,
        tenant: user::Session,
        property_id: property::Id,
    ) {
        drop(
            svc.execute(SubmitRentApplication {
                initiator: tenant,
                property_id,
            })
            .await
            .unwrap(),
        );
        drop(
            svc.execute(SubmitMaintenanceRequest {
                initiator: tenant,
                property_id,
                title: maintenance::Title::new("Broken fan").unwrap(),
                description: maintenance::Description::new("Bedroom").unwrap(),
                priority: None,
            })
            .await
            .unwrap(),
        );
        drop(
            svc.execute(RecordPayment {
                initiator: landlord,
                tenant_id: tenant.user_id,
                property_id,
                amount: Money::from_str("5000INR").unwrap(),
                method: None,
                due_at: None,
            })
            .await
            .unwrap(),
        );
    }

    #[tokio::test]
    async fn landlords_see_only_their_properties() {
        let svc = service();
        let (_, first) =
            register(&svc, "first@example.com", user::Role::Landlord).await;
        let (_, second) =
            register(&svc, "second@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let a = list_property(&svc, first, "Tollygunge", "Kolkata", "5000INR")
            .await;
        let b = list_property(&svc, second, "Garia", "Kolkata", "5000INR")
            .await;
        fill(&svc, first, tenant, a.id).await;
        fill(&svc, second, tenant, b.id).await;

        for (landlord, property) in [(first, &a), (second, &b)] {
            let of = Participant::Landlord(landlord.user_id);

            let apps = svc
                .execute(ListRentApplications::new(landlord, of))
                .await
                .unwrap();
            assert_eq!(apps.len(), 1);
            assert_eq!(apps[0].property_id, property.id);

            let requests = svc
                .execute(ListMaintenanceRequests::new(landlord, of))
                .await
                .unwrap();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].property_id, property.id);

            let payments = svc
                .execute(ListPayments::new(landlord, of))
                .await
                .unwrap();
            assert_eq!(payments.len(), 1);
            assert_eq!(payments[0].property_id, property.id);
        }

        let apps = svc
            .execute(ListRentApplications::new(
                tenant,
                Participant::Tenant(tenant.user_id),
            ))
            .await
            .unwrap();
        let ids = apps.iter().map(|a| a.property_id).collect::<Vec<_>>();
        assert_eq!(ids, [b.id, a.id]);
    }

    #[tokio::test]
    async fn empty_lists_are_fine() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;

        let apps = svc
            .execute(ListRentApplications::new(
                landlord,
                Participant::Landlord(landlord.user_id),
            ))
            .await
            .unwrap();
        assert!(apps.is_empty());
    }

    #[tokio::test]
    async fn only_participant_asks() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;

        for (initiator, of) in [
            (landlord, Participant::Tenant(tenant.user_id)),
            (tenant, Participant::Landlord(landlord.user_id)),
            (tenant, Participant::Landlord(tenant.user_id)),
            (landlord, Participant::Landlord(user::Id::new())),
        ] {
            let err = svc
                .execute(ListPayments::new(initiator, of))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Forbidden);
        }
    }

    #[tokio::test]
    async fn single_record_visible_to_its_parties_only() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (_, stranger) =
            register(&svc, "other@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let (_, neighbour) =
            register(&svc, "t2@example.com", user::Role::Tenant).await;
        let property =
            list_property(&svc, landlord, "Garia", "Kolkata", "5000INR").await;
        fill(&svc, landlord, tenant, property.id).await;
        let of = Participant::Tenant(tenant.user_id);
        let app = svc
            .execute(ListRentApplications::new(tenant, of))
            .await
            .unwrap()
            .remove(0);
        let request = svc
            .execute(ListMaintenanceRequests::new(tenant, of))
            .await
            .unwrap()
            .remove(0);
        let payment = svc
            .execute(ListPayments::new(tenant, of))
            .await
            .unwrap()
            .remove(0);

        for initiator in [tenant, landlord] {
            let found = svc
                .execute(RentApplicationById {
                    initiator,
                    id: app.id,
                })
                .await
                .unwrap();
            assert_eq!(found.id, app.id);

            let found = svc
                .execute(MaintenanceRequestById {
                    initiator,
                    id: request.id,
                })
                .await
                .unwrap();
            assert_eq!(found.id, request.id);

            let found = svc
                .execute(PaymentById {
                    initiator,
                    id: payment.id,
                })
                .await
                .unwrap();
            assert_eq!(found.id, payment.id);
        }

        for initiator in [stranger, neighbour] {
            let err = svc
                .execute(PaymentById {
                    initiator,
                    id: payment.id,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), Kind::Forbidden);
        }

        let err = svc
            .execute(RentApplicationById {
                initiator: tenant,
                id: rent_application::Id::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
