//! [`Command`] for recording a [`Payment`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        payment, property,
        user::{self, session, Session},
        Payment, Property, User,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a rent [`Payment`] owed by a tenant for a
/// [`Property`] of the initiating landlord.
///
/// The [`Payment`] starts [`payment::Status::Pending`].
#[derive(Clone, Debug)]
pub struct RecordPayment {
    /// [`Session`] of the landlord owning the [`Property`].
    pub initiator: Session,

    /// ID of the paying tenant.
    pub tenant_id: user::Id,

    /// ID of the [`Property`] the [`Payment`] is for.
    pub property_id: property::Id,

    /// Amount to be paid.
    pub amount: Money,

    /// [`payment::Method`], if already known.
    pub method: Option<payment::Method>,

    /// [`DateTime`] the [`Payment`] is due by.
    pub due_at: Option<payment::DueDateTime>,
}

impl<Db> Command<RecordPayment> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RecordPayment) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPayment {
            initiator,
            tenant_id,
            property_id,
            amount,
            method,
            due_at,
        } = cmd;

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

        _ = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|u| u.role == user::Role::Tenant)
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let payment = Payment {
            id: payment::Id::new(),
            tenant_id,
            property_id,
            amount,
            status: payment::Status::Pending,
            method,
            due_at,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(payment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            payment.id = %payment.id,
            payment.amount = %payment.amount,
            "payment recorded",
        );

        Ok(payment)
    }
}

/// Error of [`RecordPayment`] [`Command`] execution.
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

    /// Tenant doesn't exist.
    #[display("Tenant `User(id: {_0})` does not exist")]
    #[from(ignore)]
    TenantNotExists(#[error(not(source))] user::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::PropertyNotExists(_) | Self::TenantNotExists(_) => {
                Kind::NotFound
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;

    use crate::{
        command::{Command as _, RecordPayment},
        domain::{payment, user},
        error::{AsKind as _, Kind},
        spec::{list_property, register, service},
    };

    #[tokio::test]
    async fn records_pending_payment() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (tenant, _) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let property =
            list_property(&svc, landlord, "Baguiati", "Kolkata", "8000INR")
                .await;

        let payment = svc
            .execute(RecordPayment {
                initiator: landlord,
                tenant_id: tenant.id,
                property_id: property.id,
                amount: Money::from_str("8000INR").unwrap(),
                method: payment::Method::new("UPI"),
                due_at: None,
            })
            .await
            .unwrap();

        assert_eq!(payment.status, payment::Status::Pending);
        assert_eq!(payment.tenant_id, tenant.id);
        assert_eq!(payment.amount, Money::from_str("8000INR").unwrap());
    }

    #[tokio::test]
    async fn requires_owner_and_existing_tenant() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (_, other) =
            register(&svc, "other@example.com", user::Role::Landlord).await;
        let (tenant, _) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let property =
            list_property(&svc, landlord, "Baguiati", "Kolkata", "8000INR")
                .await;
        let record = |initiator, tenant_id| RecordPayment {
            initiator,
            tenant_id,
            property_id: property.id,
            amount: Money::from_str("8000INR").unwrap(),
            method: None,
            due_at: None,
        };

        let err = svc.execute(record(other, tenant.id)).await.unwrap_err();
        assert_eq!(err.kind(), Kind::Forbidden);

        let err = svc
            .execute(record(landlord, user::Id::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);

        let err = svc
            .execute(record(landlord, landlord.user_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
