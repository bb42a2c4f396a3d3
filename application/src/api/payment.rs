//! [`Payment`]-related definitions.

use common::{DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// A rent [`Payment`] recorded by a landlord.
#[derive(Clone, Debug, From)]
pub struct Payment(domain::Payment);

/// A rent `Payment` recorded by a landlord.
#[graphql_object(context = Context)]
impl Payment {
    /// Unique identifier of this `Payment`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Tenant owing this `Payment`.
    pub fn tenant(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`Payment` is recorded for a registered tenant"
        )]
        unsafe {
            api::User::new_unchecked(self.0.tenant_id)
        }
    }

    /// ID of the rented `Property`.
    pub fn property_id(&self) -> api::property::Id {
        self.0.property_id.into()
    }

    /// Amount due.
    pub fn amount(&self) -> Money {
        self.0.amount
    }

    /// Current status of this `Payment`.
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Payment method, like "UPI".
    pub fn method(&self) -> Option<Method> {
        self.0.method.clone().map(Into::into)
    }

    /// `DateTime` this `Payment` is due by.
    pub fn due_at(&self) -> Option<DateTime> {
        self.0.due_at.map(|d| d.coerce())
    }

    /// `DateTime` when this `Payment` was recorded.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// `DateTime` when this `Payment` was last modified.
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of a `Payment`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::payment::Id)]
#[into(domain::payment::Id)]
#[graphql(name = "PaymentId", transparent)]
pub struct Id(Uuid);

define_text_scalar! {
    /// Method of a `Payment`, like "UPI" or "Card".
    Method(domain::payment::Method) as "PaymentMethod"
}

/// Status of a `Payment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentStatus")]
pub enum Status {
    /// Not paid yet.
    Pending,

    /// Paid in full.
    Paid,

    /// Attempted, but not paid.
    Failed,
}

impl From<domain::payment::Status> for Status {
    fn from(status: domain::payment::Status) -> Self {
        use domain::payment::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Paid => Self::Paid,
            S::Failed => Self::Failed,
        }
    }
}
