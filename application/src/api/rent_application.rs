//! [`RentApplication`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context, Error};

/// An application of a tenant to rent a [`Property`].
///
/// [`Property`]: api::Property
#[derive(Clone, Debug, From)]
pub struct RentApplication(domain::RentApplication);

/// An application of a tenant to rent a `Property`.
#[graphql_object(context = Context)]
impl RentApplication {
    /// Unique identifier of this `RentApplication`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Tenant who applied.
    pub fn tenant(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`RentApplication` is submitted by a registered tenant"
        )]
        unsafe {
            api::User::new_unchecked(self.0.tenant_id)
        }
    }

    /// ID of the applied `Property`.
    pub fn property_id(&self) -> api::property::Id {
        self.0.property_id.into()
    }

    /// Applied `Property`, unless it has been deleted since.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "RentApplication.property",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn property(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Property>, Error> {
        api::Query::property(self.0.property_id.into(), ctx).await
    }

    /// Current status of this `RentApplication`.
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `RentApplication` was submitted.
    pub fn submitted_at(&self) -> DateTime {
        self.0.submitted_at.coerce()
    }

    /// `DateTime` when this `RentApplication` was last modified.
    pub fn updated_at(&self) -> DateTime {
        self.0.updated_at.coerce()
    }
}

/// Unique identifier of a `RentApplication`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::rent_application::Id)]
#[into(domain::rent_application::Id)]
#[graphql(name = "RentApplicationId", transparent)]
pub struct Id(Uuid);

/// Status of a `RentApplication`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "RentApplicationStatus")]
pub enum Status {
    /// Awaits the landlord's decision.
    Pending,

    /// Accepted by the landlord.
    Approved,

    /// Declined by the landlord.
    Rejected,
}

impl From<domain::rent_application::Status> for Status {
    fn from(status: domain::rent_application::Status) -> Self {
        use domain::rent_application::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Approved => Self::Approved,
            S::Rejected => Self::Rejected,
        }
    }
}

/// Landlord's decision upon a `RentApplication`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "RentApplicationDecision")]
pub enum Decision {
    /// Accept the `RentApplication`.
    Approved,

    /// Decline the `RentApplication`.
    Rejected,
}

impl From<Decision> for domain::rent_application::Decision {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => Self::Approved,
            Decision::Rejected => Self::Rejected,
        }
    }
}
