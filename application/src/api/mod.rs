//! GraphQL API definitions.

/// Defines a GraphQL scalar wrapping a domain text value.
///
/// Must stay above the module declarations to be visible in them.
macro_rules! define_text_scalar {
    (
        $(#[doc = $doc:literal])*
        $name:ident($inner:path) as $gql:literal
    ) => {
        $(#[doc = $doc])*
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            ::derive_more::From,
            ::juniper::GraphQLScalar,
            ::derive_more::Into,
        )]
        #[graphql(name = $gql, with = $crate::api::scalar::Via::<$inner>)]
        pub struct $name($inner);
    };
}

pub mod maintenance;
pub mod message;
mod mutation;
pub mod payment;
pub mod property;
mod query;
pub mod rent_application;
pub mod scalar;
mod subscription;
pub mod user;

use service::read::Participant;

use crate::{define_error, Error};

pub use self::{
    maintenance::MaintenanceRequest, message::Message, mutation::Mutation,
    payment::Payment, property::Property, query::Query,
    rent_application::RentApplication, subscription::Subscription, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

/// Resolves the `Participant` whose records are requested from the pair of
/// optional GraphQL arguments.
///
/// # Errors
///
/// If not exactly one of the IDs is provided.
pub(crate) fn participant(
    tenant_id: Option<user::Id>,
    landlord_id: Option<user::Id>,
) -> Result<Participant, Error> {
    match (tenant_id, landlord_id) {
        (Some(id), None) => Ok(Participant::Tenant(id.into())),
        (None, Some(id)) => Ok(Participant::Landlord(id.into())),
        (None, None) | (Some(_), Some(_)) => {
            Err(ParticipantError::Ambiguous.into())
        }
    }
}

define_error! {
    enum ParticipantError {
        #[code = "INVALID_ARGUMENT"]
        #[status = BAD_REQUEST]
        #[message = "Exactly one of `tenantId` and `landlordId` must be \
                     provided"]
        Ambiguous,
    }
}

#[cfg(test)]
mod spec {
    use service::read::Participant;

    use super::{participant, user};

    #[test]
    fn participant_requires_exactly_one_id() {
        let id = user::Id::from(service::domain::user::Id::new());

        assert_eq!(
            participant(Some(id), None).ok(),
            Some(Participant::Tenant(id.into())),
        );
        assert_eq!(
            participant(None, Some(id)).ok(),
            Some(Participant::Landlord(id.into())),
        );
        assert_eq!(
            participant(None, None).unwrap_err().code,
            "INVALID_ARGUMENT",
        );
        assert!(participant(Some(id), Some(id)).is_err());
    }
}
