//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the profile of the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `UNAUTHENTICATED` - no credential is presented;
    /// - `INVALID_CREDENTIAL` - the credential is forged or expired;
    /// - `NOT_FOUND` - the `User` has been deleted meanwhile.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "me",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn me(ctx: &Context) -> Result<api::User, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::user::GetProfile { initiator })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the registered `User`s, oldest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FORBIDDEN` - the current `User` is not a landlord.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "users",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn users(ctx: &Context) -> Result<Vec<api::User>, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::users::List { initiator })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|users| users.into_iter().map(Into::into).collect())
    }

    /// Returns the `Property` with the specified ID, if it is listed.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "property",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn property(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<Option<api::Property>, Error> {
        ctx.service()
            .execute(query::property::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|p| p.map(Into::into))
    }

    /// Searches the listed `Property`s, newest first.
    ///
    /// Without a `filter` every listed `Property` is returned.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_ARGUMENT` - the `bhk` criterion is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            filter = ?filter,
            gql.name = "properties",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn properties(
        filter: Option<api::property::Filter>,
        ctx: &Context,
    ) -> Result<Vec<api::Property>, Error> {
        let filter: read::property::Filter = filter
            .unwrap_or_default()
            .try_into()
            .map_err(ctx.error())?;
        ctx.service()
            .execute(query::properties::Search::by(filter))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ps| ps.into_iter().map(Into::into).collect())
    }

    /// Returns the distinct values to search the `Property`s by.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "propertyFilterOptions",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn property_filter_options(
        ctx: &Context,
    ) -> Result<api::property::FilterOptions, Error> {
        ctx.service()
            .execute(query::properties::FilterOptions::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Property`s owned by the specified landlord, newest
    /// first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "ownedProperties",
            otel.name = Self::SPAN_NAME,
            owner_id = %owner_id,
        ),
    )]
    pub async fn owned_properties(
        owner_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Property>, Error> {
        ctx.service()
            .execute(query::properties::ByOwner(owner_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ps| ps.into_iter().map(Into::into).collect())
    }

    /// Returns the `RentApplication`s of the specified tenant, or the ones
    /// for the `Property`s of the specified landlord, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_ARGUMENT` - not exactly one of the IDs is provided;
    /// - `FORBIDDEN` - the provided ID is not the current `User`'s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "rentApplications",
            landlord_id = ?landlord_id,
            otel.name = Self::SPAN_NAME,
            tenant_id = ?tenant_id,
        ),
    )]
    pub async fn rent_applications(
        tenant_id: Option<api::user::Id>,
        landlord_id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<Vec<api::RentApplication>, Error> {
        let of = api::participant(tenant_id, landlord_id)
            .map_err(ctx.error())?;
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::ListRentApplications::new(initiator, of))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|apps| apps.into_iter().map(Into::into).collect())
    }

    /// Returns the `MaintenanceRequest`s of the specified tenant, or the
    /// ones for the `Property`s of the specified landlord, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_ARGUMENT` - not exactly one of the IDs is provided;
    /// - `FORBIDDEN` - the provided ID is not the current `User`'s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "maintenanceRequests",
            landlord_id = ?landlord_id,
            otel.name = Self::SPAN_NAME,
            tenant_id = ?tenant_id,
        ),
    )]
    pub async fn maintenance_requests(
        tenant_id: Option<api::user::Id>,
        landlord_id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<Vec<api::MaintenanceRequest>, Error> {
        let of = api::participant(tenant_id, landlord_id)
            .map_err(ctx.error())?;
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::ListMaintenanceRequests::new(initiator, of))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|reqs| reqs.into_iter().map(Into::into).collect())
    }

    /// Returns the `Payment`s of the specified tenant, or the ones for the
    /// `Property`s of the specified landlord, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_ARGUMENT` - not exactly one of the IDs is provided;
    /// - `FORBIDDEN` - the provided ID is not the current `User`'s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "payments",
            landlord_id = ?landlord_id,
            otel.name = Self::SPAN_NAME,
            tenant_id = ?tenant_id,
        ),
    )]
    pub async fn payments(
        tenant_id: Option<api::user::Id>,
        landlord_id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<Vec<api::Payment>, Error> {
        let of = api::participant(tenant_id, landlord_id)
            .map_err(ctx.error())?;
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::ListPayments::new(initiator, of))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ps| ps.into_iter().map(Into::into).collect())
    }

    /// Returns the `RentApplication` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - no such `RentApplication` exists;
    /// - `FORBIDDEN` - the current `User` is neither its tenant nor the
    ///                 landlord of its `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "rentApplication",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn rent_application(
        id: api::rent_application::Id,
        ctx: &Context,
    ) -> Result<api::RentApplication, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::RentApplicationById {
                initiator,
                id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `MaintenanceRequest` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - no such `MaintenanceRequest` exists;
    /// - `FORBIDDEN` - the current `User` is neither its tenant nor the
    ///                 landlord of its `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "maintenanceRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn maintenance_request(
        id: api::maintenance::Id,
        ctx: &Context,
    ) -> Result<api::MaintenanceRequest, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::MaintenanceRequestById {
                initiator,
                id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Payment` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - no such `Payment` exists;
    /// - `FORBIDDEN` - the current `User` is neither its tenant nor the
    ///                 landlord of its `Property`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "payment",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn payment(
        id: api::payment::Id,
        ctx: &Context,
    ) -> Result<api::Payment, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::PaymentById {
                initiator,
                id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the conversation with the specified tenant, oldest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FORBIDDEN` - the current `User` is neither the tenant nor the
    ///                 landlord of the `Property` the tenant occupies.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "messages",
            otel.name = Self::SPAN_NAME,
            tenant_id = %tenant_id,
        ),
    )]
    pub async fn messages(
        tenant_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Message>, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::messages::List {
                initiator,
                tenant_id: tenant_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ms| ms.into_iter().map(Into::into).collect())
    }

    /// Returns the conversations of the specified landlord with the tenants
    /// of their `Property`s, most recently active first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FORBIDDEN` - the provided ID is not the current `User`'s.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "conversations",
            landlord_id = %landlord_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn conversations(
        landlord_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Vec<api::message::Conversation>, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(query::messages::Conversations {
                initiator,
                landlord_id: landlord_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cs| cs.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum UserError {
        #[code = "NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "`User` does not exist"]
        NotExists,
    }
}
