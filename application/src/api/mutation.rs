//! GraphQL [`Mutation`]s definitions.

use common::{DateTime, Money};
use juniper::graphql_object;
use service::{command, domain, Command as _};
use tracerr::Traced;

use crate::{api, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `User` and signs them in.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONFLICT` - provided `UserEmail` is registered already.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "register",
            name = %name,
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn register(
        name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        role: api::user::Role,
        phone: Option<api::user::Phone>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let sign_in_password = password.clone();
        let user = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                role: role.into(),
                phone: phone.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Self::sign_in(user.email, sign_in_password, user.role, ctx).await
    }

    /// Signs in the `User` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - no `User` is registered with the provided `UserEmail`;
    /// - `ROLE_MISMATCH` - the `User` is registered with another `UserRole`;
    /// - `INVALID_CREDENTIAL` - provided password is wrong.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "login",
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn login(
        email: api::user::Email,
        password: api::user::Password,
        role: api::user::Role,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        Self::sign_in(email.into(), password, role.into(), ctx).await
    }

    /// Updates the profile of the current `User`.
    ///
    /// Absent arguments are left as they are.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProfile",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_profile(
        name: Option<api::user::Name>,
        phone: Option<api::user::Phone>,
        address: Option<api::user::Address>,
        avatar: Option<api::user::Avatar>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::UpdateUserProfile {
                initiator,
                name: name.map(Into::into),
                phone: phone.map(Into::into),
                address: address.map(Into::into),
                avatar: avatar.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the account of the current tenant.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FORBIDDEN` - the current `User` is a landlord.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteAccount",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_account(ctx: &Context) -> Result<bool, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::DeleteUser { initiator })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Lists a new `Property` owned by the current landlord.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FORBIDDEN` - the current `User` is not a landlord;
    /// - `INVALID_ARGUMENT` - a count is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createProperty",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_property(
        input: api::property::Input,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let details: domain::property::Details =
            input.try_into().map_err(ctx.error())?;
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::CreateProperty { initiator, details })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `Property` owned by the current landlord.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Property` does not exist;
    /// - `FORBIDDEN` - the `Property` is owned by someone else;
    /// - `INVALID_ARGUMENT` - a count is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProperty",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_property(
        id: api::property::Id,
        changes: api::property::Changes,
        ctx: &Context,
    ) -> Result<api::Property, Error> {
        let changes: command::update_property::Changes =
            changes.try_into().map_err(ctx.error())?;
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::UpdateProperty {
                initiator,
                property_id: id.into(),
                changes,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes the `Property` owned by the current landlord from listing.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Property` does not exist;
    /// - `FORBIDDEN` - the `Property` is owned by someone else.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteProperty",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_property(
        id: api::property::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::DeleteProperty {
                initiator,
                property_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Applies the current tenant to rent the `Property`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FORBIDDEN` - the current `User` is not a tenant;
    /// - `NOT_FOUND` - the `Property` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "submitRentApplication",
            otel.name = Self::SPAN_NAME,
            property_id = %property_id,
        ),
    )]
    pub async fn submit_rent_application(
        property_id: api::property::Id,
        ctx: &Context,
    ) -> Result<api::RentApplication, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::SubmitRentApplication {
                initiator,
                property_id: property_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Approves or rejects the `RentApplication` for a `Property` of the
    /// current landlord.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `RentApplication` or its `Property` does not
    ///                 exist;
    /// - `FORBIDDEN` - the `Property` is owned by someone else;
    /// - `INVALID_TRANSITION` - the `RentApplication` is decided already;
    /// - `CONFLICT` - the `Property` is occupied by another tenant.
    #[tracing::instrument(
        skip_all,
        fields(
            decision = ?decision,
            gql.name = "decideRentApplication",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn decide_rent_application(
        id: api::rent_application::Id,
        decision: api::rent_application::Decision,
        ctx: &Context,
    ) -> Result<api::RentApplication, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::DecideRentApplication {
                initiator,
                application_id: id.into(),
                decision: decision.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Files a new `MaintenanceRequest` for the `Property`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `FORBIDDEN` - the current `User` is not a tenant;
    /// - `NOT_FOUND` - the `Property` does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "submitMaintenanceRequest",
            otel.name = Self::SPAN_NAME,
            priority = ?priority,
            property_id = %property_id,
        ),
    )]
    pub async fn submit_maintenance_request(
        property_id: api::property::Id,
        title: api::maintenance::Title,
        description: api::maintenance::Description,
        priority: Option<api::maintenance::Priority>,
        ctx: &Context,
    ) -> Result<api::MaintenanceRequest, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::SubmitMaintenanceRequest {
                initiator,
                property_id: property_id.into(),
                title: title.into(),
                description: description.into(),
                priority: priority.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `MaintenanceRequest` for a `Property` of the current
    /// landlord.
    ///
    /// Absent arguments are left as they are.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `MaintenanceRequest` does not exist;
    /// - `FORBIDDEN` - the `Property` is owned by someone else.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateMaintenanceRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
            priority = ?priority,
            status = ?status,
        ),
    )]
    pub async fn update_maintenance_request(
        id: api::maintenance::Id,
        status: Option<api::maintenance::Status>,
        description: Option<api::maintenance::Description>,
        priority: Option<api::maintenance::Priority>,
        ctx: &Context,
    ) -> Result<api::MaintenanceRequest, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::UpdateMaintenanceRequest {
                initiator,
                request_id: id.into(),
                status: status.map(Into::into),
                description: description.map(Into::into),
                priority: priority.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Leaves a comment on the `MaintenanceRequest`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_ARGUMENT` - the `text` is blank;
    /// - `NOT_FOUND` - the `MaintenanceRequest` does not exist;
    /// - `FORBIDDEN` - the current `User` is neither the filing tenant nor
    ///                 the owning landlord.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "commentMaintenanceRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn comment_maintenance_request(
        id: api::maintenance::Id,
        text: String,
        ctx: &Context,
    ) -> Result<api::MaintenanceRequest, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::CommentMaintenanceRequest {
                initiator,
                request_id: id.into(),
                text,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `MaintenanceRequest`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `MaintenanceRequest` does not exist;
    /// - `FORBIDDEN` - the current `User` is neither the filing tenant nor
    ///                 the owning landlord.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteMaintenanceRequest",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_maintenance_request(
        id: api::maintenance::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::DeleteMaintenanceRequest {
                initiator,
                request_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|()| true)
    }

    /// Records a rent `Payment` the tenant owes for a `Property` of the
    /// current landlord.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_FOUND` - the `Property` or the tenant does not exist;
    /// - `FORBIDDEN` - the `Property` is owned by someone else.
    #[tracing::instrument(
        skip_all,
        fields(
            amount = %amount,
            gql.name = "recordPayment",
            otel.name = Self::SPAN_NAME,
            property_id = %property_id,
            tenant_id = %tenant_id,
        ),
    )]
    pub async fn record_payment(
        tenant_id: api::user::Id,
        property_id: api::property::Id,
        amount: Money,
        method: Option<api::payment::Method>,
        due_at: Option<DateTime>,
        ctx: &Context,
    ) -> Result<api::Payment, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::RecordPayment {
                initiator,
                tenant_id: tenant_id.into(),
                property_id: property_id.into(),
                amount,
                method: method.map(Into::into),
                due_at: due_at.map(|d| d.coerce()),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Sends a `Message` in the conversation with the tenant.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_ARGUMENT` - the `text` is blank;
    /// - `FORBIDDEN` - the current `User` cannot speak as `from` in this
    ///                 conversation.
    #[tracing::instrument(
        skip_all,
        fields(
            from = ?from,
            gql.name = "sendMessage",
            otel.name = Self::SPAN_NAME,
            tenant_id = %tenant_id,
            to = ?to,
        ),
    )]
    pub async fn send_message(
        from: api::user::Role,
        to: api::user::Role,
        text: String,
        tenant_id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::Message, Error> {
        let initiator = ctx.current_session().await?.initiator;
        ctx.service()
            .execute(command::SendMessage {
                initiator,
                from: from.into(),
                to: to.into(),
                text,
                tenant_id: tenant_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl Mutation {
    /// Creates a new `Session` and makes it the current one of the provided
    /// [`Context`].
    async fn sign_in(
        email: domain::user::Email,
        password: api::user::Password,
        role: domain::user::Role,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession {
                email,
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                role,
            })
            .await
            .map_err(sign_in_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            initiator: domain::user::Session {
                user_id: output.user.id,
                role: output.user.role,
                expires_at: output.expires_at,
            },
        })
        .await;

        Ok(output.into())
    }
}

/// Converts a failed sign-in into an [`Error`], singling out a wrong role.
fn sign_in_error(
    e: Traced<command::create_user_session::ExecutionError>,
) -> Error {
    use command::create_user_session::ExecutionError as E;

    let mut err = e.as_error();
    if matches!(e.as_ref(), E::RoleMismatch(_)) {
        err.code = "ROLE_MISMATCH";
    }
    err
}

#[cfg(test)]
mod spec {
    use service::{command::create_user_session::ExecutionError, domain};

    use super::sign_in_error;

    #[test]
    fn role_mismatch_has_own_code() {
        let err = sign_in_error(tracerr::new!(ExecutionError::RoleMismatch(
            domain::user::Role::Tenant,
        )));
        assert_eq!(err.code, "ROLE_MISMATCH");
        assert_eq!(err.status_code, http::StatusCode::FORBIDDEN);

        let err =
            sign_in_error(tracerr::new!(ExecutionError::WrongCredentials));
        assert_eq!(err.code, "INVALID_CREDENTIAL");
    }
}
