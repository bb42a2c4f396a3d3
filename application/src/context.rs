//! [`Context`]-related definitions.

use std::{
    future,
    sync::atomic::{self, AtomicU16},
};

use axum::{async_trait, extract::FromRequestParts};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::user,
};
use tokio::sync::OnceCell;

#[cfg(doc)]
use crate::api::User;
use crate::{api, define_error, server::ApiResponse, AsError, Error, Service};

/// Per-request GraphQL context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] executing commands and queries.
    service: Service,

    /// HTTP status to respond with if execution fails.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request being served.
    parts: http::request::Parts,

    /// Outcome of authenticating the request, resolved at most once.
    session: OnceCell<Result<Session, Error>>,
}

impl Context {
    /// Returns the [`Service`] serving this request.
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the HTTP status to respond with if execution fails.
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        let code = self.error_status_code.load(atomic::Ordering::Relaxed);
        http::StatusCode::from_u16(code)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Remembers the HTTP status of a failure, so the response carries it.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Returns a [`Result::map_err()`] callback recording the status of the
    /// passed [`Error`] via [`Context::set_error_status_code()`].
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Makes the provided `session` current, unless the request is already
    /// authenticated.
    ///
    /// Used right after signing in, so the rest of the operation sees the
    /// signed-in [`User`].
    pub async fn set_current_session(&self, session: Session) {
        _ = self.session.get_or_init(|| future::ready(Ok(session))).await;
    }

    /// Returns the [`Session`] the current request is authenticated with.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request carries no credential;
    /// - the provided credential is malformed, forged or expired.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.session.get_or_init(|| self.authenticate()).await.clone()
    }

    /// Applies the [`juniper::Variables`] provided by the client on GraphQL
    /// subscription initialization.
    ///
    /// # Errors
    ///
    /// Errors if the provided variables are invalid.
    pub(crate) fn apply_subscription_variables(
        &mut self,
        vars: &juniper::Variables,
    ) -> Result<(), Error> {
        let Some(token) = vars.get("authToken") else {
            return Ok(());
        };
        let header = token
            .as_string_value()
            .and_then(|t| format!("Bearer {t}").parse().ok())
            .ok_or_else(|| Error::from(AuthError::InvalidVariables))?;
        _ = self.parts.headers.insert(http::header::AUTHORIZATION, header);

        Ok(())
    }

    /// Verifies the credential of the `Authorization` header.
    ///
    /// # Errors
    ///
    /// Errors if the provided credential is absent or invalid.
    async fn authenticate(&self) -> Result<Session, Error> {
        let credential = self
            .parts
            .headers
            .get(http::header::AUTHORIZATION)
            .map(|h| {
                h.to_str()
                    .map(ToOwned::to_owned)
                    .map_err(|_| Error::from(AuthError::NonAsciiHeader))
            })
            .transpose()
            .map_err(self.error())?;

        self.service
            .execute(command::AuthorizeUserSession { credential })
            .await
            .map(|initiator| Session {
                user_id: initiator.user_id.into(),
                initiator,
            })
            .map_err(AsError::into_error)
            .map_err(self.error())
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = ApiResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let Some(service) = parts.extensions.get::<Service>().cloned() else {
            let err = Error::internal(&"missing `Service` extension");
            return Err(ApiResponse {
                status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                body: GraphQLBatchResponse::Single(GraphQLResponse::error(
                    err.into_field_error(),
                )),
            });
        };

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
            session: OnceCell::new(),
        })
    }
}

/// Authenticated session of a [`User`].
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// ID of the [`User`] associated with this [`Session`].
    pub user_id: api::user::Id,

    /// Verified session passed to commands and queries as their initiator.
    pub initiator: user::Session,
}

define_error! {
    enum AuthError {
        #[code = "UNAUTHENTICATED"]
        #[status = UNAUTHORIZED]
        #[message = "`Authorization` header must be visible ASCII"]
        NonAsciiHeader,

        #[code = "INVALID_VARIABLES"]
        #[status = BAD_REQUEST]
        #[message = "Invalid subscription authorization variables"]
        InvalidVariables,
    }
}
