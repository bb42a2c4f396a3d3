//! [`Command`] for authorizing a [`User`] by the presented credential.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, Session},
        User,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by the presented credential.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// Raw `Authorization` header value, if any was presented.
    pub credential: Option<String>,
}

impl AuthorizeUserSession {
    /// Scheme prefix of the credential.
    const SCHEME: &'static str = "Bearer ";
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let credential = cmd
            .credential
            .ok_or(E::NoCredential)
            .map_err(tracerr::wrap!())?;
        let token = credential
            .strip_prefix(AuthorizeUserSession::SCHEME)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(E::MalformedCredential)
            .map_err(tracerr::wrap!())?;

        let session = jsonwebtoken::decode::<Session>(
            token,
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        drop(
            self.database()
                .execute(Select(By::new(session.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(session.user_id))
                .map_err(tracerr::wrap!())?,
        );

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// No credential was presented.
    #[display("No credential presented")]
    NoCredential,

    /// Credential is not of the `Bearer <token>` form.
    ///
    /// A token that doesn't parse as a JSON Web Token is reported as a
    /// [`ExecutionError::JsonWebTokenDecodeError`] of the same [`Kind`].
    #[display("Credential is not a bearer token")]
    MalformedCredential,

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::NoCredential | Self::MalformedCredential => {
                Kind::Unauthenticated
            }
            Self::JsonWebTokenDecodeError(e) => {
                use jsonwebtoken::errors::ErrorKind as K;

                match e.kind() {
                    K::InvalidToken
                    | K::Base64(_)
                    | K::Json(_)
                    | K::Utf8(_) => Kind::Unauthenticated,
                    _ => Kind::InvalidCredential,
                }
            }
            Self::UserNotExists(_) => Kind::InvalidCredential,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;
    use secrecy::SecretBox;

    use crate::{
        command::{
            AuthorizeUserSession, Command as _, CreateUserSession, DeleteUser,
        },
        domain::user,
        error::{AsKind as _, Kind},
        spec::{register, service},
    };

    #[tokio::test]
    async fn resolves_session_of_bearer_token() {
        let svc = service();
        let (user, _) =
            register(&svc, "asha@example.com", user::Role::Tenant).await;
        let login = svc
            .execute(CreateUserSession {
                email: user.email.clone(),
                password: SecretBox::init_with(|| {
                    user::Password::new("secret1").unwrap()
                }),
                role: user::Role::Tenant,
            })
            .await
            .unwrap();

        let session = svc
            .execute(AuthorizeUserSession {
                credential: Some(format!("Bearer {}", login.token)),
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, user::Role::Tenant);
        assert_eq!(session.expires_at, login.expires_at);
    }

    #[tokio::test]
    async fn rejects_missing_or_malformed_credentials() {
        let svc = service();

        for (credential, kind) in [
            (None, Kind::Unauthenticated),
            (Some("Basic dXNlcjpwYXNz"), Kind::Unauthenticated),
            (Some("Bearer "), Kind::Unauthenticated),
            (Some("Bearer garbage"), Kind::Unauthenticated),
            (Some("Bearer not.a.jwt"), Kind::Unauthenticated),
        ] {
            let err = svc
                .execute(AuthorizeUserSession {
                    credential: credential.map(Into::into),
                })
                .await
                .unwrap_err();

            assert_eq!(err.kind(), kind, "credential: {credential:?}");
        }
    }

    #[tokio::test]
    async fn rejects_forged_token() {
        let svc = service();
        let (user, _) =
            register(&svc, "asha@example.com", user::Role::Tenant).await;
        let forged = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &user::Session {
                user_id: user.id,
                role: user::Role::Landlord,
                expires_at: (DateTime::now() + Duration::from_secs(60))
                    .whole_seconds()
                    .coerce(),
            },
            &jsonwebtoken::EncodingKey::from_secret(b"another-secret"),
        )
        .unwrap();

        let err = svc
            .execute(AuthorizeUserSession {
                credential: Some(format!("Bearer {forged}")),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidCredential);
    }

    #[tokio::test]
    async fn rejects_token_of_deleted_user() {
        let svc = service();
        let (user, session) =
            register(&svc, "gone@example.com", user::Role::Tenant).await;
        let login = svc
            .execute(CreateUserSession {
                email: user.email.clone(),
                password: SecretBox::init_with(|| {
                    user::Password::new("secret1").unwrap()
                }),
                role: user::Role::Tenant,
            })
            .await
            .unwrap();
        svc.execute(DeleteUser { initiator: session }).await.unwrap();

        let err = svc
            .execute(AuthorizeUserSession {
                credential: Some(format!("Bearer {}", login.token)),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::InvalidCredential);
    }
}
