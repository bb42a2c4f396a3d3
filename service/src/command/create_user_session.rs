//! [`Command`] for signing a [`User`] in.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password, Role};
use crate::{
    domain::{
        user::{self, session, Session},
        Property, User,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for signing a [`User`] in, creating a new [`Session`].
#[derive(Clone, Debug)]
pub struct CreateUserSession {
    /// [`Email`] of the [`User`].
    pub email: user::Email,

    /// [`Password`] of the [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Role`] the [`User`] signs in as.
    pub role: user::Role,
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,

    /// [`Property`] the signed in tenant occupies, if any.
    pub property: Option<Property>,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Property>, read::property::Filter>>,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<User, user::Id>>, Err = Traced<database::Error>>
        + Database<Update<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession {
            email,
            password,
            role,
        } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(email.clone()))
            .map_err(tracerr::wrap!())?;
        if user.role != role {
            return Err(tracerr::new!(E::RoleMismatch(user.role)));
        }
        if !user.password_hash.verify(password.expose_secret()).await {
            return Err(tracerr::new!(E::WrongCredentials));
        }

        let now = DateTime::now();
        // Claims keep whole seconds only.
        let expires_at = (now + self.config().credentials.session_ttl)
            .whole_seconds()
            .coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                role: user.role,
                expires_at,
            },
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(user.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(email.clone()))
            .map_err(tracerr::wrap!())?;
        user.last_login_at = Some(now.coerce());
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let property = match user.role {
            user::Role::Tenant => self
                .database()
                .execute(Select(By::new(read::property::Filter::occupied_by(
                    user.id,
                ))))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .into_iter()
                .next(),
            user::Role::Landlord => None,
        };

        tracing::debug!(user.id = %user.id, "signed in");

        Ok(Output {
            token,
            user,
            expires_at,
            property,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// No [`User`] with the provided [`Email`] exists.
    #[display("`User` with `{_0}` email does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Email),

    /// [`User`] exists, but with another [`Role`].
    #[display("`User` is registered as `{_0}`")]
    #[from(ignore)]
    RoleMismatch(#[error(not(source))] user::Role),

    /// [`Password`] does not match.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::JsonWebTokenEncodeError(_) => Kind::StoreUnavailable,
            Self::UserNotExists(_) => Kind::NotFound,
            Self::RoleMismatch(_) => Kind::Forbidden,
            Self::WrongCredentials => Kind::InvalidCredential,
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{
            create_user_session::ExecutionError, Command as _,
            CreateUserSession, DecideRentApplication, SubmitRentApplication,
        },
        domain::{rent_application::Decision, user},
        error::{AsKind as _, Kind},
        spec::{list_property, register, service},
    };

    fn login(
        email: &str,
        password: &str,
        role: user::Role,
    ) -> CreateUserSession {
        CreateUserSession {
            email: user::Email::new(email).unwrap(),
            password: SecretBox::init_with(|| {
                user::Password::new(password).unwrap()
            }),
            role,
        }
    }

    #[tokio::test]
    async fn stamps_last_login() {
        let svc = service();
        drop(register(&svc, "owner@example.com", user::Role::Landlord).await);

        let out = svc
            .execute(login(
                "OWNER@example.com",
                "secret1",
                user::Role::Landlord,
            ))
            .await
            .unwrap();

        assert!(out.user.last_login_at.is_some());
        assert!(out.property.is_none());
        assert!(!out.token.to_string().is_empty());
    }

    #[tokio::test]
    async fn tenant_signing_in_as_landlord_is_role_mismatch() {
        let svc = service();
        drop(register(&svc, "t1@example.com", user::Role::Tenant).await);

        let err = svc
            .execute(login("t1@example.com", "secret1", user::Role::Landlord))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::RoleMismatch(user::Role::Tenant),
        ));
        assert_eq!(err.kind(), Kind::Forbidden);
    }

    #[tokio::test]
    async fn rejects_unknown_email_and_wrong_password() {
        let svc = service();
        drop(register(&svc, "t1@example.com", user::Role::Tenant).await);

        let err = svc
            .execute(login("t2@example.com", "secret1", user::Role::Tenant))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);

        let err = svc
            .execute(login("t1@example.com", "secret2", user::Role::Tenant))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidCredential);
    }

    #[tokio::test]
    async fn tenant_gets_occupied_property() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (_, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let property =
            list_property(&svc, landlord, "Bandel", "Kolkata", "9000INR").await;
        let app = svc
            .execute(SubmitRentApplication {
                initiator: tenant,
                property_id: property.id,
            })
            .await
            .unwrap();
        drop(
            svc.execute(DecideRentApplication {
                initiator: landlord,
                application_id: app.id,
                decision: Decision::Approved,
            })
            .await
            .unwrap(),
        );

        let out = svc
            .execute(login("t1@example.com", "secret1", user::Role::Tenant))
            .await
            .unwrap();

        assert_eq!(out.property.map(|p| p.id), Some(property.id));
    }
}
