//! [`Command`] for registering a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Password, Phone, Role};
use crate::{
    domain::{user, User},
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            password,
            role,
            phone,
        } = cmd;

        let existing = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let password_hash = user::PasswordHash::new(
            password.expose_secret(),
            self.config().credentials.password_cost,
        )
        .await
        .map_err(tracerr::from_and_wrap!(=> E))?;

        let now = DateTime::now();
        let user = User {
            id: user::Id::new(),
            name,
            email,
            password_hash,
            role,
            phone,
            address: None,
            avatar: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            last_login_at: None,
            deleted_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map_err(|e| match e.as_ref() {
                // Registered concurrently, after the check above.
                E::Db(db)
                    if db.is_unique_violation(Some(
                        database::USERS_EMAIL_CONSTRAINT,
                    )) =>
                {
                    tracerr::new!(E::EmailOccupied(user.email.clone()))
                }
                _ => e,
            })
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(
            user.id = %user.id,
            user.role = %user.role,
            "registered",
        );

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Failed to hash the [`Password`].
    #[display("Failed to hash the password: {_0}")]
    PasswordHashing(user::HashingError),

    /// [`user::Email`] is already registered.
    #[display("`{_0}` email is already registered")]
    #[from(ignore)]
    EmailOccupied(#[error(not(source))] user::Email),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::PasswordHashing(_) => Kind::StoreUnavailable,
            Self::EmailOccupied(_) => Kind::Conflict,
        }
    }
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::{Command as _, CreateUser},
        domain::user,
        error::{AsKind as _, Kind},
        spec::{register, service},
    };

    fn create(email: &str) -> CreateUser {
        CreateUser {
            name: user::Name::new("Asha").unwrap(),
            email: user::Email::new(email).unwrap(),
            password: SecretBox::init_with(|| {
                user::Password::new("secret1").unwrap()
            }),
            role: user::Role::Tenant,
            phone: None,
        }
    }

    #[tokio::test]
    async fn stores_normalized_email_and_hash() {
        let svc = service();

        let user = svc.execute(create(" Asha@Example.com")).await.unwrap();

        assert_eq!(user.email.to_string(), "asha@example.com");
        assert!(user
            .password_hash
            .verify(&user::Password::new("secret1").unwrap())
            .await);
        assert!(user.last_login_at.is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_email_in_any_case() {
        let svc = service();
        drop(register(&svc, "t1@example.com", user::Role::Landlord).await);

        for email in ["t1@example.com", "T1@EXAMPLE.COM", "T1@example.com"] {
            let err = svc.execute(create(email)).await.unwrap_err();

            assert_eq!(err.kind(), Kind::Conflict, "email: {email}");
        }
    }
}
