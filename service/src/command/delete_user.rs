//! [`Command`] for deleting the signed in [`User`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property,
        user::{self, session, Session},
        Property, User,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting the signed in [`User`].
///
/// Only tenants may delete their accounts. Properties the tenant occupies
/// become vacant.
#[derive(Clone, Copy, Debug)]
pub struct DeleteUser {
    /// [`Session`] of the [`User`] to delete.
    pub initiator: Session,
}

impl<Db> Command<DeleteUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Property>, read::property::Filter>>,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<User, user::Id>>, Err = Traced<database::Error>>
        + Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Err = Traced<database::Error>>
        + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser { initiator } = cmd;
        initiator
            .require_role(user::Role::Tenant)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let user_id = initiator.user_id;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        user.deleted_at = Some(now.coerce());
        user.updated_at = now.coerce();
        tx.execute(Update(user))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let occupied = tx
            .execute(Select(By::new(read::property::Filter::occupied_by(
                user_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        for property_id in occupied.into_iter().map(|p| p.id) {
            tx.execute(Lock(By::<Property, _>::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            let Some(mut property) = tx
                .execute(Select(By::<Option<Property>, _>::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
            else {
                continue;
            };
            if property.occupant_id != Some(user_id) {
                continue;
            }
            property.occupant_id = None;
            tx.execute(Update(property))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tracing::info!(property.id = %property_id, "vacated");
        }

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tracing::info!(user.id = %user_id, "deleted");

        Ok(())
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] is not a tenant.
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::UserNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Select};

    use crate::{
        command::{
            Command as _, CreateUser, DecideRentApplication, DeleteUser,
            SubmitRentApplication,
        },
        domain::{rent_application::Decision, user, Property},
        error::{AsKind as _, Kind},
        infra::Database as _,
        spec::{list_property, register, service},
    };

    #[tokio::test]
    async fn only_tenants_delete_themselves() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;

        let err = svc
            .execute(DeleteUser {
                initiator: landlord,
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Forbidden);
    }

    #[tokio::test]
    async fn deleted_email_can_register_again() {
        let svc = service();
        let (user, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;

        svc.execute(DeleteUser { initiator: tenant }).await.unwrap();
        let err = svc
            .execute(DeleteUser { initiator: tenant })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);

        let again = svc
            .execute(CreateUser {
                name: user.name,
                email: user.email,
                password: secrecy::SecretBox::init_with(|| {
                    user::Password::new("secret1").unwrap()
                }),
                role: user::Role::Tenant,
                phone: None,
            })
            .await
            .unwrap();
        assert_ne!(again.id, user.id);
    }

    #[tokio::test]
    async fn leaving_occupant_vacates_property() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (_, first) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let (_, second) =
            register(&svc, "t2@example.com", user::Role::Tenant).await;
        let property =
            list_property(&svc, landlord, "Bandel", "Kolkata", "9000INR").await;
        let svc = &svc;
        let occupant = || async move {
            svc.database()
                .execute(Select(By::<Option<Property>, _>::new(property.id)))
                .await
                .unwrap()
                .unwrap()
                .occupant_id
        };
        let move_in = |tenant: user::Session| async move {
            let app = svc
                .execute(SubmitRentApplication {
                    initiator: tenant,
                    property_id: property.id,
                })
                .await
                .unwrap();
            svc.execute(DecideRentApplication {
                initiator: landlord,
                application_id: app.id,
                decision: Decision::Approved,
            })
            .await
        };

        drop(move_in(first).await.unwrap());
        svc.execute(DeleteUser { initiator: first }).await.unwrap();
        assert_eq!(occupant().await, None);

        drop(move_in(second).await.unwrap());
        assert_eq!(occupant().await, Some(second.user_id));
    }
}
