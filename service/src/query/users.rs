//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Query, Service,
};

/// [`Query`] listing every registered [`User`], oldest first.
///
/// Available to any landlord.
#[derive(Clone, Copy, Debug)]
pub struct List {
    /// [`Session`] of the landlord asking.
    pub initiator: Session,
}

impl<Db> Query<List> for Service<Db>
where
    Db: Database<
        Select<By<Vec<User>, ()>>,
        Ok = Vec<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<User>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        List { initiator }: List,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        initiator
            .require_role(user::Role::Landlord)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`List`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is not a landlord.
    #[display("{_0}")]
    Forbidden(session::Forbidden),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::user,
        error::{AsKind as _, Kind},
        query::users,
        spec::{register, service},
        Query as _,
    };

    #[tokio::test]
    async fn landlords_see_everyone() {
        let svc = service();
        let (_, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;

        let users = svc
            .execute(users::List {
                initiator: landlord,
            })
            .await
            .unwrap();
        let ids = users.iter().map(|u| u.id).collect::<Vec<_>>();
        assert_eq!(ids, [tenant.user_id, landlord.user_id]);

        let err = svc
            .execute(users::List { initiator: tenant })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Forbidden);
    }
}
