//! [`Query`] collection related to a single [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, Session},
        User,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Query, Service,
};

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

/// [`Query`] returning the own [`User`] profile of the initiator.
#[derive(Clone, Copy, Debug)]
pub struct GetProfile {
    /// [`Session`] of the [`User`] asking.
    pub initiator: Session,
}

impl<Db> Query<GetProfile> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        GetProfile { initiator }: GetProfile,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        self.database()
            .execute(Select(By::new(initiator.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(initiator.user_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`GetProfile`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist anymore.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::UserNotExists(_) => Kind::NotFound,
        }
    }
}
