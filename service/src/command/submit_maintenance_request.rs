//! [`Command`] for filing a [`MaintenanceRequest`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        maintenance, property,
        user::{self, session, Session},
        MaintenanceRequest, Property,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for filing a [`MaintenanceRequest`] about a [`Property`].
#[derive(Clone, Debug)]
pub struct SubmitMaintenanceRequest {
    /// [`Session`] of the filing tenant.
    pub initiator: Session,

    /// ID of the [`Property`] needing maintenance.
    pub property_id: property::Id,

    /// Short [`maintenance::Title`] of the issue.
    pub title: maintenance::Title,

    /// Detailed [`maintenance::Description`] of the issue.
    pub description: maintenance::Description,

    /// [`maintenance::Priority`], [`maintenance::Priority::Medium`] if
    /// omitted.
    pub priority: Option<maintenance::Priority>,
}

impl<Db> Command<SubmitMaintenanceRequest> for Service<Db>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Insert<MaintenanceRequest>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = MaintenanceRequest;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitMaintenanceRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitMaintenanceRequest {
            initiator,
            property_id,
            title,
            description,
            priority,
        } = cmd;
        initiator
            .require_role(user::Role::Tenant)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        drop(
            self.database()
                .execute(Select(By::new(property_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::PropertyNotExists(property_id))
                .map_err(tracerr::wrap!())?,
        );

        let request = MaintenanceRequest::new(
            initiator.user_id,
            property_id,
            title,
            description,
            priority.unwrap_or_default(),
        );

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(request.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(request)
    }
}

/// Error of [`SubmitMaintenanceRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is not a tenant.
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::PropertyNotExists(_) => Kind::NotFound,
        }
    }
}
