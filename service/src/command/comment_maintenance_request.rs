//! [`Command`] for commenting on a [`MaintenanceRequest`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        maintenance, property,
        user::{session, Session},
        MaintenanceRequest, Property,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a [`maintenance::Comment`] to a
/// [`MaintenanceRequest`].
///
/// Both the filing tenant and the landlord owning the [`Property`] may
/// comment.
#[derive(Clone, Debug)]
pub struct CommentMaintenanceRequest {
    /// [`Session`] of the commenting user.
    pub initiator: Session,

    /// ID of the [`MaintenanceRequest`] to comment on.
    pub request_id: maintenance::Id,

    /// Text of the comment.
    pub text: String,
}

impl<Db> Command<CommentMaintenanceRequest> for Service<Db>
where
    Db: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<MaintenanceRequest>, maintenance::Id>>,
            Ok = Option<MaintenanceRequest>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<MaintenanceRequest, maintenance::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Update<MaintenanceRequest>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = MaintenanceRequest;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CommentMaintenanceRequest,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CommentMaintenanceRequest {
            initiator,
            request_id,
            text,
        } = cmd;
        let text = maintenance::CommentText::new(text)
            .ok_or(E::InvalidText)
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(request_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut request = tx
            .execute(Select(By::<Option<MaintenanceRequest>, _>::new(
                request_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RequestNotExists(request_id))
            .map_err(tracerr::wrap!())?;

        if initiator.user_id != request.tenant_id {
            self.database()
                .execute(Select(By::<Option<Property>, _>::new(
                    request.property_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .map_or(Err(session::Forbidden(initiator.user_id)), |p| {
                    initiator.require_ownership(p.owner_id)
                })
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }

        request.add_comment(initiator.user_id, text);
        request.updated_at = DateTime::now().coerce();

        tx.execute(Update(request.clone()))
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

/// Error of [`CommentMaintenanceRequest`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator is neither the filing tenant nor the owning landlord.
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// Comment text is blank or too long.
    #[display("Comment text must be non-blank and at most 4096 characters")]
    InvalidText,

    /// [`MaintenanceRequest`] doesn't exist.
    #[display("`MaintenanceRequest(id: {_0})` does not exist")]
    #[from(ignore)]
    RequestNotExists(#[error(not(source))] maintenance::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::InvalidText => Kind::InvalidArgument,
            Self::RequestNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{
            Command as _, CommentMaintenanceRequest, SubmitMaintenanceRequest,
        },
        domain::{maintenance, user},
        error::{AsKind as _, Kind},
        spec::{list_property, register, service},
    };

    #[tokio::test]
    async fn tenant_and_landlord_discuss_in_order() {
        let svc = service();
        let (landlord_user, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (tenant_user, tenant) =
            register(&svc, "t1@example.com", user::Role::Tenant).await;
        let (_, stranger) =
            register(&svc, "t2@example.com", user::Role::Tenant).await;
        let property =
            list_property(&svc, landlord, "Howrah", "Kolkata", "7000INR").await;
        let request = svc
            .execute(SubmitMaintenanceRequest {
                initiator: tenant,
                property_id: property.id,
                title: maintenance::Title::new("No water").unwrap(),
                description: maintenance::Description::new("Since morning")
                    .unwrap(),
                priority: Some(maintenance::Priority::High),
            })
            .await
            .unwrap();

        let comment = |initiator, text: &str| CommentMaintenanceRequest {
            initiator,
            request_id: request.id,
            text: text.into(),
        };

        let err = svc.execute(comment(tenant, "   ")).await.unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidArgument);
        let err = svc.execute(comment(stranger, "Me too")).await.unwrap_err();
        assert_eq!(err.kind(), Kind::Forbidden);

        drop(svc.execute(comment(tenant, "Any news?")).await.unwrap());
        let request = svc
            .execute(comment(landlord, "Plumber comes tomorrow"))
            .await
            .unwrap();

        let authors = request
            .comments()
            .iter()
            .map(|c| (c.author_id, c.text.to_string()))
            .collect::<Vec<_>>();
        assert_eq!(
            authors,
            [
                (tenant_user.id, "Any news?".to_owned()),
                (landlord_user.id, "Plumber comes tomorrow".to_owned()),
            ],
        );
        assert_eq!(request.priority, maintenance::Priority::High);
    }
}
