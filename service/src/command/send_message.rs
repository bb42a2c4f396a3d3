//! [`Command`] for sending a [`Message`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        message,
        user::{self, session, Session},
        Message, Property,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for sending a [`Message`] in the conversation of a tenant.
///
/// A tenant writes only in their own conversation, while a landlord writes
/// only to tenants occupying one of their [`Property`]s.
#[derive(Clone, Debug)]
pub struct SendMessage {
    /// [`Session`] of the sender.
    pub initiator: Session,

    /// [`user::Role`] the [`Message`] is sent as.
    pub from: user::Role,

    /// [`user::Role`] the [`Message`] is sent to.
    pub to: user::Role,

    /// Text of the [`Message`].
    pub text: String,

    /// ID of the tenant whose conversation this is.
    pub tenant_id: user::Id,
}

impl<Db> Command<SendMessage> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Property>, read::property::Filter>>,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Message>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Message;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SendMessage) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SendMessage {
            initiator,
            from,
            to,
            text,
            tenant_id,
        } = cmd;
        let text = message::Text::new(text)
            .ok_or(E::InvalidText)
            .map_err(tracerr::wrap!())?;

        initiator
            .require_role(from)
            .map_err(tracerr::from_and_wrap!(=> E))?;
        if from == user::Role::Tenant {
            initiator
                .require_ownership(tenant_id)
                .map_err(tracerr::from_and_wrap!(=> E))?;
        }

        let occupied = self
            .database()
            .execute(Select(By::new(read::property::Filter::occupied_by(
                tenant_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let property_id = match from {
            user::Role::Tenant => occupied.first().map(|p| p.id),
            user::Role::Landlord => Some(
                occupied
                    .iter()
                    .find(|p| p.owner_id == initiator.user_id)
                    .map(|p| p.id)
                    .ok_or(session::Forbidden(initiator.user_id))
                    .map_err(tracerr::from_and_wrap!(=> E))?,
            ),
        };

        let message = Message {
            id: message::Id::new(),
            tenant_id,
            property_id,
            from,
            to,
            text,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(message.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(message)
    }
}

/// Error of [`SendMessage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator may not write in this conversation.
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// [`Message`] text is blank or too long.
    #[display("`Message` text must be non-blank and at most 4096 characters")]
    InvalidText,
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::InvalidText => Kind::InvalidArgument,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{Command as _, SendMessage},
        domain::user::{self, Role},
        error::{AsKind as _, Kind},
        spec::{list_property, move_in, register, service},
    };

    fn send(
        initiator: user::Session,
        from: Role,
        to: Role,
        tenant_id: user::Id,
        text: &str,
    ) -> SendMessage {
        SendMessage {
            initiator,
            from,
            to,
            text: text.into(),
            tenant_id,
        }
    }

    #[tokio::test]
    async fn records_occupied_property() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", Role::Landlord).await;
        let (_, tenant) = register(&svc, "t1@example.com", Role::Tenant).await;
        let property =
            list_property(&svc, landlord, "Dum Dum", "Kolkata", "6000INR")
                .await;

        let hello =
            send(tenant, Role::Tenant, Role::Landlord, tenant.user_id, "Hi");
        let before = svc.execute(hello).await.unwrap();
        assert_eq!(before.property_id, None);

        move_in(&svc, landlord, tenant, &property).await;

        let reply = svc
            .execute(send(
                landlord,
                Role::Landlord,
                Role::Tenant,
                tenant.user_id,
                "Welcome",
            ))
            .await
            .unwrap();
        assert_eq!(reply.property_id, Some(property.id));
        assert_eq!(reply.tenant_id, tenant.user_id);
        assert_eq!(reply.text.to_string(), "Welcome");
    }

    #[tokio::test]
    async fn guards_conversations() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", Role::Landlord).await;
        let (_, stranger) =
            register(&svc, "other@example.com", Role::Landlord).await;
        let (_, tenant) = register(&svc, "t1@example.com", Role::Tenant).await;
        let (_, neighbour) =
            register(&svc, "t2@example.com", Role::Tenant).await;
        let property =
            list_property(&svc, landlord, "Dum Dum", "Kolkata", "6000INR")
                .await;
        move_in(&svc, landlord, tenant, &property).await;

        let (t, l) = (Role::Tenant, Role::Landlord);
        for cmd in [
            send(tenant, l, t, tenant.user_id, "Hi"),
            send(neighbour, t, l, tenant.user_id, "Hi"),
            send(stranger, l, t, tenant.user_id, "Hi"),
            send(landlord, l, t, neighbour.user_id, "Hi"),
        ] {
            let err = svc.execute(cmd).await.unwrap_err();
            assert_eq!(err.kind(), Kind::Forbidden);
        }

        let err = svc
            .execute(send(tenant, t, l, tenant.user_id, " "))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidArgument);
    }
}
