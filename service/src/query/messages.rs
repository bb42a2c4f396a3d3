//! [`Query`] collection related to [`Message`]s.

use std::collections::{hash_map::Entry, HashMap};

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property,
        user::{self, session, Session},
        Message, Property, User,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    read::{self, message::Conversation},
    Query, Service,
};

/// [`Query`] listing the conversation of a tenant, oldest [`Message`] first.
///
/// Available to the tenant and to the landlord of the [`Property`] the tenant
/// occupies.
#[derive(Clone, Copy, Debug)]
pub struct List {
    /// [`Session`] of the asking user.
    pub initiator: Session,

    /// ID of the tenant whose conversation is listed.
    pub tenant_id: user::Id,
}

impl<Db> Query<List> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Property>, read::property::Filter>>,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Message>, read::Scope>>,
            Ok = Vec<Message>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Message>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        List {
            initiator,
            tenant_id,
        }: List,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let is_tenant = initiator.role == user::Role::Tenant
            && initiator.user_id == tenant_id;
        if !is_tenant {
            initiator
                .require_role(user::Role::Landlord)
                .map_err(tracerr::from_and_wrap!(=> E))?;
            let occupied = self
                .database()
                .execute(Select(By::new(
                    read::property::Filter::occupied_by(tenant_id),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !occupied.iter().any(|p| p.owner_id == initiator.user_id) {
                return Err(tracerr::new!(E::Forbidden(session::Forbidden(
                    initiator.user_id
                ))));
            }
        }

        self.database()
            .execute(Select(By::new(read::Scope::Tenant(tenant_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// [`Query`] summarizing the conversations a landlord has with tenants of
/// their [`Property`]s.
///
/// Each tenant appears once, with their latest [`Message`]. The most recent
/// conversation goes first.
#[derive(Clone, Copy, Debug)]
pub struct Conversations {
    /// [`Session`] of the asking landlord.
    pub initiator: Session,

    /// ID of the landlord whose conversations are listed.
    pub landlord_id: user::Id,
}

impl<Db> Query<Conversations> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Property>, read::property::Filter>>,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Message>, read::Scope>>,
            Ok = Vec<Message>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<user::Id, User>, Vec<user::Id>>>,
            Ok = HashMap<user::Id, User>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<Conversation>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Conversations {
            initiator,
            landlord_id,
        }: Conversations,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        initiator
            .require_role(user::Role::Landlord)
            .and_then(|()| initiator.require_ownership(landlord_id))
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let titles = self
            .database()
            .execute(Select(By::new(read::property::Filter::owned_by(
                landlord_id,
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .map(|p| (p.id, p.title()))
            .collect::<HashMap<property::Id, String>>();
        if titles.is_empty() {
            return Ok(vec![]);
        }

        let messages = self
            .database()
            .execute(Select(By::new(read::Scope::Properties(
                titles.keys().copied().collect(),
            ))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut latest = HashMap::<user::Id, Message>::new();
        for msg in messages.into_iter().filter(|m| m.from == user::Role::Tenant)
        {
            match latest.entry(msg.tenant_id) {
                Entry::Occupied(mut e) => {
                    let last = e.get();
                    if (msg.created_at, msg.id) > (last.created_at, last.id) {
                        _ = e.insert(msg);
                    }
                }
                Entry::Vacant(e) => {
                    _ = e.insert(msg);
                }
            }
        }

        let tenants = self
            .database()
            .execute(Select(By::<HashMap<user::Id, User>, _>::new(
                latest.keys().copied().collect::<Vec<_>>(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut conversations = latest
            .into_values()
            .filter_map(|last_message| {
                let tenant = tenants.get(&last_message.tenant_id)?;
                let title = titles.get(&last_message.property_id?)?;
                Some(Conversation {
                    tenant_id: tenant.id,
                    tenant_name: tenant.name.clone(),
                    property_title: title.clone(),
                    last_message,
                })
            })
            .collect::<Vec<_>>();
        conversations.sort_by(|a, b| {
            let (a, b) = (&a.last_message, &b.last_message);
            (b.created_at, b.id).cmp(&(a.created_at, a.id))
        });

        Ok(conversations)
    }
}

/// Error of [`List`] and [`Conversations`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator may not read the conversation.
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
        command::{Command as _, SendMessage},
        domain::user::{self, Role},
        error::{AsKind as _, Kind},
        infra::Memory,
        query::messages,
        spec::{list_property, move_in, register, service},
        Query as _, Service,
    };

    async fn send(
        svc: &Service<Memory>,
        initiator: user::Session,
        tenant_id: user::Id,
        text: &str,
    ) {
        let (from, to) = match initiator.role {
            Role::Tenant => (Role::Tenant, Role::Landlord),
            Role::Landlord => (Role::Landlord, Role::Tenant),
        };
        drop(
            svc.execute(SendMessage {
                initiator,
                from,
                to,
                text: text.into(),
                tenant_id,
            })
            .await
            .unwrap(),
        );
    }

    #[tokio::test]
    async fn exchange_is_listed_in_order() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", Role::Landlord).await;
        let (_, tenant) = register(&svc, "t1@example.com", Role::Tenant).await;
        let (_, other) =
            register(&svc, "other@example.com", Role::Landlord).await;
        let property =
            list_property(&svc, landlord, "Behala", "Kolkata", "6500INR").await;
        move_in(&svc, landlord, tenant, &property).await;

        send(&svc, tenant, tenant.user_id, "Hello").await;
        send(&svc, landlord, tenant.user_id, "Hi there").await;
        send(&svc, tenant, tenant.user_id, "The lift is stuck").await;

        for initiator in [tenant, landlord] {
            let texts = svc
                .execute(messages::List {
                    initiator,
                    tenant_id: tenant.user_id,
                })
                .await
                .unwrap()
                .into_iter()
                .map(|m| (m.from, m.text.to_string()))
                .collect::<Vec<_>>();
            assert_eq!(
                texts,
                [
                    (Role::Tenant, "Hello".to_owned()),
                    (Role::Landlord, "Hi there".to_owned()),
                    (Role::Tenant, "The lift is stuck".to_owned()),
                ],
            );
        }

        let err = svc
            .execute(messages::List {
                initiator: other,
                tenant_id: tenant.user_id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Forbidden);
    }

    #[tokio::test]
    async fn conversations_show_latest_tenant_message() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", Role::Landlord).await;
        let (first_user, first) =
            register(&svc, "t1@example.com", Role::Tenant).await;
        let (_, second) = register(&svc, "t2@example.com", Role::Tenant).await;
        let flat =
            list_property(&svc, landlord, "Behala", "Kolkata", "6500INR").await;
        let house =
            list_property(&svc, landlord, "Jadavpur", "Kolkata", "9500INR")
                .await;
        move_in(&svc, landlord, first, &flat).await;
        move_in(&svc, landlord, second, &house).await;

        send(&svc, second, second.user_id, "Water bill?").await;
        send(&svc, first, first.user_id, "Hello").await;
        send(&svc, first, first.user_id, "Anyone?").await;
        send(&svc, landlord, second.user_id, "Paid already").await;

        let conversations = svc
            .execute(messages::Conversations {
                initiator: landlord,
                landlord_id: landlord.user_id,
            })
            .await
            .unwrap();
        let summary = conversations
            .iter()
            .map(|c| {
                (
                    c.tenant_id,
                    c.property_title.as_str(),
                    c.last_message.text.to_string(),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            [
                (
                    first.user_id,
                    "2 BHK in Behala, Kolkata",
                    "Anyone?".to_owned(),
                ),
                (
                    second.user_id,
                    "2 BHK in Jadavpur, Kolkata",
                    "Water bill?".to_owned(),
                ),
            ],
        );
        assert_eq!(conversations[0].tenant_name, first_user.name);

        let err = svc
            .execute(messages::Conversations {
                initiator: first,
                landlord_id: landlord.user_id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Forbidden);
    }
}
