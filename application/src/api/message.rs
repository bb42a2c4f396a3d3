//! [`Message`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLObject, GraphQLScalar};
use service::{domain, read};
use uuid::Uuid;

use crate::{api, Context};

/// A [`Message`] between a tenant and a landlord.
#[derive(Clone, Debug, From)]
pub struct Message(domain::Message);

/// A `Message` between a tenant and a landlord.
#[graphql_object(context = Context)]
impl Message {
    /// Unique identifier of this `Message`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Tenant taking part in the conversation.
    pub fn tenant(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "conversations are held with registered tenants"
        )]
        unsafe {
            api::User::new_unchecked(self.0.tenant_id)
        }
    }

    /// ID of the `Property` the tenant occupied when this `Message` was
    /// sent.
    pub fn property_id(&self) -> Option<api::property::Id> {
        self.0.property_id.map(Into::into)
    }

    /// Role of the sender.
    pub fn sender_role(&self) -> api::user::Role {
        self.0.from.into()
    }

    /// Role of the recipient.
    pub fn recipient_role(&self) -> api::user::Role {
        self.0.to.into()
    }

    /// Text of this `Message`.
    pub fn text(&self) -> Text {
        self.0.text.clone().into()
    }

    /// `DateTime` when this `Message` was sent.
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Message`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::message::Id)]
#[into(domain::message::Id)]
#[graphql(name = "MessageId", transparent)]
pub struct Id(Uuid);

define_text_scalar! {
    /// Text of a `Message`.
    Text(domain::message::Text) as "MessageText"
}

/// Summary of a landlord's conversation with one tenant.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct Conversation {
    /// Tenant the conversation is held with.
    pub tenant: api::User,

    /// Name of the tenant.
    pub tenant_name: api::user::Name,

    /// Title of the `Property` the conversation is about.
    pub property_title: String,

    /// Latest `Message` sent by the tenant.
    pub last_message: Message,
}

impl From<read::message::Conversation> for Conversation {
    fn from(conversation: read::message::Conversation) -> Self {
        let read::message::Conversation {
            tenant_id,
            tenant_name,
            property_title,
            last_message,
        } = conversation;
        #[expect(
            unsafe_code,
            reason = "conversations list registered tenants only"
        )]
        let tenant = unsafe { api::User::new_unchecked(tenant_id) };
        Self {
            tenant,
            tenant_name: tenant_name.into(),
            property_title,
            last_message: last_message.into(),
        }
    }
}
