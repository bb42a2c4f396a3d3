//! [`Message`] read model definitions.

use crate::domain::{user, Message};

/// Summary of a landlord's conversation with one tenant.
#[derive(Clone, Debug)]
pub struct Conversation {
    /// ID of the tenant.
    pub tenant_id: user::Id,

    /// [`user::Name`] of the tenant.
    pub tenant_name: user::Name,

    /// Title of the property the conversation is about.
    pub property_title: String,

    /// Latest [`Message`] sent by the tenant.
    pub last_message: Message,
}
