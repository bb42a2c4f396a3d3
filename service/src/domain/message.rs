//! [`Message`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::{property, user};

/// Message between a tenant and a landlord.
///
/// Append-only: never edited nor deleted.
#[derive(Clone, Debug)]
pub struct Message {
    /// ID of this [`Message`].
    pub id: Id,

    /// ID of the tenant whose conversation this [`Message`] belongs to.
    pub tenant_id: user::Id,

    /// ID of the [`Property`] the tenant occupied when this [`Message`] was
    /// sent.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: Option<property::Id>,

    /// [`user::Role`] of the sender.
    pub from: user::Role,

    /// [`user::Role`] of the recipient.
    pub to: user::Role,

    /// [`Text`] of this [`Message`].
    pub text: Text,

    /// [`DateTime`] when this [`Message`] was sent.
    pub created_at: CreationDateTime,
}

/// ID of a [`Message`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_text! {
    /// Text of a [`Message`], never blank.
    Text(max = 4096)
}

/// [`DateTime`] when a [`Message`] was sent.
pub type CreationDateTime = DateTimeOf<(Message, unit::Creation)>;
