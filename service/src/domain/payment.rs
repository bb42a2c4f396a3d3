//! [`Payment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::{property, user};

/// Rent obligation of a tenant for a [`Property`].
///
/// Processing happens elsewhere, so a [`Payment`] only records it.
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the paying tenant.
    pub tenant_id: user::Id,

    /// ID of the [`Property`] this [`Payment`] is for.
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// Amount of this [`Payment`].
    pub amount: Money,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`Method`] of this [`Payment`], once known.
    pub method: Option<Method>,

    /// [`DateTime`] this [`Payment`] is due by.
    pub due_at: Option<DueDateTime>,

    /// [`DateTime`] when this [`Payment`] was recorded.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Payment`] was last modified.
    pub updated_at: ModificationDateTime,
}

/// ID of a [`Payment`].
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
    /// Way a [`Payment`] is made, like `UPI` or `Card`.
    Method(max = 64)
}

define_kind! {
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "Not paid yet."]
        Pending = 1,

        #[doc = "Paid in full."]
        Paid = 2,

        #[doc = "Attempted, but not paid."]
        Failed = 3,
    }
}

/// [`DateTime`] when a [`Payment`] was recorded.
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;

/// [`DateTime`] when a [`Payment`] was last modified.
pub type ModificationDateTime = DateTimeOf<(Payment, unit::Modification)>;

/// [`DateTime`] a [`Payment`] is due by.
pub type DueDateTime = DateTimeOf<(Payment, unit::Due)>;
