//! Read models and selectors.

pub mod message;
pub mod property;

use std::collections::HashSet;

use crate::domain::{property as prop, user};
#[cfg(doc)]
use crate::domain::{MaintenanceRequest, Payment, RentApplication};

/// Set of records visible to one participant.
///
/// Selects [`RentApplication`]s, [`MaintenanceRequest`]s, [`Payment`]s and
/// [`Message`]s.
///
/// [`Message`]: crate::domain::Message
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scope {
    /// Records of a single tenant.
    Tenant(user::Id),

    /// Records about any of the listed properties.
    Properties(HashSet<prop::Id>),
}

impl Scope {
    /// Indicates whether a record of the provided tenant about the provided
    /// property falls into this [`Scope`].
    #[must_use]
    pub fn contains(
        &self,
        tenant_id: user::Id,
        property_id: Option<prop::Id>,
    ) -> bool {
        match self {
            Self::Tenant(id) => *id == tenant_id,
            Self::Properties(ids) => {
                property_id.is_some_and(|id| ids.contains(&id))
            }
        }
    }
}

/// Participant whose records are requested.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Participant {
    /// Tenant, seeing their own records.
    Tenant(user::Id),

    /// Landlord, seeing records about the properties they own.
    Landlord(user::Id),
}

impl Participant {
    /// Returns the ID of this [`Participant`].
    #[must_use]
    pub fn id(self) -> user::Id {
        match self {
            Self::Tenant(id) | Self::Landlord(id) => id,
        }
    }

    /// Returns the [`user::Role`] of this [`Participant`].
    #[must_use]
    pub fn role(self) -> user::Role {
        match self {
            Self::Tenant(_) => user::Role::Tenant,
            Self::Landlord(_) => user::Role::Landlord,
        }
    }
}
