//! Change notifications emitted by the [`Service`].
//!
//! [`Service`]: crate::Service

use crate::domain::{rent_application, user};
#[cfg(doc)]
use crate::domain::RentApplication;

/// A [`RentApplication`] was submitted or decided.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RentApplicationChanged {
    /// ID of the changed [`RentApplication`].
    pub application_id: rent_application::Id,

    /// ID of the tenant who submitted the [`RentApplication`].
    pub tenant_id: user::Id,

    /// ID of the landlord owning the applied property.
    pub landlord_id: user::Id,
}

impl RentApplicationChanged {
    /// Indicates whether the provided user sees the changed
    /// [`RentApplication`] in their scoped lists.
    #[must_use]
    pub fn concerns(&self, user_id: user::Id) -> bool {
        self.tenant_id == user_id || self.landlord_id == user_id
    }
}
