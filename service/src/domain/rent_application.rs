//! [`RentApplication`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::{property, user};

/// Request of a tenant to rent a [`Property`].
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug)]
pub struct RentApplication {
    /// ID of this [`RentApplication`].
    pub id: Id,

    /// ID of the tenant who submitted this [`RentApplication`].
    pub tenant_id: user::Id,

    /// ID of the applied [`Property`].
    ///
    /// [`Property`]: crate::domain::Property
    pub property_id: property::Id,

    /// Current [`Status`] of this [`RentApplication`].
    pub status: Status,

    /// [`DateTime`] when this [`RentApplication`] was submitted.
    pub submitted_at: SubmissionDateTime,

    /// [`DateTime`] when this [`RentApplication`] was last modified.
    pub updated_at: ModificationDateTime,
}

impl RentApplication {
    /// Applies the landlord's [`Decision`] to this [`RentApplication`].
    ///
    /// # Errors
    ///
    /// [`AlreadyDecided`] if this [`RentApplication`] is not
    /// [`Status::Pending`] anymore. It stays untouched then.
    pub fn decide(&mut self, decision: Decision) -> Result<(), AlreadyDecided> {
        if self.status != Status::Pending {
            return Err(AlreadyDecided(self.status));
        }
        self.status = decision.into();
        self.updated_at = common::DateTime::now().coerce();
        Ok(())
    }
}

/// [`RentApplication`] has already reached a terminal [`Status`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[display("`RentApplication` is already {_0}")]
pub struct AlreadyDecided(pub Status);

/// ID of a [`RentApplication`].
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

define_kind! {
    #[doc = "Status of a [`RentApplication`]."]
    enum Status {
        #[doc = "Awaits the landlord's decision."]
        Pending = 1,

        #[doc = "Accepted by the landlord. Terminal."]
        Approved = 2,

        #[doc = "Declined by the landlord. Terminal."]
        Rejected = 3,
    }
}

define_kind! {
    #[doc = "Landlord's decision upon a [`RentApplication`]."]
    enum Decision {
        #[doc = "Accept the [`RentApplication`]."]
        Approved = 2,

        #[doc = "Decline the [`RentApplication`]."]
        Rejected = 3,
    }
}

impl From<Decision> for Status {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => Self::Approved,
            Decision::Rejected => Self::Rejected,
        }
    }
}

/// [`DateTime`] when a [`RentApplication`] was submitted.
pub type SubmissionDateTime = DateTimeOf<(RentApplication, unit::Creation)>;

/// [`DateTime`] when a [`RentApplication`] was last modified.
pub type ModificationDateTime =
    DateTimeOf<(RentApplication, unit::Modification)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{AlreadyDecided, Decision, Id, RentApplication, Status};
    use crate::domain::{property, user};

    fn pending() -> RentApplication {
        let now = DateTime::now();
        RentApplication {
            id: Id::new(),
            tenant_id: user::Id::new(),
            property_id: property::Id::new(),
            status: Status::Pending,
            submitted_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    #[test]
    fn pending_accepts_any_decision() {
        for (decision, status) in [
            (Decision::Approved, Status::Approved),
            (Decision::Rejected, Status::Rejected),
        ] {
            let mut app = pending();
            app.decide(decision).unwrap();

            assert_eq!(app.status, status);
        }
    }

    #[test]
    fn terminal_states_are_final() {
        for first in [Decision::Approved, Decision::Rejected] {
            for second in [Decision::Approved, Decision::Rejected] {
                let mut app = pending();
                app.decide(first).unwrap();
                let decided_at = app.updated_at;

                assert_eq!(
                    app.decide(second),
                    Err(AlreadyDecided(first.into())),
                );
                assert_eq!(app.status, Status::from(first));
                assert_eq!(app.updated_at, decided_at);
            }
        }
    }
}
