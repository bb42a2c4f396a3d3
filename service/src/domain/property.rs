//! [`Property`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::domain::user;

/// Rental listing owned by a landlord.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// ID of the landlord owning this [`Property`].
    ///
    /// Set on creation and never reassigned.
    pub owner_id: user::Id,

    /// ID of the tenant currently occupying this [`Property`], if any.
    pub occupant_id: Option<user::Id>,

    /// Descriptive [`Details`] of this [`Property`].
    pub details: Details,

    /// [`DateTime`] when this [`Property`] was posted.
    pub posted_at: PostingDateTime,

    /// [`DateTime`] when this [`Property`] was deleted.
    pub deleted_at: Option<DeletionDateTime>,
}

impl Property {
    /// Returns a short human-readable title of this [`Property`], like
    /// `2 BHK in Bandel, Kolkata`.
    #[must_use]
    pub fn title(&self) -> String {
        let Details {
            bhk,
            locality,
            city,
            ..
        } = &self.details;
        format!("{bhk} BHK in {locality}, {city}")
    }
}

/// Landlord-editable description of a [`Property`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Details {
    /// Number of bedrooms, hall and kitchen (BHK).
    pub bhk: u16,

    /// Monthly rent.
    pub rent: Money,

    /// Size in square feet.
    pub size: u32,

    /// [`Floor`] description.
    pub floor: Floor,

    /// [`AreaType`] the size is measured in.
    pub area_type: AreaType,

    /// [`Locality`] within the [`City`].
    pub locality: Locality,

    /// [`City`] the [`Property`] is located in.
    pub city: City,

    /// [`FurnishingStatus`] of the [`Property`].
    pub furnishing_status: FurnishingStatus,

    /// [`TenantPreferred`] by the landlord.
    pub tenant_preferred: TenantPreferred,

    /// Number of bathrooms.
    pub bathrooms: u16,

    /// [`Contact`] to reach regarding the [`Property`].
    pub contact: Contact,

    /// [`Image`] of the [`Property`].
    pub image: Option<Image>,
}

/// ID of a [`Property`].
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
    /// Floor of a [`Property`], like `Ground out of 2`.
    Floor(max = 64)
}

define_text! {
    /// Kind of area a [`Property`] size is measured in, like `Super Area`.
    AreaType(max = 64)
}

define_text! {
    /// Locality of a [`Property`] within its [`City`].
    Locality(max = 256)
}

impl Locality {
    /// Indicates whether this [`Locality`] names the same place as `other`,
    /// ignoring letter case.
    ///
    /// Parts of a name never match.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

define_text! {
    /// City a [`Property`] is located in.
    City(max = 128)
}

define_text! {
    /// Furnishing status of a [`Property`], like `Semi-Furnished`.
    FurnishingStatus(max = 64)
}

define_text! {
    /// Kind of tenant a landlord prefers, like `Bachelors/Family`.
    TenantPreferred(max = 64)
}

define_text! {
    /// Point of contact for a [`Property`], like `Contact Owner`.
    Contact(max = 256)
}

define_text! {
    /// Path or URL of a [`Property`] image.
    Image(max = 1024)
}

/// [`DateTime`] when a [`Property`] was posted.
pub type PostingDateTime = DateTimeOf<(Property, unit::Creation)>;

/// [`DateTime`] when a [`Property`] was deleted.
pub type DeletionDateTime = DateTimeOf<(Property, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use super::Locality;

    #[test]
    fn locality_matches_whole_name_ignoring_case() {
        let bandel = Locality::new("Bandel").unwrap();

        assert!(bandel.matches(&Locality::new("bandel").unwrap()));
        assert!(bandel.matches(&Locality::new("BANDEL").unwrap()));
        assert!(!bandel.matches(&Locality::new("Band").unwrap()));
        assert!(!bandel.matches(&Locality::new("Bandel East").unwrap()));
    }
}
