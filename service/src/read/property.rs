//! [`Property`] read model definitions.

use common::Money;

use crate::domain::{property, user, Property};

/// Filter selecting [`Property`] lists.
///
/// Every present criterion must hold. An empty [`Filter`] selects all.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// Owning landlord.
    pub owner_id: Option<user::Id>,

    /// Occupying tenant.
    pub occupant_id: Option<user::Id>,

    /// Exact [`property::City`].
    pub city: Option<property::City>,

    /// Exact number of bedrooms.
    pub bhk: Option<u16>,

    /// Exact [`property::FurnishingStatus`].
    pub furnishing_status: Option<property::FurnishingStatus>,

    /// Exact [`property::TenantPreferred`].
    pub tenant_preferred: Option<property::TenantPreferred>,

    /// Exact [`property::AreaType`].
    pub area_type: Option<property::AreaType>,

    /// [`property::Locality`], compared ignoring case.
    pub locality: Option<property::Locality>,

    /// Inclusive lower bound of the rent.
    pub min_rent: Option<Money>,

    /// Inclusive upper bound of the rent.
    pub max_rent: Option<Money>,
}

impl Filter {
    /// Creates a [`Filter`] selecting [`Property`]s of the provided owner.
    #[must_use]
    pub fn owned_by(owner_id: user::Id) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    /// Creates a [`Filter`] selecting the [`Property`] occupied by the
    /// provided tenant.
    #[must_use]
    pub fn occupied_by(tenant_id: user::Id) -> Self {
        Self {
            occupant_id: Some(tenant_id),
            ..Self::default()
        }
    }

    /// Indicates whether the provided [`Property`] passes this [`Filter`].
    ///
    /// A rent bound in another currency never holds.
    #[must_use]
    pub fn matches(&self, property: &Property) -> bool {
        let Self {
            owner_id,
            occupant_id,
            city,
            bhk,
            furnishing_status,
            tenant_preferred,
            area_type,
            locality,
            min_rent,
            max_rent,
        } = self;
        let d = &property.details;

        owner_id.map_or(true, |id| property.owner_id == id)
            && occupant_id.map_or(true, |id| property.occupant_id == Some(id))
            && city.as_ref().map_or(true, |c| d.city == *c)
            && bhk.map_or(true, |b| d.bhk == b)
            && furnishing_status
                .as_ref()
                .map_or(true, |f| d.furnishing_status == *f)
            && tenant_preferred
                .as_ref()
                .map_or(true, |t| d.tenant_preferred == *t)
            && area_type.as_ref().map_or(true, |a| d.area_type == *a)
            && locality.as_ref().map_or(true, |l| d.locality.matches(l))
            && min_rent.map_or(true, |min| d.rent >= min)
            && max_rent.map_or(true, |max| d.rent <= max)
    }
}

/// Distinct values present across all [`Property`]s, sorted.
///
/// Feeds search forms.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterOptions {
    /// Distinct [`property::City`]s.
    pub cities: Vec<property::City>,

    /// Distinct numbers of bedrooms.
    pub bhk_options: Vec<u16>,

    /// Distinct [`property::FurnishingStatus`]es.
    pub furnishing_statuses: Vec<property::FurnishingStatus>,

    /// Distinct [`property::TenantPreferred`] values.
    pub tenant_preferences: Vec<property::TenantPreferred>,

    /// Distinct [`property::AreaType`]s.
    pub area_types: Vec<property::AreaType>,
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{DateTime, Money};

    use super::Filter;
    use crate::domain::{property, user, Property};

    fn property(locality: &str, rent: &str) -> Property {
        Property {
            id: property::Id::new(),
            owner_id: user::Id::new(),
            occupant_id: None,
            details: property::Details {
                bhk: 2,
                rent: Money::from_str(rent).unwrap(),
                size: 900,
                floor: property::Floor::new("1 out of 3").unwrap(),
                area_type: property::AreaType::new("Carpet Area").unwrap(),
                locality: property::Locality::new(locality).unwrap(),
                city: property::City::new("Kolkata").unwrap(),
                furnishing_status: property::FurnishingStatus::new(
                    "Unfurnished",
                )
                .unwrap(),
                tenant_preferred: property::TenantPreferred::new("Family")
                    .unwrap(),
                bathrooms: 1,
                contact: property::Contact::new("Contact Agent").unwrap(),
                image: None,
            },
            posted_at: DateTime::now().coerce(),
            deleted_at: None,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::default().matches(&property("Salt Lake", "9000INR")));
    }

    #[test]
    fn rent_range_is_inclusive() {
        let p = property("Salt Lake", "9000INR");
        let filter = |min: &str, max: &str| Filter {
            min_rent: Some(Money::from_str(min).unwrap()),
            max_rent: Some(Money::from_str(max).unwrap()),
            ..Filter::default()
        };

        assert!(filter("9000INR", "9000INR").matches(&p));
        assert!(filter("5000INR", "10000INR").matches(&p));
        assert!(!filter("9001INR", "10000INR").matches(&p));
        assert!(!filter("100USD", "100000USD").matches(&p));
    }

    #[test]
    fn criteria_are_combined() {
        let p = property("Salt Lake", "9000INR");

        let filter = Filter {
            city: property::City::new("Kolkata"),
            locality: property::Locality::new("salt lake"),
            bhk: Some(3),
            ..Filter::default()
        };
        assert!(!filter.matches(&p));

        let filter = Filter {
            bhk: Some(2),
            ..filter
        };
        assert!(filter.matches(&p));
    }
}
