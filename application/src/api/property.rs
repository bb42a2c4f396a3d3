//! [`Property`]-related definitions.

use common::{DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{
    graphql_object, GraphQLInputObject, GraphQLObject, GraphQLScalar,
    Nullable,
};
use service::{command, domain, read};
use uuid::Uuid;

use crate::{api, define_error, Context, Error};

/// A [`Property`] listed on the marketplace.
#[derive(Clone, Debug, From)]
pub struct Property(domain::Property);

/// A `Property` listed on the marketplace.
#[graphql_object(context = Context)]
impl Property {
    /// Unique identifier of this `Property`.
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Display title of this `Property`, like "2 BHK in Bandel, Kolkata".
    pub fn title(&self) -> String {
        self.0.title()
    }

    /// Landlord owning this `Property`.
    pub fn owner(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "`Property` owner is a registered landlord"
        )]
        unsafe {
            api::User::new_unchecked(self.0.owner_id)
        }
    }

    /// Tenant occupying this `Property`, if any.
    pub fn occupant(&self) -> Option<api::User> {
        self.0.occupant_id.map(|id| {
            #[expect(
                unsafe_code,
                reason = "occupant is set on approval of a registered tenant"
            )]
            unsafe {
                api::User::new_unchecked(id)
            }
        })
    }

    /// Number of bedrooms.
    pub fn bhk(&self) -> i32 {
        self.0.details.bhk.into()
    }

    /// Monthly rent.
    pub fn rent(&self) -> Money {
        self.0.details.rent
    }

    /// Size in square feet.
    pub fn size(&self) -> i32 {
        i32::try_from(self.0.details.size).unwrap_or(i32::MAX)
    }

    /// Floor, like "Ground out of 2".
    pub fn floor(&self) -> Floor {
        self.0.details.floor.clone().into()
    }

    /// Kind of the measured area.
    pub fn area_type(&self) -> AreaType {
        self.0.details.area_type.clone().into()
    }

    /// Locality within the city.
    pub fn locality(&self) -> Locality {
        self.0.details.locality.clone().into()
    }

    /// City.
    pub fn city(&self) -> City {
        self.0.details.city.clone().into()
    }

    /// Furnishing status.
    pub fn furnishing_status(&self) -> FurnishingStatus {
        self.0.details.furnishing_status.clone().into()
    }

    /// Kind of tenants the landlord prefers.
    pub fn tenant_preferred(&self) -> TenantPreferred {
        self.0.details.tenant_preferred.clone().into()
    }

    /// Number of bathrooms.
    pub fn bathrooms(&self) -> i32 {
        self.0.details.bathrooms.into()
    }

    /// Whom to contact about this `Property`.
    pub fn contact(&self) -> Contact {
        self.0.details.contact.clone().into()
    }

    /// Path of the uploaded image of this `Property`.
    pub fn image(&self) -> Option<Image> {
        self.0.details.image.clone().map(Into::into)
    }

    /// `DateTime` when this `Property` was listed.
    pub fn posted_at(&self) -> DateTime {
        self.0.posted_at.coerce()
    }
}

/// Unique identifier of a `Property`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::property::Id)]
#[into(domain::property::Id)]
#[graphql(name = "PropertyId", transparent)]
pub struct Id(Uuid);

define_text_scalar! {
    /// Floor of a `Property`, like "1 out of 3".
    Floor(domain::property::Floor) as "PropertyFloor"
}

define_text_scalar! {
    /// Kind of the measured area of a `Property`, like "Super Area".
    AreaType(domain::property::AreaType) as "PropertyAreaType"
}

define_text_scalar! {
    /// Locality of a `Property`.
    Locality(domain::property::Locality) as "PropertyLocality"
}

define_text_scalar! {
    /// City of a `Property`.
    City(domain::property::City) as "PropertyCity"
}

define_text_scalar! {
    /// Furnishing status of a `Property`, like "Semi-Furnished".
    FurnishingStatus(domain::property::FurnishingStatus)
        as "PropertyFurnishingStatus"
}

define_text_scalar! {
    /// Kind of tenants preferred for a `Property`, like "Bachelors/Family".
    TenantPreferred(domain::property::TenantPreferred)
        as "PropertyTenantPreferred"
}

define_text_scalar! {
    /// Contact of a `Property`, like "Contact Owner".
    Contact(domain::property::Contact) as "PropertyContact"
}

define_text_scalar! {
    /// Path of an uploaded `Property` image.
    Image(domain::property::Image) as "PropertyImage"
}

/// Details of a new `Property`.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "PropertyInput")]
pub struct Input {
    /// Number of bedrooms.
    pub bhk: i32,

    /// Monthly rent.
    pub rent: Money,

    /// Size in square feet.
    pub size: i32,

    /// Floor, like "Ground out of 2".
    pub floor: Floor,

    /// Kind of the measured area.
    pub area_type: AreaType,

    /// Locality within the city.
    pub locality: Locality,

    /// City.
    pub city: City,

    /// Furnishing status.
    pub furnishing_status: FurnishingStatus,

    /// Kind of tenants the landlord prefers.
    pub tenant_preferred: TenantPreferred,

    /// Number of bathrooms.
    pub bathrooms: i32,

    /// Whom to contact.
    pub contact: Contact,

    /// Path of the uploaded image.
    pub image: Option<Image>,
}

impl TryFrom<Input> for domain::property::Details {
    type Error = Error;

    fn try_from(input: Input) -> Result<Self, Self::Error> {
        let Input {
            bhk,
            rent,
            size,
            floor,
            area_type,
            locality,
            city,
            furnishing_status,
            tenant_preferred,
            bathrooms,
            contact,
            image,
        } = input;
        Ok(Self {
            bhk: count(bhk)?,
            rent,
            size: count(size)?,
            floor: floor.into(),
            area_type: area_type.into(),
            locality: locality.into(),
            city: city.into(),
            furnishing_status: furnishing_status.into(),
            tenant_preferred: tenant_preferred.into(),
            bathrooms: count(bathrooms)?,
            contact: contact.into(),
            image: image.map(Into::into),
        })
    }
}

/// Changes to apply to an existing `Property`.
///
/// Absent fields are left as they are.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "PropertyChanges")]
pub struct Changes {
    /// New number of bedrooms.
    pub bhk: Option<i32>,

    /// New monthly rent.
    pub rent: Option<Money>,

    /// New size in square feet.
    pub size: Option<i32>,

    /// New floor.
    pub floor: Option<Floor>,

    /// New kind of the measured area.
    pub area_type: Option<AreaType>,

    /// New locality.
    pub locality: Option<Locality>,

    /// New city.
    pub city: Option<City>,

    /// New furnishing status.
    pub furnishing_status: Option<FurnishingStatus>,

    /// New kind of preferred tenants.
    pub tenant_preferred: Option<TenantPreferred>,

    /// New number of bathrooms.
    pub bathrooms: Option<i32>,

    /// New contact.
    pub contact: Option<Contact>,

    /// New image path, with an explicit `null` removing the current image.
    pub image: Nullable<Image>,
}

impl TryFrom<Changes> for command::update_property::Changes {
    type Error = Error;

    fn try_from(changes: Changes) -> Result<Self, Self::Error> {
        let Changes {
            bhk,
            rent,
            size,
            floor,
            area_type,
            locality,
            city,
            furnishing_status,
            tenant_preferred,
            bathrooms,
            contact,
            image,
        } = changes;
        Ok(Self {
            bhk: bhk.map(count).transpose()?,
            rent,
            size: size.map(count).transpose()?,
            floor: floor.map(Into::into),
            area_type: area_type.map(Into::into),
            locality: locality.map(Into::into),
            city: city.map(Into::into),
            furnishing_status: furnishing_status.map(Into::into),
            tenant_preferred: tenant_preferred.map(Into::into),
            bathrooms: bathrooms.map(count).transpose()?,
            contact: contact.map(Into::into),
            image: image.explicit().map(|i| i.map(Into::into)),
        })
    }
}

/// Criteria of a `Property` search.
///
/// Every present criterion must hold.
#[derive(Clone, Debug, Default, GraphQLInputObject)]
#[graphql(name = "PropertyFilter")]
pub struct Filter {
    /// Exact city.
    pub city: Option<City>,

    /// Exact number of bedrooms.
    pub bhk: Option<i32>,

    /// Exact furnishing status.
    pub furnishing_status: Option<FurnishingStatus>,

    /// Exact kind of preferred tenants.
    pub tenant_preferred: Option<TenantPreferred>,

    /// Exact kind of the measured area.
    pub area_type: Option<AreaType>,

    /// Locality, compared ignoring case.
    pub locality: Option<Locality>,

    /// Inclusive lower bound of the rent.
    pub min_rent: Option<Money>,

    /// Inclusive upper bound of the rent.
    pub max_rent: Option<Money>,
}

impl TryFrom<Filter> for read::property::Filter {
    type Error = Error;

    fn try_from(filter: Filter) -> Result<Self, Self::Error> {
        let Filter {
            city,
            bhk,
            furnishing_status,
            tenant_preferred,
            area_type,
            locality,
            min_rent,
            max_rent,
        } = filter;
        Ok(Self {
            city: city.map(Into::into),
            bhk: bhk.map(count).transpose()?,
            furnishing_status: furnishing_status.map(Into::into),
            tenant_preferred: tenant_preferred.map(Into::into),
            area_type: area_type.map(Into::into),
            locality: locality.map(Into::into),
            min_rent,
            max_rent,
            ..Self::default()
        })
    }
}

/// Distinct values present across all `Property`s.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "PropertyFilterOptions")]
pub struct FilterOptions {
    /// Distinct cities.
    pub cities: Vec<City>,

    /// Distinct numbers of bedrooms.
    pub bhk_options: Vec<i32>,

    /// Distinct furnishing statuses.
    pub furnishing_statuses: Vec<FurnishingStatus>,

    /// Distinct kinds of preferred tenants.
    pub tenant_preferences: Vec<TenantPreferred>,

    /// Distinct kinds of the measured area.
    pub area_types: Vec<AreaType>,
}

impl From<read::property::FilterOptions> for FilterOptions {
    fn from(options: read::property::FilterOptions) -> Self {
        let read::property::FilterOptions {
            cities,
            bhk_options,
            furnishing_statuses,
            tenant_preferences,
            area_types,
        } = options;
        Self {
            cities: cities.into_iter().map(Into::into).collect(),
            bhk_options: bhk_options.into_iter().map(Into::into).collect(),
            furnishing_statuses: furnishing_statuses
                .into_iter()
                .map(Into::into)
                .collect(),
            tenant_preferences: tenant_preferences
                .into_iter()
                .map(Into::into)
                .collect(),
            area_types: area_types.into_iter().map(Into::into).collect(),
        }
    }
}

/// Converts the provided GraphQL integer into a non-negative count.
///
/// # Errors
///
/// If the `value` is negative or too large.
fn count<T: TryFrom<i32>>(value: i32) -> Result<T, Error> {
    T::try_from(value).map_err(|_| PropertyError::InvalidCount.into())
}

define_error! {
    enum PropertyError {
        #[code = "INVALID_ARGUMENT"]
        #[status = BAD_REQUEST]
        #[message = "Counts must be non-negative and not too large"]
        InvalidCount,
    }
}

#[cfg(test)]
mod spec {
    use super::count;

    #[test]
    fn negative_counts_are_rejected() {
        assert_eq!(count::<u16>(3).ok(), Some(3));
        assert_eq!(count::<u32>(0).ok(), Some(0));

        let err = count::<u16>(-1).unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);

        assert!(count::<u16>(70_000).is_err());
    }
}
