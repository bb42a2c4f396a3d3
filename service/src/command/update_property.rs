//! [`Command`] for editing a [`Property`] listing.

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        property,
        user::{session, Session},
        Property,
    },
    error::{AsKind, Kind},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for editing a [`Property`] listing.
///
/// Owner and occupant are not editable.
#[derive(Clone, Debug)]
pub struct UpdateProperty {
    /// [`Session`] of the landlord editing the [`Property`].
    pub initiator: Session,

    /// ID of the [`Property`] to edit.
    pub property_id: property::Id,

    /// [`Changes`] to apply.
    pub changes: Changes,
}

/// Changes of [`property::Details`]. Only the provided fields change.
#[derive(Clone, Debug, Default)]
pub struct Changes {
    /// New number of bedrooms.
    pub bhk: Option<u16>,

    /// New rent.
    pub rent: Option<Money>,

    /// New size, in square feet.
    pub size: Option<u32>,

    /// New [`property::Floor`].
    pub floor: Option<property::Floor>,

    /// New [`property::AreaType`].
    pub area_type: Option<property::AreaType>,

    /// New [`property::Locality`].
    pub locality: Option<property::Locality>,

    /// New [`property::City`].
    pub city: Option<property::City>,

    /// New [`property::FurnishingStatus`].
    pub furnishing_status: Option<property::FurnishingStatus>,

    /// New [`property::TenantPreferred`].
    pub tenant_preferred: Option<property::TenantPreferred>,

    /// New number of bathrooms.
    pub bathrooms: Option<u16>,

    /// New [`property::Contact`].
    pub contact: Option<property::Contact>,

    /// New [`property::Image`], with `Some(None)` removing the current one.
    pub image: Option<Option<property::Image>>,
}

impl Changes {
    /// Applies these [`Changes`] to the provided [`property::Details`].
    fn apply(self, details: &mut property::Details) {
        let Self {
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
        } = self;

        if let Some(bhk) = bhk {
            details.bhk = bhk;
        }
        if let Some(rent) = rent {
            details.rent = rent;
        }
        if let Some(size) = size {
            details.size = size;
        }
        if let Some(floor) = floor {
            details.floor = floor;
        }
        if let Some(area_type) = area_type {
            details.area_type = area_type;
        }
        if let Some(locality) = locality {
            details.locality = locality;
        }
        if let Some(city) = city {
            details.city = city;
        }
        if let Some(status) = furnishing_status {
            details.furnishing_status = status;
        }
        if let Some(preferred) = tenant_preferred {
            details.tenant_preferred = preferred;
        }
        if let Some(bathrooms) = bathrooms {
            details.bathrooms = bathrooms;
        }
        if let Some(contact) = contact {
            details.contact = contact;
        }
        if let Some(image) = image {
            details.image = image;
        }
    }
}

impl<Db> Command<UpdateProperty> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Property, property::Id>>,
            Err = Traced<database::Error>,
        > + Database<Update<Property>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Property;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateProperty,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProperty {
            initiator,
            property_id,
            changes,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let mut property = tx
            .execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())?;
        initiator
            .require_ownership(property.owner_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        changes.apply(&mut property.details);

        tx.execute(Update(property.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(property)
    }
}

/// Error of [`UpdateProperty`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Initiator does not own the [`Property`].
    #[display("{_0}")]
    Forbidden(session::Forbidden),

    /// [`Property`] doesn't exist.
    #[display("`Property(id: {_0})` does not exist")]
    #[from(ignore)]
    PropertyNotExists(#[error(not(source))] property::Id),
}

impl AsKind for ExecutionError {
    fn kind(&self) -> Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::Forbidden(_) => Kind::Forbidden,
            Self::PropertyNotExists(_) => Kind::NotFound,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::Money;

    use super::Changes;
    use crate::{
        command::{Command as _, UpdateProperty},
        domain::{property, user},
        error::{AsKind as _, Kind},
        spec::{list_property, register, service},
    };

    #[tokio::test]
    async fn owner_changes_only_provided_fields() {
        let svc = service();
        let (_, landlord) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let before =
            list_property(&svc, landlord, "Bandel", "Kolkata", "9000INR").await;

        let after = svc
            .execute(UpdateProperty {
                initiator: landlord,
                property_id: before.id,
                changes: Changes {
                    rent: Some(Money::from_str("9500INR").unwrap()),
                    image: Some(property::Image::new("/uploads/bandel.jpg")),
                    ..Changes::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(after.details.rent, Money::from_str("9500INR").unwrap());
        assert_eq!(
            after.details.image,
            property::Image::new("/uploads/bandel.jpg"),
        );
        assert_eq!(after.details.locality, before.details.locality);
        assert_eq!(after.owner_id, before.owner_id);
        assert_eq!(after.posted_at, before.posted_at);

        let kept = svc
            .execute(UpdateProperty {
                initiator: landlord,
                property_id: before.id,
                changes: Changes::default(),
            })
            .await
            .unwrap();
        assert_eq!(kept.details.image, after.details.image);

        let cleared = svc
            .execute(UpdateProperty {
                initiator: landlord,
                property_id: before.id,
                changes: Changes {
                    image: Some(None),
                    ..Changes::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(cleared.details.image, None);
    }

    #[tokio::test]
    async fn other_landlord_is_forbidden() {
        let svc = service();
        let (_, owner) =
            register(&svc, "owner@example.com", user::Role::Landlord).await;
        let (_, other) =
            register(&svc, "other@example.com", user::Role::Landlord).await;
        let property =
            list_property(&svc, owner, "Bandel", "Kolkata", "9000INR").await;

        let err = svc
            .execute(UpdateProperty {
                initiator: other,
                property_id: property.id,
                changes: Changes {
                    bhk: Some(3),
                    ..Changes::default()
                },
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Forbidden);

        let err = svc
            .execute(UpdateProperty {
                initiator: owner,
                property_id: property::Id::new(),
                changes: Changes::default(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
    }
}
