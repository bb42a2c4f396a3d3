//! Service contains the business logic of the RentEase marketplace.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod error;
pub mod event;
pub mod infra;
pub mod query;
pub mod read;

use std::time::Duration;

use derive_more::Debug;
use smart_default::SmartDefault;
use tokio::sync::broadcast;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, error::Kind as ErrorKind, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Credentials configuration.
    pub credentials: Credentials,
}

impl Config {
    /// Creates a new [`Config`] signing sessions with the provided `secret`.
    #[must_use]
    pub fn with_secret(secret: &[u8], credentials: Credentials) -> Self {
        Self {
            jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(secret),
            jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(secret),
            credentials,
        }
    }
}

/// Credentials configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Credentials {
    /// Lifetime of an issued session.
    #[default(Duration::from_secs(60 * 60))]
    pub session_ttl: Duration,

    /// [`bcrypt`] cost of password hashing.
    #[default(bcrypt::DEFAULT_COST)]
    pub password_cost: u32,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// Sender of [`event::RentApplicationChanged`] notifications.
    events: broadcast::Sender<event::RentApplicationChanged>,
}

impl<Db> Service<Db> {
    /// Capacity of the change notifications channel.
    ///
    /// Receivers lagging behind more than this number of events skip the
    /// missed ones.
    const EVENTS_CAPACITY: usize = 128;

    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db) -> Self {
        let (events, _) = broadcast::channel(Self::EVENTS_CAPACITY);
        Self {
            config,
            database,
            events,
        }
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Subscribes to [`event::RentApplicationChanged`] notifications.
    ///
    /// Delivery is best-effort: nothing is replayed to late subscribers.
    #[must_use]
    pub fn subscribe(
        &self,
    ) -> broadcast::Receiver<event::RentApplicationChanged> {
        self.events.subscribe()
    }

    /// Notifies subscribers about the provided `event`.
    fn notify(&self, event: event::RentApplicationChanged) {
        // No subscribers is not an error.
        _ = self.events.send(event);
    }
}

#[cfg(test)]
mod spec {
    //! Helpers shared by the [`Service`] tests.

    use std::str::FromStr as _;

    use common::Money;
    use secrecy::SecretBox;

    use crate::{
        command::{self, Command as _},
        domain::{
            property, rent_application,
            user::{self, Session},
            Property, User,
        },
        infra::Memory,
        Config, Credentials, Service,
    };

    /// [`Service`] backed by a fresh in-memory database.
    pub(crate) fn service() -> Service<Memory> {
        Service::new(
            Config::with_secret(
                b"test-secret",
                Credentials {
                    password_cost: 4,
                    ..Credentials::default()
                },
            ),
            Memory::new(),
        )
    }

    /// Registers a new [`User`] and returns its [`Session`].
    pub(crate) async fn register(
        svc: &Service<Memory>,
        email: &str,
        role: user::Role,
    ) -> (User, Session) {
        let user = svc
            .execute(command::CreateUser {
                name: user::Name::new(email.split('@').next().unwrap())
                    .unwrap(),
                email: user::Email::new(email).unwrap(),
                password: SecretBox::init_with(|| {
                    user::Password::new("secret1").unwrap()
                }),
                role,
                phone: None,
            })
            .await
            .unwrap();
        let session = Session {
            user_id: user.id,
            role: user.role,
            expires_at: (common::DateTime::now()
                + svc.config().credentials.session_ttl)
                .coerce(),
        };
        (user, session)
    }

    /// Lists a new [`Property`] on behalf of the provided landlord.
    pub(crate) async fn list_property(
        svc: &Service<Memory>,
        landlord: Session,
        locality: &str,
        city: &str,
        rent: &str,
    ) -> Property {
        svc.execute(command::CreateProperty {
            initiator: landlord,
            details: property::Details {
                bhk: 2,
                rent: Money::from_str(rent).unwrap(),
                size: 850,
                floor: property::Floor::new("Ground out of 2").unwrap(),
                area_type: property::AreaType::new("Super Area").unwrap(),
                locality: property::Locality::new(locality).unwrap(),
                city: property::City::new(city).unwrap(),
                furnishing_status: property::FurnishingStatus::new(
                    "Semi-Furnished",
                )
                .unwrap(),
                tenant_preferred: property::TenantPreferred::new(
                    "Bachelors/Family",
                )
                .unwrap(),
                bathrooms: 2,
                contact: property::Contact::new("Contact Owner").unwrap(),
                image: None,
            },
        })
        .await
        .unwrap()
    }

    /// Makes the provided tenant the occupant of the provided [`Property`]
    /// through an approved rent application.
    pub(crate) async fn move_in(
        svc: &Service<Memory>,
        landlord: Session,
        tenant: Session,
        property: &Property,
    ) {
        let application = svc
            .execute(command::SubmitRentApplication {
                initiator: tenant,
                property_id: property.id,
            })
            .await
            .unwrap();
        drop(
            svc.execute(command::DecideRentApplication {
                initiator: landlord,
                application_id: application.id,
                decision: rent_application::Decision::Approved,
            })
            .await
            .unwrap(),
        );
    }
}
