//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, Error, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user::{self, Role};

/// Authenticated caller identity, carried as [JWT] claims.
///
/// Self-contained: nothing is stored on the server side.
///
/// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    #[serde(rename = "sub")]
    pub user_id: user::Id,

    /// [`Role`] of the [`User`] this [`Session`] belongs to.
    #[serde(with = "role")]
    pub role: Role,

    /// [`DateTime`] when this [`Session`] expires.
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,
}

impl Session {
    /// Ensures this [`Session`] belongs to a [`User`] with the provided
    /// [`Role`].
    ///
    /// # Errors
    ///
    /// [`Forbidden`] if the [`Role`] differs.
    pub fn require_role(&self, role: Role) -> Result<(), Forbidden> {
        if self.role == role {
            Ok(())
        } else {
            Err(Forbidden(self.user_id))
        }
    }

    /// Ensures this [`Session`] belongs to the provided resource owner.
    ///
    /// # Errors
    ///
    /// [`Forbidden`] if the owner is someone else.
    pub fn require_ownership(
        &self,
        owner_id: user::Id,
    ) -> Result<(), Forbidden> {
        if self.user_id == owner_id {
            Ok(())
        } else {
            Err(Forbidden(self.user_id))
        }
    }
}

/// [`User`] is not allowed to perform an operation.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[display("`User(id: {_0})` is not allowed to perform this operation")]
pub struct Forbidden(#[error(not(source))] pub user::Id);

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

mod role {
    //! (De)serialization of a [`Role`] as its name.

    use serde::{de::Error as _, Deserialize as _, Deserializer, Serializer};

    use super::Role;

    pub(super) fn serialize<S: Serializer>(
        role: &Role,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(role)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Role, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Forbidden, Role, Session};
    use crate::domain::user;

    fn session(role: Role) -> Session {
        Session {
            user_id: user::Id::new(),
            role,
            expires_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn require_role() {
        let tenant = session(Role::Tenant);

        assert_eq!(tenant.require_role(Role::Tenant), Ok(()));
        assert_eq!(
            tenant.require_role(Role::Landlord),
            Err(Forbidden(tenant.user_id)),
        );
    }

    #[test]
    fn require_ownership() {
        let landlord = session(Role::Landlord);

        assert!(landlord.require_ownership(landlord.user_id).is_ok());
        assert!(landlord.require_ownership(user::Id::new()).is_err());
    }
}
