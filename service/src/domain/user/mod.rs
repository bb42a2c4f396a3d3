//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use tokio::task;
use uuid::Uuid;

pub use self::session::Session;

/// Marketplace user: either a tenant or a landlord.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`], unique among existing [`User`]s.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Role`] of this [`User`], never changes.
    pub role: Role,

    /// [`Phone`] of this [`User`].
    pub phone: Option<Phone>,

    /// [`Address`] of this [`User`].
    pub address: Option<Address>,

    /// [`Avatar`] of this [`User`].
    pub avatar: Option<Avatar>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was last modified.
    pub updated_at: ModificationDateTime,

    /// [`DateTime`] when this [`User`] signed in for the last time.
    pub last_login_at: Option<SignInDateTime>,

    /// [`DateTime`] when this [`User`] was deleted.
    pub deleted_at: Option<DeletionDateTime>,
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
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
    #[doc = "Role of a [`User`] on the marketplace."]
    enum Role {
        #[doc = "Looks for a place to rent."]
        Tenant = 1,

        #[doc = "Owns and lists properties."]
        Landlord = 2,
    }
}

define_text! {
    /// Name of a [`User`].
    Name(max = 256)
}

define_text! {
    /// Postal address of a [`User`].
    Address(max = 512)
}

define_text! {
    /// Path of an uploaded avatar image of a [`User`].
    Avatar(max = 1024)
}

/// Password of a [`User`].
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    ///
    /// [`bcrypt`] ignores everything after 72 bytes.
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.len() > 1 && password.len() <= 72
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [`bcrypt`] hash of a [`Password`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes the provided [`Password`] with the given [`bcrypt`] `cost`.
    ///
    /// Hashing runs on the blocking thread pool of [`tokio`].
    ///
    /// # Errors
    ///
    /// If the `cost` is out of the range supported by [`bcrypt`].
    pub async fn new(
        password: &Password,
        cost: u32,
    ) -> Result<Self, HashingError> {
        let password = password.0.clone();
        let hash =
            task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(Self(hash))
    }

    /// Checks whether this [`PasswordHash`] was produced from the provided
    /// [`Password`].
    ///
    /// Malformed hashes never match.
    pub async fn verify(&self, password: &Password) -> bool {
        let (password, hash) = (password.0.clone(), self.0.clone());
        match task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(HashingError::from)
            .and_then(|r| r.map_err(HashingError::from))
        {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "cannot verify password hash");
                false
            }
        }
    }
}

/// Error of hashing a [`Password`] or checking it against a
/// [`PasswordHash`].
#[derive(Debug, Display, Error, From)]
pub enum HashingError {
    /// [`bcrypt`] rejected its input.
    #[display("`bcrypt` failed: {_0}")]
    Bcrypt(bcrypt::BcryptError),

    /// Blocking task panicked or was cancelled.
    #[display("hashing task failed: {_0}")]
    Task(task::JoinError),
}

/// Email address of a [`User`].
///
/// Always lowercase, so comparison is case-insensitive.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format
    /// and is lowercase.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] from the trimmed and lowercased `address`, if
    /// it is valid.
    #[must_use]
    pub fn new(address: impl AsRef<str>) -> Option<Self> {
        let address = address.as_ref().trim().to_lowercase();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format: a local part, a
        /// single `@` and a dotted domain, without whitespace.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 320 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Phone`] if the given trimmed `number` is valid.
    #[must_use]
    pub fn new(number: impl AsRef<str>) -> Option<Self> {
        let number = number.as_ref().trim();
        Self::check(number).then(|| Self(number.to_owned()))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format: optional country
        /// code, then 7 to 15 digits optionally grouped by spaces or dashes.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^\+?\d[\d\s-]{5,18}\d$").expect("valid regex")
        });

        let number = number.as_ref();
        let digits = number.chars().filter(char::is_ascii_digit).count();
        (7..=15).contains(&digits) && REGEX.is_match(number)
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was last modified.
pub type ModificationDateTime = DateTimeOf<(User, unit::Modification)>;

/// [`DateTime`] when a [`User`] signed in.
pub type SignInDateTime = DateTimeOf<(User, unit::SignIn)>;

/// [`DateTime`] when a [`User`] was deleted.
pub type DeletionDateTime = DateTimeOf<(User, unit::Deletion)>;

#[cfg(test)]
mod spec {
    use super::{Email, Name, Password, PasswordHash, Phone, Role};

    #[test]
    fn email_is_normalized() {
        let email = Email::new("  T1@Example.COM ").unwrap();

        assert_eq!(email.to_string(), "t1@example.com");
        assert_eq!(email, Email::new("t1@example.com").unwrap());
    }

    #[test]
    fn email_rejects_malformed() {
        assert!(Email::new("t1example.com").is_none());
        assert!(Email::new("t1@example").is_none());
        assert!(Email::new("t 1@example.com").is_none());
        assert!(Email::new("t1@@example.com").is_none());
        assert!(Email::new("").is_none());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("tenant".parse::<Role>().unwrap(), Role::Tenant);
        assert_eq!("Landlord".parse::<Role>().unwrap(), Role::Landlord);
        assert_eq!("LANDLORD".parse::<Role>().unwrap(), Role::Landlord);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Tenant.to_string(), "TENANT");
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(Name::new("  Asha  ").unwrap().to_string(), "Asha");
        assert!(Name::new("   ").is_none());
        assert!(Name::new("a".repeat(257)).is_none());
    }

    #[test]
    fn phone_format() {
        assert!(Phone::new("+91 98765 43210").is_some());
        assert!(Phone::new("555-123-4567").is_some());
        assert!(Phone::new("12345").is_none());
        assert!(Phone::new("call me").is_none());
    }

    #[tokio::test]
    async fn password_hash_verifies_only_its_password() {
        let password = Password::new("secret1").unwrap();
        let hash = PasswordHash::new(&password, 4).await.unwrap();

        assert!(hash.verify(&password).await);
        assert!(!hash.verify(&Password::new("secret2").unwrap()).await);
        assert_ne!(hash, PasswordHash::new(&password, 4).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_never_matches() {
        let password = Password::new("secret1").unwrap();

        assert!(!PasswordHash("not-a-bcrypt-hash".into())
            .verify(&password)
            .await);
        assert!(PasswordHash::new(&password, 99).await.is_err());
    }
}
