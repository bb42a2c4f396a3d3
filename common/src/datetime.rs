//! [`DateTimeOf`] definitions.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, hash, marker::PhantomData, ops, time::Duration};

use derive_more::{Debug, Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// [`DateTimeOf`] not bound to any particular event.
pub type DateTime = DateTimeOf;

/// Moment in UTC with microsecond precision, tagged with what it is the
/// moment `Of`.
///
/// The tag keeps e.g. a creation time from being passed where an
/// expiration time is expected. Use [`DateTimeOf::coerce()`] to retag.
#[derive(Debug)]
pub struct DateTimeOf<Of: ?Sized = ()> {
    /// UTC moment, never finer than a microsecond.
    utc: OffsetDateTime,

    /// What this moment stands for.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateTimeOf<Of> {
    /// Wraps the provided `moment`, converting it to UTC and dropping
    /// precision finer than a microsecond.
    fn from_moment(moment: OffsetDateTime) -> Self {
        let utc = moment.to_offset(time::UtcOffset::UTC);
        let nanos = utc.nanosecond() % 1_000;
        Self {
            utc: utc - time::Duration::nanoseconds(nanos.into()),
            _of: PhantomData,
        }
    }

    /// Returns the current moment.
    ///
    /// Precision matches a `TIMESTAMPTZ` column, so stored values compare
    /// equal to the ones read back.
    #[must_use]
    pub fn now() -> Self {
        Self::from_moment(OffsetDateTime::now_utc())
    }

    /// Creates a [`DateTimeOf`] from seconds elapsed since the Unix epoch.
    ///
    /// [`None`] if the `seconds` are out of the supported range.
    #[must_use]
    pub fn from_unix_timestamp(seconds: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(seconds)
            .ok()
            .map(Self::from_moment)
    }

    /// Returns whole seconds elapsed since the Unix epoch.
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.utc.unix_timestamp()
    }

    /// Drops the fraction of a second of this moment.
    #[must_use]
    pub fn whole_seconds(self) -> Self {
        let nanos = self.utc.nanosecond();
        Self {
            utc: self.utc - time::Duration::nanoseconds(nanos.into()),
            _of: PhantomData,
        }
    }

    /// Parses an [RFC 3339] string with any offset.
    ///
    /// # Errors
    ///
    /// If the `input` is not a valid [RFC 3339] date and time.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub fn from_rfc3339(input: &str) -> Result<Self, ParseError> {
        OffsetDateTime::parse(input, &Rfc3339)
            .map(Self::from_moment)
            .map_err(ParseError)
    }

    /// Formats this moment as an [RFC 3339] string in UTC.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        // Only years outside 0..=9999 fail to format, and `time` cannot
        // represent those without the `large-dates` feature.
        self.utc.format(&Rfc3339).unwrap_or_default()
    }

    /// Retags this moment as the moment of `Other`.
    #[must_use]
    pub fn coerce<Other: ?Sized>(self) -> DateTimeOf<Other> {
        DateTimeOf {
            utc: self.utc,
            _of: PhantomData,
        }
    }
}

/// Error of parsing a [`DateTimeOf`] from an [RFC 3339] string.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid RFC 3339 date and time: {_0}")]
pub struct ParseError(time::error::Parse);

impl<Of: ?Sized> Copy for DateTimeOf<Of> {}
impl<Of: ?Sized> Clone for DateTimeOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateTimeOf<Of> {}
impl<Of: ?Sized> PartialEq for DateTimeOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.utc == other.utc
    }
}

impl<Of: ?Sized> hash::Hash for DateTimeOf<Of> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.utc.hash(state);
    }
}

impl<Of: ?Sized> Ord for DateTimeOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc.cmp(&other.utc)
    }
}
impl<Of: ?Sized> PartialOrd for DateTimeOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> From<OffsetDateTime> for DateTimeOf<Of> {
    fn from(moment: OffsetDateTime) -> Self {
        Self::from_moment(moment)
    }
}

impl<Of: ?Sized> From<DateTimeOf<Of>> for OffsetDateTime {
    fn from(dt: DateTimeOf<Of>) -> Self {
        dt.utc
    }
}

impl<Of: ?Sized> ops::Add<Duration> for DateTimeOf<Of> {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self::from_moment(self.utc + rhs)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        OffsetDateTime::from_sql(ty, raw).map(Self::from_moment)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateTimeOf<Of> {
    accepts!(TIMESTAMPTZ);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.utc.to_sql(ty, out)
    }
}

#[cfg(feature = "serde")]
pub mod serde {
    //! [`serde`] representations of a [`DateTimeOf`].

    pub mod unix_timestamp {
        //! [`DateTimeOf`] as whole seconds since the Unix epoch, for use in
        //! `#[serde(with = "..")]`.
        //!
        //! [`DateTimeOf`]: crate::DateTimeOf

        use serde::{de, Deserialize as _, Deserializer, Serializer};

        use crate::DateTimeOf;

        /// Writes the `dt` as whole seconds since the Unix epoch.
        ///
        /// # Errors
        ///
        /// If the `serializer` fails.
        pub fn serialize<Of, S>(
            dt: &DateTimeOf<Of>,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            Of: ?Sized,
            S: Serializer,
        {
            serializer.serialize_i64(dt.unix_timestamp())
        }

        /// Reads a [`DateTimeOf`] from seconds since the Unix epoch.
        ///
        /// # Errors
        ///
        /// If the value is not an integer or is out of range.
        pub fn deserialize<'de, D, Of>(
            deserializer: D,
        ) -> Result<DateTimeOf<Of>, D::Error>
        where
            D: Deserializer<'de>,
            Of: ?Sized,
        {
            let seconds = i64::deserialize(deserializer)?;
            DateTimeOf::from_unix_timestamp(seconds).ok_or_else(|| {
                de::Error::custom(format!("timestamp {seconds} out of range"))
            })
        }
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! [`juniper`] scalar of a [`DateTime`].

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Date and time as an [RFC 3339] string in UTC, with up to microsecond
    /// precision, e.g. `2024-05-01T10:00:00.123456Z`.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    #[graphql_scalar(with = Self, parse_token(String))]
    type DateTime = crate::DateTime;

    impl DateTime {
        fn to_output<S: ScalarValue>(dt: &DateTime) -> Value<S> {
            Value::scalar(dt.to_rfc3339())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let Some(s) = input.as_string_value() else {
                return Err(format!("`DateTime` expects string, got: {input}"));
            };
            Self::from_rfc3339(s).map_err(|e| format!("`DateTime`: {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{DateTime, DateTimeOf};

    struct Expiry;

    #[test]
    fn now_has_microsecond_precision() {
        let now = time::OffsetDateTime::from(DateTime::now());

        assert_eq!(now.nanosecond() % 1_000, 0);
    }

    #[test]
    fn rfc3339_output_parses_back() {
        let dt = DateTime::from_rfc3339("2024-03-01T10:20:30.123456Z").unwrap();

        assert_eq!(DateTime::from_rfc3339(&dt.to_rfc3339()).unwrap(), dt);
    }

    #[test]
    fn converts_offsets_to_utc() {
        let local =
            DateTime::from_rfc3339("2024-03-01T15:50:30+05:30").unwrap();
        let utc = DateTime::from_rfc3339("2024-03-01T10:20:30Z").unwrap();

        assert_eq!(local, utc);
        assert!(local.to_rfc3339().ends_with('Z'));
    }

    #[test]
    fn drops_sub_microsecond_digits() {
        let fine =
            DateTime::from_rfc3339("2024-03-01T10:20:30.123456789Z").unwrap();
        let coarse =
            DateTime::from_rfc3339("2024-03-01T10:20:30.123456Z").unwrap();

        assert_eq!(fine, coarse);
        assert_eq!(
            fine.whole_seconds(),
            DateTime::from_rfc3339("2024-03-01T10:20:30Z").unwrap(),
        );
    }

    #[test]
    fn coercion_and_addition() {
        let start = DateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let expires: DateTimeOf<Expiry> =
            (start + Duration::from_secs(3600)).coerce();

        assert_eq!(expires.unix_timestamp(), 1_700_003_600);
        assert!(expires.coerce::<()>() > start);
    }

    #[test]
    fn rejects_garbage() {
        assert!(DateTime::from_rfc3339("yesterday").is_err());
        assert!(DateTime::from_unix_timestamp(i64::MAX).is_none());
    }
}
