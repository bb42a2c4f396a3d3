//! Domain definitions.

/// Defines a free-form text value: trimmed, non-empty and bounded in length.
///
/// Must stay above the module declarations to be visible in them.
macro_rules! define_text {
    (
        $(#[doc = $doc:literal])*
        $name:ident(max = $max:literal)
    ) => {
        $(#[doc = $doc])*
        #[derive(
            ::derive_more::AsRef,
            Clone,
            Debug,
            ::derive_more::Display,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
        )]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent),
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`].")]
            ///
            /// # Safety
            ///
            /// The caller must ensure that the given `value` is trimmed,
            /// non-empty and not too long.
            #[expect(unsafe_code, reason = "bypass")]
            #[must_use]
            pub unsafe fn new_unchecked(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[doc = concat!(
                "Creates a new [`", stringify!($name), "`] from the trimmed ",
                "`value`, if it is valid.",
            )]
            #[must_use]
            pub fn new(value: impl AsRef<str>) -> Option<Self> {
                let value = value.as_ref().trim();
                Self::check(value).then(|| Self(value.to_owned()))
            }

            /// Checks whether the given `value` is valid.
            fn check(value: &str) -> bool {
                !value.is_empty() && value.chars().count() <= $max
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
                    .ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    };
}

pub mod maintenance;
pub mod message;
pub mod payment;
pub mod property;
pub mod rent_application;
pub mod user;

pub use self::{
    maintenance::MaintenanceRequest, message::Message, payment::Payment,
    property::Property, rent_application::RentApplication, user::User,
};
