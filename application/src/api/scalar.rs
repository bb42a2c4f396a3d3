//! Custom GraphQL scalar helpers.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Strategy for `#[graphql(with = ..)]` representing a scalar as a string
/// of the domain type `As`.
///
/// Output goes through the [`fmt::Display`] of `As`, input is parsed with
/// its [`FromStr`] and then converted into the scalar with [`TryFrom`], so
/// domain validation applies to every input.
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Renders the `value` as a string [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::scalar(value.as_ref().to_string())
    }

    /// Parses a scalar from a string [`InputValue`].
    ///
    /// # Errors
    ///
    /// If the `input` is not a string or is rejected by `As`.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = T::name(&()).unwrap_or("scalar");
        let Some(raw) = input.as_string_value() else {
            return Err(format!("`{name}` expects a string, got: {input}"));
        };
        let parsed = raw
            .parse::<As>()
            .map_err(|e| format!("`{name}` rejects \"{raw}\": {e}"))?;
        T::try_from(parsed).map_err(|e| format!("`{name}` is invalid: {e}"))
    }

    /// Parses a [`ScalarToken`] as a string.
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        token: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(token)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue};

    use crate::api::property::City;

    use super::Via;

    type Input = InputValue<DefaultScalarValue>;

    #[test]
    fn parses_valid_strings() {
        let city: City =
            Via::<service::domain::property::City>::from_input(
                &Input::scalar("Mumbai"),
            )
            .unwrap();

        assert_eq!(city.to_string(), "Mumbai");
    }

    #[test]
    fn rejects_non_strings_and_invalid_values() {
        let err = Via::<service::domain::property::City>::from_input::<
            City,
            _,
        >(&Input::scalar(42))
        .unwrap_err();
        assert!(err.contains("expects a string"), "{err}");

        let err = Via::<service::domain::property::City>::from_input::<
            City,
            _,
        >(&Input::scalar("   "))
        .unwrap_err();
        assert!(err.contains("rejects"), "{err}");
    }
}
