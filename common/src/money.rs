//! [`Money`] definitions.

use std::{cmp::Ordering, fmt, str::FromStr};

use derive_more::{Display, Error};
use rust_decimal::Decimal;

use crate::define_kind;

/// Non-negative amount of some [`Currency`].
///
/// Written as the amount immediately followed by the currency code, e.g.
/// `15000INR` or `99.50USD`. Amounts of different currencies don't
/// compare: [`PartialOrd`] gives [`None`] for them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount in major units.
    pub amount: Decimal,

    /// [`Currency`] of the [`Money::amount`].
    pub currency: Currency,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount.normalize(), self.currency)
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.amount.cmp(&other.amount))
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .len()
            .checked_sub(3)
            .filter(|&at| at > 0 && s.is_char_boundary(at))
            .ok_or(ParseMoneyError::Format)?;
        let (amount, code) = s.split_at(split);

        let amount = Decimal::from_str(amount)
            .map_err(|_| ParseMoneyError::Amount)?;
        if amount.is_sign_negative() {
            return Err(ParseMoneyError::Negative);
        }
        let currency =
            code.parse().map_err(|_| ParseMoneyError::Currency)?;

        Ok(Self { amount, currency })
    }
}

/// Error of parsing [`Money`] from a string.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum ParseMoneyError {
    /// Not an amount followed by a three-letter code.
    #[display("expected an amount followed by a currency code")]
    Format,

    /// Amount is not a decimal number.
    #[display("amount is not a decimal number")]
    Amount,

    /// Amount is below zero.
    #[display("amount cannot be negative")]
    Negative,

    /// Currency code is not a known [`Currency`].
    #[display("unknown currency")]
    Currency,
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Indian Rupee."]
        Inr = 1,

        #[doc = "US Dollar."]
        Usd = 2,

        #[doc = "Euro."]
        Eur = 3,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! [`juniper`] scalar of [`Money`].

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Non-negative amount followed by a currency code, e.g. `15000INR` or
    /// `99.5USD`.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let Some(s) = input.as_string_value() else {
                return Err(format!("`Money` expects string, got: {input}"));
            };
            s.parse().map_err(|e| format!("`Money` \"{s}\": {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Currency, Money, ParseMoneyError};

    fn money(amount: &str, currency: Currency) -> Money {
        Money {
            amount: amount.parse::<Decimal>().unwrap(),
            currency,
        }
    }

    #[test]
    fn parses_amount_and_code() {
        assert_eq!("15000INR".parse(), Ok(money("15000", Currency::Inr)));
        assert_eq!("99.50usd".parse(), Ok(money("99.50", Currency::Usd)));
        assert_eq!("0EUR".parse(), Ok(money("0", Currency::Eur)));
    }

    #[test]
    fn rejects_malformed() {
        use ParseMoneyError as E;

        assert_eq!("INR".parse::<Money>(), Err(E::Format));
        assert_eq!("1.5".parse::<Money>(), Err(E::Format));
        assert_eq!("abcINR".parse::<Money>(), Err(E::Amount));
        assert_eq!("-5INR".parse::<Money>(), Err(E::Negative));
        assert_eq!("100GBP".parse::<Money>(), Err(E::Currency));
        assert_eq!("₹10".parse::<Money>(), Err(E::Format));
    }

    #[test]
    fn displays_without_trailing_zeros() {
        assert_eq!(money("25000.50", Currency::Inr).to_string(), "25000.5INR");
        assert_eq!(money("123.00", Currency::Usd).to_string(), "123USD");
        assert_eq!(money("0.75", Currency::Eur).to_string(), "0.75EUR");
    }

    #[test]
    fn compares_only_within_currency() {
        let cheap = money("9000", Currency::Inr);
        let pricey = money("25000", Currency::Inr);
        let dollars = money("100", Currency::Usd);

        assert!(cheap < pricey);
        assert!(pricey >= cheap);
        assert_eq!(cheap.partial_cmp(&dollars), None);
        assert!(!(cheap <= dollars));
        assert!(!(cheap >= dollars));
    }
}
