//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Uses [`FromStr`]/[`Display`] impls of `As` type to convert the target type
/// to/from GraphQL scalar.
///
/// Target type must implement [`TryFrom`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Convert the target type into scalar [`Value`] by using [`Display`] impl
    /// of `As` type.
    ///
    /// [`Display`]: fmt::Display
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from scalar [`Value`] by using [`FromStr`]
    /// impl of `As` type.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the input value is not a string;
    /// - the input value cannot be parsed into `As` type;
    /// - the parsed value cannot be converted into the target type.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr + fmt::Display,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{}`: expected string input \
                 value, found: {input}",
                T::name(&()).expect("always has a name"),
            )
        })?;
        s.parse::<As>()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{}` from \"{s}\" string: {e}",
                    T::name(&()).expect("always has a name"),
                )
            })?
            .try_into()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{}`: {e}",
                    T::name(&()).expect("always has a name"),
                )
            })
    }

    /// Parse the provided [`ScalarToken`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be parsed as [`String`].
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod tests {
    use juniper::{DefaultScalarValue, InputValue, Value};
    use service::domain;

    use crate::api::{category, user};

    use super::Via;

    #[test]
    fn parses_valid_input() {
        let login = Via::<domain::user::Login>::from_input::<
            user::Login,
            DefaultScalarValue,
        >(&InputValue::scalar("jane.doe"))
        .unwrap();

        assert_eq!(login.to_string(), "jane.doe");
    }

    #[test]
    fn rejects_invalid_input() {
        let err = Via::<domain::category::Name>::from_input::<
            category::Name,
            DefaultScalarValue,
        >(&InputValue::scalar(" IT"))
        .unwrap_err();
        assert!(err.contains("CategoryName"), "{err}");

        let err = Via::<domain::user::Login>::from_input::<
            user::Login,
            DefaultScalarValue,
        >(&InputValue::scalar(42))
        .unwrap_err();
        assert!(err.contains("expected string"), "{err}");
    }

    #[test]
    fn outputs_display() {
        let name = category::Name::from(
            domain::category::Name::new("Versicherungen").unwrap(),
        );

        assert_eq!(
            Via::<domain::category::Name>::to_output::<_, DefaultScalarValue>(
                &name,
            ),
            Value::scalar("Versicherungen"),
        );
    }
}
