//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData, str::FromStr};

use derive_more::{Display, Error, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::FormatItem, macros::format_description};

/// `YYYY-MM-DD` representation of a [`Date`].
const FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Untyped calendar date.
pub type Date = DateOf;

/// Calendar date without a time zone.
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// Latest representable [`Date`].
    pub const MAX: Self = Self::from_inner(time::Date::MAX);

    /// Returns the current UTC [`Date`].
    #[must_use]
    pub fn today() -> Self {
        Self::from_inner(time::OffsetDateTime::now_utc().date())
    }

    /// Creates a new [`Date`] out of its calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self::from_inner)
    }

    /// Wraps the provided [`time::Date`].
    const fn from_inner(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }

    /// Shifts this [`Date`] by the provided number of calendar [`Months`].
    ///
    /// The day of month is clamped to the last day of the resulting month, so
    /// `2024-01-31` plus one month is `2024-02-29`.
    ///
    /// [`None`] is returned if the result is out of the supported range.
    #[must_use]
    pub fn checked_add_months(self, months: Months) -> Option<Self> {
        let months_since_zero = self
            .inner
            .year()
            .checked_mul(12)?
            .checked_add(i32::from(u8::from(self.inner.month())) - 1)?
            .checked_add(months.0)?;
        let year = months_since_zero.div_euclid(12);
        let month = u8::try_from(months_since_zero.rem_euclid(12) + 1)
            .ok()
            .and_then(|m| time::Month::try_from(m).ok())?;
        let day = self
            .inner
            .day()
            .min(time::util::days_in_year_month(year, month));
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self::from_inner)
    }

    /// Shifts this [`Date`] back by the provided number of calendar
    /// [`Months`], clamping the day of month the same way
    /// [`DateOf::checked_add_months()`] does.
    #[must_use]
    pub fn checked_sub_months(self, months: Months) -> Option<Self> {
        self.checked_add_months(Months(months.0.checked_neg()?))
    }

    /// Shifts this [`Date`] by the provided number of days.
    ///
    /// [`None`] is returned if the result is out of the supported range.
    #[must_use]
    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        let secs = days.checked_mul(86_400)?;
        self.inner
            .checked_add(time::Duration::seconds(secs))
            .map(Self::from_inner)
    }

    /// Coerces one kind of [`Date`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateOf<NewOf> {
        DateOf::from_inner(self.inner)
    }
}

impl<Of: ?Sized> fmt::Debug for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Date({self})")
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.format(FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

impl<Of: ?Sized> FromStr for DateOf<Of> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        time::Date::parse(s, FORMAT)
            .map(Self::from_inner)
            .map_err(ParseError)
    }
}

/// Error of parsing a [`Date`] from a `YYYY-MM-DD` string.
#[derive(Clone, Copy, Debug, Display, Error)]
#[display("invalid `YYYY-MM-DD` date: {_0}")]
pub struct ParseError(time::error::Parse);

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(date: time::Date) -> Self {
        Self::from_inner(date)
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(date: DateOf<Of>) -> Self {
        date.inner
    }
}

/// Number of calendar months, possibly negative.
#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, Hash, Into, Ord, PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Months(i32);

impl Months {
    /// Creates new [`Months`] out of the provided count.
    #[must_use]
    pub const fn new(count: i32) -> Self {
        Self(count)
    }

    /// Returns the count of these [`Months`].
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Multiplies these [`Months`] by the provided factor.
    ///
    /// [`None`] is returned on overflow.
    #[must_use]
    pub const fn checked_mul(self, factor: i32) -> Option<Self> {
        match self.0.checked_mul(factor) {
            Some(m) => Some(Self(m)),
            None => None,
        }
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self::from_inner)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = crate::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from non-string \
                         value: {input}",
                    )
                })
                .and_then(|s| {
                    s.parse().map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Date, Months};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_displays() {
        assert_eq!(date("2024-03-09").to_string(), "2024-03-09");
        assert_eq!(Date::from_ymd(2024, 3, 9), Some(date("2024-03-09")));
        assert!("2024-13-01".parse::<Date>().is_err());
        assert!("2024/01/01".parse::<Date>().is_err());
        assert!(Date::from_ymd(2023, 2, 29).is_none());
    }

    #[test]
    fn adds_months_across_years() {
        let d = date("2024-11-15");

        assert_eq!(d.checked_add_months(Months::new(2)), Some(date("2025-01-15")));
        assert_eq!(
            d.checked_add_months(Months::new(-11)),
            Some(date("2023-12-15")),
        );
        assert_eq!(
            d.checked_sub_months(Months::new(23)),
            Some(date("2022-12-15")),
        );
        assert_eq!(d.checked_add_months(Months::new(0)), Some(d));
    }

    #[test]
    fn clamps_day_of_month() {
        assert_eq!(
            date("2024-01-31").checked_add_months(Months::new(1)),
            Some(date("2024-02-29")),
        );
        assert_eq!(
            date("2023-01-31").checked_add_months(Months::new(1)),
            Some(date("2023-02-28")),
        );
        assert_eq!(
            date("2024-05-31").checked_sub_months(Months::new(1)),
            Some(date("2024-04-30")),
        );
        assert_eq!(
            date("2024-02-29").checked_add_months(Months::new(12)),
            Some(date("2025-02-28")),
        );
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            date("9999-12-01").checked_add_months(Months::new(1)),
            None,
        );
        assert_eq!(
            date("2024-01-01").checked_add_months(Months::new(i32::MAX)),
            None,
        );
        assert_eq!(
            date("2024-01-01").checked_sub_months(Months::new(i32::MIN)),
            None,
        );
    }

    #[test]
    fn adds_days() {
        assert_eq!(
            date("2024-02-20").checked_add_days(10),
            Some(date("2024-03-01")),
        );
        assert_eq!(
            date("2024-01-01").checked_add_days(-1),
            Some(date("2023-12-31")),
        );
    }

    #[test]
    fn months_multiply() {
        assert_eq!(Months::new(12).checked_mul(3), Some(Months::new(36)));
        assert_eq!(Months::new(i32::MAX).checked_mul(2), None);
    }
}
