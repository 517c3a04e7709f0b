//! [`Contract`] definitions.

pub mod cancellation;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateOf, DateTimeOf, Months};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::category;
#[cfg(doc)]
use crate::domain::Category;

pub use self::cancellation::Schedule;

/// Legal or business contract of the organization.
#[derive(Clone, Debug)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// Human-readable [`Number`] of this [`Contract`].
    pub number: Number,

    /// [`Title`] of this [`Contract`].
    pub title: Title,

    /// Content of this [`Contract`].
    pub content: Text,

    /// Conditions of this [`Contract`].
    pub conditions: Text,

    /// [`Partner`] this [`Contract`] is concluded with.
    pub partner: Partner,

    /// ID of the [`Category`] this [`Contract`] belongs to.
    pub category_id: category::Id,

    /// [`Kind`] of this [`Contract`].
    pub kind: Kind,

    /// ID of the [`Kind::Framework`] [`Contract`] this [`Contract`] is
    /// grouped under, if any.
    pub framework_contract_id: Option<Id>,

    /// Date the commitment of this [`Contract`] begins.
    pub valid_from: CommencementDate,

    /// Date this [`Contract`] is no longer valid after.
    pub valid_until: Option<ExpirationDate>,

    /// Length of a single renewal period of this [`Contract`].
    pub term: Option<Months>,

    /// Date the mandatory initial commitment of this [`Contract`] ends.
    pub minimum_term: Option<MinimumTermDate>,

    /// Advance notice required to cancel this [`Contract`].
    pub notice_period: Option<Months>,

    /// Last computed cancellation [`Schedule`] of this [`Contract`].
    pub cancellation: Option<Schedule>,

    /// [`DateTime`] when this [`Contract`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Contract`] was terminated, if it was.
    pub terminated_at: Option<TerminationDateTime>,
}

impl Contract {
    /// Returns the [`cancellation::Terms`] of this [`Contract`].
    ///
    /// [`None`] is returned if this [`Contract`] lacks any of them.
    #[must_use]
    pub fn terms(&self) -> Option<cancellation::Terms> {
        cancellation::Terms::from_parts(
            self.valid_from,
            self.term,
            self.minimum_term,
            self.notice_period,
        )
    }

    /// Returns whether this [`Contract`] is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.terminated_at.is_none()
    }
}

/// ID of a [`Contract`].
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
    PartialEq,
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

/// Unique number of a [`Contract`], like `V000042`.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Number(String);

impl Number {
    /// Prefix of automatically assigned [`Number`]s.
    const PREFIX: char = 'V';

    /// Creates a new [`Number`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Returns the automatically assigned [`Number`] following the provided
    /// one.
    ///
    /// The `latest` [`Number`] is expected to be the highest automatically
    /// assigned one. Anything else is treated as if there were none.
    ///
    /// [`None`] is returned if the `latest` [`Number`] is too big to be
    /// followed by another one.
    #[must_use]
    pub fn next_after(latest: Option<&Self>) -> Option<Self> {
        let seq = match latest.and_then(Self::sequence) {
            Some(digits) => digits.parse::<u64>().ok()?.checked_add(1)?,
            None => 1,
        };
        Some(Self(format!("{}{seq:06}", Self::PREFIX)))
    }

    /// Returns the sequence digits of this [`Number`], if it was assigned
    /// automatically.
    fn sequence(&self) -> Option<&str> {
        let digits = self.0.strip_prefix(Self::PREFIX)?;
        (digits.len() >= 6 && digits.bytes().all(|b| b.is_ascii_digit()))
            .then_some(digits)
    }

    /// Checks whether the given `number` is a valid [`Number`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        number.trim() == number && !number.is_empty() && number.len() <= 64
    }
}

impl FromStr for Number {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Number`")
    }
}

/// Title of a [`Contract`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 512
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Partner a [`Contract`] is concluded with.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Partner(String);

impl Partner {
    /// Creates a new [`Partner`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Partner`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Partner {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Partner`")
    }
}

/// Free-form text of a [`Contract`]. May be empty.
#[derive(AsRef, Clone, Debug, Default, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Text(String);

impl Text {
    /// Creates a new [`Text`] if the given `text` is not too long.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.len() <= 65_536).then_some(Self(text))
    }
}

impl FromStr for Text {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Text`")
    }
}

define_kind! {
    #[doc = "Kind of a [`Contract`]."]
    enum Kind {
        #[doc = "[`Contract`] grouping other [`Contract`]s under it."]
        Framework = 1,

        #[doc = "Standalone [`Contract`]."]
        Individual = 2,
    }
}

/// [`DateTime`] when a [`Contract`] was created.
pub type CreationDateTime = DateTimeOf<(Contract, unit::Creation)>;

/// [`DateTime`] when a [`Contract`] was terminated.
pub type TerminationDateTime = DateTimeOf<(Contract, unit::Termination)>;

/// Date a [`Contract`] commitment begins.
pub type CommencementDate = DateOf<(Contract, unit::Commencement)>;

/// Date a [`Contract`] is no longer valid after.
pub type ExpirationDate = DateOf<(Contract, unit::Expiration)>;

/// Marker type indicating the end of a [`Contract`] minimum term.
#[derive(Clone, Copy, Debug)]
pub struct MinimumTerm;

/// Date the mandatory initial commitment of a [`Contract`] ends.
pub type MinimumTermDate = DateOf<(Contract, MinimumTerm)>;

/// Renewal boundary a [`Contract`] can be cancelled at.
pub type CancellationDate = DateOf<(Contract, unit::Cancellation)>;

/// Marker type indicating an action to be taken on a [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct Action;

/// Latest date a [`Contract`] cancellation notice has to be filed at.
pub type CancellationActionDate =
    DateOf<(Contract, unit::Cancellation, Action)>;

#[cfg(test)]
mod tests {
    use super::Number;

    fn next_after(latest: &str) -> Option<String> {
        let latest = Number::new(latest).unwrap();
        Number::next_after(Some(&latest)).map(|n| n.to_string())
    }

    #[test]
    fn assigns_first_number() {
        assert_eq!(
            Number::next_after(None).map(|n| n.to_string()).as_deref(),
            Some("V000001"),
        );
    }

    #[test]
    fn increments_latest_number() {
        assert_eq!(next_after("V000041").as_deref(), Some("V000042"));
        assert_eq!(next_after("V999999").as_deref(), Some("V1000000"));
    }

    #[test]
    fn ignores_manual_numbers() {
        for manual in ["ABC-1", "V12", "V00001x", "v000005"] {
            assert_eq!(
                next_after(manual).as_deref(),
                Some("V000001"),
                "{manual}",
            );
        }
    }

    #[test]
    fn refuses_to_follow_too_big_number() {
        assert_eq!(
            next_after(&format!("V{}", u64::MAX - 1)),
            Some(format!("V{}", u64::MAX)),
        );
        assert_eq!(next_after(&format!("V{}", u64::MAX)), None);
        assert_eq!(next_after("V99999999999999999999999"), None);
    }

    #[test]
    fn rejects_blank_numbers() {
        assert!(Number::new("").is_none());
        assert!(Number::new(" V000001").is_none());
    }
}
