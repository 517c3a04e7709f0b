//! [`Category`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Contract;

/// Category grouping [`Contract`]s, like `IT` or `Insurances`.
#[derive(Clone, Debug)]
pub struct Category {
    /// ID of this [`Category`].
    pub id: Id,

    /// [`Name`] of this [`Category`].
    pub name: Name,
}

/// ID of a [`Category`].
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

/// Unique name of a [`Category`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.chars().count() <= 128
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}
