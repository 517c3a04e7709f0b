//! [`Contract`] read model definition.

use common::{Date, Months};

use crate::domain::contract::{self, cancellation};
#[cfg(doc)]
use crate::domain::Contract;

/// Wrapper around [`Contract`] indicating that it [`is_active()`].
///
/// [`is_active()`]: Contract::is_active
#[derive(Clone, Copy, Debug)]
pub struct Active<T>(pub T);

/// Fields of a [`Contract`] its [`cancellation::Schedule`] is derived from.
#[derive(Clone, Copy, Debug)]
pub struct CancellationTerms {
    /// ID of the [`Contract`].
    pub id: contract::Id,

    /// Date the [`Contract`] commitment begins.
    pub valid_from: contract::CommencementDate,

    /// Length of a single renewal period.
    pub term: Option<Months>,

    /// Date the mandatory initial commitment ends.
    pub minimum_term: Option<contract::MinimumTermDate>,

    /// Advance notice required to cancel the [`Contract`].
    pub notice_period: Option<Months>,
}

impl CancellationTerms {
    /// Returns the [`cancellation::Terms`], if all of them are present.
    #[must_use]
    pub fn terms(&self) -> Option<cancellation::Terms> {
        cancellation::Terms::from_parts(
            self.valid_from,
            self.term,
            self.minimum_term,
            self.notice_period,
        )
    }
}

/// Selector of the highest automatically assigned [`contract::Number`].
#[derive(Clone, Copy, Debug)]
pub struct LatestNumber;

/// Window of [`contract::CancellationActionDate`]s, both ends inclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ActionWindow {
    /// First date of this [`ActionWindow`].
    pub from: Date,

    /// Last date of this [`ActionWindow`].
    pub to: Date,
}

impl ActionWindow {
    /// Checks whether the provided date falls into this [`ActionWindow`].
    #[must_use]
    pub fn contains(&self, date: contract::CancellationActionDate) -> bool {
        (self.from..=self.to).contains(&date.coerce())
    }
}

pub mod list {
    //! [`Contract`]s list definitions.

    use common::{define_pagination, Date};
    use derive_more::{From, Into};

    use crate::domain::{category, contract};
    #[cfg(doc)]
    use crate::domain::Contract;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = contract::Id;

    /// Cursor pointing to a specific [`Contract`] in a list.
    pub type Cursor = contract::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Words to search for in a [`Contract`] title, partner or content.
        pub search: Option<String>,

        /// ID of the [`category::Category`] to list [`Contract`]s of.
        pub category_id: Option<category::Id>,

        /// Date to list only non-terminated [`Contract`]s still valid on.
        pub valid_on: Option<Date>,
    }

    /// Total count of [`Contract`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);
}
