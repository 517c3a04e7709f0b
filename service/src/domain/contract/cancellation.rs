//! Cancellation [`Schedule`] of a [`Contract`].
//!
//! A [`Contract`] renews every `term` months starting at its
//! [`CommencementDate`], each boundary being `term` months after the previous
//! one. Each renewal boundary is a possible cancellation
//! date, but only the ones at or after the [`MinimumTermDate`] are allowed,
//! and a cancellation notice has to be filed `notice_period` months before
//! the boundary it targets. [`Terms::schedule()`] finds the nearest boundary
//! which is still actionable.

use common::{Date, Months};

#[cfg(doc)]
use crate::domain::Contract;

use super::{
    CancellationActionDate, CancellationDate, CommencementDate,
    MinimumTermDate,
};

/// Terms of a [`Contract`] its cancellation [`Schedule`] is derived from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Terms {
    /// Date the [`Contract`] commitment begins.
    valid_from: CommencementDate,

    /// Length of a single renewal period. Always positive.
    term: Months,

    /// Date the mandatory initial commitment ends.
    minimum_term: MinimumTermDate,

    /// Required advance notice before a renewal boundary.
    notice_period: Months,
}

impl Terms {
    /// Creates new [`Terms`] if the provided `term` is positive.
    #[must_use]
    pub fn new(
        valid_from: CommencementDate,
        term: Months,
        minimum_term: MinimumTermDate,
        notice_period: Months,
    ) -> Option<Self> {
        (term.get() > 0).then_some(Self {
            valid_from,
            term,
            minimum_term,
            notice_period,
        })
    }

    /// Creates new [`Terms`] out of the optional fields of a [`Contract`].
    ///
    /// [`None`] is returned if any of the fields is absent, or the `term` is
    /// not positive.
    #[must_use]
    pub fn from_parts(
        valid_from: CommencementDate,
        term: Option<Months>,
        minimum_term: Option<MinimumTermDate>,
        notice_period: Option<Months>,
    ) -> Option<Self> {
        Self::new(valid_from, term?, minimum_term?, notice_period?)
    }

    /// Computes the cancellation [`Schedule`] as of the provided `today`.
    ///
    /// The returned [`Schedule::cancellation_date()`] is the first renewal
    /// boundary which is not before the [`MinimumTermDate`] and whose
    /// [`Schedule::action_date()`] is not before `today`.
    ///
    /// [`None`] is returned only if the boundary leaves the supported
    /// calendar range.
    #[must_use]
    pub fn schedule(&self, today: Date) -> Option<Schedule> {
        let minimum_term = self.minimum_term.coerce::<()>();

        let mut boundary = self.valid_from.coerce::<()>();
        while boundary < minimum_term {
            boundary = boundary.checked_add_months(self.term)?;
        }

        loop {
            let action_date = boundary.checked_sub_months(self.notice_period)?;
            if action_date >= today {
                return Some(Schedule {
                    cancellation_date: boundary.coerce(),
                    action_date: action_date.coerce(),
                });
            }
            boundary = boundary.checked_add_months(self.term)?;
        }
    }
}

/// Cancellation schedule of a [`Contract`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Schedule {
    /// Renewal boundary the [`Contract`] can be cancelled at.
    cancellation_date: CancellationDate,

    /// Latest date a cancellation notice has to be filed at.
    action_date: CancellationActionDate,
}

impl Schedule {
    /// Restores a [`Schedule`] out of its persisted dates.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the dates were produced together by
    /// [`Terms::schedule()`].
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(
        cancellation_date: CancellationDate,
        action_date: CancellationActionDate,
    ) -> Self {
        Self {
            cancellation_date,
            action_date,
        }
    }

    /// Returns the renewal boundary the [`Contract`] can be cancelled at.
    #[must_use]
    pub const fn cancellation_date(&self) -> CancellationDate {
        self.cancellation_date
    }

    /// Returns the latest date a cancellation notice has to be filed at.
    #[must_use]
    pub const fn action_date(&self) -> CancellationActionDate {
        self.action_date
    }
}

#[cfg(test)]
mod tests {
    use common::{Date, DateOf, Months};

    use super::{Schedule, Terms};

    fn date<Of: ?Sized>(s: &str) -> DateOf<Of> {
        s.parse().unwrap()
    }

    fn terms(valid_from: &str, term: i32, minimum: &str, notice: i32) -> Terms {
        Terms::new(
            date(valid_from),
            Months::new(term),
            date(minimum),
            Months::new(notice),
        )
        .unwrap()
    }

    fn dates(s: Schedule) -> (String, String) {
        (
            s.cancellation_date().to_string(),
            s.action_date().to_string(),
        )
    }

    #[test]
    fn schedules_first_boundary_after_minimum_term() {
        let t = terms("2024-01-01", 12, "2025-01-01", 3);

        let s = t.schedule(date("2024-06-01")).unwrap();

        assert_eq!(
            dates(s),
            ("2025-01-01".to_owned(), "2024-10-01".to_owned()),
        );
    }

    #[test]
    fn skips_boundary_whose_notice_has_passed() {
        let t = terms("2024-01-01", 12, "2025-01-01", 3);

        let s = t.schedule(date("2024-11-01")).unwrap();

        assert_eq!(
            dates(s),
            ("2026-01-01".to_owned(), "2025-10-01".to_owned()),
        );
    }

    #[test]
    fn keeps_boundary_actionable_today() {
        let t = terms("2024-01-01", 12, "2025-01-01", 3);

        let s = t.schedule(date("2024-10-01")).unwrap();

        assert_eq!(s.cancellation_date(), date("2025-01-01"));
        assert_eq!(s.action_date(), date("2024-10-01"));
    }

    #[test]
    fn starts_at_valid_from_when_minimum_term_passed() {
        let t = terms("2024-03-15", 6, "2023-01-01", 1);

        let s = t.schedule(date("2024-01-01")).unwrap();

        assert_eq!(s.cancellation_date(), date("2024-03-15"));
        assert_eq!(s.action_date(), date("2024-02-15"));
    }

    #[test]
    fn advances_from_previous_boundary() {
        let t = terms("2024-01-31", 1, "2024-03-01", 0);

        let s = t.schedule(date("2024-01-01")).unwrap();

        // 01-31 -> 02-29 -> 03-29, the clamped day carries over.
        assert_eq!(s.cancellation_date(), date("2024-03-29"));
        assert_eq!(s.action_date(), date("2024-03-29"));
    }

    #[test]
    fn action_date_is_notice_period_before_cancellation() {
        let today: Date = date("2024-07-20");
        for (from, term, min, notice) in [
            ("2020-05-31", 1, "2021-01-01", 1),
            ("2019-02-28", 12, "2020-02-29", 6),
            ("2023-08-31", 3, "2023-08-31", 2),
            ("2024-07-20", 24, "2024-07-20", 0),
        ] {
            let s = terms(from, term, min, notice).schedule(today).unwrap();

            assert_eq!(
                s.cancellation_date()
                    .checked_sub_months(Months::new(notice))
                    .map(DateOf::coerce),
                Some(s.action_date()),
                "{from} / {term} / {min} / {notice}",
            );
            assert!(s.cancellation_date().coerce::<()>() >= date(min));
            assert!(s.action_date().coerce::<()>() >= today);
        }
    }

    #[test]
    fn is_idempotent_for_same_day() {
        let t = terms("2021-04-10", 12, "2022-04-10", 3);
        let today = date("2024-02-01");

        assert_eq!(t.schedule(today), t.schedule(today));
    }

    #[test]
    fn advances_once_action_date_passes() {
        let t = terms("2021-04-10", 12, "2022-04-10", 3);

        let mut previous = t.schedule(date("2021-01-01")).unwrap();
        let mut today: Date = date("2021-01-01");
        while let Some(next) = today.checked_add_days(17) {
            if next > date("2030-01-01") {
                break;
            }
            today = next;

            let current = t.schedule(today).unwrap();
            if today > previous.action_date().coerce() {
                assert!(
                    current.cancellation_date() > previous.cancellation_date(),
                    "{today}",
                );
            } else {
                assert_eq!(current, previous, "{today}");
            }
            previous = current;
        }
    }

    #[test]
    fn rejects_non_positive_term() {
        let from = date("2024-01-01");
        let min = date("2025-01-01");

        assert_eq!(Terms::new(from, Months::new(0), min, Months::new(3)), None);
        assert_eq!(
            Terms::new(from, Months::new(-12), min, Months::new(3)),
            None,
        );
    }

    #[test]
    fn requires_all_parts() {
        let from = date("2024-01-01");
        let min = Some(date("2025-01-01"));
        let m = |n| Some(Months::new(n));

        assert!(Terms::from_parts(from, m(12), min, m(3)).is_some());
        assert_eq!(Terms::from_parts(from, None, min, m(3)), None);
        assert_eq!(Terms::from_parts(from, m(12), None, m(3)), None);
        assert_eq!(Terms::from_parts(from, m(12), min, None), None);
        assert_eq!(Terms::from_parts(from, m(0), min, m(3)), None);
    }

    #[test]
    fn gives_up_outside_calendar_range() {
        let t = terms("9998-01-01", 12, "9999-06-01", 0);

        assert_eq!(t.schedule(date("2024-01-01")), None);
    }
}
