//! [`Query`] collection related to the multiple [`Contract`]s.

use common::{
    operations::{By, Select},
    Date,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::contract::{cancellation::Schedule, Number};
use crate::{
    domain::Contract,
    infra::{database, Database},
    read::{
        self,
        contract::{Active, ActionWindow},
    },
    Query, Service,
};

use super::DatabaseQuery;

/// Queries a list of [`Contract`]s.
pub type List = DatabaseQuery<
    By<read::contract::list::Page, read::contract::list::Selector>,
>;

/// Queries total count of [`Contract`]s.
pub type TotalCount = DatabaseQuery<By<read::contract::list::TotalCount, ()>>;

/// [`Query`] of the active [`Contract`]s whose cancellation notice has to be
/// filed within the next days.
///
/// Only active [`Contract`]s having their [`Schedule::action_date()`] inside
/// the [`ActionWindow`] are returned, the soonest first, and the ones due on
/// the same day ordered by their [`Number`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Expiring {
    /// Date to look ahead from.
    as_of: Date,

    /// Number of days to look ahead, including the last one.
    lookahead_days: i32,
}

impl Expiring {
    /// Number of days to look ahead if nothing valid is requested.
    pub const DEFAULT_LOOKAHEAD_DAYS: i32 = 90;

    /// Creates a new [`Expiring`] [`Query`] looking ahead from today.
    ///
    /// Falls back to the [`Expiring::DEFAULT_LOOKAHEAD_DAYS`] if no
    /// `lookahead_days` are provided, or they're not positive.
    #[must_use]
    pub fn new(lookahead_days: Option<i32>) -> Self {
        Self {
            as_of: Date::today(),
            lookahead_days: lookahead_days
                .filter(|d| *d > 0)
                .unwrap_or(Self::DEFAULT_LOOKAHEAD_DAYS),
        }
    }

    /// Makes this [`Expiring`] [`Query`] look ahead from the provided date.
    #[must_use]
    pub fn as_of(mut self, date: Date) -> Self {
        self.as_of = date;
        self
    }

    /// Returns the number of days this [`Expiring`] [`Query`] looks ahead.
    #[must_use]
    pub fn lookahead_days(&self) -> i32 {
        self.lookahead_days
    }

    /// Returns the [`ActionWindow`] this [`Expiring`] [`Query`] covers.
    #[must_use]
    pub fn window(&self) -> ActionWindow {
        ActionWindow {
            from: self.as_of,
            to: self
                .as_of
                .checked_add_days(i64::from(self.lookahead_days))
                .unwrap_or(Date::MAX),
        }
    }
}

impl<Db> Query<Expiring> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Active<Contract>>, ActionWindow>>,
        Ok = Vec<Active<Contract>>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(&self, query: Expiring) -> Result<Self::Ok, Self::Err> {
        let window = query.window();

        let mut expiring = self
            .database()
            .execute(Select(By::new(window)))
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .filter_map(|Active(c)| {
                let action_date = c.cancellation?.action_date();
                (c.is_active() && window.contains(action_date))
                    .then_some((action_date, c))
            })
            .collect::<Vec<_>>();
        expiring.sort_by(|(a, x), (b, y)| {
            a.cmp(b).then_with(|| x.number.cmp(&y.number))
        });

        Ok(expiring.into_iter().map(|(_, c)| c).collect())
    }
}

#[cfg(test)]
mod tests {
    use common::{
        operations::{By, Select},
        Date, DateTime, Months,
    };
    use tracerr::Traced;

    use crate::{
        domain::{
            category,
            contract::{self, cancellation::Terms},
            Contract,
        },
        infra::{database, Database},
        read::contract::{Active, ActionWindow},
        Query as _,
    };

    use super::Expiring;

    /// Storage handing out all of its [`Contract`]s, whatever is asked.
    #[derive(Clone, Debug, Default)]
    struct MockDb {
        contracts: Vec<Contract>,
    }

    impl Database<Select<By<Vec<Active<Contract>>, ActionWindow>>> for MockDb {
        type Ok = Vec<Active<Contract>>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Select<By<Vec<Active<Contract>>, ActionWindow>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.contracts.iter().cloned().map(Active).collect())
        }
    }

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn days_after(today: Date, days: i64) -> Date {
        today.checked_add_days(days).unwrap()
    }

    fn due(number: &str, action_date: Option<Date>) -> Contract {
        Contract {
            id: contract::Id::new(),
            number: contract::Number::new(number).unwrap(),
            title: contract::Title::new("Office lease").unwrap(),
            content: contract::Text::default(),
            conditions: contract::Text::default(),
            partner: contract::Partner::new("ACME").unwrap(),
            category_id: category::Id::new(),
            kind: contract::Kind::Individual,
            framework_contract_id: None,
            valid_from: date("2020-01-01").coerce(),
            valid_until: None,
            term: None,
            minimum_term: None,
            notice_period: None,
            cancellation: action_date.map(|d| {
                let (from, year, min) = (d.coerce(), Months::new(12), d.coerce());
                Terms::new(from, year, min, Months::new(0))
                    .and_then(|t| t.schedule(d))
                    .unwrap()
            }),
            created_at: DateTime::now().coerce(),
            terminated_at: None,
        }
    }

    fn terminated(mut c: Contract) -> Contract {
        c.terminated_at = Some(DateTime::now().coerce());
        c
    }

    fn service(db: MockDb) -> crate::Service<MockDb> {
        crate::Service::new(
            crate::Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    b"test",
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    b"test",
                ),
                session_ttl: std::time::Duration::from_secs(60),
            },
            db,
        )
    }

    fn numbers(contracts: &[Contract]) -> Vec<String> {
        contracts.iter().map(|c| c.number.to_string()).collect()
    }

    #[test]
    fn defaults_to_ninety_days() {
        for days in [None, Some(0), Some(-5)] {
            let q = Expiring::new(days).as_of(date("2024-06-01"));

            assert_eq!(q.lookahead_days(), 90, "{days:?}");
            assert_eq!(q.window().from, date("2024-06-01"));
            assert_eq!(q.window().to, date("2024-08-30"));
        }
    }

    #[test]
    fn looks_ahead_requested_days() {
        let q = Expiring::new(Some(30)).as_of(date("2024-02-15"));

        assert_eq!(q.window().to, date("2024-03-16"));
    }

    #[test]
    fn window_includes_both_ends() {
        let w = Expiring::new(Some(10)).as_of(date("2024-06-01")).window();

        assert!(w.contains(date("2024-06-01").coerce()));
        assert!(w.contains(date("2024-06-11").coerce()));
        assert!(!w.contains(date("2024-05-31").coerce()));
        assert!(!w.contains(date("2024-06-12").coerce()));
    }

    #[test]
    fn saturates_far_lookahead() {
        let w = Expiring::new(Some(i32::MAX)).as_of(date("2024-06-01")).window();

        assert_eq!(w.to, Date::MAX);
    }

    #[tokio::test]
    async fn returns_only_active_contracts_due_within_window() {
        let today = date("2024-06-01");
        let db = MockDb {
            contracts: vec![
                due("V000001", Some(days_after(today, 10))),
                due("V000002", Some(days_after(today, 40))),
                terminated(due("V000003", Some(days_after(today, -5)))),
            ],
        };

        let expiring = service(db)
            .execute(Expiring::new(Some(30)).as_of(today))
            .await
            .unwrap();

        assert_eq!(numbers(&expiring), ["V000001"]);
    }

    #[tokio::test]
    async fn skips_terminated_and_unscheduled_contracts() {
        let today = date("2024-06-01");
        let db = MockDb {
            contracts: vec![
                terminated(due("V000001", Some(days_after(today, 3)))),
                due("V000002", None),
                due("V000003", Some(days_after(today, -1))),
            ],
        };

        let expiring = service(db)
            .execute(Expiring::new(None).as_of(today))
            .await
            .unwrap();

        assert!(expiring.is_empty());
    }

    #[tokio::test]
    async fn orders_soonest_first() {
        let today = date("2024-06-01");
        let db = MockDb {
            contracts: vec![
                due("V000001", Some(days_after(today, 20))),
                due("V000004", Some(days_after(today, 5))),
                due("V000002", Some(today)),
                due("V000003", Some(days_after(today, 5))),
            ],
        };

        let expiring = service(db)
            .execute(Expiring::new(Some(30)).as_of(today))
            .await
            .unwrap();

        assert_eq!(
            numbers(&expiring),
            ["V000002", "V000003", "V000004", "V000001"],
        );
    }
}
