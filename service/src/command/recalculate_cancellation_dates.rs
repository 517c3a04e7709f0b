//! [`Command`] for recalculating cancellation [`Schedule`]s.

use common::{
    operations::{By, Select, Update},
    Date,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Contract;
use crate::{
    domain::contract::{self, cancellation::Schedule},
    infra::{database, Database},
    read::contract::{Active, CancellationTerms},
    Service,
};

use super::Command;

/// [`Command`] for recalculating the cancellation [`Schedule`]s of all the
/// active [`Contract`]s.
///
/// [`Contract`]s lacking any of their cancellation terms get their
/// [`Schedule`] cleared. Each [`Contract`] is persisted on its own, so a
/// failure doesn't affect the others. [`Contract`]s terminated meanwhile are
/// left untouched.
#[derive(Clone, Copy, Debug)]
pub struct RecalculateCancellationDates {
    /// Date to recalculate the [`Schedule`]s as of.
    pub as_of: Date,
}

impl RecalculateCancellationDates {
    /// Creates a new [`RecalculateCancellationDates`] [`Command`] as of the
    /// current date.
    #[must_use]
    pub fn today() -> Self {
        Self {
            as_of: Date::today(),
        }
    }
}

/// Output of [`RecalculateCancellationDates`] [`Command`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Output {
    /// Number of [`Contract`]s which got a new [`Schedule`].
    pub updated: usize,

    /// Number of [`Contract`]s which got their [`Schedule`] cleared.
    pub cleared: usize,

    /// Number of [`Contract`]s which were terminated before being persisted.
    pub skipped: usize,

    /// Number of [`Contract`]s which failed to be persisted.
    pub failed: usize,
}

impl<Db> Command<RecalculateCancellationDates> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Active<CancellationTerms>>, ()>>,
            Ok = Vec<Active<CancellationTerms>>,
            Err = Traced<database::Error>,
        > + Database<
            Update<(contract::Id, Option<Schedule>)>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RecalculateCancellationDates,
    ) -> Result<Self::Ok, Self::Err> {
        let RecalculateCancellationDates { as_of } = cmd;

        let contracts = self
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;

        let mut out = Output::default();
        for Active(c) in contracts {
            let schedule = c.terms().and_then(|terms| {
                let schedule = terms.schedule(as_of);
                if schedule.is_none() {
                    log::warn!(
                        "cancellation schedule of `Contract(id: {})` is out \
                         of supported calendar range, clearing it",
                        c.id,
                    );
                }
                schedule
            });

            match self.database().execute(Update((c.id, schedule))).await {
                Ok(true) if schedule.is_some() => out.updated += 1,
                Ok(true) => out.cleared += 1,
                Ok(false) => {
                    log::debug!(
                        "`Contract(id: {})` is terminated, skipping its \
                         cancellation schedule",
                        c.id,
                    );
                    out.skipped += 1;
                }
                Err(e) => {
                    log::warn!(
                        "failed to persist cancellation schedule of \
                         `Contract(id: {})`: {e}",
                        c.id,
                    );
                    out.failed += 1;
                }
            }
        }

        log::info!(
            "recalculated cancellation schedules as of {as_of}: \
             {} updated, {} cleared, {} skipped, {} failed",
            out.updated,
            out.cleared,
            out.skipped,
            out.failed,
        );

        Ok(out)
    }
}

/// Error of [`RecalculateCancellationDates`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashMap, HashSet},
        sync::{Arc, Mutex},
    };

    use common::{
        operations::{By, Select, Update},
        Date, DateOf, Months,
    };
    use tracerr::Traced;

    use crate::{
        domain::contract::{self, cancellation::Schedule},
        infra::{database, Database},
        read::contract::{Active, CancellationTerms},
        Command as _,
    };

    use super::{Output, RecalculateCancellationDates};

    /// In-memory storage of the active [`CancellationTerms`] and the
    /// [`Schedule`]s persisted for them.
    #[derive(Clone, Debug, Default)]
    struct MockDb {
        terms: Vec<CancellationTerms>,
        schedules: Arc<Mutex<HashMap<contract::Id, Option<Schedule>>>>,
        broken: HashSet<contract::Id>,
        terminated: HashSet<contract::Id>,
    }

    impl MockDb {
        fn schedule(&self, id: contract::Id) -> Option<Option<Schedule>> {
            self.schedules.lock().unwrap().get(&id).copied()
        }
    }

    impl Database<Select<By<Vec<Active<CancellationTerms>>, ()>>> for MockDb {
        type Ok = Vec<Active<CancellationTerms>>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Select<By<Vec<Active<CancellationTerms>>, ()>>,
        ) -> Result<Self::Ok, Self::Err> {
            Ok(self.terms.iter().copied().map(Active).collect())
        }
    }

    impl Database<Update<(contract::Id, Option<Schedule>)>> for MockDb {
        type Ok = bool;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Update((id, schedule)): Update<(contract::Id, Option<Schedule>)>,
        ) -> Result<Self::Ok, Self::Err> {
            if self.broken.contains(&id) {
                return Err(tracerr::new!(database::Error::Mocked));
            }
            if self.terminated.contains(&id) {
                return Ok(false);
            }
            _ = self.schedules.lock().unwrap().insert(id, schedule);
            Ok(true)
        }
    }

    fn date<Of: ?Sized>(s: &str) -> DateOf<Of> {
        s.parse().unwrap()
    }

    fn terms(
        term: Option<i32>,
        minimum_term: Option<&str>,
        notice_period: Option<i32>,
    ) -> CancellationTerms {
        CancellationTerms {
            id: contract::Id::new(),
            valid_from: date("2024-01-01"),
            term: term.map(Months::new),
            minimum_term: minimum_term.map(date),
            notice_period: notice_period.map(Months::new),
        }
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

    fn as_of(s: &str) -> RecalculateCancellationDates {
        RecalculateCancellationDates { as_of: date(s) }
    }

    #[tokio::test]
    async fn persists_computed_schedules() {
        let complete = terms(Some(12), Some("2025-01-01"), Some(3));
        let db = MockDb {
            terms: vec![complete],
            ..MockDb::default()
        };

        let out = service(db.clone())
            .execute(as_of("2024-11-01"))
            .await
            .unwrap();

        assert_eq!(
            out,
            Output {
                updated: 1,
                cleared: 0,
                skipped: 0,
                failed: 0,
            },
        );
        let schedule = db.schedule(complete.id).flatten().unwrap();
        assert_eq!(schedule.cancellation_date(), date("2026-01-01"));
        assert_eq!(schedule.action_date(), date("2025-10-01"));
    }

    #[tokio::test]
    async fn clears_schedules_of_incomplete_terms() {
        let incomplete = [
            terms(None, Some("2025-01-01"), Some(3)),
            terms(Some(12), None, Some(3)),
            terms(Some(12), Some("2025-01-01"), None),
            terms(Some(0), Some("2025-01-01"), Some(3)),
            terms(Some(-1), Some("2025-01-01"), Some(3)),
        ];
        let db = MockDb {
            terms: incomplete.to_vec(),
            ..MockDb::default()
        };

        let out = service(db.clone())
            .execute(as_of("2024-06-01"))
            .await
            .unwrap();

        assert_eq!(out.updated, 0);
        assert_eq!(out.cleared, incomplete.len());
        for t in incomplete {
            assert_eq!(db.schedule(t.id), Some(None));
        }
    }

    #[tokio::test]
    async fn continues_after_persistence_failure() {
        let broken = terms(Some(12), Some("2025-01-01"), Some(3));
        let healthy = terms(Some(6), Some("2024-07-01"), Some(1));
        let db = MockDb {
            terms: vec![broken, healthy],
            broken: HashSet::from([broken.id]),
            ..MockDb::default()
        };

        let out = service(db.clone())
            .execute(as_of("2024-06-01"))
            .await
            .unwrap();

        assert_eq!(
            out,
            Output {
                updated: 1,
                cleared: 0,
                skipped: 0,
                failed: 1,
            },
        );
        assert_eq!(db.schedule(broken.id), None);
        assert!(db.schedule(healthy.id).flatten().is_some());
    }

    #[tokio::test]
    async fn skips_contracts_terminated_meanwhile() {
        let gone = terms(Some(12), Some("2025-01-01"), Some(3));
        let kept = terms(Some(12), Some("2025-01-01"), Some(3));
        let db = MockDb {
            terms: vec![gone, kept],
            terminated: HashSet::from([gone.id]),
            ..MockDb::default()
        };

        let out = service(db.clone())
            .execute(as_of("2024-06-01"))
            .await
            .unwrap();

        assert_eq!(
            out,
            Output {
                updated: 1,
                cleared: 0,
                skipped: 1,
                failed: 0,
            },
        );
        assert_eq!(db.schedule(gone.id), None);
        assert!(db.schedule(kept.id).flatten().is_some());
    }

    #[tokio::test]
    async fn is_idempotent_for_same_day() {
        let db = MockDb {
            terms: vec![
                terms(Some(12), Some("2025-01-01"), Some(3)),
                terms(Some(1), Some("2024-02-01"), Some(0)),
                terms(None, None, None),
            ],
            ..MockDb::default()
        };
        let svc = service(db.clone());

        let first = svc.execute(as_of("2024-09-15")).await.unwrap();
        let persisted = db.schedules.lock().unwrap().clone();
        let second = svc.execute(as_of("2024-09-15")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(*db.schedules.lock().unwrap(), persisted);
    }

    #[tokio::test]
    async fn never_persists_past_action_dates() {
        let today: Date = date("2027-03-10");
        let db = MockDb {
            terms: vec![
                terms(Some(12), Some("2025-01-01"), Some(3)),
                terms(Some(24), Some("2024-01-01"), Some(12)),
                terms(Some(1), Some("2024-01-31"), Some(2)),
            ],
            ..MockDb::default()
        };

        _ = service(db.clone())
            .execute(RecalculateCancellationDates { as_of: today })
            .await
            .unwrap();

        for schedule in db.schedules.lock().unwrap().values() {
            let schedule = schedule.unwrap();
            assert!(schedule.action_date().coerce::<()>() >= today);
        }
    }
}
