//! [`Contract`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{contract, Contract},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read::{
        self,
        contract::{Active, ActionWindow, CancellationTerms, LatestNumber},
    },
};

/// Expands into the list of [`Contract`] columns read by [`from_row()`].
macro_rules! columns {
    () => {
        "id, number, \
         title, content, conditions, partner, \
         category_id, kind, framework_contract_id, \
         valid_from, valid_until, \
         term_months, minimum_term, notice_period_months, \
         cancellation_date, cancellation_action_date, \
         created_at, terminated_at"
    };
}

/// Builds a [`Contract`] out of a [`Row`] selected with [`columns!`].
#[expect(unsafe_code, reason = "persisted schedule")]
fn from_row(row: &Row) -> Contract {
    let cancellation = match (
        row.get("cancellation_date"),
        row.get("cancellation_action_date"),
    ) {
        // SAFETY: Both dates are only ever written together, as a pair
        //         produced by `cancellation::Terms::schedule()`.
        (Some(cancellation_date), Some(action_date)) => Some(unsafe {
            contract::Schedule::new_unchecked(cancellation_date, action_date)
        }),
        _ => None,
    };
    Contract {
        id: row.get("id"),
        number: row.get("number"),
        title: row.get("title"),
        content: row.get("content"),
        conditions: row.get("conditions"),
        partner: row.get("partner"),
        category_id: row.get("category_id"),
        kind: row.get("kind"),
        framework_contract_id: row.get("framework_contract_id"),
        valid_from: row.get("valid_from"),
        valid_until: row.get("valid_until"),
        term: row.get("term_months"),
        minimum_term: row.get("minimum_term"),
        notice_period: row.get("notice_period_months"),
        cancellation,
        created_at: row.get("created_at"),
        terminated_at: row.get("terminated_at"),
    }
}

impl<C> Database<Select<By<Option<Contract>, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM contracts \
              WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<'n, C> Database<Select<By<Option<Contract>, &'n contract::Number>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, &'n contract::Number>>,
    ) -> Result<Self::Ok, Self::Err> {
        let number = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM contracts \
              WHERE number = $1::VARCHAR \
              LIMIT 1",
        );
        Ok(self
            .query_opt(SQL, &[&number])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<contract::Number>, LatestNumber>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<contract::Number>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<contract::Number>, LatestNumber>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT number \
            FROM contracts \
            WHERE number ~ '^V[0-9]{6,}$' \
            ORDER BY LENGTH(LTRIM(SUBSTRING(number FROM 2), '0')) DESC, \
                     LTRIM(SUBSTRING(number FROM 2), '0') DESC \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| row.get("number")))
    }
}

impl<C> Database<Insert<Contract>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Contract>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(contract))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Contract>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(contract): Update<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        let Contract {
            id,
            number,
            title,
            content,
            conditions,
            partner,
            category_id,
            kind,
            framework_contract_id,
            valid_from,
            valid_until,
            term,
            minimum_term,
            notice_period,
            cancellation,
            created_at,
            terminated_at,
        } = contract;
        let cancellation_date = cancellation.map(|s| s.cancellation_date());
        let action_date = cancellation.map(|s| s.action_date());

        // Existing cancellation dates are only rewritten by the
        // `Update<(contract::Id, Option<Schedule>)>` operation.
        const SQL: &str = concat!(
            "INSERT INTO contracts (",
            columns!(),
            ") \
             VALUES (\
                 $1::UUID, $2::VARCHAR, \
                 $3::VARCHAR, $4::TEXT, $5::TEXT, $6::VARCHAR, \
                 $7::UUID, $8::INT2, $9::UUID, \
                 $10::DATE, $11::DATE, \
                 $12::INT4, $13::DATE, $14::INT4, \
                 $15::DATE, $16::DATE, \
                 $17::TIMESTAMPTZ, $18::TIMESTAMPTZ\
             ) \
             ON CONFLICT (id) DO UPDATE \
             SET number = EXCLUDED.number, \
                 title = EXCLUDED.title, \
                 content = EXCLUDED.content, \
                 conditions = EXCLUDED.conditions, \
                 partner = EXCLUDED.partner, \
                 category_id = EXCLUDED.category_id, \
                 kind = EXCLUDED.kind, \
                 framework_contract_id = EXCLUDED.framework_contract_id, \
                 valid_from = EXCLUDED.valid_from, \
                 valid_until = EXCLUDED.valid_until, \
                 term_months = EXCLUDED.term_months, \
                 minimum_term = EXCLUDED.minimum_term, \
                 notice_period_months = EXCLUDED.notice_period_months, \
                 terminated_at = EXCLUDED.terminated_at",
        );
        self.exec(
            SQL,
            &[
                &id,
                &number,
                &title,
                &content,
                &conditions,
                &partner,
                &category_id,
                &kind,
                &framework_contract_id,
                &valid_from,
                &valid_until,
                &term,
                &minimum_term,
                &notice_period,
                &cancellation_date,
                &action_date,
                &created_at,
                &terminated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Contract, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO contracts_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<LatestNumber, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<LatestNumber, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Released once the transaction ends.
        const SQL: &str = "\
            SELECT pg_advisory_xact_lock(hashtext('contracts.number'))";
        self.exec(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Active<CancellationTerms>>, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Active<CancellationTerms>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Active<CancellationTerms>>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT id, valid_from, \
                   term_months, minimum_term, notice_period_months \
            FROM contracts \
            WHERE terminated_at IS NULL \
            ORDER BY id";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| {
                Active(CancellationTerms {
                    id: row.get("id"),
                    valid_from: row.get("valid_from"),
                    term: row.get("term_months"),
                    minimum_term: row.get("minimum_term"),
                    notice_period: row.get("notice_period_months"),
                })
            })
            .collect())
    }
}

impl<C> Database<Update<(contract::Id, Option<contract::Schedule>)>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update((id, schedule)): Update<(
            contract::Id,
            Option<contract::Schedule>,
        )>,
    ) -> Result<Self::Ok, Self::Err> {
        let cancellation_date = schedule.map(|s| s.cancellation_date());
        let action_date = schedule.map(|s| s.action_date());

        const SQL: &str = "\
            UPDATE contracts \
            SET cancellation_date = $2::DATE, \
                cancellation_action_date = $3::DATE \
            WHERE id = $1::UUID \
              AND terminated_at IS NULL";
        self.exec(SQL, &[&id, &cancellation_date, &action_date])
            .await
            .map_err(tracerr::wrap!())
            .map(|updated| updated > 0)
    }
}

impl<C> Database<Select<By<Vec<Active<Contract>>, ActionWindow>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Active<Contract>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Active<Contract>>, ActionWindow>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ActionWindow { from, to } = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM contracts \
              WHERE terminated_at IS NULL \
                AND cancellation_action_date BETWEEN $1::DATE AND $2::DATE \
              ORDER BY cancellation_action_date ASC, number ASC",
        );
        Ok(self
            .query(SQL, &[&from, &to])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| Active(from_row(row)))
            .collect())
    }
}

impl<C>
    Database<
        Select<
            By<read::contract::list::Page, read::contract::list::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::contract::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::contract::list::Page, read::contract::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::contract::list::Selector {
            arguments,
            filter:
                read::contract::list::Filter {
                    search,
                    category_id,
                    valid_on,
                },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit())
            .map_or(i32::MAX, |l| l.saturating_add(1));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let search_pattern = search.as_deref().map(FuzzPattern::new);
        let search_idx = search_pattern.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });
        let category_idx = category_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let valid_on_idx = valid_on.as_ref().map(|d| {
            ps.push(d);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM contracts \
             WHERE TRUE \
                   {cursor} \
                   {search_filtering} \
                   {category_filtering} \
                   {validity_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
            search_filtering =
                search_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND (LOWER(title) SIMILAR TO LOWER(${idx}::VARCHAR) \
                         OR LOWER(partner) SIMILAR TO LOWER(${idx}::VARCHAR) \
                         OR LOWER(content) SIMILAR TO LOWER(${idx}::VARCHAR))"
                    ))
                }),
            category_filtering =
                category_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND category_id = ${idx}::UUID"))
                }),
            validity_filtering =
                valid_on_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND terminated_at IS NULL \
                         AND (valid_until IS NULL \
                              OR valid_until > ${idx}::DATE)"
                    ))
                }),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(read::contract::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::contract::list::TotalCount, ()>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::contract::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::contract::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM contracts";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
