//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Builds a [`User`] out of a selected [`Row`].
fn from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        login: row.get("login"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        created_at: row.get("created_at"),
        deleted_at: row.get("deleted_at"),
    }
}

impl<C> Database<Select<By<Option<User>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, password_hash, role, \
                   created_at, deleted_at \
            FROM users \
            WHERE id = $1::UUID \
              AND deleted_at IS NULL";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<'l, C> Database<Select<By<Option<User>, &'l user::Login>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();

        const SQL: &str = "\
            SELECT id, login, password_hash, role, \
                   created_at, deleted_at \
            FROM users \
            WHERE login = $1::VARCHAR \
              AND deleted_at IS NULL \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&login])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(user)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            id,
            login,
            password_hash,
            role,
            created_at,
            deleted_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                id, login, password_hash, role, \
                created_at, deleted_at\
            ) \
            VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::INT2, \
                $5::TIMESTAMPTZ, $6::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET login = EXCLUDED.login, \
                password_hash = EXCLUDED.password_hash, \
                role = EXCLUDED.role, \
                deleted_at = EXCLUDED.deleted_at";
        self.exec(
            SQL,
            &[
                &id,
                &login,
                &password_hash,
                &role,
                &created_at,
                &deleted_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<User, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO users_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO NOTHING";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<read::user::CountWithRole, user::Role>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::CountWithRole;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::user::CountWithRole, user::Role>>,
    ) -> Result<Self::Ok, Self::Err> {
        let role = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM users \
            WHERE role = $1::INT2 \
              AND deleted_at IS NULL";
        self.query_opt(SQL, &[&role])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}

impl<C> Database<Select<By<read::user::list::Page, read::user::list::Selector>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::user::list::Page, read::user::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::user::list::Selector {
            arguments,
            filter: read::user::list::Filter { role },
        } = by.into_inner();

        let limit = i32::try_from(arguments.limit())
            .map_or(i32::MAX, |l| l.saturating_add(1));

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let role_idx = role.as_ref().map(|r| {
            ps.push(r);
            ps.len()
        });

        let sql = format!(
            "SELECT id \
             FROM users \
             WHERE deleted_at IS NULL \
                   {cursor} \
                   {role_filtering} \
             ORDER BY id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            order = arguments.kind().order().sql(),
            role_filtering = role_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND role = ${idx}::INT2"))
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

        Ok(read::user::list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<read::user::list::TotalCount, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::user::list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<read::user::list::TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM users \
            WHERE deleted_at IS NULL";
        self.query_opt(SQL, &[])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
