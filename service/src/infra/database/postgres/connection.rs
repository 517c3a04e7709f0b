//! [`Connection`] definitions.

use std::{fmt, future::Future};

use futures::{FutureExt as _, TryFutureExt as _};
use ouroboros::self_referencing;
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{self, postgres};

pub use deadpool_postgres::{
    Client as NonTx, CreatePoolError as PoolCreationError, Pool, PoolError,
};
pub use tokio_postgres::Error;

/// Generic database connection.
///
/// Every method returns [`database::Error`]s, so callers don't care whether
/// they run inside a transaction or not.
pub trait Connection {
    /// Queries the provided statement and returns all the resulting rows.
    ///
    /// # Errors
    ///
    /// If failed to query the statement.
    fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Vec<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Queries the provided statement and returns at most one resulting row.
    ///
    /// # Errors
    ///
    /// If failed to query the statement, or it returned more than one row.
    fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<Option<Row>, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Executes the provided statement and returns the number of affected
    /// rows.
    ///
    /// # Errors
    ///
    /// If failed to execute the statement.
    fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = Result<u64, Traced<database::Error>>>
    where
        T: ToStatement + ?Sized;

    /// Executes the provided semicolon-separated statements without
    /// parameters.
    ///
    /// # Errors
    ///
    /// If failed to execute any of the statements.
    fn batch_exec(
        &self,
        stmt: &str,
    ) -> impl Future<Output = Result<(), Traced<database::Error>>>;
}

/// Implements [`Connection`] by delegating to the client `$client` evaluates
/// to.
macro_rules! impl_connection {
    ($ty:ty, |$this:ident| $client:expr) => {
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $client
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $client
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                let $this = self;
                $client
                    .execute(stmt, params)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }

            async fn batch_exec(
                &self,
                stmt: &str,
            ) -> Result<(), Traced<database::Error>> {
                let $this = self;
                $client
                    .batch_execute(stmt)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)
            }
        }
    };
}

impl_connection!(NonTx, |conn| &**conn);
impl_connection!(Tx, |conn| conn.transaction());

/// Transactional Postgres database [`Connection`].
///
/// Owns the pooled [`NonTx`] connection for as long as the transaction lives.
#[self_referencing]
pub struct Tx {
    /// Pooled [`NonTx`] connection the transaction runs on.
    non_tx: NonTx,

    /// Open transaction, taken out on commit.
    #[borrows(mut non_tx)]
    #[not_covariant]
    tx: Option<deadpool_postgres::Transaction<'this>>,
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self.with_tx(|tx| tx.is_some());
        f.debug_struct("Tx").field("open", &open).finish_non_exhaustive()
    }
}

impl Tx {
    /// Begins a new [`Tx`] on the provided [`NonTx`] connection.
    ///
    /// # Errors
    ///
    /// If failed to issue `BEGIN`.
    pub async fn begin(non_tx: NonTx) -> Result<Self, Traced<database::Error>> {
        Self::try_new_async_send(non_tx, |c| {
            c.transaction().map_ok(Some).boxed()
        })
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
    }

    /// Returns the open [`deadpool_postgres::Transaction`].
    fn transaction(&self) -> &deadpool_postgres::Transaction<'_> {
        self.with_tx(|tx| tx.as_ref().expect("`Tx` is consumed on commit"))
    }

    /// Commits this [`Tx`].
    ///
    /// # Errors
    ///
    /// If failed to issue `COMMIT`.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    pub async fn commit(mut self) -> Result<(), Traced<database::Error>> {
        #[expect(
            clippy::redundant_closure_for_method_calls,
            reason = "different variance"
        )]
        self.with_tx_mut(|tx| tx.take())
            .expect("`Tx` is consumed on commit")
            .commit()
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)
    }
}
