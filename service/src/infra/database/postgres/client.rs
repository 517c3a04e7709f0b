//! Postgres database clients.
//!
//! Both clients acquire their [`connection`] lazily, on the first statement,
//! and share it between their clones.

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Non-transactional Postgres database client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire connections from.
    pool: connection::Pool,

    /// Connection acquired by this client, if any.
    conn: Arc<Slot<connection::NonTx>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client backed by the provided
    /// [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            conn: Arc::new(Slot::default()),
        }
    }

    /// Returns the [`connection::Pool`] backing this [`NonTx`] client.
    #[must_use]
    pub(crate) const fn pool(&self) -> &connection::Pool {
        &self.pool
    }

    /// Returns the [`connection::NonTx`] of this client, acquiring it first
    /// if needed.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        self.conn
            .get_or_try_init(|| acquire(&self.pool))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Transactional Postgres database client.
///
/// The transaction is begun on the connection of the [`NonTx`] client it was
/// created from, or on a fresh one if that client hasn't acquired any yet.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client this [`Tx`] was created from.
    origin: NonTx,

    /// Transaction begun by this client, if any.
    tx: Arc<Slot<connection::Tx>>,
}

impl Tx {
    /// Creates a new [`Tx`] client out of the provided [`NonTx`] one.
    #[must_use]
    pub fn from_non_tx(origin: NonTx) -> Self {
        Self {
            origin,
            tx: Arc::new(Slot::default()),
        }
    }

    /// Returns the [`connection::Tx`] of this client, beginning it first if
    /// needed.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        self.tx
            .get_or_try_init(|| async {
                let conn = match self.origin.conn.take().await {
                    Some(conn) => conn,
                    None => acquire(&self.origin.pool)
                        .await
                        .map_err(tracerr::wrap!())?,
                };
                connection::Tx::begin(conn).await.map_err(tracerr::wrap!())
            })
            .await
            .map_err(tracerr::wrap!())
    }

    /// Commits the transaction of this [`Tx`] client, if it has begun any.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.tx.take().await {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

/// Acquires a new [`connection::NonTx`] from the provided
/// [`connection::Pool`].
async fn acquire(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Lazily initialized value, which can be taken out to be re-initialized.
#[derive(Debug)]
struct Slot<T>(RwLock<Option<T>>);

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(RwLock::new(None))
    }
}

impl<T> Slot<T> {
    /// Returns the value of this [`Slot`], initializing it with the provided
    /// `init` function if it's empty.
    async fn get_or_try_init<F, Fut>(
        &self,
        init: F,
    ) -> Result<RwLockReadGuard<'_, T>, Traced<database::Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Traced<database::Error>>>,
    {
        let read = self.0.read().await;
        if read.is_some() {
            return Ok(RwLockReadGuard::map(read, |v| {
                v.as_ref().expect("checked to be `Some`")
            }));
        }
        drop(read);

        let mut write = self.0.write().await;
        if write.is_none() {
            *write = Some(init().await.map_err(tracerr::wrap!())?);
        }
        Ok(RwLockReadGuard::map(write.downgrade(), |v| {
            v.as_ref().expect("initialized above")
        }))
    }

    /// Takes the value out of this [`Slot`], leaving it empty.
    async fn take(&self) -> Option<T> {
        self.0.write().await.take()
    }
}

/// Implements [`Connection`] for a client by running every statement on its
/// lazily obtained `connection()`.
macro_rules! impl_client_connection {
    ($client:ty) => {
        impl Connection for $client {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn query_opt<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Option<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .query_opt(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn exec<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<u64, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }

            async fn batch_exec(
                &self,
                stmt: &str,
            ) -> Result<(), Traced<database::Error>> {
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .batch_exec(stmt)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    };
}

impl_client_connection!(NonTx);
impl_client_connection!(Tx);
