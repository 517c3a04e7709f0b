//! Postgres [`Database`] implementation.

pub mod client;
pub mod connection;
mod fuzz_pattern;
mod impls;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::database;
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{NonTx, Tx},
    connection::Connection,
    fuzz_pattern::FuzzPattern,
};

pub use deadpool_postgres::Config;

/// Postgres [`Database`] client.
#[derive(Clone, Copy, Debug, Deref)]
pub struct Postgres<T = NonTx>(T);

impl Postgres {
    /// Creates a new [`Postgres`] client with a connection pool configured by
    /// the provided [`Config`].
    ///
    /// No connection is established until the first statement is run.
    ///
    /// # Errors
    ///
    /// If the [`Config`] is invalid.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self(NonTx::from_pool(pool)))
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// [`Connection`] error.
    #[display("`Connection` error: {_0}")]
    Connection(connection::Error),

    /// Failed to create a [`connection::Pool`].
    #[display("Failed to create `connection::Pool`: {_0}")]
    PoolCreationError(connection::PoolCreationError),

    /// Failed to acquire a connection from a [`connection::Pool`].
    #[display("Failed to acquire connection from `connection::Pool`: {_0}")]
    PoolError(connection::PoolError),
}
