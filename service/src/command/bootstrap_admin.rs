//! [`Command`] for creating the initial administrator [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Login, Password, Role};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating the initial [`Role::Admin`] [`User`], so the
/// system can be administered right after its first start.
///
/// Does nothing if any [`User`] exists already.
#[derive(Debug)]
pub struct BootstrapAdmin {
    /// [`Login`] of the administrator.
    pub login: user::Login,

    /// [`Password`] of the administrator.
    pub password: SecretBox<user::Password>,
}

impl<Db> Command<BootstrapAdmin> for Service<Db>
where
    Db: Database<
            Select<By<read::user::list::TotalCount, ()>>,
            Ok = read::user::list::TotalCount,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    /// Created administrator, if any.
    type Ok = Option<User>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: BootstrapAdmin,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let BootstrapAdmin { login, password } = cmd;

        let count = self
            .database()
            .execute(Select(By::<read::user::list::TotalCount, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if i32::from(count) > 0 {
            return Ok(None);
        }

        let admin = User {
            id: user::Id::new(),
            login,
            password_hash: user::PasswordHash::new(password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?,
            role: user::Role::Admin,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(admin.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("created initial administrator `{}`", admin.login);

        Ok(Some(admin))
    }
}

/// Error of [`BootstrapAdmin`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Administrator [`user::Password`] failed to be hashed.
    #[display("`Password` hashing failed: {_0}")]
    Hashing(user::HashingError),
}
