//! [`Command`] for updating a [`User`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{Login, Password, Role};
use crate::{
    domain::{user, User},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for updating a [`User`].
///
/// Only the provided fields are changed.
#[derive(Debug)]
pub struct UpdateUser {
    /// ID of the [`User`] to be updated.
    pub user_id: user::Id,

    /// New [`Login`] of the [`User`].
    pub login: Option<user::Login>,

    /// New [`Password`] of the [`User`].
    pub password: Option<SecretBox<user::Password>>,

    /// New [`Role`] of the [`User`].
    pub role: Option<user::Role>,
}

impl<Db> Command<UpdateUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<User>, &'l user::Login>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::user::CountWithRole, user::Role>>,
            Ok = read::user::CountWithRole,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUser {
            user_id,
            login,
            password,
            role,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `User`.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if let Some(login) = login.filter(|l| *l != user.login) {
            let occupant = tx
                .execute(Select(By::<Option<User>, _>::new(&login)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupant.is_some() {
                return Err(tracerr::new!(E::LoginOccupied(login)));
            }
            user.login = login;
        }

        if let Some(password) = password {
            user.password_hash =
                user::PasswordHash::new(password.expose_secret())
                    .map_err(tracerr::from_and_wrap!(=> E))?;
        }

        if let Some(role) = role.filter(|r| *r != user.role) {
            if user.is_admin() {
                let admins = tx
                    .execute(Select(By::new(user::Role::Admin)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                if i32::from(admins) <= 1 {
                    return Err(tracerr::new!(E::LastAdmin(user_id)));
                }
            }
            user.role = role;
        }

        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`UpdateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// New [`user::Password`] failed to be hashed.
    #[display("`Password` hashing failed: {_0}")]
    Hashing(user::HashingError),

    /// [`User`] is the last remaining [`Role::Admin`].
    #[display("`User(id: {_0})` is the last administrator")]
    #[from(ignore)]
    LastAdmin(#[error(not(source))] user::Id),

    /// [`Login`] is already occupied.
    #[display("`{_0}` login is occupied")]
    #[from(ignore)]
    LoginOccupied(#[error(not(source))] user::Login),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
