//! [`Command`] for deleting a [`User`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Role;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a [`User`].
///
/// The [`User`] is only marked as deleted, so the records referring it stay
/// consistent.
#[derive(Clone, Copy, Debug)]
pub struct DeleteUser {
    /// ID of the [`User`] to be deleted.
    pub user_id: user::Id,

    /// ID of the [`User`] who deletes the [`User`].
    pub initiator_id: user::Id,
}

impl<Db> Command<DeleteUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Id>>,
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

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteUser {
            user_id,
            initiator_id,
        } = cmd;

        if user_id == initiator_id {
            return Err(tracerr::new!(E::SelfDeletion(user_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent deletions.
        tx.execute(Lock(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut user = tx
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if user.is_admin() {
            let admins = tx
                .execute(Select(By::new(user::Role::Admin)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if i32::from(admins) <= 1 {
                return Err(tracerr::new!(E::LastAdmin(user_id)));
            }
        }

        user.deleted_at = Some(DateTime::now().coerce());
        tx.execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user)
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] is the last remaining [`Role::Admin`].
    #[display("`User(id: {_0})` is the last administrator")]
    #[from(ignore)]
    LastAdmin(#[error(not(source))] user::Id),

    /// [`User`] tries to delete itself.
    #[display("`User(id: {_0})` cannot delete itself")]
    #[from(ignore)]
    SelfDeletion(#[error(not(source))] user::Id),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
