//! [`Command`] for deleting a [`Category`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Contract;
use crate::{
    domain::{category, Category},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for deleting a [`Category`] no [`Contract`] belongs to.
#[derive(Clone, Copy, Debug)]
pub struct DeleteCategory {
    /// ID of the [`Category`] to be deleted.
    pub category_id: category::Id,
}

impl<Db> Command<DeleteCategory> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Category, category::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Category>, category::Id>>,
            Ok = Option<Category>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::category::ContractsCount, category::Id>>,
            Ok = read::category::ContractsCount,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Category, category::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Category;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteCategory,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCategory { category_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent deletions.
        tx.execute(Lock(By::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let category = tx
            .execute(Select(By::<Option<Category>, _>::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CategoryNotExists(category_id))
            .map_err(tracerr::wrap!())?;

        let used_by = tx
            .execute(Select(By::<read::category::ContractsCount, _>::new(
                category_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if i32::from(used_by) > 0 {
            return Err(tracerr::new!(E::CategoryInUse(category_id)));
        }

        tx.execute(Delete(By::<Category, _>::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(category)
    }
}

/// Error of [`DeleteCategory`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Some [`Contract`]s still belong to the [`Category`].
    #[display("`Category(id: {_0})` is used by contracts")]
    #[from(ignore)]
    CategoryInUse(#[error(not(source))] category::Id),

    /// [`Category`] with the provided ID does not exist.
    #[display("`Category(id: {_0})` does not exist")]
    #[from(ignore)]
    CategoryNotExists(#[error(not(source))] category::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
