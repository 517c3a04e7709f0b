//! [`Command`] for renaming a [`Category`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Contract;
use crate::{
    domain::{category, Category},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for renaming a [`Category`].
///
/// [`Contract`]s refer a [`Category`] by its ID, so they follow the new name
/// right away.
#[derive(Clone, Debug)]
pub struct RenameCategory {
    /// ID of the [`Category`] to be renamed.
    pub category_id: category::Id,

    /// New name of the [`Category`].
    pub name: category::Name,
}

impl<Db> Command<RenameCategory> for Service<Db>
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
        > + for<'l> Database<
            Select<By<Option<Category>, &'l category::Name>>,
            Ok = Option<Category>,
            Err = Traced<database::Error>,
        > + Database<Update<Category>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Category;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RenameCategory,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RenameCategory { category_id, name } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Category`.
        tx.execute(Lock(By::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut category = tx
            .execute(Select(By::<Option<Category>, _>::new(category_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CategoryNotExists(category_id))
            .map_err(tracerr::wrap!())?;
        if category.name == name {
            return Ok(category);
        }

        let occupant = tx
            .execute(Select(By::<Option<Category>, _>::new(&name)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupant.is_some() {
            return Err(tracerr::new!(E::NameOccupied(name)));
        }

        category.name = name;
        tx.execute(Update(category.clone()))
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

/// Error of [`RenameCategory`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Category`] with the provided ID does not exist.
    #[display("`Category(id: {_0})` does not exist")]
    #[from(ignore)]
    CategoryNotExists(#[error(not(source))] category::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`category::Name`] is already occupied.
    #[display("`{_0}` category already exists")]
    #[from(ignore)]
    NameOccupied(#[error(not(source))] category::Name),
}
