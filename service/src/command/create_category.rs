//! [`Command`] for creating a new [`Category`].

use common::operations::{By, Commit, Insert, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{category, Category},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Category`].
#[derive(Clone, Debug)]
pub struct CreateCategory {
    /// Name of a new [`Category`].
    pub name: category::Name,
}

impl<Db> Command<CreateCategory> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: for<'l> Database<
            Select<By<Option<Category>, &'l category::Name>>,
            Ok = Option<Category>,
            Err = Traced<database::Error>,
        > + Database<Insert<Category>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Category;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateCategory,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateCategory { name } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let occupant = tx
            .execute(Select(By::new(&name)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if occupant.is_some() {
            return Err(tracerr::new!(E::NameOccupied(name)));
        }

        let category = Category {
            id: category::Id::new(),
            name,
        };
        tx.execute(Insert(category.clone()))
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

/// Error of [`CreateCategory`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`category::Name`] is already occupied.
    #[display("`{_0}` category already exists")]
    NameOccupied(#[error(not(source))] category::Name),
}
