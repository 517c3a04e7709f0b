//! [`Command`] for terminating a [`Contract`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, Contract},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for terminating a [`Contract`].
///
/// Termination is final: a terminated [`Contract`] is neither updated, nor
/// rescheduled anymore.
#[derive(Clone, Copy, Debug)]
pub struct TerminateContract {
    /// ID of the [`Contract`] to be terminated.
    pub contract_id: contract::Id,
}

impl<Db> Command<TerminateContract> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<Update<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: TerminateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let TerminateContract { contract_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent terminations.
        tx.execute(Lock(By::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        if contract.terminated_at.is_some() {
            return Err(tracerr::new!(E::ContractAlreadyTerminated(
                contract_id
            )));
        }

        contract.terminated_at = Some(DateTime::now().coerce());

        tx.execute(Update(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(contract)
    }
}

/// Error of [`TerminateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is already terminated.
    #[display("`Contract(id: {_0})` is already terminated")]
    ContractAlreadyTerminated(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
