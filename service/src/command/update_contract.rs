//! [`Command`] for updating a [`Contract`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Months,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::contract::{cancellation::Schedule, Kind};
use crate::{
    domain::{category, contract, Category, Contract},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for replacing the editable fields of a [`Contract`].
///
/// The cancellation [`Schedule`] stays as it was, until the next
/// recalculation.
#[derive(Clone, Debug)]
pub struct UpdateContract {
    /// ID of the [`Contract`] to be updated.
    pub contract_id: contract::Id,

    /// New title of the [`Contract`].
    pub title: contract::Title,

    /// New content of the [`Contract`].
    pub content: contract::Text,

    /// New conditions of the [`Contract`].
    pub conditions: contract::Text,

    /// New partner of the [`Contract`].
    pub partner: contract::Partner,

    /// ID of the new [`Category`] of the [`Contract`].
    pub category_id: category::Id,

    /// New [`Kind`] of the [`Contract`].
    pub kind: contract::Kind,

    /// ID of the [`Kind::Framework`] [`Contract`] to group the [`Contract`]
    /// under.
    pub framework_contract_id: Option<contract::Id>,

    /// New date the commitment of the [`Contract`] begins.
    pub valid_from: contract::CommencementDate,

    /// New date the [`Contract`] is no longer valid after.
    pub valid_until: Option<contract::ExpirationDate>,

    /// New length of a single renewal period of the [`Contract`].
    pub term: Option<Months>,

    /// New date the mandatory initial commitment of the [`Contract`] ends.
    pub minimum_term: Option<contract::MinimumTermDate>,

    /// New advance notice required to cancel the [`Contract`].
    pub notice_period: Option<Months>,
}

impl<Db> Command<UpdateContract> for Service<Db>
where
    Db: Database<
            Select<By<Option<Category>, category::Id>>,
            Ok = Option<Category>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
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
        cmd: UpdateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateContract {
            contract_id,
            title,
            content,
            conditions,
            partner,
            category_id,
            kind,
            framework_contract_id,
            valid_from,
            valid_until,
            term,
            minimum_term,
            notice_period,
        } = cmd;

        drop(
            self.database()
                .execute(Select(By::<Option<Category>, _>::new(category_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::CategoryNotExists(category_id))
                .map_err(tracerr::wrap!())?,
        );

        if let Some(id) = framework_contract_id {
            if id == contract_id {
                return Err(tracerr::new!(E::NotFrameworkContract(id)));
            }
            let framework = self
                .database()
                .execute(Select(By::<Option<Contract>, _>::new(id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::FrameworkContractNotExists(id))
                .map_err(tracerr::wrap!())?;
            if framework.kind != contract::Kind::Framework {
                return Err(tracerr::new!(E::NotFrameworkContract(id)));
            }
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Contract`.
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
        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractTerminated(contract_id)));
        }

        contract.title = title;
        contract.content = content;
        contract.conditions = conditions;
        contract.partner = partner;
        contract.category_id = category_id;
        contract.kind = kind;
        contract.framework_contract_id = framework_contract_id;
        contract.valid_from = valid_from;
        contract.valid_until = valid_until;
        contract.term = term;
        contract.minimum_term = minimum_term;
        contract.notice_period = notice_period;

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

/// Error of [`UpdateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Category`] with the provided ID does not exist.
    #[display("`Category(id: {_0})` does not exist")]
    CategoryNotExists(#[error(not(source))] category::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] is terminated and cannot be changed anymore.
    #[display("`Contract(id: {_0})` is terminated")]
    ContractTerminated(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Contract`] to group under does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    FrameworkContractNotExists(#[error(not(source))] contract::Id),

    /// [`Contract`] to group under is not a [`Kind::Framework`] one.
    #[display("`Contract(id: {_0})` is not a framework contract")]
    NotFrameworkContract(#[error(not(source))] contract::Id),
}
