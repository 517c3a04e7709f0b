//! [`Command`] for creating a new [`Contract`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime, Months,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::contract::{Kind, Number};
use crate::{
    domain::{category, contract, Category, Contract},
    infra::{database, Database},
    read, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Contract`].
#[derive(Clone, Debug)]
pub struct CreateContract {
    /// [`Number`] of a new [`Contract`].
    ///
    /// The next free `V`-[`Number`] is assigned if [`None`].
    pub number: Option<contract::Number>,

    /// Title of a new [`Contract`].
    pub title: contract::Title,

    /// Content of a new [`Contract`].
    pub content: contract::Text,

    /// Conditions of a new [`Contract`].
    pub conditions: contract::Text,

    /// Partner of a new [`Contract`].
    pub partner: contract::Partner,

    /// ID of the [`Category`] of a new [`Contract`].
    pub category_id: category::Id,

    /// [`Kind`] of a new [`Contract`].
    pub kind: contract::Kind,

    /// ID of the [`Kind::Framework`] [`Contract`] to group a new [`Contract`]
    /// under.
    pub framework_contract_id: Option<contract::Id>,

    /// Date the commitment of a new [`Contract`] begins.
    pub valid_from: contract::CommencementDate,

    /// Date a new [`Contract`] is no longer valid after.
    pub valid_until: Option<contract::ExpirationDate>,

    /// Length of a single renewal period of a new [`Contract`].
    pub term: Option<Months>,

    /// Date the mandatory initial commitment of a new [`Contract`] ends.
    pub minimum_term: Option<contract::MinimumTermDate>,

    /// Advance notice required to cancel a new [`Contract`].
    pub notice_period: Option<Months>,
}

impl<Db> Command<CreateContract> for Service<Db>
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
            Lock<By<read::contract::LatestNumber, ()>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<contract::Number>, read::contract::LatestNumber>>,
            Ok = Option<contract::Number>,
            Err = Traced<database::Error>,
        > + for<'l> Database<
            Select<By<Option<Contract>, &'l contract::Number>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<Insert<Contract>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateContract {
            number,
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

        // Avoid concurrent assignments of the same `contract::Number`.
        tx.execute(Lock(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let number = if let Some(number) = number {
            let occupant = tx
                .execute(Select(By::<Option<Contract>, _>::new(&number)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if occupant.is_some() {
                return Err(tracerr::new!(E::NumberOccupied(number)));
            }
            number
        } else {
            let latest = tx
                .execute(Select(By::new(read::contract::LatestNumber)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            contract::Number::next_after(latest.as_ref())
                .ok_or(E::NumbersExhausted)
                .map_err(tracerr::wrap!())?
        };

        let contract = Contract {
            id: contract::Id::new(),
            number,
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
            cancellation: None,
            created_at: DateTime::now().coerce(),
            terminated_at: None,
        };

        tx.execute(Insert(contract.clone()))
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

/// Error of [`CreateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Category`] with the provided ID does not exist.
    #[display("`Category(id: {_0})` does not exist")]
    CategoryNotExists(#[error(not(source))] category::Id),

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

    /// [`Number`] is already occupied.
    #[display("`{_0}` contract number is occupied")]
    NumberOccupied(#[error(not(source))] contract::Number),

    /// No [`Number`] is left to be assigned automatically.
    #[display("automatic contract numbers are exhausted")]
    NumbersExhausted,
}
