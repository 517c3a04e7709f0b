//! GraphQL [`Mutation`]s definitions.

use common::{Date, Months};
use juniper::{graphql_object, GraphQLObject};
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error, Session};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `UserSession` with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials does not match any `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUserSession",
            login = %login,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        login: api::user::Login,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession {
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(Session {
            user_id: output.user.id.into(),
            role: output.user.role,
            token: output.token.clone(),
            expires_at: output.expires_at.coerce(),
        })
        .await;

        Ok(output.into())
    }

    /// Creates a new `User` with the provided credentials and `UserRole`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `LOGIN_OCCUPIED` - provided `UserLogin` is occupied by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createUser",
            login = %login,
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn create_user(
        login: api::user::Login,
        password: api::user::Password,
        role: api::user::Role,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        _ = ctx.admin_session().await?;

        ctx.service()
            .execute(command::CreateUser {
                login: login.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                role: role.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the provided fields of the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `LAST_ADMIN` - the last administrator cannot lose its `UserRole`;
    /// - `LOGIN_OCCUPIED` - provided `UserLogin` is occupied by another `User`;
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateUser",
            id = %id,
            login = ?login.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn update_user(
        id: api::user::Id,
        login: Option<api::user::Login>,
        password: Option<api::user::Password>,
        role: Option<api::user::Role>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        _ = ctx.admin_session().await?;

        ctx.service()
            .execute(command::UpdateUser {
                user_id: id.into(),
                login: login.map(Into::into),
                password: password.map(|p| {
                    secrecy::SecretBox::init_with(move || p.into())
                }),
                role: role.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `LAST_ADMIN` - the last administrator cannot be deleted;
    /// - `SELF_DELETION` - the current `User` cannot delete itself;
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUser",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let my_id = ctx.admin_session().await?.user_id;

        ctx.service()
            .execute(command::DeleteUser {
                user_id: id.into(),
                initiator_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Contract`.
    ///
    /// The next free `ContractNumber` is assigned if no `number` is provided.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `CATEGORY_NOT_EXISTS` - the specified `Category` does not exist;
    /// - `FRAMEWORK_CONTRACT_NOT_EXISTS` - the specified framework `Contract`
    ///                                     does not exist;
    /// - `NOT_FRAMEWORK_CONTRACT` - the specified `Contract` to group under is
    ///                              not a framework one;
    /// - `NUMBER_OCCUPIED` - provided `ContractNumber` is occupied by another
    ///                       `Contract`;
    /// - `NUMBERS_EXHAUSTED` - no `ContractNumber` is left to be assigned
    ///                         automatically.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createContract",
            number = ?number.as_ref().map(ToString::to_string),
            otel.name = Self::SPAN_NAME,
            title = %input.title,
        ),
    )]
    pub async fn create_contract(
        number: Option<api::contract::Number>,
        input: api::contract::Input,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        _ = ctx.admin_session().await?;

        let fields = ContractFields::from(input);
        ctx.service()
            .execute(command::CreateContract {
                number: number.map(Into::into),
                title: fields.title,
                content: fields.content,
                conditions: fields.conditions,
                partner: fields.partner,
                category_id: fields.category_id,
                kind: fields.kind,
                framework_contract_id: fields.framework_contract_id,
                valid_from: fields.valid_from,
                valid_until: fields.valid_until,
                term: fields.term,
                minimum_term: fields.minimum_term,
                notice_period: fields.notice_period,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the editable fields of the `Contract` with the specified ID.
    ///
    /// Cancellation dates of the `Contract` stay as they were until the next
    /// recalculation.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `CATEGORY_NOT_EXISTS` - the specified `Category` does not exist;
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does not
    ///                           exist;
    /// - `CONTRACT_TERMINATED` - the `Contract` is terminated;
    /// - `FRAMEWORK_CONTRACT_NOT_EXISTS` - the specified framework `Contract`
    ///                                     does not exist;
    /// - `NOT_FRAMEWORK_CONTRACT` - the specified `Contract` to group under is
    ///                              not a framework one.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateContract",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn update_contract(
        id: api::contract::Id,
        input: api::contract::Input,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        _ = ctx.admin_session().await?;

        let fields = ContractFields::from(input);
        ctx.service()
            .execute(command::UpdateContract {
                contract_id: id.into(),
                title: fields.title,
                content: fields.content,
                conditions: fields.conditions,
                partner: fields.partner,
                category_id: fields.category_id,
                kind: fields.kind,
                framework_contract_id: fields.framework_contract_id,
                valid_from: fields.valid_from,
                valid_until: fields.valid_until,
                term: fields.term,
                minimum_term: fields.minimum_term,
                notice_period: fields.notice_period,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Terminates the `Contract` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `CONTRACT_ALREADY_TERMINATED` - the `Contract` is terminated already;
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "terminateContract",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn terminate_contract(
        id: api::contract::Id,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        _ = ctx.admin_session().await?;

        ctx.service()
            .execute(command::TerminateContract {
                contract_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Recalculates the cancellation dates of all the active `Contract`s as
    /// of today.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "recalculateCancellationDates",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn recalculate_cancellation_dates(
        ctx: &Context,
    ) -> Result<RecalculationResult, Error> {
        _ = ctx.admin_session().await?;

        ctx.service()
            .execute(command::RecalculateCancellationDates::today())
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Category` with the provided name.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `NAME_OCCUPIED` - provided `CategoryName` is occupied by another
    ///                     `Category`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createCategory",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_category(
        name: api::category::Name,
        ctx: &Context,
    ) -> Result<api::Category, Error> {
        _ = ctx.admin_session().await?;

        ctx.service()
            .execute(command::CreateCategory { name: name.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Renames the `Category` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `CATEGORY_NOT_EXISTS` - the `Category` with the specified ID does not
    ///                           exist;
    /// - `NAME_OCCUPIED` - provided `CategoryName` is occupied by another
    ///                     `Category`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "renameCategory",
            id = %id,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn rename_category(
        id: api::category::Id,
        name: api::category::Name,
        ctx: &Context,
    ) -> Result<api::Category, Error> {
        _ = ctx.admin_session().await?;

        ctx.service()
            .execute(command::RenameCategory {
                category_id: id.into(),
                name: name.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Category` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ADMIN_REQUIRED` - the current `User` is not an administrator;
    /// - `CATEGORY_IN_USE` - some `Contract`s still belong to the `Category`;
    /// - `CATEGORY_NOT_EXISTS` - the `Category` with the specified ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteCategory",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_category(
        id: api::category::Id,
        ctx: &Context,
    ) -> Result<api::Category, Error> {
        _ = ctx.admin_session().await?;

        ctx.service()
            .execute(command::DeleteCategory {
                category_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Result of the cancellation dates recalculation.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct RecalculationResult {
    /// Number of `Contract`s which got new cancellation dates.
    pub updated: i32,

    /// Number of `Contract`s which got their cancellation dates cleared.
    pub cleared: i32,

    /// Number of `Contract`s terminated before their cancellation dates were
    /// stored.
    pub skipped: i32,

    /// Number of `Contract`s whose cancellation dates failed to be stored.
    pub failed: i32,
}

impl From<command::recalculate_cancellation_dates::Output>
    for RecalculationResult
{
    fn from(output: command::recalculate_cancellation_dates::Output) -> Self {
        let command::recalculate_cancellation_dates::Output {
            updated,
            cleared,
            skipped,
            failed,
        } = output;
        let count = |n: usize| i32::try_from(n).unwrap_or(i32::MAX);
        Self {
            updated: count(updated),
            cleared: count(cleared),
            skipped: count(skipped),
            failed: count(failed),
        }
    }
}

/// [`api::contract::Input`] converted into the domain types.
struct ContractFields {
    title: domain::contract::Title,
    content: domain::contract::Text,
    conditions: domain::contract::Text,
    partner: domain::contract::Partner,
    category_id: domain::category::Id,
    kind: domain::contract::Kind,
    framework_contract_id: Option<domain::contract::Id>,
    valid_from: domain::contract::CommencementDate,
    valid_until: Option<domain::contract::ExpirationDate>,
    term: Option<Months>,
    minimum_term: Option<domain::contract::MinimumTermDate>,
    notice_period: Option<Months>,
}

impl From<api::contract::Input> for ContractFields {
    fn from(input: api::contract::Input) -> Self {
        let api::contract::Input {
            title,
            content,
            conditions,
            partner,
            category_id,
            kind,
            framework_contract_id,
            valid_from,
            valid_until,
            term_months,
            minimum_term,
            notice_period_months,
        } = input;
        Self {
            title: title.into(),
            content: content.map(Into::into).unwrap_or_default(),
            conditions: conditions.map(Into::into).unwrap_or_default(),
            partner: partner.into(),
            category_id: category_id.into(),
            kind: kind.into(),
            framework_contract_id: framework_contract_id.map(Into::into),
            valid_from: valid_from.coerce(),
            valid_until: valid_until.map(Date::coerce),
            term: term_months.map(Months::new),
            minimum_term: minimum_term.map(Date::coerce),
            notice_period: notice_period_months.map(Months::new),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::WrongCredentials => Some(Error::WrongCredentials.into()),
        }
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Hashing(_) => None,
            Self::LoginOccupied(_) => Some(UserError::LoginOccupied.into()),
        }
    }
}

impl AsError for command::update_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::Hashing(_) => return None,
            Self::LastAdmin(_) => UserError::LastAdmin.into(),
            Self::LoginOccupied(_) => UserError::LoginOccupied.into(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::LastAdmin(_) => UserError::LastAdmin.into(),
            Self::SelfDeletion(_) => UserError::SelfDeletion.into(),
            Self::UserNotExists(_) => api::query::UserError::NotExists.into(),
        })
    }
}

impl AsError for command::create_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "NUMBER_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`ContractNumber` is occupied by another \
                             `Contract`"]
                NumberOccupied,

                #[code = "NUMBERS_EXHAUSTED"]
                #[status = CONFLICT]
                #[message = "No `ContractNumber` is left to be assigned \
                             automatically, provide one explicitly"]
                NumbersExhausted,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::CategoryNotExists(_) => {
                api::query::CategoryError::NotExists.into()
            }
            Self::FrameworkContractNotExists(_) => {
                ContractError::FrameworkNotExists.into()
            }
            Self::NotFrameworkContract(_) => ContractError::NotFramework.into(),
            Self::NumberOccupied(_) => Error::NumberOccupied.into(),
            Self::NumbersExhausted => Error::NumbersExhausted.into(),
        })
    }
}

impl AsError for command::update_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::CategoryNotExists(_) => {
                api::query::CategoryError::NotExists.into()
            }
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
            Self::ContractTerminated(_) => ContractError::Terminated.into(),
            Self::FrameworkContractNotExists(_) => {
                ContractError::FrameworkNotExists.into()
            }
            Self::NotFrameworkContract(_) => ContractError::NotFramework.into(),
        })
    }
}

impl AsError for command::terminate_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractAlreadyTerminated(_) => {
                ContractError::AlreadyTerminated.into()
            }
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
        })
    }
}

impl AsError for command::recalculate_cancellation_dates::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_category::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NameOccupied(_) => Some(CategoryError::NameOccupied.into()),
        }
    }
}

impl AsError for command::rename_category::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::CategoryNotExists(_) => {
                api::query::CategoryError::NotExists.into()
            }
            Self::NameOccupied(_) => CategoryError::NameOccupied.into(),
        })
    }
}

impl AsError for command::delete_category::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::CategoryInUse(_) => CategoryError::InUse.into(),
            Self::CategoryNotExists(_) => {
                api::query::CategoryError::NotExists.into()
            }
        })
    }
}

define_error! {
    enum UserError {
        #[code = "LAST_ADMIN"]
        #[status = CONFLICT]
        #[message = "The last administrator must stay one"]
        LastAdmin,

        #[code = "LOGIN_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`UserLogin` is occupied by another `User`"]
        LoginOccupied,

        #[code = "SELF_DELETION"]
        #[status = CONFLICT]
        #[message = "`User` cannot delete itself"]
        SelfDeletion,
    }
}

define_error! {
    enum ContractError {
        #[code = "CONTRACT_ALREADY_TERMINATED"]
        #[status = CONFLICT]
        #[message = "`Contract` is terminated already"]
        AlreadyTerminated,

        #[code = "FRAMEWORK_CONTRACT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Framework `Contract` with the specified ID does not \
                     exist"]
        FrameworkNotExists,

        #[code = "NOT_FRAMEWORK_CONTRACT"]
        #[status = BAD_REQUEST]
        #[message = "`Contract` to group under is not a framework one"]
        NotFramework,

        #[code = "CONTRACT_TERMINATED"]
        #[status = CONFLICT]
        #[message = "Terminated `Contract` cannot be changed"]
        Terminated,
    }
}

define_error! {
    enum CategoryError {
        #[code = "CATEGORY_IN_USE"]
        #[status = CONFLICT]
        #[message = "`Contract`s still belong to the `Category`"]
        InUse,

        #[code = "NAME_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`CategoryName` is occupied by another `Category`"]
        NameOccupied,
    }
}
