//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";

    /// Default number of items on a list page.
    const DEFAULT_PAGE_SIZE: i32 = 20;
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        Self::user(my_id, ctx).await
    }

    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `User`s, optionally having the specified
    /// `UserRole` only.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous;
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "users",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            role = ?role,
        ),
    )]
    pub async fn users(
        first: Option<i32>,
        after: Option<api::user::list::Cursor>,
        last: Option<i32>,
        before: Option<api::user::list::Cursor>,
        role: Option<api::user::Role>,
        ctx: &Context,
    ) -> Result<api::user::list::Connection, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::users::List::by(read::user::list::Selector {
                arguments: read::user::list::Arguments::new(
                    first,
                    after.map(Into::into),
                    last,
                    before.map(Into::into),
                    Self::DEFAULT_PAGE_SIZE,
                )
                .ok_or_else(|| api::PaginationError::Ambiguous.into())
                .map_err(ctx.error())?,
                filter: read::user::list::Filter {
                    role: role.map(Into::into),
                },
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Contract` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "contract",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn contract(
        id: api::contract::Id,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::contract::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ContractError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Contract`s.
    ///
    /// `search` matches any of its words in the title, partner or content of
    /// a `Contract`. `onlyValid` leaves only non-terminated `Contract`s still
    /// valid today.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous;
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            category_id = ?category_id,
            first = ?first,
            gql.name = "contracts",
            last = ?last,
            only_valid = ?only_valid,
            otel.name = Self::SPAN_NAME,
            search = ?search,
        ),
    )]
    pub async fn contracts(
        first: Option<i32>,
        after: Option<api::contract::list::Cursor>,
        last: Option<i32>,
        before: Option<api::contract::list::Cursor>,
        search: Option<String>,
        category_id: Option<api::category::Id>,
        only_valid: Option<bool>,
        ctx: &Context,
    ) -> Result<api::contract::list::Connection, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::contracts::List::by(
                read::contract::list::Selector {
                    arguments: read::contract::list::Arguments::new(
                        first,
                        after.map(Into::into),
                        last,
                        before.map(Into::into),
                        Self::DEFAULT_PAGE_SIZE,
                    )
                    .ok_or_else(|| api::PaginationError::Ambiguous.into())
                    .map_err(ctx.error())?,
                    filter: read::contract::list::Filter {
                        search: search.filter(|s| !s.trim().is_empty()),
                        category_id: category_id.map(Into::into),
                        valid_on: only_valid
                            .unwrap_or_default()
                            .then(Date::today),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the active `Contract`s whose cancellation notice has to be
    /// filed within the specified number of `days`, including today.
    ///
    /// 90 days are looked ahead if `days` are absent or not positive. The
    /// soonest `Contract`s come first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            days = ?days,
            gql.name = "expiringContracts",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn expiring_contracts(
        days: Option<i32>,
        ctx: &Context,
    ) -> Result<Vec<api::Contract>, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::contracts::Expiring::new(days))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cs| cs.into_iter().map(Into::into).collect())
    }

    /// Returns the `Category` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized;
    /// - `CATEGORY_NOT_EXISTS` - the `Category` with the specified ID does not
    ///                           exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "category",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn category(
        id: api::category::Id,
        ctx: &Context,
    ) -> Result<api::Category, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::category::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| CategoryError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Category`s ordered by their names.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the request is not authorized.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "categories",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn categories(
        ctx: &Context,
    ) -> Result<Vec<api::Category>, Error> {
        _ = ctx.current_session().await?;

        ctx.service()
            .execute(query::categories::List::by(()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cs| cs.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum CategoryError {
        #[code = "CATEGORY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Category` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ContractError {
        #[code = "CONTRACT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Contract` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
