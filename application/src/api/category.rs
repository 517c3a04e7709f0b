//! [`Category`]-related definitions.

use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`Category`] grouping `Contract`s.
#[derive(Clone, Debug)]
pub struct Category {
    /// ID of this [`Category`].
    pub id: Id,

    /// [`domain::Category`] representing this [`Category`].
    category: OnceCell<domain::Category>,
}

impl From<domain::Category> for Category {
    fn from(category: domain::Category) -> Self {
        Self {
            id: category.id.into(),
            category: OnceCell::new_with(Some(category)),
        }
    }
}

impl Category {
    /// Creates a new [`Category`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Category`] with the provided ID exists,
    /// otherwise accessing this [`Category`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            category: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Category`] representing this [`Category`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Category`] doesn't exist.
    async fn category(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Category, Error> {
        let id = self.id.into();
        self.category
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::category::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(
                            c.ok_or_else(|| {
                                api::query::CategoryError::NotExists.into()
                            })
                            .map_err(ctx.error()),
                        )
                    })
            })
            .await
    }
}

/// A `Category` grouping `Contract`s.
#[graphql_object(context = Context)]
impl Category {
    /// Unique identifier of this `Category`.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Unique name of this `Category`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Category.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.category(ctx).await?.name.clone().into())
    }
}

/// Unique identifier of a `Category`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::category::Id)]
#[into(domain::category::Id)]
#[graphql(name = "CategoryId", transparent)]
pub struct Id(Uuid);

/// Name of a `Category`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "CategoryName",
    with = scalar::Via::<domain::category::Name>,
)]
pub struct Name(domain::category::Name);
