//! [`Contract`]-related definitions.

use common::{Date, DateTime, Months};
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A [`Contract`] of the organization.
#[derive(Clone, Debug)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// [`domain::Contract`] representing this [`Contract`].
    contract: OnceCell<domain::Contract>,
}

impl From<domain::Contract> for Contract {
    fn from(contract: domain::Contract) -> Self {
        Self {
            id: contract.id.into(),
            contract: OnceCell::new_with(Some(contract)),
        }
    }
}

impl Contract {
    /// Creates a new [`Contract`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Contract`] with the provided ID exists,
    /// otherwise accessing this [`Contract`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            contract: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Contract`] representing this [`Contract`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Contract`] doesn't exist.
    async fn contract(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Contract, Error> {
        let id = self.id.into();
        self.contract
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::contract::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(
                            c.ok_or_else(|| {
                                api::query::ContractError::NotExists.into()
                            })
                            .map_err(ctx.error()),
                        )
                    })
            })
            .await
    }
}

/// A `Contract` of the organization.
#[graphql_object(context = Context)]
impl Contract {
    /// Unique identifier of this `Contract`.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Unique human-readable number of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.number",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn number(&self, ctx: &Context) -> Result<Number, Error> {
        Ok(self.contract(ctx).await?.number.clone().into())
    }

    /// Title of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn title(&self, ctx: &Context) -> Result<Title, Error> {
        Ok(self.contract(ctx).await?.title.clone().into())
    }

    /// Content of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.content",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn content(&self, ctx: &Context) -> Result<Text, Error> {
        Ok(self.contract(ctx).await?.content.clone().into())
    }

    /// Conditions of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.conditions",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn conditions(&self, ctx: &Context) -> Result<Text, Error> {
        Ok(self.contract(ctx).await?.conditions.clone().into())
    }

    /// Partner this `Contract` is concluded with.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.partner",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn partner(&self, ctx: &Context) -> Result<Partner, Error> {
        Ok(self.contract(ctx).await?.partner.clone().into())
    }

    /// `Category` this `Contract` belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.category",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn category(
        &self,
        ctx: &Context,
    ) -> Result<api::Category, Error> {
        let id = self.contract(ctx).await?.category_id;

        #[expect(unsafe_code, reason = "foreign key guarantees existence")]
        let category = unsafe { api::Category::new_unchecked(id) };
        Ok(category)
    }

    /// Kind of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.kind",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn kind(&self, ctx: &Context) -> Result<Kind, Error> {
        Ok(self.contract(ctx).await?.kind.into())
    }

    /// Framework `Contract` this `Contract` is grouped under, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.frameworkContract",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn framework_contract(
        &self,
        ctx: &Context,
    ) -> Result<Option<Contract>, Error> {
        Ok(self.contract(ctx).await?.framework_contract_id.map(|id| {
            #[expect(unsafe_code, reason = "foreign key guarantees existence")]
            unsafe {
                Self::new_unchecked(id)
            }
        }))
    }

    /// Date the commitment of this `Contract` begins.
    pub async fn valid_from(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.contract(ctx).await?.valid_from.coerce())
    }

    /// Date this `Contract` is no longer valid after.
    pub async fn valid_until(
        &self,
        ctx: &Context,
    ) -> Result<Option<Date>, Error> {
        Ok(self.contract(ctx).await?.valid_until.map(|d| d.coerce()))
    }

    /// Length of a single renewal period of this `Contract`, in months.
    pub async fn term_months(
        &self,
        ctx: &Context,
    ) -> Result<Option<i32>, Error> {
        Ok(self.contract(ctx).await?.term.map(Months::get))
    }

    /// Date the mandatory initial commitment of this `Contract` ends.
    pub async fn minimum_term(
        &self,
        ctx: &Context,
    ) -> Result<Option<Date>, Error> {
        Ok(self.contract(ctx).await?.minimum_term.map(|d| d.coerce()))
    }

    /// Advance notice required to cancel this `Contract`, in months.
    pub async fn notice_period_months(
        &self,
        ctx: &Context,
    ) -> Result<Option<i32>, Error> {
        Ok(self.contract(ctx).await?.notice_period.map(Months::get))
    }

    /// Nearest renewal boundary this `Contract` can still be cancelled at.
    ///
    /// Absent if this `Contract` lacks any of its cancellation terms.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.cancellationDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancellation_date(
        &self,
        ctx: &Context,
    ) -> Result<Option<Date>, Error> {
        Ok(self
            .contract(ctx)
            .await?
            .cancellation
            .map(|s| s.cancellation_date().coerce()))
    }

    /// Latest date a cancellation notice for this `Contract` has to be filed
    /// at.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.cancellationActionDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancellation_action_date(
        &self,
        ctx: &Context,
    ) -> Result<Option<Date>, Error> {
        Ok(self
            .contract(ctx)
            .await?
            .cancellation
            .map(|s| s.action_date().coerce()))
    }

    /// `DateTime` when this `Contract` was created.
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.contract(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Contract` was terminated, if it was.
    pub async fn terminated_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.contract(ctx).await?.terminated_at.map(|at| at.coerce()))
    }

    /// Indicator whether this `Contract` was terminated.
    pub async fn is_terminated(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(!self.contract(ctx).await?.is_active())
    }
}

/// Editable fields of a `Contract`.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ContractInput")]
pub struct Input {
    /// Title of the `Contract`.
    pub title: Title,

    /// Content of the `Contract`.
    pub content: Option<Text>,

    /// Conditions of the `Contract`.
    pub conditions: Option<Text>,

    /// Partner the `Contract` is concluded with.
    pub partner: Partner,

    /// ID of the `Category` the `Contract` belongs to.
    pub category_id: api::category::Id,

    /// Kind of the `Contract`.
    pub kind: Kind,

    /// ID of the framework `Contract` to group the `Contract` under.
    pub framework_contract_id: Option<Id>,

    /// Date the commitment of the `Contract` begins.
    pub valid_from: Date,

    /// Date the `Contract` is no longer valid after.
    pub valid_until: Option<Date>,

    /// Length of a single renewal period of the `Contract`, in months.
    pub term_months: Option<i32>,

    /// Date the mandatory initial commitment of the `Contract` ends.
    pub minimum_term: Option<Date>,

    /// Advance notice required to cancel the `Contract`, in months.
    pub notice_period_months: Option<i32>,
}

/// Unique identifier of a `Contract`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::contract::Id)]
#[into(domain::contract::Id)]
#[graphql(name = "ContractId", transparent)]
pub struct Id(Uuid);

/// Unique human-readable number of a `Contract`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ContractNumber",
    with = scalar::Via::<domain::contract::Number>,
)]
pub struct Number(domain::contract::Number);

/// Title of a `Contract`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ContractTitle",
    with = scalar::Via::<domain::contract::Title>,
)]
pub struct Title(domain::contract::Title);

/// Partner a `Contract` is concluded with.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ContractPartner",
    with = scalar::Via::<domain::contract::Partner>,
)]
pub struct Partner(domain::contract::Partner);

/// Free-form text of a `Contract`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ContractText",
    with = scalar::Via::<domain::contract::Text>,
)]
pub struct Text(domain::contract::Text);

/// Kind of a `Contract`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ContractKind")]
pub enum Kind {
    /// `Contract` grouping other `Contract`s under it.
    Framework,

    /// Standalone `Contract`.
    Individual,
}

impl From<domain::contract::Kind> for Kind {
    fn from(kind: domain::contract::Kind) -> Self {
        match kind {
            domain::contract::Kind::Framework => Self::Framework,
            domain::contract::Kind::Individual => Self::Individual,
        }
    }
}

impl From<Kind> for domain::contract::Kind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Framework => Self::Framework,
            Kind::Individual => Self::Individual,
        }
    }
}

pub mod list {
    //! Definitions related to the [`Contract`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Contract, Id};

    /// Cursor for the `Contract` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::contract::list::Cursor)]
    #[graphql(
        name = "ContractListCursor",
        with = scalar::Via::<read::contract::list::Cursor>,
    )]
    pub struct Cursor(pub read::contract::list::Cursor);

    /// Edge in the [`Contract`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::contract::list::Edge);

    /// Edge in the `Contract` list.
    #[graphql_object(name = "ContractListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `ContractListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `ContractListEdge`.
        #[must_use]
        pub fn node(&self) -> Contract {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees `Contract` \
                          existence"
            )]
            unsafe {
                Contract::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Contract`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::contract::list::Connection);

    /// Connection of the `Contract` list.
    #[graphql_object(name = "ContractListConnection", context = Context)]
    impl Connection {
        /// Edges in this `ContractListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.0.page_info(),
                start_cursor: self.0.edges.first().map(|e| e.cursor.into()),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::contract::list::PageInfo`].
        info: read::contract::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,
    }

    /// Information about a `ContractListConnection` page.
    #[graphql_object(name = "ContractListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> Option<Cursor> {
            self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> Option<Cursor> {
            self.info.end_cursor.map(Into::into)
        }

        /// Total `Contract`s count.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::contracts::TotalCount::by(()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
