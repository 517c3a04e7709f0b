//! GraphQL API definitions.

pub mod category;
pub mod contract;
mod mutation;
mod query;
pub mod scalar;
pub mod user;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    category::Category, contract::Contract, mutation::Mutation, query::Query,
    user::User,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

define_error! {
    enum PaginationError {
        #[code = "AMBIGUOUS_PAGINATION_ARGUMENTS"]
        #[status = BAD_REQUEST]
        #[message = "Ambiguous pagination arguments"]
        Ambiguous,
    }
}
