//! [`Command`] definition.

pub mod authorize_user_session;
pub mod bootstrap_admin;
pub mod create_category;
pub mod create_contract;
pub mod create_user;
pub mod create_user_session;
pub mod delete_category;
pub mod delete_user;
pub mod recalculate_cancellation_dates;
pub mod rename_category;
pub mod terminate_contract;
pub mod update_contract;
pub mod update_user;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    bootstrap_admin::BootstrapAdmin, create_category::CreateCategory,
    create_contract::CreateContract, create_user::CreateUser,
    create_user_session::CreateUserSession, delete_category::DeleteCategory,
    delete_user::DeleteUser,
    recalculate_cancellation_dates::RecalculateCancellationDates,
    rename_category::RenameCategory, terminate_contract::TerminateContract,
    update_contract::UpdateContract, update_user::UpdateUser,
};
