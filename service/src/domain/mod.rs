//! Domain definitions.

pub mod category;
pub mod contract;
pub mod user;

pub use self::{category::Category, contract::Contract, user::User};
