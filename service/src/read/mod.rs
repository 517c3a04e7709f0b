//! Read entities definitions.

pub mod category;
pub mod contract;
pub mod user;
