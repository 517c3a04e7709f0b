//! [`Category`] read model definition.
//!
//! [`Category`]: crate::domain::Category

use derive_more::{From, Into};

#[cfg(doc)]
use crate::domain::{Category, Contract};

/// Count of [`Contract`]s belonging to a [`Category`].
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct ContractsCount(i32);
