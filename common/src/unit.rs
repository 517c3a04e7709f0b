//! Marker types describing what a typed value stands for.
//!
//! Combined into tuples with an entity type, they tell apart values of the
//! same representation, like `DateOf<(Contract, Cancellation)>`.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing an entity termination.
#[derive(Clone, Copy, Debug)]
pub struct Termination;

/// Marker type describing an entity commencement.
#[derive(Clone, Copy, Debug)]
pub struct Commencement;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing an entity cancellation.
#[derive(Clone, Copy, Debug)]
pub struct Cancellation;
