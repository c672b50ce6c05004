//! Domain models for the records system.
//!
//! This module contains the four entity types, the closed set of
//! collections they live in, and the client configuration.

/// The collections exposed by the backend.
pub mod collection;
pub use collection::{Collection, UnknownCollectionError};

/// Entity field sets and the [`Record`] wrapper.
pub mod record;
pub use record::{
    Accident, Entity, Id, Owner, Policy, PolicyStatus, Record, Reference, UnknownStatusError,
    Vehicle,
};

mod config;
pub use config::Config;
