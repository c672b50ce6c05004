//! Vehicle insurance records
//!
//! A typed client for a REST backend holding owners, vehicles, policies and
//! accidents. The [`EntityStore`] keeps the last fetched snapshot of each
//! collection and resolves references between them for display.

pub mod domain;
pub use domain::{
    Accident, Collection, Config, Entity, Id, Owner, Policy, PolicyStatus, Record, Reference,
    Vehicle,
};

/// Transports the store can talk to.
pub mod storage;
pub use storage::{Backend, HttpBackend, MemoryBackend};

pub mod store;
pub use store::{Cache, EntityStore, RequestState, StoreError, Stored};

/// Display tables derived from store state.
pub mod view;
