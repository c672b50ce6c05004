//! The entity store.
//!
//! [`EntityStore`] fetches, caches and mutates the four collections through a
//! [`Backend`], and resolves references between them for display.
//!
//! The store holds only the most recently fetched snapshot of each
//! collection. Mutations never touch the cache: after a successful create,
//! update or remove, the caller lists the collection again.

use std::collections::BTreeMap;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::instrument;

use crate::{
    domain::{Accident, Collection, Entity, Id, Owner, Policy, Record, Reference, Vehicle},
    storage::{Backend, Method, Request},
};

mod error;
pub use error::StoreError;

/// Progress of the most recent request for a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestState {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// A request has been sent and has not completed.
    InFlight,
    /// The last request succeeded.
    Success,
    /// The last request failed.
    Failed,
}

/// The last fetched snapshot of every collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cache {
    owners: Vec<Record<Owner>>,
    vehicles: Vec<Record<Vehicle>>,
    policies: Vec<Record<Policy>>,
    accidents: Vec<Record<Accident>>,
}

impl Cache {
    /// The cached records of one entity type, in the order the backend
    /// returned them.
    #[must_use]
    pub fn records<F: Stored>(&self) -> &[Record<F>] {
        F::snapshot(self)
    }

    /// Looks up a cached record by id.
    ///
    /// Returns `None` if the id was not in the last fetched snapshot.
    #[must_use]
    pub fn resolve<F: Stored>(&self, id: Id) -> Option<&Record<F>> {
        F::snapshot(self).iter().find(|record| record.id == id)
    }

    /// The label of the record a reference points at, if it is cached.
    #[must_use]
    pub fn label(&self, reference: Reference) -> Option<&str> {
        match reference.collection {
            Collection::Owners => self.label_of::<Owner>(reference.id),
            Collection::Vehicles => self.label_of::<Vehicle>(reference.id),
            Collection::Policies => self.label_of::<Policy>(reference.id),
            Collection::Accidents => self.label_of::<Accident>(reference.id),
        }
    }

    fn label_of<F: Stored>(&self, id: Id) -> Option<&str> {
        self.resolve::<F>(id).map(|record| record.fields.label())
    }

    /// Whether a reference points at a cached record.
    #[must_use]
    pub fn contains(&self, reference: Reference) -> bool {
        self.label(reference).is_some()
    }

    /// The number of cached records in a collection.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Owners => self.owners.len(),
            Collection::Vehicles => self.vehicles.len(),
            Collection::Policies => self.policies.len(),
            Collection::Accidents => self.accidents.len(),
        }
    }

    /// Whether a collection has no cached records.
    #[must_use]
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    /// Records whose reference does not resolve against the cache.
    ///
    /// Views render these references as `N/A`.
    #[must_use]
    pub fn unresolved_references(&self) -> Vec<(Reference, Reference)> {
        let mut dangling = Vec::new();
        self.collect_unresolved::<Vehicle>(&mut dangling);
        self.collect_unresolved::<Policy>(&mut dangling);
        self.collect_unresolved::<Accident>(&mut dangling);
        dangling
    }

    fn collect_unresolved<F: Stored>(&self, dangling: &mut Vec<(Reference, Reference)>) {
        for record in F::snapshot(self) {
            let Some(target) = record.fields.reference() else {
                continue;
            };
            if !self.contains(target) {
                let source = Reference {
                    collection: F::COLLECTION,
                    id: record.id,
                };
                dangling.push((source, target));
            }
        }
    }
}

/// An entity type with a slot in the [`Cache`].
pub trait Stored: Entity + 'static {
    /// The cached records of this type.
    fn snapshot(cache: &Cache) -> &[Record<Self>];

    /// Replaces the cached records of this type.
    fn replace(cache: &mut Cache, records: Vec<Record<Self>>);
}

macro_rules! stored {
    ($ty:ty, $slot:ident) => {
        impl Stored for $ty {
            fn snapshot(cache: &Cache) -> &[Record<Self>] {
                &cache.$slot
            }

            fn replace(cache: &mut Cache, records: Vec<Record<Self>>) {
                cache.$slot = records;
            }
        }
    };
}

stored!(Owner, owners);
stored!(Vehicle, vehicles);
stored!(Policy, policies);
stored!(Accident, accidents);

/// Fetches, caches and mutates records through a [`Backend`].
///
/// Every operation runs to completion before returning. Failures are
/// returned as [`StoreError`] and also raise the [banner](Self::banner), which
/// stays up until the next successful request.
#[derive(Debug)]
pub struct EntityStore<B> {
    backend: B,
    cache: Cache,
    states: BTreeMap<Collection, RequestState>,
    banner: Option<StoreError>,
}

impl<B> EntityStore<B> {
    /// Creates a store with an empty cache.
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            cache: Cache {
                owners: Vec::new(),
                vehicles: Vec::new(),
                policies: Vec::new(),
                accidents: Vec::new(),
            },
            states: BTreeMap::new(),
            banner: None,
        }
    }

    /// The backend requests are sent through.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The cached snapshots, for views.
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// The cached records of one entity type, without any I/O.
    pub fn cached<F: Stored>(&self) -> &[Record<F>] {
        self.cache.records()
    }

    /// Looks up a record in the last fetched snapshot of its collection.
    ///
    /// Never fails: an unknown id yields `None`.
    pub fn resolve_reference<F: Stored>(&self, id: Id) -> Option<&Record<F>> {
        self.cache.resolve(id)
    }

    /// Progress of the most recent request for a collection.
    pub fn state(&self, collection: Collection) -> RequestState {
        self.states.get(&collection).copied().unwrap_or_default()
    }

    /// The failure indicator, if the last request failed.
    pub const fn banner(&self) -> Option<&StoreError> {
        self.banner.as_ref()
    }

    /// Hides the failure indicator.
    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Drops all cached snapshots and request state.
    pub fn clear(&mut self) {
        self.cache = Cache::default();
        self.states.clear();
        self.banner = None;
    }
}

impl<B: Backend> EntityStore<B> {
    /// Fetches a whole collection and replaces its cached snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. The cached snapshot is left
    /// untouched in that case.
    #[instrument(skip(self), fields(collection = %F::COLLECTION))]
    pub fn list<F: Stored>(&mut self) -> Result<&[Record<F>], StoreError> {
        let request = Request::get(F::COLLECTION.list_path());
        let result = self
            .round_trip(F::COLLECTION, &request)
            .and_then(|body| decode::<Vec<Record<F>>>(&request, body));
        let records = self.settle(F::COLLECTION, result)?;

        tracing::debug!(count = records.len(), "replaced cached snapshot");
        F::replace(&mut self.cache, records);
        Ok(F::snapshot(&self.cache))
    }

    /// Fetches a collection chosen at runtime, returning how many records it
    /// holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn list_collection(&mut self, collection: Collection) -> Result<usize, StoreError> {
        match collection {
            Collection::Owners => self.list::<Owner>().map(<[_]>::len),
            Collection::Vehicles => self.list::<Vehicle>().map(<[_]>::len),
            Collection::Policies => self.list::<Policy>().map(<[_]>::len),
            Collection::Accidents => self.list::<Accident>().map(<[_]>::len),
        }
    }

    /// Fetches every collection, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first failed request's error.
    pub fn refresh_all(&mut self) -> Result<(), StoreError> {
        for collection in Collection::ALL {
            self.list_collection(collection)?;
        }
        Ok(())
    }

    /// Submits a new record.
    ///
    /// The cache is not updated; list the collection again to see the
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingFields`] without sending anything if a
    /// required field is empty, or a request error if the backend refuses or
    /// cannot be reached.
    #[instrument(skip(self, fields), fields(collection = %F::COLLECTION))]
    pub fn create<F: Stored>(&mut self, fields: &F) -> Result<Record<F>, StoreError> {
        validate(fields)?;
        let request = Request::new(Method::Post, F::COLLECTION.list_path());
        let result = with_body(request, fields).and_then(|request| {
            let body = self.round_trip(F::COLLECTION, &request)?;
            decode(&request, body)
        });
        self.settle(F::COLLECTION, result)
    }

    /// Replaces every editable field of an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingFields`] without sending anything if a
    /// required field is empty, or a request error if the backend refuses or
    /// cannot be reached.
    #[instrument(skip(self, fields), fields(collection = %F::COLLECTION))]
    pub fn update<F: Stored>(&mut self, id: Id, fields: &F) -> Result<Record<F>, StoreError> {
        validate(fields)?;
        let request = Request::new(Method::Put, F::COLLECTION.record_path(id));
        let result = with_body(request, fields).and_then(|request| {
            let body = self.round_trip(F::COLLECTION, &request)?;
            decode(&request, body)
        });
        self.settle(F::COLLECTION, result)
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses or cannot be reached.
    #[instrument(skip(self), fields(collection = %F::COLLECTION))]
    pub fn remove<F: Stored>(&mut self, id: Id) -> Result<(), StoreError> {
        self.remove_from(F::COLLECTION, id)
    }

    /// Deletes a record from a collection chosen at runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses or cannot be reached.
    pub fn remove_from(&mut self, collection: Collection, id: Id) -> Result<(), StoreError> {
        let request = Request::delete(collection.record_path(id));
        let result = self.round_trip(collection, &request).map(|_| ());
        self.settle(collection, result)
    }

    /// Deletes an owner after deleting every vehicle they own.
    ///
    /// The vehicles collection is fetched first so the cascade sees the
    /// current owner assignments. Stops at the first failure, which can leave
    /// some of the vehicles deleted and the owner in place.
    ///
    /// Returns the number of vehicles deleted.
    ///
    /// # Errors
    ///
    /// Returns the first failed request's error.
    #[instrument(skip(self))]
    pub fn remove_owner_cascading(&mut self, owner_id: Id) -> Result<usize, StoreError> {
        let owned: Vec<Id> = self
            .list::<Vehicle>()?
            .iter()
            .filter(|vehicle| vehicle.fields.owner_id == owner_id)
            .map(|vehicle| vehicle.id)
            .collect();

        for &vehicle_id in &owned {
            self.remove::<Vehicle>(vehicle_id)?;
        }
        self.remove::<Owner>(owner_id)?;
        Ok(owned.len())
    }

    /// Sends a request and checks its status, returning the body.
    fn round_trip(
        &mut self,
        collection: Collection,
        request: &Request,
    ) -> Result<Option<Value>, StoreError> {
        tracing::debug!(%request, "sending");
        self.states.insert(collection, RequestState::InFlight);

        let response = self
            .backend
            .execute(request)
            .map_err(|e| StoreError::network(request, e.0))?;

        if response.is_success() {
            Ok(response.body)
        } else {
            Err(StoreError::rejected(request, response.status))
        }
    }

    /// Records the outcome of a request in the collection state and banner.
    fn settle<T>(
        &mut self,
        collection: Collection,
        result: Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        match &result {
            Ok(_) => {
                self.states.insert(collection, RequestState::Success);
                self.banner = None;
            }
            Err(error) => {
                tracing::warn!(%error, "request failed");
                self.states.insert(collection, RequestState::Failed);
                self.banner = Some(error.clone());
            }
        }
        result
    }
}

fn validate<F: Entity>(fields: &F) -> Result<(), StoreError> {
    let missing = fields.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::MissingFields {
            collection: F::COLLECTION,
            fields: missing,
        })
    }
}

/// Attaches the JSON encoding of `fields` as the request body.
fn with_body<F: Serialize>(mut request: Request, fields: &F) -> Result<Request, StoreError> {
    match serde_json::to_value(fields) {
        Ok(body) => {
            request.body = Some(body);
            Ok(request)
        }
        Err(e) => Err(StoreError::network(
            &request,
            format!("failed to encode payload: {e}"),
        )),
    }
}

fn decode<T: DeserializeOwned>(request: &Request, body: Option<Value>) -> Result<T, StoreError> {
    let body = body.ok_or_else(|| StoreError::network(request, "response had no body"))?;
    serde_json::from_value(body)
        .map_err(|e| StoreError::network(request, format!("unexpected response shape: {e}")))
}
