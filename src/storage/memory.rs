use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{
    domain::{Collection, Entity, Id, Record},
    storage::backend::{Backend, Method, Request, Response, TransportError},
};

/// A JSON object as stored in a table.
type Row = Map<String, Value>;

#[derive(Debug, Default, Clone, PartialEq)]
struct Table {
    rows: BTreeMap<Id, Row>,
    /// The highest id ever issued or seeded. Ids are never reused.
    high_water: Id,
}

impl Table {
    fn allocate(&mut self) -> Id {
        let max = self.rows.last_key_value().map_or(0, |(id, _)| *id);
        self.high_water = self.high_water.max(max) + 1;
        self.high_water
    }

    fn put(&mut self, id: Id, mut row: Row) -> Row {
        row.insert("id".to_string(), Value::from(id));
        self.high_water = self.high_water.max(id);
        self.rows.insert(id, row.clone());
        row
    }
}

/// An in-memory stand-in for the records API.
///
/// It serves the same routes as the real backend, assigns ids as one more
/// than the largest id it has ever held, and stores bodies verbatim. It does
/// not check references between collections.
///
/// Failures can be injected with [`MemoryBackend::set_offline`] (transport
/// failure) and [`MemoryBackend::reject_with`] (non-2xx status).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryBackend {
    tables: BTreeMap<Collection, Table>,
    offline: bool,
    rejection: Option<u16>,
    requests: usize,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts records with their existing ids.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be serialized to a JSON object.
    pub fn seed<F: Entity>(
        &mut self,
        records: impl IntoIterator<Item = Record<F>>,
    ) -> Result<&mut Self, serde_json::Error> {
        let table = self.tables.entry(F::COLLECTION).or_default();
        for record in records {
            let row: Row = serde_json::from_value(serde_json::to_value(&record.fields)?)?;
            table.put(record.id, row);
        }
        Ok(self)
    }

    /// When offline, every request fails at the transport level.
    pub const fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// When set, every request is answered with this status and no body.
    pub const fn reject_with(&mut self, status: Option<u16>) {
        self.rejection = status;
    }

    /// The number of requests received, including failed ones.
    #[must_use]
    pub const fn request_count(&self) -> usize {
        self.requests
    }

    /// The number of records currently held in a collection.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.tables.get(&collection).map_or(0, |t| t.rows.len())
    }

    /// Whether a collection holds no records.
    #[must_use]
    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn handle(&mut self, request: &Request) -> Response {
        let Some((collection, id)) = route(&request.path) else {
            return Response::empty(404);
        };
        let table = self.tables.entry(collection).or_default();

        match (request.method, id) {
            (Method::Get, None) => Response::json(
                200,
                Value::Array(table.rows.values().cloned().map(Value::Object).collect()),
            ),
            (Method::Get, Some(id)) => table
                .rows
                .get(&id)
                .map_or(Response::empty(404), |row| {
                    Response::json(200, Value::Object(row.clone()))
                }),
            (Method::Post, None) => match as_object(request.body.as_ref()) {
                Some(row) => {
                    let id = table.allocate();
                    Response::json(201, Value::Object(table.put(id, row)))
                }
                None => Response::empty(400),
            },
            (Method::Put, Some(id)) => {
                if !table.rows.contains_key(&id) {
                    return Response::empty(404);
                }
                match as_object(request.body.as_ref()) {
                    Some(row) => Response::json(200, Value::Object(table.put(id, row))),
                    None => Response::empty(400),
                }
            }
            (Method::Delete, Some(id)) => match table.rows.remove(&id) {
                Some(_) => Response::empty(204),
                None => Response::empty(404),
            },
            _ => Response::empty(405),
        }
    }
}

impl Backend for MemoryBackend {
    fn execute(&mut self, request: &Request) -> Result<Response, TransportError> {
        self.requests += 1;
        if self.offline {
            return Err(TransportError::new(format!(
                "connection refused while sending {request}"
            )));
        }
        if let Some(status) = self.rejection {
            return Ok(Response::empty(status));
        }
        Ok(self.handle(request))
    }
}

/// Splits `/owners/` or `/owners/3/` into a collection and optional id.
fn route(path: &str) -> Option<(Collection, Option<Id>)> {
    let mut segments = path.trim_matches('/').split('/');
    let collection = Collection::from_segment(segments.next()?)?;
    let id = match segments.next() {
        None => None,
        Some(segment) => Some(segment.parse().ok()?),
    };
    if segments.next().is_some() {
        return None;
    }
    Some((collection, id))
}

/// The body as a JSON object, without any client-supplied id.
fn as_object(body: Option<&Value>) -> Option<Row> {
    let mut row = body?.as_object()?.clone();
    row.remove("id");
    Some(row)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;
    use crate::domain::Owner;

    fn owner(name: &str) -> Owner {
        Owner {
            full_name: name.to_string(),
            address: "123 MG Road".to_string(),
            phone_number: "9876543210".to_string(),
        }
    }

    fn seeded() -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        backend
            .seed([
                Record::new(1, owner("Anjali Sharma")),
                Record::new(2, owner("Rohan Mehta")),
            ])
            .unwrap();
        backend
    }

    #[test_case("/owners/", Some((Collection::Owners, None)); "collection")]
    #[test_case("/vehicles/7/", Some((Collection::Vehicles, Some(7))); "record")]
    #[test_case("/claims/", None; "unknown collection")]
    #[test_case("/owners/abc/", None; "non numeric id")]
    #[test_case("/owners/1/extra/", None; "too many segments")]
    fn routes_paths(path: &str, expected: Option<(Collection, Option<Id>)>) {
        assert_eq!(route(path), expected);
    }

    #[test]
    fn lists_rows_in_id_order() {
        let mut backend = seeded();
        let response = backend.execute(&Request::get("/owners/")).unwrap();

        assert_eq!(response.status, 200);
        let body = response.body.unwrap();
        let ids: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn post_assigns_next_id_and_ignores_client_id() {
        let mut backend = seeded();
        let response = backend
            .execute(&Request::post(
                "/owners/",
                json!({"id": 99, "fullName": "Priya Singh", "address": "X", "phoneNumber": "1"}),
            ))
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body.unwrap()["id"], json!(3));
    }

    #[test]
    fn ids_are_not_reused_after_deleting_the_highest() {
        let mut backend = seeded();
        let delete = backend.execute(&Request::delete("/owners/2/")).unwrap();
        assert_eq!(delete, Response::empty(204));

        let response = backend
            .execute(&Request::post("/owners/", json!({"fullName": "New"})))
            .unwrap();
        assert_eq!(response.body.unwrap()["id"], json!(3));
    }

    #[test]
    fn put_replaces_the_whole_row() {
        let mut backend = seeded();
        backend
            .execute(&Request::put("/owners/1/", json!({"fullName": "Only Name"})))
            .unwrap();

        let response = backend.execute(&Request::get("/owners/1/")).unwrap();
        assert_eq!(
            response.body.unwrap(),
            json!({"id": 1, "fullName": "Only Name"})
        );
    }

    #[test_case(Request::put("/owners/9/", json!({})), 404; "put missing record")]
    #[test_case(Request::delete("/owners/9/"), 404; "delete missing record")]
    #[test_case(Request::post("/owners/", json!([1, 2])), 400; "post non object")]
    #[test_case(Request::delete("/owners/"), 405; "delete collection")]
    #[test_case(Request::get("/claims/"), 404; "unknown route")]
    fn rejects_invalid_requests(request: Request, status: u16) {
        let mut backend = seeded();
        assert_eq!(backend.execute(&request).unwrap(), Response::empty(status));
    }

    #[test]
    fn offline_backend_fails_at_transport_level() {
        let mut backend = seeded();
        backend.set_offline(true);

        assert!(backend.execute(&Request::get("/owners/")).is_err());
        assert_eq!(backend.request_count(), 1);
    }

    #[test]
    fn rejection_overrides_every_response() {
        let mut backend = seeded();
        backend.reject_with(Some(503));

        let response = backend.execute(&Request::get("/owners/")).unwrap();
        assert_eq!(response, Response::empty(503));
        assert_eq!(backend.len(Collection::Owners), 2);
    }
}
