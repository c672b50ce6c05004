//! Views are pure functions of the cached snapshots plus a [`Filter`].
//!
//! Each entity type knows its columns, how to render one row and which
//! fields a search looks at. References are resolved against the cache and
//! rendered as [`NOT_AVAILABLE`] when the target is missing.

use regex::Regex;

use crate::{
    domain::{Accident, Collection, Entity, Owner, Policy, Record, Vehicle},
    store::{Cache, Stored},
};

/// Placeholder for a reference that does not resolve.
pub const NOT_AVAILABLE: &str = "N/A";

/// Rows of text under a fixed set of column headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column headers.
    pub headers: &'static [&'static str],
    /// One entry per record, each with one cell per header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Narrows a listing by substring search and/or regular expression.
///
/// Both criteria must match when both are given. An empty filter matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    search: Option<String>,
    pattern: Option<Regex>,
}

impl Filter {
    /// Case-insensitive substring search. Blank queries are ignored.
    #[must_use]
    pub fn search(mut self, query: Option<&str>) -> Self {
        self.search = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        self
    }

    /// Regular expression matched against the same fields as the search.
    #[must_use]
    pub fn pattern(mut self, pattern: Option<Regex>) -> Self {
        self.pattern = pattern;
        self
    }

    fn matches(&self, haystacks: &[&str]) -> bool {
        let searched = self.search.as_ref().is_none_or(|query| {
            haystacks
                .iter()
                .any(|h| h.to_lowercase().contains(query.as_str()))
        });
        let patterned = self
            .pattern
            .as_ref()
            .is_none_or(|re| haystacks.iter().any(|h| re.is_match(h)));
        searched && patterned
    }
}

/// Rendering behaviour of an entity type.
pub trait View: Stored {
    /// Column headers.
    const HEADERS: &'static [&'static str];

    /// Collections whose snapshots the rows read, besides this one.
    const RELATED: &'static [Collection];

    /// Renders one record.
    fn row(record: &Record<Self>, cache: &Cache) -> Vec<String>;

    /// The texts a [`Filter`] is matched against.
    fn searchable<'a>(record: &'a Record<Self>, cache: &'a Cache) -> Vec<&'a str>;
}

/// The label of the record `fields` points at, or [`NOT_AVAILABLE`].
fn referenced<'a, F: Entity>(fields: &F, cache: &'a Cache) -> &'a str {
    fields
        .reference()
        .and_then(|reference| cache.label(reference))
        .unwrap_or(NOT_AVAILABLE)
}

impl View for Owner {
    const HEADERS: &'static [&'static str] = &["ID", "Full name", "Address", "Phone", "Vehicles"];
    const RELATED: &'static [Collection] = &[Collection::Vehicles];

    fn row(record: &Record<Self>, cache: &Cache) -> Vec<String> {
        let vehicles = cache
            .records::<Vehicle>()
            .iter()
            .filter(|v| v.fields.owner_id == record.id)
            .count();
        vec![
            record.id.to_string(),
            record.fields.full_name.clone(),
            record.fields.address.clone(),
            record.fields.phone_number.clone(),
            vehicles.to_string(),
        ]
    }

    fn searchable<'a>(record: &'a Record<Self>, _cache: &'a Cache) -> Vec<&'a str> {
        vec![record.fields.full_name.as_str(), record.fields.phone_number.as_str()]
    }
}

impl View for Vehicle {
    const HEADERS: &'static [&'static str] = &["ID", "Vehicle no", "Model", "Year", "VIN", "Owner"];
    const RELATED: &'static [Collection] = &[Collection::Owners];

    fn row(record: &Record<Self>, cache: &Cache) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.fields.vehicle_no.clone(),
            record.fields.model.clone(),
            record.fields.year.to_string(),
            record.fields.vin.clone(),
            referenced(&record.fields, cache).to_string(),
        ]
    }

    fn searchable<'a>(record: &'a Record<Self>, cache: &'a Cache) -> Vec<&'a str> {
        let mut fields = vec![record.fields.vehicle_no.as_str()];
        if let Some(owner) = record.fields.reference().and_then(|r| cache.label(r)) {
            fields.push(owner);
        }
        fields
    }
}

impl View for Policy {
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Policy no",
        "Vehicle",
        "Start",
        "End",
        "Amount",
        "Status",
    ];
    const RELATED: &'static [Collection] = &[Collection::Vehicles];

    fn row(record: &Record<Self>, cache: &Cache) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.fields.policy_no.clone(),
            referenced(&record.fields, cache).to_string(),
            record.fields.start_date.to_string(),
            record.fields.end_date.to_string(),
            format!("{:.2}", record.fields.amount),
            record.fields.status.to_string(),
        ]
    }

    fn searchable<'a>(record: &'a Record<Self>, _cache: &'a Cache) -> Vec<&'a str> {
        vec![record.fields.policy_no.as_str()]
    }
}

impl View for Accident {
    const HEADERS: &'static [&'static str] = &["ID", "Date", "Location", "Description", "Vehicle"];
    const RELATED: &'static [Collection] = &[Collection::Vehicles];

    fn row(record: &Record<Self>, cache: &Cache) -> Vec<String> {
        vec![
            record.id.to_string(),
            record.fields.accident_date.to_string(),
            record.fields.location.clone(),
            record.fields.description.clone(),
            referenced(&record.fields, cache).to_string(),
        ]
    }

    fn searchable<'a>(record: &'a Record<Self>, _cache: &'a Cache) -> Vec<&'a str> {
        vec![record.fields.location.as_str(), record.fields.description.as_str()]
    }
}

/// The cached records of a type that pass the filter, in cache order.
#[must_use]
pub fn filtered<'a, F: View>(cache: &'a Cache, filter: &Filter) -> Vec<&'a Record<F>> {
    cache
        .records::<F>()
        .iter()
        .filter(|record| filter.matches(&F::searchable(record, cache)))
        .collect()
}

/// Renders the cached records of a type that pass the filter.
#[must_use]
pub fn table<F: View>(cache: &Cache, filter: &Filter) -> Table {
    Table {
        headers: F::HEADERS,
        rows: filtered::<F>(cache, filter)
            .into_iter()
            .map(|record| F::row(record, cache))
            .collect(),
    }
}

/// [`table`] for a collection chosen at runtime.
#[must_use]
pub fn table_for(collection: Collection, cache: &Cache, filter: &Filter) -> Table {
    match collection {
        Collection::Owners => table::<Owner>(cache, filter),
        Collection::Vehicles => table::<Vehicle>(cache, filter),
        Collection::Policies => table::<Policy>(cache, filter),
        Collection::Accidents => table::<Accident>(cache, filter),
    }
}

/// The collections a listing of `collection` needs fetched, itself first.
#[must_use]
pub fn required_collections(collection: Collection) -> Vec<Collection> {
    let related = match collection {
        Collection::Owners => Owner::RELATED,
        Collection::Vehicles => Vehicle::RELATED,
        Collection::Policies => Policy::RELATED,
        Collection::Accidents => Accident::RELATED,
    };
    std::iter::once(collection)
        .chain(related.iter().copied())
        .collect()
}

/// Cached record counts per collection, in display order.
#[must_use]
pub fn summary(cache: &Cache) -> Vec<(Collection, usize)> {
    Collection::ALL
        .into_iter()
        .map(|collection| (collection, cache.len(collection)))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        domain::PolicyStatus,
        storage::MemoryBackend,
        store::EntityStore,
    };

    fn owner(id: u64, name: &str, phone: &str) -> Record<Owner> {
        Record::new(
            id,
            Owner {
                full_name: name.to_string(),
                address: "Bangalore".to_string(),
                phone_number: phone.to_string(),
            },
        )
    }

    fn vehicle(id: u64, no: &str, owner_id: u64) -> Record<Vehicle> {
        Record::new(
            id,
            Vehicle {
                vehicle_no: no.to_string(),
                model: "Civic".to_string(),
                year: 2022,
                vin: format!("VIN{id}"),
                owner_id,
            },
        )
    }

    fn policy(id: u64, no: &str, vehicle_id: u64) -> Record<Policy> {
        Record::new(
            id,
            Policy {
                policy_no: no.to_string(),
                start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
                amount: 15000.0,
                status: PolicyStatus::Active,
                vehicle_id,
            },
        )
    }

    fn cache() -> Cache {
        let mut backend = MemoryBackend::new();
        backend
            .seed([
                owner(1, "Anjali Sharma", "9876543210"),
                owner(2, "Rohan Mehta", "8765432109"),
            ])
            .unwrap()
            .seed([
                vehicle(1, "KA-01-AB-1234", 1),
                vehicle(2, "MH-12-CD-5678", 2),
                vehicle(3, "TN-07-EF-9012", 9),
            ])
            .unwrap()
            .seed([policy(1, "POL-001", 1), policy(2, "POL-002", 7)])
            .unwrap();
        let mut store = EntityStore::new(backend);
        store.refresh_all().unwrap();
        store.cache().clone()
    }

    #[test]
    fn vehicle_rows_resolve_owner_names() {
        let table = table::<Vehicle>(&cache(), &Filter::default());

        let owners: Vec<_> = table.rows.iter().map(|row| row[5].as_str()).collect();
        assert_eq!(owners, vec!["Anjali Sharma", "Rohan Mehta", NOT_AVAILABLE]);
    }

    #[test]
    fn policy_rows_render_missing_vehicle_as_placeholder() {
        let table = table::<Policy>(&cache(), &Filter::default());

        assert_eq!(
            table.rows[1],
            vec!["2", "POL-002", "N/A", "2024-01-15", "2025-01-14", "15000.00", "active"]
        );
    }

    #[test]
    fn owner_rows_count_owned_vehicles() {
        let table = table::<Owner>(&cache(), &Filter::default());
        assert_eq!(table.rows[0][4], "1");
    }

    #[test]
    fn owner_search_matches_name_or_phone() {
        let cache = cache();

        let by_name = table::<Owner>(&cache, &Filter::default().search(Some("anjali")));
        let by_phone = table::<Owner>(&cache, &Filter::default().search(Some("2109")));

        assert_eq!(by_name.rows.len(), 1);
        assert_eq!(by_name.rows[0][1], "Anjali Sharma");
        assert_eq!(by_phone.rows.len(), 1);
        assert_eq!(by_phone.rows[0][1], "Rohan Mehta");
    }

    #[test]
    fn vehicle_search_matches_resolved_owner_name() {
        let cache = cache();
        let found = filtered::<Vehicle>(&cache, &Filter::default().search(Some("ROHAN")));
        let ids: Vec<_> = found.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn blank_search_matches_everything() {
        let cache = cache();
        let found = filtered::<Vehicle>(&cache, &Filter::default().search(Some("  ")));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn regex_and_search_must_both_match() {
        let filter = Filter::default()
            .search(Some("-"))
            .pattern(Some(Regex::new("^(KA|TN)-").unwrap()));

        let cache = cache();
        let found = filtered::<Vehicle>(&cache, &filter);
        let ids: Vec<_> = found.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn empty_cache_renders_no_rows() {
        let table = table_for(Collection::Accidents, &Cache::default(), &Filter::default());
        assert!(table.is_empty());
        assert_eq!(table.headers, Accident::HEADERS);
    }

    #[test]
    fn listings_fetch_referenced_collections() {
        assert_eq!(
            required_collections(Collection::Policies),
            vec![Collection::Policies, Collection::Vehicles]
        );
    }

    #[test]
    fn summary_counts_each_collection() {
        assert_eq!(
            summary(&cache()),
            vec![
                (Collection::Owners, 2),
                (Collection::Vehicles, 3),
                (Collection::Policies, 2),
                (Collection::Accidents, 0),
            ]
        );
    }
}
