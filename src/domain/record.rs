use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de, de::DeserializeOwned};

use crate::domain::Collection;

/// Backend-assigned record identifier, unique within a collection.
pub type Id = u64;

/// A stored entity: the backend-assigned id plus the entity's fields.
///
/// On the wire the id sits alongside the fields in a single flat JSON
/// object, e.g. `{"id": 1, "fullName": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<F> {
    /// The backend-assigned identifier.
    pub id: Id,
    /// The editable fields.
    #[serde(flatten)]
    pub fields: F,
}

impl<F> Record<F> {
    /// Pairs an id with a set of fields.
    pub const fn new(id: Id, fields: F) -> Self {
        Self { id, fields }
    }
}

/// A foreign-key-style pointer to a record in another collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    /// The collection the target lives in.
    pub collection: Collection,
    /// The id of the target record.
    pub id: Id,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.collection.singular(), self.id)
    }
}

/// Behaviour shared by the editable field sets of every entity.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// The collection records of this kind are stored in.
    const COLLECTION: Collection;

    /// JSON names of required fields which are empty (or zero, for
    /// references and years).
    ///
    /// An empty result means the payload may be submitted.
    fn missing_fields(&self) -> Vec<&'static str>;

    /// The record this entity points at, if any.
    fn reference(&self) -> Option<Reference>;

    /// A short human-readable label, used where the record is referenced.
    fn label(&self) -> &str;
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Reads a JSON number, or a string holding one.
///
/// Form inputs reach the backend as text, so numeric fields may come back
/// as `"15000.00"` rather than `15000.0`.
fn number_or_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire<T> {
        Number(T),
        Text(String),
    }

    match Wire::<T>::deserialize(deserializer)? {
        Wire::Number(value) => Ok(value),
        Wire::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid number {text:?}: {e}"))),
    }
}

/// Collects the names whose condition holds.
fn missing(checks: &[(&'static str, bool)]) -> Vec<&'static str> {
    checks
        .iter()
        .filter(|(_, is_missing)| *is_missing)
        .map(|(name, _)| *name)
        .collect()
}

/// A vehicle owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// The owner's full name.
    pub full_name: String,
    /// Postal address.
    pub address: String,
    /// Contact phone number, kept as entered.
    pub phone_number: String,
}

impl Entity for Owner {
    const COLLECTION: Collection = Collection::Owners;

    fn missing_fields(&self) -> Vec<&'static str> {
        missing(&[
            ("fullName", blank(&self.full_name)),
            ("address", blank(&self.address)),
            ("phoneNumber", blank(&self.phone_number)),
        ])
    }

    fn reference(&self) -> Option<Reference> {
        None
    }

    fn label(&self) -> &str {
        &self.full_name
    }
}

/// A registered vehicle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Registration plate, e.g. `KA-01-AB-1234`.
    pub vehicle_no: String,
    /// Model name.
    pub model: String,
    /// Model year.
    #[serde(deserialize_with = "number_or_text")]
    pub year: u16,
    /// Vehicle identification number.
    pub vin: String,
    /// The owning [`Owner`].
    pub owner_id: Id,
}

impl Entity for Vehicle {
    const COLLECTION: Collection = Collection::Vehicles;

    fn missing_fields(&self) -> Vec<&'static str> {
        missing(&[
            ("vehicleNo", blank(&self.vehicle_no)),
            ("model", blank(&self.model)),
            ("year", self.year == 0),
            ("vin", blank(&self.vin)),
            ("ownerId", self.owner_id == 0),
        ])
    }

    fn reference(&self) -> Option<Reference> {
        Some(Reference {
            collection: Collection::Owners,
            id: self.owner_id,
        })
    }

    fn label(&self) -> &str {
        &self.vehicle_no
    }
}

/// Lifecycle state of a [`Policy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyStatus {
    /// In force.
    #[default]
    Active,
    /// Past its end date.
    Expired,
    /// Terminated before its end date.
    Cancelled,
}

impl PolicyStatus {
    /// The wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The given text is not a policy status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown policy status '{0}' (expected active, expired or cancelled)")]
pub struct UnknownStatusError(pub String);

impl FromStr for PolicyStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(UnknownStatusError(s.to_string())),
        }
    }
}

/// An insurance policy covering a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Policy number, e.g. `POL-001`.
    pub policy_no: String,
    /// First day of cover.
    pub start_date: NaiveDate,
    /// Last day of cover.
    pub end_date: NaiveDate,
    /// Premium amount.
    #[serde(deserialize_with = "number_or_text")]
    pub amount: f64,
    /// Current status.
    pub status: PolicyStatus,
    /// The covered [`Vehicle`].
    pub vehicle_id: Id,
}

impl Entity for Policy {
    const COLLECTION: Collection = Collection::Policies;

    fn missing_fields(&self) -> Vec<&'static str> {
        missing(&[
            ("policyNo", blank(&self.policy_no)),
            ("amount", !self.amount.is_finite()),
            ("vehicleId", self.vehicle_id == 0),
        ])
    }

    fn reference(&self) -> Option<Reference> {
        Some(Reference {
            collection: Collection::Vehicles,
            id: self.vehicle_id,
        })
    }

    fn label(&self) -> &str {
        &self.policy_no
    }
}

/// A reported accident involving a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accident {
    /// The day the accident happened.
    pub accident_date: NaiveDate,
    /// Where it happened.
    pub location: String,
    /// Free-text account.
    pub description: String,
    /// The involved [`Vehicle`].
    pub vehicle_id: Id,
}

impl Entity for Accident {
    const COLLECTION: Collection = Collection::Accidents;

    fn missing_fields(&self) -> Vec<&'static str> {
        missing(&[
            ("location", blank(&self.location)),
            ("description", blank(&self.description)),
            ("vehicleId", self.vehicle_id == 0),
        ])
    }

    fn reference(&self) -> Option<Reference> {
        Some(Reference {
            collection: Collection::Vehicles,
            id: self.vehicle_id,
        })
    }

    fn label(&self) -> &str {
        &self.location
    }
}
