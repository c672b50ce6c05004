use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::Id;

/// One of the record collections exposed by the backend.
///
/// The set is closed: every route, cache slot and view is keyed by one of
/// these variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Vehicle owners.
    Owners,
    /// Registered vehicles, each belonging to an owner.
    Vehicles,
    /// Insurance policies, each covering a vehicle.
    Policies,
    /// Reported accidents, each involving a vehicle.
    Accidents,
}

impl Collection {
    /// Every collection, in display order.
    pub const ALL: [Self; 4] = [Self::Owners, Self::Vehicles, Self::Policies, Self::Accidents];

    /// The plural name used in routes, e.g. `owners`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owners => "owners",
            Self::Vehicles => "vehicles",
            Self::Policies => "policies",
            Self::Accidents => "accidents",
        }
    }

    /// The singular noun for a single record, e.g. `owner`.
    #[must_use]
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Owners => "owner",
            Self::Vehicles => "vehicle",
            Self::Policies => "policy",
            Self::Accidents => "accident",
        }
    }

    /// The route of the whole collection, e.g. `/owners/`.
    #[must_use]
    pub fn list_path(self) -> String {
        format!("/{}/", self.as_str())
    }

    /// The route of a single record, e.g. `/owners/3/`.
    #[must_use]
    pub fn record_path(self, id: Id) -> String {
        format!("/{}/{id}/", self.as_str())
    }

    /// Matches a route segment exactly against the plural names.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == segment)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The given name is not one of the known collections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection '{0}' (expected owners, vehicles, policies or accidents)")]
pub struct UnknownCollectionError(pub String);

impl FromStr for Collection {
    type Err = UnknownCollectionError;

    /// Accepts singular or plural names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower || c.singular() == lower)
            .ok_or_else(|| UnknownCollectionError(s.to_string()))
    }
}
