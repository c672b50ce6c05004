use crate::{
    domain::Collection,
    storage::{Method, Request},
};

/// Why a store operation did not succeed.
///
/// Network and server failures are shown to the user the same way, as a
/// banner that stays until the next successful request. Missing fields are
/// caught before anything is sent and leave the banner alone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The request could not be sent, or the response could not be parsed.
    #[error("network failure during {method} {path}: {reason}")]
    NetworkFailure {
        /// Method of the failed request.
        method: Method,
        /// Route of the failed request.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// The server answered with a non-2xx status.
    #[error("server rejected {method} {path} with status {status}")]
    ServerRejected {
        /// Method of the rejected request.
        method: Method,
        /// Route of the rejected request.
        path: String,
        /// The status code. Kept for logging only; all codes are treated alike.
        status: u16,
    },

    /// Required fields were empty, so nothing was sent.
    #[error("cannot submit {}: missing {}", .collection.singular(), .fields.join(", "))]
    MissingFields {
        /// The collection the payload was meant for.
        collection: Collection,
        /// JSON names of the empty fields.
        fields: Vec<&'static str>,
    },
}

impl StoreError {
    pub(crate) fn network(request: &Request, reason: impl Into<String>) -> Self {
        Self::NetworkFailure {
            method: request.method,
            path: request.path.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn rejected(request: &Request, status: u16) -> Self {
        Self::ServerRejected {
            method: request.method,
            path: request.path.clone(),
            status,
        }
    }
}
