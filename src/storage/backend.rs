//! The transport seam between the store and the records API.
//!
//! A [`Backend`] only moves requests and responses. Interpreting status
//! codes and decoding bodies into typed records is the store's job.

use std::fmt;

use serde_json::Value;

/// HTTP methods used by the records API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a collection or record.
    Get,
    /// Create a record.
    Post,
    /// Replace a record.
    Put,
    /// Remove a record.
    Delete,
}

impl Method {
    /// The method name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request against a route relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,
    /// Route such as `/owners/` or `/owners/3/`.
    pub path: String,
    /// JSON payload, if any.
    pub body: Option<Value>,
}

impl Request {
    /// A request without a body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    /// A `GET` without a body.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// A `POST` carrying a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    /// A `PUT` carrying a JSON body.
    #[must_use]
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    /// A `DELETE` without a body.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// The status and (possibly absent) JSON body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body. `None` when the body was empty.
    pub body: Option<Value>,
}

impl Response {
    /// A response without a body.
    #[must_use]
    pub const fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    /// A response carrying a JSON body.
    #[must_use]
    pub const fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// The request could not be sent, or its response could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Wraps a description of what went wrong.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Something that can carry a [`Request`] to the records API.
pub trait Backend {
    /// Sends the request and returns whatever the server answered.
    ///
    /// Non-2xx statuses are returned as ordinary responses.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request could not be sent or the
    /// response body was not valid JSON.
    fn execute(&mut self, request: &Request) -> Result<Response, TransportError>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn execute(&mut self, request: &Request) -> Result<Response, TransportError> {
        (**self).execute(request)
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn execute(&mut self, request: &Request) -> Result<Response, TransportError> {
        (**self).execute(request)
    }
}
