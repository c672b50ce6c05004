use tracing::instrument;

use crate::{
    domain::Config,
    storage::backend::{Backend, Request, Response, TransportError},
};

/// Talks to the records API over HTTP.
///
/// Requests run to completion: there is no timeout policy and no
/// cancellation.
pub struct HttpBackend {
    agent: ureq::Agent,
    /// Base URL without a trailing slash.
    base_url: String,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    /// Creates a backend rooted at the given base URL, e.g.
    /// `http://localhost:8000/api`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("insure/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a backend for the API configured in `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url())
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The absolute URL of a route.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Backend for HttpBackend {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    fn execute(&mut self, request: &Request) -> Result<Response, TransportError> {
        let url = self.url(&request.path);
        let call = self
            .agent
            .request(request.method.as_str(), &url)
            .set("Accept", "application/json");

        let result = match &request.body {
            Some(body) => call
                .set("Content-Type", "application/json")
                .send_json(body),
            None => call.call(),
        };

        match result {
            Ok(response) => read_response(response),
            Err(ureq::Error::Status(status, response)) => {
                // The body of a rejection carries no meaning for callers.
                let detail = response.into_string().unwrap_or_default();
                tracing::debug!(status, %detail, "server rejected request");
                Ok(Response::empty(status))
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(TransportError::new(transport.to_string()))
            }
        }
    }
}

fn read_response(response: ureq::Response) -> Result<Response, TransportError> {
    let status = response.status();
    let text = response
        .into_string()
        .map_err(|e| TransportError::new(format!("failed to read response body: {e}")))?;
    parse_body(status, &text)
}

/// Parses a response body, treating an empty body as absent.
fn parse_body(status: u16, text: &str) -> Result<Response, TransportError> {
    if text.trim().is_empty() {
        return Ok(Response::empty(status));
    }
    serde_json::from_str(text)
        .map(|body| Response::json(status, body))
        .map_err(|e| TransportError::new(format!("response is not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test_case("http://localhost:8000/api", "/owners/", "http://localhost:8000/api/owners/"; "plain base")]
    #[test_case("http://localhost:8000/api/", "/owners/", "http://localhost:8000/api/owners/"; "base with trailing slash")]
    #[test_case("https://records.example.test", "/policies/2/", "https://records.example.test/policies/2/"; "record route")]
    fn joins_base_url_and_route(base: &str, path: &str, expected: &str) {
        assert_eq!(HttpBackend::new(base).url(path), expected);
    }

    #[test]
    fn uses_configured_api_url() {
        let backend = HttpBackend::from_config(&Config::default());
        assert_eq!(backend.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn empty_body_is_absent() {
        assert_eq!(parse_body(204, "").unwrap(), Response::empty(204));
        assert_eq!(parse_body(200, "  \n").unwrap(), Response::empty(200));
    }

    #[test]
    fn json_body_is_parsed() {
        let response = parse_body(200, r#"[{"id": 1}]"#).unwrap();
        assert_eq!(response, Response::json(200, json!([{"id": 1}])));
    }

    #[test]
    fn malformed_body_is_a_transport_error() {
        let error = parse_body(200, "<html>gateway</html>").unwrap_err();
        assert!(error.0.starts_with("response is not valid JSON"));
    }
}
