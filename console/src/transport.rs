//! Executes core `HttpRequest`s over the network.

use std::time::Duration;

use admin_core::{HttpMethod, HttpRequest, HttpResponse};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{method} {path}: {source}")]
    Request {
        method: HttpMethod,
        path: String,
        #[source]
        source: ureq::Error,
    },
}

/// A blocking HTTP round-trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// ureq-backed transport with a fixed overall deadline per request.
///
/// HTTP error statuses are returned as responses, not errors, so the core
/// normalizer sees every status. No cookie jar is kept between requests.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    fn send(
        &self,
        request: &HttpRequest,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let path = request.path.as_str();
        let headers = &request.headers;
        let body = request.body.as_deref().map(str::as_bytes);
        match (request.method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(path), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(path), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(path), headers).send(body)
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(path), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(path), headers).send(body),
            (HttpMethod::Put, None) => with_headers(self.agent.put(path), headers).send_empty(),
        }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let failed = |source| TransportError::Request {
            method: request.method,
            path: request.path.clone(),
            source,
        };
        let mut response = self.send(&request).map_err(failed)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.body_mut().read_to_string().map_err(failed)?;
        debug!(method = %request.method, path = %request.path, status, "request completed");

        Ok(HttpResponse { status, headers, body })
    }
}
