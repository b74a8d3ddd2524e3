// API client module: a small blocking HTTP client for the prime generation
// service. Each remote operation is one round trip and returns a
// `ClientError` instead of printing; the polling helpers build on `status`.
//
// Endpoints:
// - POST /new          create a generation request
// - GET  /status/{id}  progress of a request
// - GET  /result/{id}  primes generated so far
// - GET  /             health check

use crate::config::{ClientConfig, PollPolicy};
use crate::error::{ClientError, ConfigError};
use crate::poll::{poll_until_complete, Clock, Progress, SystemClock, WaitOutcome};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Opaque identifier of a generation job, exactly as the server issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        RequestId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /new`. Field names are the ones the server expects.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRequest {
    pub cantidad: u32,
    pub digitos: u32,
}

#[derive(Deserialize, Debug)]
struct NewResponse {
    id: String,
}

/// One read of a job's progress from `GET /status/{id}`.
///
/// `cantidad` and `generados` are required; `id` and `digitos` are echoed
/// by the server and kept only for display. Anything else is ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub cantidad: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digitos: Option<u32>,
    pub generados: u64,
}

/// Primes returned by `GET /result/{id}`, passed through verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    pub id: String,
    pub primos: Vec<String>,
}

/// Body of `GET /`.
#[derive(Deserialize, Debug)]
struct HealthBody {
    status: String,
}

/// Error payload the service attaches to non-200 answers.
#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: String,
}

/// Blocking client for the prime generation service. Holds one reqwest
/// client so connections are pooled across calls.
#[derive(Clone)]
pub struct PrimesClient {
    client: Client,
    base_url: Url,
}

impl PrimesClient {
    /// Build a client from an explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::BaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::BaseUrl {
                url: config.base_url,
                reason: "url cannot carry a path".into(),
            });
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        debug!(base_url = %base_url, timeout = ?config.timeout, "built primes client");
        Ok(PrimesClient { client, base_url })
    }

    /// Build a client configured by `PRIMES_API_URL` and
    /// `PRIMES_HTTP_TIMEOUT_SECS`. See `ClientConfig::from_env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base url. The identifier goes in as a
    /// single escaped segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Submit a generation request for `quantity` primes of `digits` digits.
    /// Only HTTP 200 counts as accepted.
    pub fn create(&self, quantity: u32, digits: u32) -> Result<RequestId, ClientError> {
        let url = self.endpoint(&["new"]);
        let payload = NewRequest {
            cantidad: quantity,
            digitos: digits,
        };
        debug!(%url, quantity, digits, "POST new request");
        let res = self.client.post(url).json(&payload).send()?;
        let status = res.status();
        let body = res.text()?;
        if status != StatusCode::OK {
            warn!(%status, "create request rejected");
            return Err(server_error(status, &body));
        }
        let resp: NewResponse = decode("create", &body)?;
        info!(id = %resp.id, quantity, digits, "request created");
        Ok(RequestId(resp.id))
    }

    /// Fetch the current progress of a request.
    pub fn status(&self, id: &RequestId) -> Result<StatusSnapshot, ClientError> {
        self.lookup("status", id)
    }

    /// Fetch the primes generated for a request. Calling this before the job
    /// completes returns whatever the server has so far.
    pub fn result(&self, id: &RequestId) -> Result<ResultSet, ClientError> {
        self.lookup("result", id)
    }

    /// Ping the service root. Healthy means HTTP 200 with `{"status":"ok"}`.
    pub fn health(&self) -> Result<(), ClientError> {
        let url = self.endpoint(&[]);
        debug!(%url, "GET health");
        let res = self.client.get(url).send()?;
        let status = res.status();
        let body = res.text()?;
        if status != StatusCode::OK {
            return Err(server_error(status, &body));
        }
        let health: HealthBody = decode("health", &body)?;
        if health.status != "ok" {
            return Err(ClientError::Server {
                status,
                message: format!("service reports status {:?}", health.status),
            });
        }
        Ok(())
    }

    /// Shared GET for the per-identifier endpoints: 200 decodes, 404 is
    /// `NotFound`, anything else is a server error.
    fn lookup<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        id: &RequestId,
    ) -> Result<T, ClientError> {
        let url = self.endpoint(&[endpoint, id.as_str()]);
        debug!(%url, "GET {endpoint}");
        let res = self.client.get(url).send()?;
        let status = res.status();
        let body = res.text()?;
        match status {
            StatusCode::OK => decode(endpoint, &body),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound {
                id: id.as_str().to_string(),
            }),
            _ => Err(server_error(status, &body)),
        }
    }

    /// Poll `status` until the job completes or `policy.max_wait` runs out.
    /// Returns false on timeout and on the first failed status call.
    pub fn wait_for_completion(&self, id: &RequestId, policy: PollPolicy) -> bool {
        self.poll_until_complete(id, policy, &SystemClock, |_| {})
            .is_completed()
    }

    /// Same loop as `wait_for_completion`, reporting why it stopped.
    pub fn poll_until_complete<C, O>(
        &self,
        id: &RequestId,
        policy: PollPolicy,
        clock: &C,
        observer: O,
    ) -> WaitOutcome
    where
        C: Clock + ?Sized,
        O: FnMut(&Progress),
    {
        poll_until_complete(|| self.status(id), policy, clock, observer)
    }
}

fn decode<T: DeserializeOwned>(context: &'static str, body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|source| ClientError::Decode { context, source })
}

/// Prefer the service's `{"error": ...}` message, fall back to the raw body.
fn server_error(status: StatusCode, body: &str) -> ClientError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.trim().to_string(),
    };
    ClientError::Server { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> PrimesClient {
        PrimesClient::new(ClientConfig::default().with_base_url(base)).unwrap()
    }

    #[test]
    fn endpoints_join_onto_base() {
        let c = client("http://localhost:8000");
        assert_eq!(c.endpoint(&["new"]).as_str(), "http://localhost:8000/new");
        assert_eq!(
            c.endpoint(&["status", "abc-123"]).as_str(),
            "http://localhost:8000/status/abc-123"
        );
        assert_eq!(c.endpoint(&[]).as_str(), "http://localhost:8000/");

        let c = client("http://gateway/primes/");
        assert_eq!(
            c.endpoint(&["result", "x"]).as_str(),
            "http://gateway/primes/result/x"
        );
    }

    #[test]
    fn identifier_is_passed_through_verbatim() {
        let id = RequestId::new(" 42-abc ");
        assert_eq!(id.as_str(), " 42-abc ");
        assert_eq!(id.to_string(), " 42-abc ");
    }

    #[test]
    fn identifier_stays_one_segment() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.endpoint(&["status", "a/b c"]).as_str(),
            "http://localhost:8000/status/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        let err = PrimesClient::new(ClientConfig::default().with_base_url("not a url"))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::BaseUrl { .. }));

        let err = PrimesClient::new(ClientConfig::default().with_base_url("mailto:x@y"))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::BaseUrl { .. }));
    }

    #[test]
    fn server_error_uses_error_field() {
        let err = server_error(
            StatusCode::BAD_REQUEST,
            "{\"error\":\"cantidad debe estar entre 1 y 1000\"}\n",
        );
        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "cantidad debe estar entre 1 y 1000");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = server_error(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert!(matches!(err, ClientError::Server { message, .. } if message == "upstream down"));
    }

    #[test]
    fn snapshot_ignores_unknown_fields_and_requires_counts() {
        let snap: StatusSnapshot =
            decode("status", r#"{"id":"j1","cantidad":3,"digitos":12,"generados":1,"extra":true}"#)
                .unwrap();
        assert_eq!(snap.cantidad, 3);
        assert_eq!(snap.generados, 1);
        assert_eq!(snap.digitos, Some(12));

        let snap: StatusSnapshot = decode("status", r#"{"cantidad":3,"generados":0}"#).unwrap();
        assert_eq!(snap.id, None);

        let err = decode::<StatusSnapshot>("status", r#"{"cantidad":3}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode { context: "status", .. }));
    }
}
