//! One-shot HTTP transport.
//!
//! Each request builds a current-thread tokio runtime, drives a hyper client
//! until the reply body is collected or the timer fires, then shuts the
//! runtime down without waiting on anything still in flight. `http` and
//! `https` endpoints are both accepted and redirects are followed, all within
//! the same timeout.

use std::future::Future;
use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::LOCATION;
use hyper::Uri;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::RemoteError;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

type HttpsClient = Client<HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// Sends a script and returns the raw reply body.
pub trait Transport: Send + Sync {
    fn fetch(&self, script: &str) -> Result<String, RemoteError>;
}

/// Blocking HTTP GET bounded by a timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Endpoint with the script as its percent-encoded `script` parameter.
    pub fn request_uri(&self, script: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}script={}",
            self.endpoint,
            separator,
            utf8_percent_encode(script, NON_ALPHANUMERIC)
        )
    }

    fn client() -> HttpsClient {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        Client::builder(TokioExecutor::new()).build(connector)
    }

    async fn get(uri: Uri) -> Result<String, RemoteError> {
        let client = Self::client();
        let mut uri = uri;
        let mut hops = 0;
        let response = loop {
            let response = client
                .get(uri.clone())
                .await
                .map_err(|e| RemoteError::Http(e.to_string()))?;
            let status = response.status();
            if !status.is_redirection() {
                break response;
            }
            let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
            else {
                return Err(RemoteError::Status(status.as_u16()));
            };
            if hops == MAX_REDIRECTS {
                return Err(RemoteError::Http(format!(
                    "more than {MAX_REDIRECTS} redirects"
                )));
            }
            hops += 1;
            let next = redirect_target(&uri, location)?;
            tracing::debug!("{} redirect to {}", status.as_u16(), next);
            uri = next;
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?
            .to_bytes();
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Resolves a `Location` header against the URI that answered with it.
fn redirect_target(base: &Uri, location: &str) -> Result<Uri, RemoteError> {
    let absolute = match (location.parse::<Uri>(), base.scheme_str(), base.authority()) {
        (Ok(target), _, _) if target.scheme().is_some() => return Ok(target),
        (_, Some(scheme), Some(authority)) if location.starts_with('/') => {
            format!("{scheme}://{authority}{location}")
        }
        (_, Some(scheme), Some(authority)) => {
            let dir = base.path().rsplit_once('/').map_or("", |(dir, _)| dir);
            format!("{scheme}://{authority}{dir}/{location}")
        }
        _ => location.to_string(),
    };
    absolute
        .parse::<Uri>()
        .map_err(|e| RemoteError::InvalidUri {
            uri: absolute.clone(),
            reason: e.to_string(),
        })
}

/// Runs `future` on a fresh current-thread runtime, giving up after `timeout`.
///
/// The runtime is shut down without joining its blocking pool, so a name
/// lookup that never returns cannot hold the caller past the bound.
fn run_bounded<T>(
    timeout: Duration,
    future: impl Future<Output = Result<T, RemoteError>>,
) -> Result<T, RemoteError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| RemoteError::Http(format!("failed to start runtime: {e}")))?;

    let result = runtime.block_on(async {
        match tokio::time::timeout(timeout, future).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(timeout)),
        }
    });
    runtime.shutdown_background();
    result
}

impl Transport for HttpTransport {
    fn fetch(&self, script: &str) -> Result<String, RemoteError> {
        let raw = self.request_uri(script);
        let uri = raw.parse::<Uri>().map_err(|e| RemoteError::InvalidUri {
            uri: raw.clone(),
            reason: e.to_string(),
        })?;

        tracing::debug!("GET {}", self.endpoint);
        run_bounded(self.timeout, Self::get(uri))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use ntest::timeout;

    use super::*;

    #[test]
    fn test_script_is_percent_encoded() {
        let transport = HttpTransport::new("http://localhost/sim-script", Duration::from_secs(1));
        let uri = transport.request_uri("query id Alpha Cen\nformat \"%COO(A)\"");
        assert_eq!(
            uri,
            "http://localhost/sim-script?script=query%20id%20Alpha%20Cen%0Aformat%20%22%25COO%28A%29%22"
        );
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn test_existing_query_string_is_extended() {
        let transport = HttpTransport::new("http://localhost/run?mode=text", Duration::from_secs(1));
        assert_eq!(
            transport.request_uri("a;b"),
            "http://localhost/run?mode=text&script=a%3Bb"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_reported() {
        let transport = HttpTransport::new("http://bad host/", Duration::from_secs(1));
        assert!(matches!(
            transport.fetch("query id Vega"),
            Err(RemoteError::InvalidUri { .. })
        ));
    }

    #[test]
    fn test_redirect_target_resolution() {
        let base: Uri = "http://simbad.example.org/simbad/sim-script?script=x"
            .parse()
            .unwrap();
        assert_eq!(
            redirect_target(&base, "https://mirror.example.org/sim-script?script=x")
                .unwrap()
                .to_string(),
            "https://mirror.example.org/sim-script?script=x"
        );
        assert_eq!(
            redirect_target(&base, "/v2/sim-script?script=x").unwrap().to_string(),
            "http://simbad.example.org/v2/sim-script?script=x"
        );
        assert_eq!(
            redirect_target(&base, "sim-script-2?script=x").unwrap().to_string(),
            "http://simbad.example.org/simbad/sim-script-2?script=x"
        );
        assert!(matches!(
            redirect_target(&base, "http://bad host/"),
            Err(RemoteError::InvalidUri { .. })
        ));
    }

    #[timeout(5000)]
    #[test]
    fn test_stuck_blocking_work_does_not_hold_the_caller() {
        let bound = Duration::from_millis(200);
        let started = Instant::now();
        let result: Result<(), RemoteError> = run_bounded(bound, async {
            // stands in for a resolver call that never answers
            let stuck = tokio::task::spawn_blocking(|| {
                std::thread::sleep(Duration::from_secs(30));
            });
            let _ = stuck.await;
            Ok(())
        });
        assert_eq!(result, Err(RemoteError::Timeout(bound)));
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
