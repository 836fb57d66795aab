use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::error::{ConfigError, Error, GgusError};

const CORRELATION_HEADER: &str = "x-correlation-id";
const ENDPOINT_PATH: &str = "index.php";

/// HTTP session against the GGUS web frontend.
///
/// The session cookie obtained by [`GgusClient::login`] is kept in the
/// client's cookie jar and replayed on every later request.
#[derive(Clone)]
pub struct GgusClient {
    http: reqwest::Client,
    base: Url,
    jar: Arc<Jar>,
}

impl GgusClient {
    /// Build a `GgusClient` for the given GGUS base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not HTTPS while `insecure_http` is off,
    /// or if the underlying HTTP client fails to build.
    pub fn new(
        base: Url,
        timeout: Duration,
        connect_timeout: Duration,
        insecure_http: bool,
    ) -> Result<Self> {
        if base.scheme() != "https" && !insecure_http {
            return Err(Error::Config(ConfigError::InvalidField {
                field: "ggus.url",
                message: "only https URLs are accepted without --insecure".to_string(),
            }));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/xml, text/xml;q=0.9, */*;q=0.1"),
        );

        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .user_agent(concat!("ggus-watch/", env!("CARGO_PKG_VERSION")));

        if !insecure_http {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|err| GgusError::Client { source: err })?;

        Ok(Self { http, base, jar })
    }

    pub(super) fn endpoint(&self) -> Result<Url> {
        Ok(self.base.join(ENDPOINT_PATH).map_err(GgusError::from)?)
    }

    pub(super) const fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether the jar holds a cookie for the GGUS host.
    pub(super) fn has_session(&self) -> bool {
        self.jar.cookies(&self.base).is_some()
    }

    /// Send one request, tagged with a fresh correlation id. Anything but a
    /// 2xx answer is an error; nothing is retried.
    pub(super) async fn send(&self, action: &'static str, request: RequestBuilder) -> Result<Response> {
        let correlation_id = Uuid::now_v7().to_string();
        let started = Instant::now();

        let response = request
            .header(CORRELATION_HEADER, &correlation_id)
            .send()
            .await
            .map_err(|err| {
                let err = GgusError::from(err);
                warn!(action, %correlation_id, error = %err, "GGUS request failed");
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(action, %correlation_id, %status, "GGUS answered with an error status");
            return Err(GgusError::HttpStatus { status }.into());
        }

        debug!(
            action,
            %correlation_id,
            latency_ms = started.elapsed().as_millis(),
            "GGUS request succeeded"
        );
        Ok(response)
    }
}
