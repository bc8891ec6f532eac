use std::fmt;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::time::sleep;

use crate::{
    endpoints,
    options::{DEFAULT_API_VERSION, DEFAULT_BASE_URL},
    ApiError, ApiResponse, ClientOptions, Request, Result, RetryPolicy,
};

const API_VERSION_HEADER: &str = "x-github-api-version";

/// Issues a single logical request with a one-off GitHub caller.
///
/// Relative request paths resolve against `https://api.github.com`. An empty
/// `token` sends the request unauthenticated.
pub async fn call(request: Request, retry_policy: &RetryPolicy, token: &str) -> Result<ApiResponse> {
    ApiCaller::github(token).call(request, retry_policy).await
}

/// Retrying HTTP caller bound to a base URL and token.
#[derive(Clone)]
pub struct ApiCaller {
    http: reqwest::Client,
    base_url: String,
    authorization: Option<String>,
    options: ClientOptions,
}

impl fmt::Debug for ApiCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCaller")
            .field("base_url", &self.base_url)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .field("options", &self.options)
            .finish()
    }
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

impl ApiCaller {
    /// Creates a caller for `base_url`.
    ///
    /// A bare token is sent as `Authorization: token <token>`; a value that
    /// already names a scheme (`token …`, `Bearer …`) is sent unchanged.
    pub fn new(base_url: impl Into<String>, token: impl AsRef<str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            authorization: token_authorization(token.as_ref()),
            options: ClientOptions::default(),
        }
    }

    /// Creates a caller for `https://api.github.com`.
    pub fn github(token: impl AsRef<str>) -> Self {
        Self::new(DEFAULT_BASE_URL, token)
    }

    /// Creates a caller from environment variables.
    ///
    /// Reads:
    /// - `GITHUB_TOKEN`: access token, required and non-empty
    /// - `GITHUB_API_URL`: base URL, defaults to `https://api.github.com`
    /// - `GITHUB_API_VERSION`: defaults to `2022-11-28`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ghapi_http::ApiCaller;
    ///
    /// let caller = ApiCaller::from_env().expect("GITHUB_TOKEN must be set");
    /// ```
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| {
            ApiError::InvalidInput("missing GITHUB_TOKEN environment variable".to_owned())
        })?;
        if token.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "GITHUB_TOKEN is set but empty".to_owned(),
            ));
        }

        let base_url = non_empty_var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let api_version =
            non_empty_var("GITHUB_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_owned());

        Ok(Self::new(base_url, token).with_options(ClientOptions {
            api_version,
            ..ClientOptions::default()
        }))
    }

    /// Applies timeout, default header and default retry settings.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Replaces the underlying `reqwest` client, e.g. to configure a proxy.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Sends `request` with the default retry policy from [`ClientOptions`].
    pub async fn send(&self, request: impl Into<Request>) -> Result<ApiResponse> {
        self.call(request.into(), &self.options.retry).await
    }

    /// Queries `GET /rate_limit`.
    pub async fn rate_limit(&self) -> Result<ApiResponse> {
        self.send(endpoints::rate_limit()).await
    }

    /// Sends `request`, retrying transient failures according to `retry_policy`.
    ///
    /// 2xx returns immediately. 401/403 and other non-5xx statuses fail
    /// without retrying. 5xx and network failures are retried up to
    /// `max_retries` times with exponential backoff, after which
    /// [`ApiError::RetryExhausted`] is returned.
    pub async fn call(&self, request: Request, retry_policy: &RetryPolicy) -> Result<ApiResponse> {
        if request.url().trim().is_empty() {
            return Err(ApiError::InvalidInput("request URL is empty".to_owned()));
        }
        retry_policy.validate()?;
        self.options.validate()?;

        let url = request.resolve_url(&self.base_url);
        let headers = self.build_headers(&request)?;

        let mut attempt = 0usize;
        let mut total_backoff = Duration::ZERO;
        loop {
            match self.attempt(&request, &url, &headers).await {
                Ok((status, headers, body)) => {
                    return Ok(ApiResponse {
                        status,
                        headers,
                        body,
                        attempts: attempt + 1,
                        total_backoff,
                    });
                }
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => {
                    if attempt >= retry_policy.max_retries {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(
                            "giving up on {} {} after {} attempt(s): {}",
                            request.method(),
                            url,
                            attempt + 1,
                            err
                        );

                        return Err(ApiError::RetryExhausted {
                            attempts: attempt + 1,
                            last: Box::new(err),
                        });
                    }

                    let delay = retry_policy.delay_for(attempt);
                    self.wait_before_retry(delay, attempt, &err).await;
                    total_backoff = total_backoff.saturating_add(delay);
                    attempt += 1;
                }
            }
        }
    }

    /// Performs one HTTP exchange and classifies the outcome.
    async fn attempt(
        &self,
        request: &Request,
        url: &str,
        headers: &HeaderMap,
    ) -> Result<(u16, HeaderMap, Vec<u8>)> {
        let mut builder = self
            .http
            .request(request.method().clone(), url)
            .headers(headers.clone())
            .timeout(Duration::from_millis(self.options.timeout_ms));

        let query = request.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            if err.is_builder() {
                ApiError::InvalidInput(err.to_string())
            } else {
                ApiError::Network(err)
            }
        })?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let body = response.bytes().await.map_err(ApiError::Network)?;

        if status.is_success() {
            return Ok((status.as_u16(), response_headers, body.to_vec()));
        }
        Err(classify_failure(
            status,
            String::from_utf8_lossy(&body).into_owned(),
        ))
    }

    /// Default headers, then the authorization header, then per-request
    /// headers, each later source replacing earlier values of the same name.
    fn build_headers(&self, request: &Request) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        insert_header(&mut headers, header::ACCEPT.as_str(), &self.options.accept)?;
        insert_header(&mut headers, header::USER_AGENT.as_str(), &self.options.user_agent)?;
        if !self.options.api_version.is_empty() {
            insert_header(&mut headers, API_VERSION_HEADER, &self.options.api_version)?;
        }
        if let Some(authorization) = &self.authorization {
            let mut value = HeaderValue::from_str(authorization).map_err(|_| {
                ApiError::InvalidInput("token contains invalid header characters".to_owned())
            })?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        for (name, value) in request.headers() {
            insert_header(&mut headers, name, value)?;
        }
        Ok(headers)
    }

    /// Sleeps before the next attempt without blocking other tasks.
    async fn wait_before_retry(&self, delay: Duration, attempt: usize, reason: &ApiError) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "attempt {} failed ({}), retrying after {} ms",
            attempt,
            reason,
            delay.as_millis()
        );

        #[cfg(not(feature = "tracing"))]
        let _ = (attempt, reason);

        sleep(delay).await;
    }
}

fn classify_failure(status: StatusCode, body: String) -> ApiError {
    let code = status.as_u16();
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Auth {
            status: code,
            message: provider_message(&body)
                .unwrap_or_else(|| "Unauthorized access. Check your token.".to_owned()),
        },
        StatusCode::FORBIDDEN => ApiError::Auth {
            status: code,
            message: provider_message(&body)
                .unwrap_or_else(|| "Forbidden. Check your token's permissions.".to_owned()),
        },
        s if s.is_server_error() => ApiError::Server { status: code, body },
        StatusCode::NOT_FOUND => ApiError::Client {
            status: code,
            message: provider_message(&body).unwrap_or_else(|| "Resource not found.".to_owned()),
        },
        _ => ApiError::Client {
            status: code,
            message: provider_message(&body)
                .unwrap_or_else(|| format!("Unexpected error: {body}")),
        },
    }
}

/// The `message` field GitHub puts in JSON error bodies.
fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderError>(body)
        .ok()
        .map(|err| err.message)
        .filter(|message| !message.trim().is_empty())
}

fn token_authorization(token: &str) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    let has_scheme = ["token ", "bearer "].iter().any(|scheme| {
        trimmed
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });
    if has_scheme {
        Some(trimmed.to_owned())
    } else {
        Some(format!("token {trimmed}"))
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ApiError::InvalidInput(format!("invalid header name '{name}'")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| ApiError::InvalidInput(format!("invalid value for header '{name}'")))?;
    headers.insert(name, value);
    Ok(())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
