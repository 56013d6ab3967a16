use std::sync::{Arc, LazyLock};

use log::{debug, info, warn};
use orchard_model::ApiErrorBody;
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::auth::credentials::Credentials;
use crate::auth::lifecycle::TokenLifecycle;
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, GENERIC_FAILURE_MESSAGE};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

const LOCAL_STORE_FILE: &str = "local.json";
const COOKIE_STORE_FILE: &str = "cookies.json";

static INVALID_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)invalid token").expect("static regex"));

/// Everything about a request except its path
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP verb
    pub method: Method,
    /// JSON body, sent as-is
    pub body: Option<serde_json::Value>,
    /// Merged over the default headers; caller values win
    pub headers: HeaderMap,
    /// Query string pairs, in order
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options for `method` with no body
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    /// Plain GET
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// Plain DELETE
    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// POST with a JSON body
    pub fn post<B: Serialize + ?Sized>(body: &B) -> ClientResult<Self> {
        Self::new(Method::POST).json(body)
    }

    /// PUT with a JSON body
    pub fn put<B: Serialize + ?Sized>(body: &B) -> ClientResult<Self> {
        Self::new(Method::PUT).json(body)
    }

    /// Replace the body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Set a header, replacing any default of the same name
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// A non-success response, reduced to what callers need
#[derive(Debug, Clone)]
pub(crate) struct Failure {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl Failure {
    pub fn message(&self) -> &str {
        self.body.text().unwrap_or(GENERIC_FAILURE_MESSAGE)
    }

    /// The server's way of saying the bearer token is no good
    pub fn is_invalid_token(&self) -> bool {
        self.body.has_invalid_token_code()
            || self
                .body
                .text()
                .is_some_and(|text| INVALID_TOKEN.is_match(text))
    }

    pub fn into_error(self) -> ClientError {
        ClientError::request_failed(Some(self.status.as_u16()), self.body.text())
    }
}

/// Read the error body of a failed response. Non-JSON bodies are used as the
/// message verbatim when short and printable.
pub(crate) async fn read_failure(response: Response) -> Failure {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            debug!("[ApiClient] Failed to read error body ({}): {}", status, e);
            String::new()
        }
    };
    let body = serde_json::from_str::<ApiErrorBody>(&text).unwrap_or_else(|_| {
        let trimmed = text.trim();
        let usable = !trimmed.is_empty()
            && trimmed.len() <= 512
            && !trimmed.starts_with('<')
            && !trimmed.starts_with('{');
        ApiErrorBody {
            message: usable.then(|| trimmed.to_string()),
            ..ApiErrorBody::default()
        }
    });
    Failure { status, body }
}

/// Join `path` onto `base_url`; absolute URLs pass through unchanged
pub fn build_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Deserialize a success body; an empty body decodes as JSON `null`
async fn decode_body<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    let slice: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };
    serde_json::from_slice(slice).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// API client with automatic token renewal
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) http: Client,
    base_url: Arc<str>,
    pub(crate) lifecycle: TokenLifecycle,
    pub(crate) credentials: Credentials,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.credentials.access_token().is_some())
            .field("refreshing", &self.lifecycle.is_refreshing())
            .finish()
    }
}

/// Wires storage, clock and HTTP settings into an [`ApiClient`]
#[derive(Debug)]
pub struct ApiClientBuilder {
    config: ClientConfig,
    session: Option<Arc<dyn KeyValueStore>>,
    local: Option<Arc<dyn KeyValueStore>>,
    cookies: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ApiClientBuilder {
    /// Store for the access token and its expiry
    pub fn session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session = Some(store);
        self
    }

    /// Store for user and settings snapshots
    pub fn local_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.local = Some(store);
        self
    }

    /// Backing store of the cookie jar
    pub fn cookie_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.cookies = Some(store);
        self
    }

    /// Time source for expiry checks
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Persist local snapshots and cookies under the configured data directory
    pub fn file_storage(self) -> ClientResult<Self> {
        let dir = self.config.data_dir()?;
        let local = FileStore::open(dir.join(LOCAL_STORE_FILE))?;
        let cookies = FileStore::open(dir.join(COOKIE_STORE_FILE))?;
        Ok(self
            .local_store(Arc::new(local))
            .cookie_store(Arc::new(cookies)))
    }

    /// Assemble the client; unset stores default to in-memory ones
    pub fn build(self) -> ClientResult<ApiClient> {
        let mut http = Client::builder();
        if let Some(timeout) = self.config.request_timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        let in_memory = || -> Arc<dyn KeyValueStore> { Arc::new(MemoryStore::new()) };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let credentials = Credentials::new(
            self.session.unwrap_or_else(in_memory),
            self.local.unwrap_or_else(in_memory),
            self.cookies.unwrap_or_else(in_memory),
            Arc::clone(&clock),
            self.config.refresh_cookie_ttl,
        );

        let base_url: Arc<str> = Arc::from(self.config.base_url.as_str());
        let lifecycle = TokenLifecycle::new(
            http.clone(),
            Arc::clone(&base_url),
            credentials.clone(),
            clock,
            self.config.refresh_buffer,
        );

        info!("[ApiClient] Creating API client for {}", base_url);

        Ok(ApiClient {
            http,
            base_url,
            lifecycle,
            credentials,
        })
    }
}

impl ApiClient {
    /// Start building a client from `config`
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            session: None,
            local: None,
            cookies: None,
            clock: None,
        }
    }

    /// Client with in-memory stores
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Self::builder(config).build()
    }

    /// Configured API root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`
    pub fn build_url(&self, path: &str) -> String {
        build_url(&self.base_url, path)
    }

    /// Stored tokens and snapshots
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Token renewal state
    pub fn lifecycle(&self) -> &TokenLifecycle {
        &self.lifecycle
    }

    /// See [`TokenLifecycle::ensure_token_valid`]
    pub async fn ensure_token_valid(&self) -> ClientResult<String> {
        self.lifecycle.ensure_token_valid().await
    }

    /// See [`TokenLifecycle::refresh_tokens`]
    pub async fn refresh_tokens(&self) -> ClientResult<()> {
        self.lifecycle.refresh_tokens().await
    }

    fn request(&self, url: &str, options: &RequestOptions, token: Option<&str>) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(options.method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        request.headers(options.headers.clone())
    }

    /// Perform a call with a bearer token, renewing the token as needed.
    ///
    /// When the server answers with an invalid-token error the token is
    /// refreshed once and the call retried once; a second failure is returned
    /// as is.
    pub async fn authenticated_request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let url = self.build_url(path);
        let token = self.lifecycle.ensure_token_valid().await?;

        debug!("[ApiClient] {} {}", options.method, url);
        let response = self.request(&url, &options, Some(token.as_str())).send().await?;
        if response.status().is_success() {
            return decode_body(response).await;
        }

        let failure = read_failure(response).await;
        if !failure.is_invalid_token() {
            return Err(failure.into_error());
        }

        info!("[ApiClient] Token rejected by server, attempting refresh");
        self.lifecycle.refresh_after_rejection(&token).await?;
        let Some(token) = self.credentials.access_token() else {
            return Err(ClientError::InvalidTokenRetryExhausted(
                failure.message().to_string(),
            ));
        };

        info!("[ApiClient] Token refreshed, retrying request");
        let retry = self.request(&url, &options, Some(token.as_str())).send().await?;
        if retry.status().is_success() {
            return decode_body(retry).await;
        }

        let failure = read_failure(retry).await;
        if failure.is_invalid_token() {
            warn!("[ApiClient] Token still rejected after refresh: {}", failure.message());
            return Err(ClientError::InvalidTokenRetryExhausted(
                failure.message().to_string(),
            ));
        }
        Err(failure.into_error())
    }

    /// Call an endpoint that takes no bearer token (login, register, logout)
    pub async fn public_request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let url = self.build_url(path);
        debug!("[ApiClient] {} (public) {}", options.method, url);

        let response = self.request(&url, &options, None).send().await?;
        if response.status().is_success() {
            return decode_body(response).await;
        }
        Err(read_failure(response).await.into_error())
    }

    /// GET request with authentication
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.authenticated_request(path, RequestOptions::get()).await
    }

    /// POST request with authentication
    pub async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<R> {
        self.authenticated_request(path, RequestOptions::post(body)?)
            .await
    }

    /// PUT request with authentication
    pub async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<R> {
        self.authenticated_request(path, RequestOptions::put(body)?)
            .await
    }

    /// DELETE request with authentication
    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.authenticated_request(path, RequestOptions::delete())
            .await
    }
}
