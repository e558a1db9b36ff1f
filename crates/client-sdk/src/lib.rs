use std::future::Future;

use common::{
    ConfigUpdate, EntriesReply, HealthReport, KeysRequest, MsetRequest, MutationReply, SetRequest,
    ValueReply,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// A call that never produced a usable reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The request could not be sent or the response could not be read.
    Unreachable(String),
    /// The service answered with a body that is not JSON.
    InvalidBody(String),
    /// No request could be built, so nothing was sent.
    InvalidRequest(String),
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable(msg) => write!(f, "{msg}"),
            Self::InvalidBody(msg) => write!(f, "invalid response body: {msg}"),
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
        }
    }
}

impl std::error::Error for CallError {}

pub type CallResult<T> = std::result::Result<T, CallError>;

/// The key-value service's HTTP API, one method per endpoint.
pub trait KvApi: Send + Sync + 'static {
    fn health(&self) -> impl Future<Output = CallResult<HealthReport>> + Send;

    fn set(&self, request: &SetRequest) -> impl Future<Output = CallResult<MutationReply>> + Send;

    fn get(&self, key: &str) -> impl Future<Output = CallResult<ValueReply>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = CallResult<MutationReply>> + Send;

    fn mset(&self, request: &MsetRequest)
    -> impl Future<Output = CallResult<MutationReply>> + Send;

    fn mget(&self, request: &KeysRequest) -> impl Future<Output = CallResult<EntriesReply>> + Send;

    fn mdelete(
        &self,
        request: &KeysRequest,
    ) -> impl Future<Output = CallResult<MutationReply>> + Send;

    fn scan(&self, prefix: &str) -> impl Future<Output = CallResult<EntriesReply>> + Send;

    fn config(&self) -> impl Future<Output = CallResult<Value>> + Send;

    fn update_config(
        &self,
        update: &ConfigUpdate,
    ) -> impl Future<Output = CallResult<MutationReply>> + Send;
}

#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    server_base_url: String,
}

impl ServiceClient {
    pub fn new(server_base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            server_base_url: server_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.server_base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_base_url, path)
    }

    /// URL for `{path}/{key}` with the key encoded as a single path segment.
    ///
    /// `.` and `..` are refused: URL parsing resolves them, and their
    /// percent-encoded forms, as dot segments, so they cannot name a key.
    fn key_url(&self, path: &str, key: &str) -> CallResult<Url> {
        if key == "." || key == ".." {
            return Err(CallError::InvalidRequest(format!(
                "key '{key}' cannot be addressed in a url path"
            )));
        }
        let mut url = Url::parse(&self.url(path))
            .map_err(|err| CallError::InvalidRequest(format!("invalid service url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                CallError::InvalidRequest("service url cannot carry a path".to_string())
            })?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }

    /// Sends the request and decodes the JSON body whatever the status code:
    /// the service reports domain failures as `{error}` bodies on 4xx/5xx.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> CallResult<T> {
        let response = request
            .send()
            .await
            .map_err(|err| CallError::Unreachable(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| CallError::Unreachable(err.to_string()))?;
        debug!(%status, body_len = body.len(), "service replied");

        serde_json::from_slice(&body).map_err(|err| CallError::InvalidBody(err.to_string()))
    }
}

impl KvApi for ServiceClient {
    async fn health(&self) -> CallResult<HealthReport> {
        self.call(self.http.get(self.url("/health"))).await
    }

    async fn set(&self, request: &SetRequest) -> CallResult<MutationReply> {
        self.call(self.http.post(self.url("/api/v1/set")).json(request))
            .await
    }

    async fn get(&self, key: &str) -> CallResult<ValueReply> {
        let url = self.key_url("/api/v1/get", key)?;
        self.call(self.http.get(url)).await
    }

    async fn delete(&self, key: &str) -> CallResult<MutationReply> {
        let url = self.key_url("/api/v1/delete", key)?;
        self.call(self.http.delete(url)).await
    }

    async fn mset(&self, request: &MsetRequest) -> CallResult<MutationReply> {
        self.call(self.http.post(self.url("/api/v1/mset")).json(request))
            .await
    }

    async fn mget(&self, request: &KeysRequest) -> CallResult<EntriesReply> {
        self.call(self.http.post(self.url("/api/v1/mget")).json(request))
            .await
    }

    async fn mdelete(&self, request: &KeysRequest) -> CallResult<MutationReply> {
        self.call(self.http.post(self.url("/api/v1/mdelete")).json(request))
            .await
    }

    async fn scan(&self, prefix: &str) -> CallResult<EntriesReply> {
        self.call(
            self.http
                .get(self.url("/api/v1/scan"))
                .query(&[("prefix", prefix)]),
        )
        .await
    }

    async fn config(&self) -> CallResult<Value> {
        self.call(self.http.get(self.url("/api/v1/config"))).await
    }

    async fn update_config(&self, update: &ConfigUpdate) -> CallResult<MutationReply> {
        self.call(self.http.post(self.url("/api/v1/config")).json(update))
            .await
    }
}
