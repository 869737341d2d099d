// crates/bridge-client/src/client.rs
// ============================================================================
// Module: Bridge HTTP Client
// Description: Session-aware JSON client for the Bridge REST API.
// Purpose: Issue typed requests, carry session and identity headers, and
//          record a transcript of every exchange.
// Dependencies: bridge-core, reqwest, serde, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`BridgeClient`] is cheap to clone; clones share the session, client
//! identity, and transcript. Requests carry the client identity as a
//! `User-Agent` and, once signed in, the session token in the
//! `Bridge-Session` header. Calls are never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use bridge_core::ClientInfo;
use bridge_core::SESSION_HEADER;
use bridge_core::UserSessionInfo;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::USER_AGENT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::api::AdminApi;
use crate::api::AuthApi;
use crate::api::ConsentedApi;
use crate::api::SchedulesApi;
use crate::api::SurveysApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transcript::TranscriptEntry;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Typed Bridge API client.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    /// Shared state.
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    http: Client,
    host_url: Url,
    session: Mutex<Option<UserSessionInfo>>,
    client_info: Mutex<ClientInfo>,
    transcript: Mutex<Vec<TranscriptEntry>>,
}

impl BridgeClient {
    /// Builds a client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                host_url: config.host_url,
                session: Mutex::new(None),
                client_info: Mutex::new(config.client_info),
                transcript: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Service root.
    #[must_use]
    pub fn host_url(&self) -> &Url {
        &self.inner.host_url
    }

    /// Current session, if signed in.
    #[must_use]
    pub fn session(&self) -> Option<UserSessionInfo> {
        self.inner.session.lock().ok().and_then(|session| session.clone())
    }

    /// Current session token, if signed in.
    #[must_use]
    pub fn session_token(&self) -> Option<String> {
        self.session().map(|session| session.session_token)
    }

    /// Replaces the stored session.
    pub fn set_session(&self, session: Option<UserSessionInfo>) {
        if let Ok(mut guard) = self.inner.session.lock() {
            *guard = session;
        }
    }

    /// Client identity sent with each request.
    #[must_use]
    pub fn client_info(&self) -> ClientInfo {
        self.inner.client_info.lock().map_or_else(|_| ClientInfo::default(), |info| info.clone())
    }

    /// Replaces the client identity for subsequent requests.
    pub fn set_client_info(&self, client_info: ClientInfo) {
        if let Ok(mut guard) = self.inner.client_info.lock() {
            *guard = client_info;
        }
    }

    /// Snapshot of the exchanges issued so far.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.inner.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Authentication calls.
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Administrative calls.
    #[must_use]
    pub const fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }

    /// Schedule plan calls.
    #[must_use]
    pub const fn schedules(&self) -> SchedulesApi<'_> {
        SchedulesApi::new(self)
    }

    /// Calls for consented participants.
    #[must_use]
    pub const fn consented(&self) -> ConsentedApi<'_> {
        ConsentedApi::new(self)
    }

    /// Survey authoring calls.
    #[must_use]
    pub const fn surveys(&self) -> SurveysApi<'_> {
        SurveysApi::new(self)
    }

    // ------------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------------

    /// Issues a request and decodes the JSON response.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let text = self.execute(method, segments, query, body).await?;
        serde_json::from_str(&text).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<String, ApiError> {
        let url = self.endpoint(segments, query)?;
        let path = url.path().to_string();
        let mut request = self
            .inner
            .http
            .request(method.clone(), url)
            .header(USER_AGENT, self.client_info().user_agent());
        if let Some(token) = self.session_token() {
            request = request.header(SESSION_HEADER, token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let error = ApiError::Transport(err.to_string());
                tracing::warn!(method = %method, path = %path, error = %error, "bridge request failed");
                self.record(&method, path, None, body, String::new(), Some(error.to_string()));
                return Err(error);
            }
        };
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|err| ApiError::Transport(err.to_string()))?;
        tracing::debug!(method = %method, path = %path, status, "bridge request");
        let error = if (200 .. 300).contains(&status) {
            None
        } else {
            Some(ApiError::from_response(status, &text))
        };
        self.record(&method, path, Some(status), body, text.clone(), error.as_ref().map(ToString::to_string));
        match error {
            Some(error) => Err(error),
            None => Ok(text),
        }
    }

    /// Resolves path segments and query pairs against the host URL.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.host_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidRequest("host url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn record(
        &self,
        method: &Method,
        path: String,
        status: Option<u16>,
        request: Option<Value>,
        response: String,
        error: Option<String>,
    ) {
        let Ok(mut guard) = self.inner.transcript.lock() else {
            return;
        };
        let sequence = u64::try_from(guard.len()).unwrap_or(u64::MAX).saturating_add(1);
        guard.push(TranscriptEntry {
            sequence,
            method: method.to_string(),
            path,
            status,
            request: request.unwrap_or(Value::Null),
            response: serde_json::from_str(&response).unwrap_or(Value::Null),
            error,
        });
    }
}

/// Serializes a request body.
pub(crate) fn body<T: Serialize + ?Sized>(value: &T) -> Result<Option<Value>, ApiError> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|err| ApiError::InvalidRequest(format!("request serialization failed: {err}")))
}
