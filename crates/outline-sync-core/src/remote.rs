//! Outline API client
//!
//! Thin blocking wrapper over the three Outline endpoints the sync needs.
//! Every call is `POST <api_url>/<endpoint>` with a JSON body and a bearer
//! token. A call succeeds only when the HTTP status is 2xx and the decoded
//! payload's `ok` field is absent or truthy.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::{SyncError, SyncResult};

const COLLECTIONS_CREATE: &str = "collections.create";
const DOCUMENTS_CREATE: &str = "documents.create";
const DOCUMENTS_UPDATE: &str = "documents.update";

/// Remote document service operations used by the reconciler
pub trait DocumentService {
    /// Create a collection and return its id
    fn create_collection(&self, name: &str) -> SyncResult<String>;

    /// Create and publish a document, returning its id
    fn create_document(
        &self,
        collection_id: &str,
        title: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> SyncResult<String>;

    /// Replace the title and text of an existing document and publish it
    fn update_document(
        &self,
        document_id: &str,
        title: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> SyncResult<()>;
}

/// Outline response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default = "default_ok")]
    ok: Value,
    #[serde(default)]
    data: Option<Value>,
}

fn default_ok() -> Value {
    Value::Bool(true)
}

impl ApiResponse {
    /// `ok` that is false, null, zero or empty marks a failed call
    fn is_failure(&self) -> bool {
        match &self.ok {
            Value::Null => true,
            Value::Bool(ok) => !ok,
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => fields.is_empty(),
        }
    }

    /// Extract `data.id` from a creation response
    fn created_id(&self, operation: &str, raw: &str) -> SyncResult<String> {
        self.data
            .as_ref()
            .and_then(|data| data.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                SyncError::remote(operation, format!("response missing data.id: {}", raw))
            })
    }
}

/// HTTP client for the Outline API
pub struct OutlineClient {
    http: reqwest::blocking::Client,
    api_url: String,
    token: String,
}

impl OutlineClient {
    /// Create a client for the given API base URL and bearer token
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> SyncResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("outline-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::remote("client", e.to_string()))?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
        })
    }

    /// Get the full URL for an endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), endpoint)
    }

    /// POST a JSON payload and validate the response envelope
    fn request(&self, endpoint: &str, payload: &Value) -> SyncResult<(ApiResponse, String)> {
        let url = self.endpoint_url(endpoint);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .map_err(|e| SyncError::remote(endpoint, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SyncError::remote(endpoint, e.to_string()))?;

        if !status.is_success() {
            return Err(SyncError::remote(endpoint, body));
        }

        let decoded: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            SyncError::remote(endpoint, format!("invalid JSON response ({}): {}", e, body))
        })?;

        if decoded.is_failure() {
            return Err(SyncError::remote(
                endpoint,
                format!("responded with failure: {}", body),
            ));
        }

        Ok((decoded, body))
    }
}

impl DocumentService for OutlineClient {
    fn create_collection(&self, name: &str) -> SyncResult<String> {
        let (response, raw) = self.request(COLLECTIONS_CREATE, &json!({ "name": name }))?;
        response.created_id(COLLECTIONS_CREATE, &raw)
    }

    fn create_document(
        &self,
        collection_id: &str,
        title: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> SyncResult<String> {
        let mut payload = document_payload(title, text, parent_id);
        payload.insert("collectionId".to_string(), json!(collection_id));

        let (response, raw) = self.request(DOCUMENTS_CREATE, &Value::Object(payload))?;
        response.created_id(DOCUMENTS_CREATE, &raw)
    }

    fn update_document(
        &self,
        document_id: &str,
        title: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> SyncResult<()> {
        let mut payload = document_payload(title, text, parent_id);
        payload.insert("id".to_string(), json!(document_id));

        self.request(DOCUMENTS_UPDATE, &Value::Object(payload))?;
        Ok(())
    }
}

/// Fields shared by create and update; documents are always published
fn document_payload(title: &str, text: &str, parent_id: Option<&str>) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("title".to_string(), json!(title));
    payload.insert("text".to_string(), json!(text));
    payload.insert("publish".to_string(), json!(true));
    if let Some(parent_id) = parent_id {
        payload.insert("parentDocumentId".to_string(), json!(parent_id));
    }
    payload
}
