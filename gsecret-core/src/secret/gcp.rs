//! Google Cloud Secret Manager backend
//!
//! Native REST implementation of [`RemoteSecretStore`] against the Secret
//! Manager v1 API (`projects/{project}/secrets`). Every failure short of a
//! definitive 404 is reported as [`RemoteResult::Unavailable`], except a 409
//! on create, which means the identifier is taken.
//!
//! Identifiers and version selectors outside `[A-Za-z0-9_-]` never reach the
//! network; they are reported as [`RemoteResult::NotFound`].
//!
//! # Authentication
//!
//! An OAuth access token is taken, in order, from:
//!
//! 1. the `remote.access_token` setting
//! 2. the `GOOGLE_OAUTH_ACCESS_TOKEN` environment variable
//! 3. `gcloud auth print-access-token`
//!
//! The token is fetched once per process.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::RemoteSettings;
use crate::error::{SecretError, SecretResult};
use crate::models::{SecretVersion, is_valid_secret_id};

use super::remote::{CreateStatus, RemoteResult, RemoteSecretStore};

/// Environment variable holding a ready-made access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const PAGE_SIZE: u32 = 250;

/// Where the access token comes from
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// A fixed token
    Static(SecretString),
    /// `gcloud auth print-access-token`
    Gcloud,
}

impl TokenSource {
    /// Chooses a source from settings and the environment
    #[must_use]
    pub fn from_settings(settings: &RemoteSettings) -> Self {
        settings
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok().filter(|t| !t.trim().is_empty()))
            .map_or(Self::Gcloud, |t| Self::Static(SecretString::from(t)))
    }

    async fn fetch(&self) -> Result<SecretString, String> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Gcloud => {
                let output = Command::new("gcloud")
                    .args(["auth", "print-access-token"])
                    .stdin(Stdio::null())
                    .output()
                    .await
                    .map_err(|e| format!("Failed to run gcloud: {e}"))?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(format!("gcloud auth failed: {}", stderr.trim()));
                }

                let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if token.is_empty() {
                    return Err("gcloud returned an empty access token".into());
                }
                Ok(SecretString::from(token))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSecretsResponse {
    #[serde(default)]
    secrets: Vec<SecretResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecretResource {
    name: String,
}

#[derive(Debug, Serialize)]
struct CreateSecretRequest {
    replication: Replication,
}

#[derive(Debug, Serialize)]
struct Replication {
    automatic: AutomaticReplication,
}

#[derive(Debug, Serialize)]
struct AutomaticReplication {}

#[derive(Debug, Serialize)]
struct AddVersionRequest {
    payload: SecretPayload,
}

#[derive(Debug, Serialize, Deserialize)]
struct SecretPayload {
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct SecretVersionResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: Option<SecretPayload>,
}

/// Secret Manager REST client bound to one project
pub struct GcpSecretManager {
    client: Client,
    endpoint: String,
    project_id: String,
    token_source: TokenSource,
    token: OnceCell<Result<SecretString, String>>,
}

impl std::fmt::Debug for GcpSecretManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpSecretManager")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl GcpSecretManager {
    /// Creates a client for `project_id`
    ///
    /// # Errors
    /// Returns `SecretError::RemoteClient` if the HTTP client cannot be built.
    pub fn new(
        project_id: impl Into<String>,
        settings: &RemoteSettings,
        token_source: TokenSource,
    ) -> SecretResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| SecretError::RemoteClient(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            token_source,
            token: OnceCell::new(),
        })
    }

    fn secrets_url(&self) -> String {
        format!("{}/projects/{}/secrets", self.endpoint, self.project_id)
    }

    /// URL of one secret, or `None` if `id` is not a plain path segment
    fn secret_url(&self, id: &str) -> Option<String> {
        if is_valid_secret_id(id) {
            Some(format!("{}/{id}", self.secrets_url()))
        } else {
            debug!(secret_id = %id, "Rejected identifier outside [A-Za-z0-9_-]");
            None
        }
    }

    /// Reduces `projects/{p}/secrets/{id}` to `{id}`
    fn short_name(name: &str) -> &str {
        name.rsplit_once("/secrets/").map_or(name, |(_, id)| id)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, String> {
        let token = self
            .token
            .get_or_init(|| self.token_source.fetch())
            .await
            .clone()?;
        Ok(request.bearer_auth(token.expose_secret()))
    }

    /// Authorizes and sends a request; any HTTP status counts as an answer
    async fn execute(&self, request: RequestBuilder) -> Result<Response, String> {
        let request = self.authorize(request).await.map_err(|reason| {
            warn!(error = %reason, "No access token for remote store");
            reason
        })?;

        request.send().await.map_err(|e| {
            warn!(error = %e, "Remote store unreachable");
            e.to_string()
        })
    }

    async fn classify(response: Response) -> RemoteResult<Response> {
        let status = response.status();
        if status.is_success() {
            return RemoteResult::Found(response);
        }
        if status == StatusCode::NOT_FOUND {
            return RemoteResult::NotFound;
        }

        let body = response.text().await.unwrap_or_default();
        warn!(%status, "Remote store rejected request");
        debug!(body = %body, "Remote store error body");
        RemoteResult::Unavailable(format!("HTTP {status}"))
    }

    /// Sends a request, classifying the response
    async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        match self.execute(request).await {
            Ok(response) => Self::classify(response).await,
            Err(reason) => RemoteResult::Unavailable(reason),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> RemoteResult<T> {
        match self.send(request).await {
            RemoteResult::Found(response) => match response.json::<T>().await {
                Ok(body) => RemoteResult::Found(body),
                Err(e) => RemoteResult::Unavailable(format!("Malformed response: {e}")),
            },
            RemoteResult::NotFound => RemoteResult::NotFound,
            RemoteResult::Unavailable(reason) => RemoteResult::Unavailable(reason),
        }
    }
}

#[async_trait]
impl RemoteSecretStore for GcpSecretManager {
    fn store_id(&self) -> &'static str {
        "gcp-secret-manager"
    }

    async fn list(&self) -> RemoteResult<Vec<String>> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.secrets_url())
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page = match self.send_json::<ListSecretsResponse>(request).await {
                RemoteResult::Found(page) => page,
                RemoteResult::NotFound => {
                    return RemoteResult::Unavailable(format!(
                        "project {} not found",
                        self.project_id
                    ));
                }
                RemoteResult::Unavailable(reason) => return RemoteResult::Unavailable(reason),
            };

            ids.extend(
                page.secrets
                    .iter()
                    .map(|s| Self::short_name(&s.name).to_string()),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!(count = ids.len(), "Listed remote secrets");
        RemoteResult::Found(ids)
    }

    async fn exists(&self, id: &str) -> RemoteResult<()> {
        let Some(url) = self.secret_url(id) else {
            return RemoteResult::NotFound;
        };
        self.send(self.client.get(url)).await.map(|_| ())
    }

    async fn create(&self, id: &str) -> RemoteResult<CreateStatus> {
        if !is_valid_secret_id(id) {
            return RemoteResult::NotFound;
        }
        let body = CreateSecretRequest {
            replication: Replication {
                automatic: AutomaticReplication {},
            },
        };
        let request = self
            .client
            .post(self.secrets_url())
            .query(&[("secretId", id)])
            .json(&body);

        match self.execute(request).await {
            Ok(response) if response.status() == StatusCode::CONFLICT => {
                debug!(secret_id = %id, "Remote store reports the identifier as taken");
                RemoteResult::Found(CreateStatus::AlreadyExists)
            }
            Ok(response) => Self::classify(response).await.map(|_| CreateStatus::Created),
            Err(reason) => RemoteResult::Unavailable(reason),
        }
    }

    async fn add_version(&self, id: &str, value: &str) -> RemoteResult<String> {
        let Some(url) = self.secret_url(id) else {
            return RemoteResult::NotFound;
        };
        let body = AddVersionRequest {
            payload: SecretPayload {
                data: BASE64.encode(value.as_bytes()),
            },
        };
        let request = self
            .client
            .post(format!("{url}:addVersion"))
            .json(&body);
        self.send_json::<SecretVersionResource>(request)
            .await
            .map(|v| v.name)
    }

    async fn access_version(&self, id: &str, version: &SecretVersion) -> RemoteResult<String> {
        let Some(secret_url) = self.secret_url(id).filter(|_| version.is_valid()) else {
            return RemoteResult::NotFound;
        };
        let url = format!("{secret_url}/versions/{version}:access");
        let response = match self
            .send_json::<AccessSecretVersionResponse>(self.client.get(url))
            .await
        {
            RemoteResult::Found(response) => response,
            RemoteResult::NotFound => return RemoteResult::NotFound,
            RemoteResult::Unavailable(reason) => return RemoteResult::Unavailable(reason),
        };

        let Some(payload) = response.payload.filter(|p| !p.data.is_empty()) else {
            return RemoteResult::NotFound;
        };

        match BASE64.decode(payload.data.as_bytes()) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(value) if !value.is_empty() => RemoteResult::Found(value),
                Ok(_) => RemoteResult::NotFound,
                Err(e) => RemoteResult::Unavailable(format!("Payload is not UTF-8: {e}")),
            },
            Err(e) => RemoteResult::Unavailable(format!("Payload is not base64: {e}")),
        }
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        let Some(url) = self.secret_url(id) else {
            return RemoteResult::NotFound;
        };
        self.send(self.client.delete(url)).await.map(|_| ())
    }
}
