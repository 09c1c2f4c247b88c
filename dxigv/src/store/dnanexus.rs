//! DNAnexus JSON API client.
//!
//! Every API route is a `POST` with a JSON body and a bearer token. Search
//! routes (`findDataObjects`, `findProjects`) page through results with the
//! `next` cursor, which is fed back as `starting`.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{is_project_id, FileHandle, ProjectInfo, ProjectStore, StoreError, StoreResult};

/// Public DNAnexus API endpoint.
pub const DEFAULT_API_SERVER: &str = "https://api.dnanexus.com";

/// Environment variable holding the dx-toolkit security context.
const SECURITY_CONTEXT_ENV: &str = "DX_SECURITY_CONTEXT";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of retries for transient failures.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Connection settings for [`DxClient`].
#[derive(Debug, Clone)]
pub struct DxClientConfig {
    /// API base URL without trailing slash.
    pub api_server: String,

    /// Bearer token. Falls back to `DX_SECURITY_CONTEXT` when `None`.
    pub auth_token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Retries for connect errors, timeouts, HTTP 429 and 5xx.
    pub max_retries: u32,

    /// Base delay between retries; attempt `n` waits `n * retry_delay`.
    pub retry_delay: Duration,
}

impl Default for DxClientConfig {
    fn default() -> Self {
        Self {
            api_server: DEFAULT_API_SERVER.to_string(),
            auth_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl DxClientConfig {
    /// Set the API server.
    pub fn with_api_server(mut self, api_server: impl Into<String>) -> Self {
        self.api_server = api_server.into();
        self
    }

    /// Set the auth token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[derive(Debug, Deserialize)]
struct SecurityContext {
    auth_token: String,
}

/// Extract the token from a dx-toolkit security context JSON string.
fn parse_security_context(raw: &str) -> Option<String> {
    serde_json::from_str::<SecurityContext>(raw)
        .ok()
        .map(|ctx| ctx.auth_token)
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    #[serde(default)]
    folders: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FindResponse<T> {
    results: Vec<T>,
    #[serde(default)]
    next: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct NameDescribe {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FoundObject {
    id: String,
    describe: NameDescribe,
}

#[derive(Debug, Deserialize)]
struct DownloadResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDescribe {
    id: String,
    name: String,
}

/// Blocking DNAnexus API client.
pub struct DxClient {
    client: Client,
    api_server: String,
    token: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl DxClient {
    /// Create a client, resolving the token from config or environment.
    pub fn new(config: DxClientConfig) -> StoreResult<Self> {
        let token = config
            .auth_token
            .filter(|t| !t.is_empty())
            .or_else(|| {
                std::env::var(SECURITY_CONTEXT_ENV)
                    .ok()
                    .and_then(|raw| parse_security_context(&raw))
            })
            .ok_or(StoreError::MissingToken)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("dxigv/{}", crate::VERSION))
            .build()
            .map_err(|e| StoreError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_server: config.api_server.trim_end_matches('/').to_string(),
            token,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    fn route_url(&self, route: &str) -> String {
        format!("{}/{}", self.api_server, route.trim_start_matches('/'))
    }

    /// POST a JSON body to an API route, retrying transient failures.
    fn post<T: DeserializeOwned>(&self, route: &str, body: &Value) -> StoreResult<T> {
        let url = self.route_url(route);
        let mut attempt = 0;
        loop {
            match self.post_once(&url, body) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(%url, attempt, error = %e, "Retrying DNAnexus API call");
                    thread::sleep(self.retry_delay * attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn post_once<T: DeserializeOwned>(&self, url: &str, body: &Value) -> StoreResult<T> {
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| StoreError::Http {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().map_err(|e| StoreError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Run a search route to exhaustion, following `next` cursors.
    fn find_all<T: DeserializeOwned>(&self, route: &str, mut body: Value) -> StoreResult<Vec<T>> {
        let mut results = Vec::new();
        loop {
            let page: FindResponse<T> = self.post(route, &body)?;
            results.extend(page.results);
            match page.next {
                Some(next) if !next.is_null() => body["starting"] = next,
                _ => return Ok(results),
            }
        }
    }

    fn find_files(
        &self,
        project: &ProjectInfo,
        folder: &str,
        name: Option<&str>,
    ) -> StoreResult<Vec<FileHandle>> {
        let mut body = json!({
            "class": "file",
            "scope": { "project": project.id, "folder": folder, "recurse": false },
            "describe": { "fields": { "name": true } },
        });
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        let found: Vec<FoundObject> = self.find_all("system/findDataObjects", body)?;
        Ok(found
            .into_iter()
            .map(|obj| FileHandle::new(obj.id, obj.describe.name))
            .collect())
    }

    fn describe_project(&self, id: &str) -> StoreResult<ProjectInfo> {
        let route = format!("{}/describe", id);
        let described: ProjectDescribe = self
            .post(&route, &json!({ "fields": { "name": true } }))
            .map_err(|e| match e {
                StoreError::Status { status: 404, .. } => {
                    StoreError::ProjectNotFound(id.to_string())
                }
                other => other,
            })?;
        Ok(ProjectInfo::new(described.id, described.name))
    }
}

impl ProjectStore for DxClient {
    fn list_subfolders(&self, project: &ProjectInfo, folder: &str) -> StoreResult<Vec<String>> {
        let route = format!("{}/listFolder", project.id);
        let listing: ListFolderResponse = self.post(
            &route,
            &json!({ "folder": folder, "only": "folders", "includeHidden": false }),
        )?;
        Ok(listing
            .folders
            .iter()
            .filter_map(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn list_files(&self, project: &ProjectInfo, folder: &str) -> StoreResult<Vec<FileHandle>> {
        self.find_files(project, folder, None)
    }

    fn find_file_by_exact_name(
        &self,
        project: &ProjectInfo,
        folder: &str,
        name: &str,
    ) -> StoreResult<Option<FileHandle>> {
        Ok(self.find_files(project, folder, Some(name))?.into_iter().next())
    }

    fn mint_download_url(
        &self,
        project: &ProjectInfo,
        file: &FileHandle,
        duration_secs: u64,
        suggested_name: &str,
    ) -> StoreResult<String> {
        let route = format!("{}/download", file.id);
        let response: DownloadResponse = self.post(
            &route,
            &json!({
                "duration": duration_secs,
                "filename": suggested_name,
                "preauthenticated": true,
                "project": project.id,
            }),
        )?;
        Ok(response.url)
    }

    fn list_projects(&self) -> StoreResult<Vec<ProjectInfo>> {
        let found: Vec<FoundObject> = self.find_all(
            "system/findProjects",
            json!({ "describe": { "fields": { "name": true } } }),
        )?;
        Ok(found
            .into_iter()
            .map(|p| ProjectInfo::new(p.id, p.describe.name))
            .collect())
    }

    fn resolve_project(&self, id_or_name: &str) -> StoreResult<ProjectInfo> {
        if is_project_id(id_or_name) {
            return self.describe_project(id_or_name);
        }

        let found: Vec<FoundObject> = self.find_all(
            "system/findProjects",
            json!({ "name": id_or_name, "describe": { "fields": { "name": true } } }),
        )?;
        match found.len() {
            0 => Err(StoreError::ProjectNotFound(id_or_name.to_string())),
            1 => {
                let p = &found[0];
                Ok(ProjectInfo::new(p.id.clone(), p.describe.name.clone()))
            }
            count => Err(StoreError::AmbiguousProject {
                name: id_or_name.to_string(),
                count,
            }),
        }
    }
}
