//! HTTP client for controller API communication.

use photon_api::{
    ApiError, DiskCreateSpec, Host, HostCreateSpec, PersistentDisk, Project, ProjectCreateSpec,
    ResourceList, Task, Tenant, TenantCreateSpec, Vm, VmCreateSpec,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiClientError;

/// Client for communicating with the Photon controller.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a new client for `target`, optionally authenticated.
    pub fn new(target: &str, token: Option<&str>) -> Result<Self, ApiClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ApiClientError::InvalidToken)?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: target.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        debug!(path, "GET");
        let response = self.http.get(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiClientError> {
        debug!(path, "POST");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        self.handle_response(response).await
    }

    /// POST to an operation endpoint that takes no body (e.g. vm start).
    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        debug!(path, "POST");
        let response = self.http.post(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiClientError> {
        debug!(path, "DELETE");
        let response = self.http.delete(self.url(path)).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiClientError::Unexpected(format!("failed to parse response: {e}")))
        } else {
            self.handle_error(response).await
        }
    }

    /// Decode a structured error body.
    ///
    /// The controller reports failed operations as `{code, message}` and may
    /// embed the (possibly partial) task record; the task is kept on the
    /// error so callers can extract step errors from it.
    async fn handle_error<T>(&self, response: reqwest::Response) -> Result<T, ApiClientError> {
        let status = response.status().as_u16();

        let body: ErrorBody = response.json().await.unwrap_or_else(|_| ErrorBody {
            code: "unknown".to_string(),
            message: "unknown error".to_string(),
            task: None,
        });

        let errors = vec![ApiError {
            code: body.code,
            message: body.message,
            data: None,
        }];

        Err(ApiClientError::api(status, errors, body.task))
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    pub async fn get_task(&self, id: &str) -> Result<Task, ApiClientError> {
        self.get(&format!("/tasks/{id}")).await
    }

    /// Server-side blocking wait; returns once the task is terminal.
    pub async fn wait_task(&self, id: &str) -> Result<Task, ApiClientError> {
        self.get(&format!("/tasks/{id}/wait")).await
    }

    pub async fn list_tasks(
        &self,
        entity_id: Option<&str>,
        entity_kind: Option<&str>,
        state: Option<&str>,
    ) -> Result<ResourceList<Task>, ApiClientError> {
        let mut params = Vec::new();
        if let Some(id) = entity_id {
            params.push(format!("entity_id={id}"));
        }
        if let Some(kind) = entity_kind {
            params.push(format!("entity_kind={kind}"));
        }
        if let Some(state) = state {
            params.push(format!("state={state}"));
        }

        let mut path = "/tasks".to_string();
        if !params.is_empty() {
            path.push('?');
            path.push_str(&params.join("&"));
        }

        self.get(&path).await
    }

    // =========================================================================
    // Tenants
    // =========================================================================

    pub async fn create_tenant(&self, spec: &TenantCreateSpec) -> Result<Task, ApiClientError> {
        self.post("/tenants", spec).await
    }

    pub async fn list_tenants(&self) -> Result<ResourceList<Tenant>, ApiClientError> {
        self.get("/tenants").await
    }

    pub async fn delete_tenant(&self, id: &str) -> Result<Task, ApiClientError> {
        self.delete(&format!("/tenants/{id}")).await
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub async fn create_project(
        &self,
        tenant_id: &str,
        spec: &ProjectCreateSpec,
    ) -> Result<Task, ApiClientError> {
        self.post(&format!("/tenants/{tenant_id}/projects"), spec)
            .await
    }

    pub async fn list_projects(
        &self,
        tenant_id: &str,
    ) -> Result<ResourceList<Project>, ApiClientError> {
        self.get(&format!("/tenants/{tenant_id}/projects")).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<Task, ApiClientError> {
        self.delete(&format!("/projects/{id}")).await
    }

    // =========================================================================
    // Disks
    // =========================================================================

    pub async fn create_disk(
        &self,
        project_id: &str,
        spec: &DiskCreateSpec,
    ) -> Result<Task, ApiClientError> {
        self.post(&format!("/projects/{project_id}/disks"), spec)
            .await
    }

    pub async fn get_disk(&self, id: &str) -> Result<PersistentDisk, ApiClientError> {
        self.get(&format!("/disks/{id}")).await
    }

    pub async fn list_disks(
        &self,
        project_id: &str,
    ) -> Result<ResourceList<PersistentDisk>, ApiClientError> {
        self.get(&format!("/projects/{project_id}/disks")).await
    }

    pub async fn delete_disk(&self, id: &str) -> Result<Task, ApiClientError> {
        self.delete(&format!("/disks/{id}")).await
    }

    // =========================================================================
    // VMs
    // =========================================================================

    pub async fn create_vm(
        &self,
        project_id: &str,
        spec: &VmCreateSpec,
    ) -> Result<Task, ApiClientError> {
        self.post(&format!("/projects/{project_id}/vms"), spec).await
    }

    pub async fn get_vm(&self, id: &str) -> Result<Vm, ApiClientError> {
        self.get(&format!("/vms/{id}")).await
    }

    pub async fn list_vms(&self, project_id: &str) -> Result<ResourceList<Vm>, ApiClientError> {
        self.get(&format!("/projects/{project_id}/vms")).await
    }

    pub async fn delete_vm(&self, id: &str) -> Result<Task, ApiClientError> {
        self.delete(&format!("/vms/{id}")).await
    }

    pub async fn start_vm(&self, id: &str) -> Result<Task, ApiClientError> {
        self.post_empty(&format!("/vms/{id}/start")).await
    }

    pub async fn stop_vm(&self, id: &str) -> Result<Task, ApiClientError> {
        self.post_empty(&format!("/vms/{id}/stop")).await
    }

    // =========================================================================
    // Hosts
    // =========================================================================

    pub async fn create_host(&self, spec: &HostCreateSpec) -> Result<Task, ApiClientError> {
        self.post("/hosts", spec).await
    }

    pub async fn get_host(&self, id: &str) -> Result<Host, ApiClientError> {
        self.get(&format!("/hosts/{id}")).await
    }

    pub async fn list_hosts(&self) -> Result<ResourceList<Host>, ApiClientError> {
        self.get("/hosts").await
    }

    pub async fn delete_host(&self, id: &str) -> Result<Task, ApiClientError> {
        self.delete(&format!("/hosts/{id}")).await
    }
}

/// Error response structure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,

    #[serde(default)]
    message: String,

    /// Partially-returned task, when the failure concerns one.
    #[serde(default)]
    task: Option<Task>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_strips_trailing_slash() {
        let client = Client::new("http://localhost:9000/", None).unwrap();
        assert_eq!(client.url("/tasks/t-1"), "http://localhost:9000/tasks/t-1");
    }

    #[test]
    fn test_rejects_unprintable_token() {
        let result = Client::new("http://localhost:9000", Some("bad\ntoken"));
        assert!(matches!(result, Err(ApiClientError::InvalidToken)));
    }
}
