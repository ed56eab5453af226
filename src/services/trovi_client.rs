//! Trovi REST API client.
//!
//! Thin typed wrapper over the artifact-sharing API: cursor-paginated
//! listing, artifact detail, create/import/update/delete, role and
//! version management, DOI migration requests, and the portal's tag and
//! badge endpoints. Authentication tokens come from an injected
//! [`Credentials`] collaborator and ride along as the `access_token`
//! query parameter, matching the API contract.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Result, TroviError};
use crate::models::artifact::{Artifact, ArtifactListing, ArtifactRole, Version};
use crate::models::badge::BadgeListing;
use crate::services::artifact_source::ArtifactSource;
use crate::services::credentials::Credentials;

/// Client configuration
#[derive(Debug, Clone)]
pub struct TroviClientConfig {
    /// Trovi API base URL
    pub base_url: String,
    /// Chameleon portal base URL (badge listing)
    pub portal_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Listing page size
    pub page_size: u32,
}

impl Default for TroviClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            portal_url: String::new(),
            timeout_secs: 30,
            page_size: 21,
        }
    }
}

impl From<&Config> for TroviClientConfig {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.api_url.clone(),
            portal_url: config.portal_url.clone(),
            timeout_secs: config.http_timeout_secs,
            page_size: config.page_size,
        }
    }
}

/// Trovi REST API client
pub struct TroviClient {
    client: Client,
    config: TroviClientConfig,
    credentials: Arc<dyn Credentials>,
}

// ============ API Response Types ============

#[derive(Debug, Deserialize)]
struct TagListing {
    tags: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    tag: String,
}

impl TroviClient {
    /// Create a new client with the given configuration and credentials.
    pub fn new(config: TroviClientConfig, credentials: Arc<dyn Credentials>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    pub fn portal_url(&self) -> &str {
        &self.config.portal_url
    }

    /// Query parameters carrying the access token, when one is available.
    async fn token_query(&self) -> Vec<(String, String)> {
        match self.credentials.access_token().await {
            Some(token) => vec![("access_token".into(), token)],
            None => Vec::new(),
        }
    }

    /// Access token for operations that refuse anonymous callers.
    async fn required_token(&self) -> Result<String> {
        self.credentials
            .access_token()
            .await
            .ok_or(TroviError::NotAuthenticated)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Decode a success response, mapping failures into the error taxonomy.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// Accept any success status for endpoints that return no body.
    async fn expect_no_content(response: Response) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn error_from(response: Response) -> TroviError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".into());
        if status == StatusCode::BAD_REQUEST {
            if let Ok(errors) = serde_json::from_str::<Value>(&body) {
                return TroviError::Validation(errors);
            }
        }
        TroviError::Api {
            status: status.as_u16(),
            message: body,
        }
    }

    // ============ API Methods ============

    /// Fetch one page of the artifact listing.
    pub async fn list_artifacts(
        &self,
        after: Option<String>,
        limit: u32,
    ) -> Result<ArtifactListing> {
        let mut query = self.token_query().await;
        query.push(("limit".into(), limit.to_string()));
        if let Some(after) = after {
            query.push(("after".into(), after));
        }

        let response = self
            .client
            .get(self.api_url("/artifacts/"))
            .query(&query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Fetch one artifact, optionally with a sharing key.
    pub async fn get_artifact(&self, uuid: Uuid, sharing_key: Option<&str>) -> Result<Artifact> {
        let mut query = self.token_query().await;
        if let Some(key) = sharing_key {
            query.push(("sharing_key".into(), key.into()));
        }

        let response = self
            .client
            .get(self.api_url(&format!("/artifacts/{uuid}/")))
            .query(&query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Create an artifact from a request payload.
    pub async fn create_artifact(&self, artifact: &Value) -> Result<Artifact> {
        let token = self.required_token().await?;
        let response = self
            .client
            .post(self.api_url("/artifacts/"))
            .query(&[("access_token", token)])
            .json(artifact)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Import an artifact from a GitHub repository; re-imports the
    /// artifact in place when `existing` is set.
    pub async fn import_artifact(
        &self,
        github_url: &str,
        existing: Option<Uuid>,
    ) -> Result<Artifact> {
        let token = self.required_token().await?;
        let body = json!({ "github_url": github_url });

        let request = match existing {
            Some(uuid) => self.client.put(self.api_url(&format!("/import/{uuid}/"))),
            None => self.client.post(self.api_url("/import/")),
        };
        let response = request
            .query(&[("access_token", token)])
            .json(&body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Apply a partial metadata update and return the fresh record.
    pub async fn update_artifact(&self, uuid: Uuid, patch: &Value) -> Result<Artifact> {
        let token = self.required_token().await?;
        let response = self
            .client
            .put(self.api_url(&format!("/artifacts/{uuid}/")))
            .query(&[
                ("access_token", token.as_str()),
                ("partial", "true"),
            ])
            .json(&json!({ "patch": patch }))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Delete an artifact.
    pub async fn delete_artifact(&self, uuid: Uuid) -> Result<()> {
        let token = self.required_token().await?;
        let response = self
            .client
            .delete(self.api_url(&format!("/artifacts/{uuid}/")))
            .query(&[("access_token", token)])
            .send()
            .await?;
        Self::expect_no_content(response).await
    }

    /// Grant a role on an artifact.
    pub async fn add_role(&self, uuid: Uuid, role: &ArtifactRole) -> Result<()> {
        let token = self.required_token().await?;
        let response = self
            .client
            .post(self.api_url(&format!("/artifacts/{uuid}/roles/")))
            .query(&[("access_token", token)])
            .json(role)
            .send()
            .await?;
        Self::expect_no_content(response).await
    }

    /// Revoke a role on an artifact.
    pub async fn remove_role(&self, uuid: Uuid, role: &ArtifactRole) -> Result<()> {
        let token = self.required_token().await?;
        let response = self
            .client
            .delete(self.api_url(&format!("/artifacts/{uuid}/roles/")))
            .query(&[
                ("access_token", token.as_str()),
                ("user", role.user.as_str()),
                ("role", role.role.as_str()),
            ])
            .send()
            .await?;
        Self::expect_no_content(response).await
    }

    /// Create a new version of an artifact.
    pub async fn create_version(&self, uuid: Uuid, version: &Value) -> Result<Version> {
        let token = self.required_token().await?;
        let response = self
            .client
            .post(self.api_url(&format!("/artifacts/{uuid}/versions/")))
            .query(&[("access_token", token)])
            .json(version)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Delete a version of an artifact.
    pub async fn delete_version(&self, uuid: Uuid, slug: &str) -> Result<()> {
        let token = self.required_token().await?;
        let response = self
            .client
            .delete(self.api_url(&format!("/artifacts/{uuid}/versions/{slug}/")))
            .query(&[("access_token", token)])
            .send()
            .await?;
        Self::expect_no_content(response).await
    }

    /// Request DOI assignment by migrating a version to an archival
    /// backend (Zenodo, by convention).
    pub async fn request_doi(&self, uuid: Uuid, slug: &str, backend: &str) -> Result<Value> {
        let token = self.required_token().await?;
        let response = self
            .client
            .post(self.api_url(&format!("/artifacts/{uuid}/versions/{slug}/migration/")))
            .query(&[("access_token", token)])
            .json(&json!({ "backend": backend }))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// List the known artifact tags.
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        let response = self.client.get(self.api_url("/meta/tags")).send().await?;
        let listing: TagListing = Self::handle_response(response).await?;
        Ok(listing.tags.into_iter().map(|entry| entry.tag).collect())
    }

    /// Fetch badge definitions and assignments from the portal.
    pub async fn list_badges(&self) -> Result<BadgeListing> {
        let url = format!("{}/experiment/share/api/badges", self.config.portal_url);
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }
}

#[async_trait::async_trait]
impl ArtifactSource for TroviClient {
    async fn list_artifacts(&self, after: Option<String>, limit: u32) -> Result<ArtifactListing> {
        self.list_artifacts(after, limit).await
    }

    async fn get_artifact(&self, uuid: Uuid, sharing_key: Option<&str>) -> Result<Artifact> {
        self.get_artifact(uuid, sharing_key).await
    }

    async fn create_artifact(&self, artifact: &Value) -> Result<Artifact> {
        self.create_artifact(artifact).await
    }

    async fn import_artifact(&self, github_url: &str, existing: Option<Uuid>) -> Result<Artifact> {
        self.import_artifact(github_url, existing).await
    }

    async fn update_artifact(&self, uuid: Uuid, patch: &Value) -> Result<Artifact> {
        self.update_artifact(uuid, patch).await
    }

    async fn delete_artifact(&self, uuid: Uuid) -> Result<()> {
        self.delete_artifact(uuid).await
    }

    async fn add_role(&self, uuid: Uuid, role: &ArtifactRole) -> Result<()> {
        self.add_role(uuid, role).await
    }

    async fn remove_role(&self, uuid: Uuid, role: &ArtifactRole) -> Result<()> {
        self.remove_role(uuid, role).await
    }

    async fn create_version(&self, uuid: Uuid, version: &Value) -> Result<Version> {
        self.create_version(uuid, version).await
    }

    async fn delete_version(&self, uuid: Uuid, slug: &str) -> Result<()> {
        self.delete_version(uuid, slug).await
    }

    async fn request_doi(&self, uuid: Uuid, slug: &str, backend: &str) -> Result<Value> {
        self.request_doi(uuid, slug, backend).await
    }

    async fn list_tags(&self) -> Result<Vec<String>> {
        self.list_tags().await
    }

    async fn list_badges(&self) -> Result<BadgeListing> {
        self.list_badges().await
    }

    fn user_urn(&self) -> Option<String> {
        self.credentials.user_urn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credentials::{Anonymous, StaticCredentials};

    #[test]
    fn config_default() {
        let config = TroviClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.page_size, 21);
        assert!(config.base_url.is_empty());
        assert!(config.portal_url.is_empty());
    }

    #[test]
    fn config_from_app_config() {
        let app = Config {
            api_url: "https://trovi.example.org".into(),
            portal_url: "https://portal.example.org".into(),
            log_level: "info".into(),
            page_size: 50,
            http_timeout_secs: 10,
        };
        let config = TroviClientConfig::from(&app);
        assert_eq!(config.base_url, "https://trovi.example.org");
        assert_eq!(config.portal_url, "https://portal.example.org");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn client_creation() {
        let config = TroviClientConfig {
            base_url: "https://trovi.example.org".into(),
            portal_url: "https://portal.example.org".into(),
            ..Default::default()
        };
        assert!(TroviClient::new(config, Arc::new(Anonymous)).is_ok());
    }

    #[tokio::test]
    async fn anonymous_caller_gets_no_token_params() {
        let client = TroviClient::new(TroviClientConfig::default(), Arc::new(Anonymous)).unwrap();
        assert!(client.token_query().await.is_empty());
        assert!(matches!(
            client.required_token().await,
            Err(TroviError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn signed_in_caller_gets_token_params() {
        let creds = StaticCredentials::new("tok-1", "urn:trovi:user:chameleon:alice");
        let client = TroviClient::new(TroviClientConfig::default(), Arc::new(creds)).unwrap();
        let query = client.token_query().await;
        assert_eq!(query, vec![("access_token".to_string(), "tok-1".to_string())]);
        assert_eq!(client.required_token().await.unwrap(), "tok-1");
        assert_eq!(
            ArtifactSource::user_urn(&client).as_deref(),
            Some("urn:trovi:user:chameleon:alice")
        );
    }

    #[test]
    fn tag_listing_deserialization() {
        let json = r#"{"tags": [{"tag": "edge"}, {"tag": "power"}]}"#;
        let listing: TagListing = serde_json::from_str(json).unwrap();
        let tags: Vec<String> = listing.tags.into_iter().map(|t| t.tag).collect();
        assert_eq!(tags, vec!["edge", "power"]);
    }
}
