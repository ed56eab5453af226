//! Abstraction over the Trovi API surface the session store consumes.
//!
//! `TroviClient` implements this trait against the real API; tests use a
//! scripted implementation so store behavior can be exercised without a
//! server.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::models::artifact::{Artifact, ArtifactListing, ArtifactRole, Version};
use crate::models::badge::BadgeListing;

/// Uniform async interface over the Trovi API.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Fetch one page of the artifact listing.
    async fn list_artifacts(&self, after: Option<String>, limit: u32) -> Result<ArtifactListing>;

    /// Fetch one artifact, optionally with a sharing key.
    async fn get_artifact(&self, uuid: Uuid, sharing_key: Option<&str>) -> Result<Artifact>;

    /// Create an artifact from a request payload.
    async fn create_artifact(&self, artifact: &Value) -> Result<Artifact>;

    /// Import an artifact from a GitHub repository, or re-import an
    /// existing one when `existing` is set.
    async fn import_artifact(&self, github_url: &str, existing: Option<Uuid>) -> Result<Artifact>;

    /// Apply a partial metadata update and return the fresh record.
    async fn update_artifact(&self, uuid: Uuid, patch: &Value) -> Result<Artifact>;

    /// Delete an artifact.
    async fn delete_artifact(&self, uuid: Uuid) -> Result<()>;

    /// Grant a role on an artifact.
    async fn add_role(&self, uuid: Uuid, role: &ArtifactRole) -> Result<()>;

    /// Revoke a role on an artifact.
    async fn remove_role(&self, uuid: Uuid, role: &ArtifactRole) -> Result<()>;

    /// Create a new version of an artifact.
    async fn create_version(&self, uuid: Uuid, version: &Value) -> Result<Version>;

    /// Delete a version of an artifact.
    async fn delete_version(&self, uuid: Uuid, slug: &str) -> Result<()>;

    /// Request DOI assignment by migrating a version to an archival
    /// backend.
    async fn request_doi(&self, uuid: Uuid, slug: &str, backend: &str) -> Result<Value>;

    /// List the known artifact tags.
    async fn list_tags(&self) -> Result<Vec<String>>;

    /// Fetch badge definitions and assignments.
    async fn list_badges(&self) -> Result<BadgeListing>;

    /// URN of the signed-in user, if any.
    fn user_urn(&self) -> Option<String>;
}
