//! Artifact and version models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Artifact visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Role granted to a user on an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Collaborator,
    Administrator,
}

impl RoleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RoleKind::Collaborator => "collaborator",
            RoleKind::Administrator => "administrator",
        }
    }
}

/// Author entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub full_name: String,
    #[serde(default)]
    pub affiliation: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Role assignment entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRole {
    /// User URN the role is granted to
    pub user: String,
    pub role: RoleKind,
}

/// Per-version access metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetrics {
    #[serde(default)]
    pub access_count: u64,
    #[serde(default)]
    pub unique_access_count: u64,
    #[serde(default)]
    pub unique_cell_execution_count: u64,
}

/// Where a version's contents live (git remote, Zenodo deposit, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionContents {
    pub urn: String,
}

/// One snapshot of an artifact's contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub contents: VersionContents,
    #[serde(default)]
    pub metrics: VersionMetrics,
    #[serde(default)]
    pub links: Vec<serde_json::Value>,
}

/// Artifact entity as returned by the listing and detail endpoints.
///
/// `versions` is never empty once an artifact has been loaded; derived
/// views rely on that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub uuid: Uuid,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    pub owner_urn: String,
    #[serde(default)]
    pub roles: Vec<ArtifactRole>,
    pub visibility: Visibility,
    #[serde(default)]
    pub linked_projects: Vec<String>,
    #[serde(default)]
    pub linked_artifacts: Vec<String>,
    pub versions: Vec<Version>,
    /// Server-side aggregate metrics; derived views recompute their own
    /// sums from `versions`.
    #[serde(default)]
    pub metrics: Option<VersionMetrics>,
}

/// Cursor for the next listing page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    #[serde(default)]
    pub after: Option<String>,
}

/// One page of the artifact listing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactListing {
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub next: PageCursor,
}
