//! Badge models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Badge definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Assignment of a badge to an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactBadge {
    pub artifact_uuid: Uuid,
    pub badge: String,
}

/// Badge endpoint response: flat definition + assignment lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BadgeListing {
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(default)]
    pub artifact_badges: Vec<ArtifactBadge>,
}
