//! Badge index: lookup from artifact to its badge definitions.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use crate::models::badge::{ArtifactBadge, Badge, BadgeListing};

/// Index over the flat badge listing returned by the portal.
///
/// Maps badge names to definitions and artifact uuids to the set of badge
/// names assigned to them. Building is idempotent; callers are expected
/// to build it once per session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeIndex {
    badges: HashMap<String, Badge>,
    artifact_badges: HashMap<Uuid, BTreeSet<String>>,
}

impl BadgeIndex {
    /// Build the index from definition and assignment lists.
    ///
    /// Duplicate badge names keep the last definition; duplicate
    /// assignments collapse through set semantics.
    pub fn build(badges: Vec<Badge>, assignments: Vec<ArtifactBadge>) -> Self {
        let mut index = Self::default();
        for badge in badges {
            index.badges.insert(badge.name.clone(), badge);
        }
        for assignment in assignments {
            index
                .artifact_badges
                .entry(assignment.artifact_uuid)
                .or_default()
                .insert(assignment.badge);
        }
        index
    }

    pub fn from_listing(listing: BadgeListing) -> Self {
        Self::build(listing.badges, listing.artifact_badges)
    }

    /// Badge definitions assigned to an artifact; unknown artifacts get
    /// an empty list.
    pub fn badges_for(&self, artifact_uuid: &Uuid) -> Vec<Badge> {
        self.artifact_badges
            .get(artifact_uuid)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| self.badges.get(name).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Look up a badge definition by name.
    pub fn definition(&self, name: &str) -> Option<&Badge> {
        self.badges.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty() && self.artifact_badges.is_empty()
    }
}
