//! In-memory session store over the Trovi API.
//!
//! Caches the artifact listing, per-artifact detail views, the tag list,
//! and the badge index for one session. Entries are only ever replaced
//! wholesale by re-normalizing a fresh server response; all mutation
//! goes through `&mut self`, so the store is single-writer by
//! construction.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::artifact::{ArtifactRole, Version};
use crate::services::artifact_source::ArtifactSource;
use crate::services::badge_index::BadgeIndex;
use crate::services::filter::{filter_artifacts, ArtifactFilter};
use crate::services::normalizer::ArtifactView;
use crate::services::pagination::accumulate_pages;

/// Session-scoped artifact cache
pub struct ArtifactStore<S: ArtifactSource> {
    source: S,
    page_size: u32,
    listing: Vec<Uuid>,
    details: HashMap<Uuid, ArtifactView>,
    tags: Vec<String>,
    badge_index: Option<BadgeIndex>,
}

impl<S: ArtifactSource> ArtifactStore<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            listing: Vec::new(),
            details: HashMap::new(),
            tags: Vec::new(),
            badge_index: None,
        }
    }

    /// Badge index, built at most once per session.
    ///
    /// A failed badge fetch logs a warning and leaves the index unbuilt,
    /// so the next call retries; normalization proceeds with an empty
    /// index in the meantime.
    async fn badge_index(&mut self) -> BadgeIndex {
        if let Some(index) = &self.badge_index {
            return index.clone();
        }
        match self.source.list_badges().await {
            Ok(listing) => {
                let index = BadgeIndex::from_listing(listing);
                self.badge_index = Some(index.clone());
                index
            }
            Err(err) => {
                warn!(error = %err, "failed to load badges");
                BadgeIndex::default()
            }
        }
    }

    /// Fetch the complete artifact listing once; later calls are no-ops.
    ///
    /// A fetch error mid-pagination keeps the partial listing and is
    /// logged rather than propagated, matching the dashboard's
    /// best-effort listing behavior.
    pub async fn fetch_all(&mut self) -> Result<()> {
        if !self.listing.is_empty() {
            return Ok(());
        }
        let badges = self.badge_index().await;

        let source = &self.source;
        let limit = self.page_size;
        let outcome = accumulate_pages(|after| source.list_artifacts(after, limit), &badges).await;

        if let Some(err) = &outcome.error {
            warn!(error = %err, loaded = outcome.artifacts.len(), "artifact listing ended early");
        }
        for view in outcome.artifacts {
            let uuid = view.uuid();
            self.listing.push(uuid);
            self.details.insert(uuid, view);
        }
        Ok(())
    }

    /// Artifacts in listing order.
    pub fn artifacts(&self) -> Vec<&ArtifactView> {
        self.listing
            .iter()
            .filter_map(|uuid| self.details.get(uuid))
            .collect()
    }

    /// Cached view for one artifact, if present.
    pub fn get(&self, uuid: &Uuid) -> Option<&ArtifactView> {
        self.details.get(uuid)
    }

    /// Listing filtered against the signed-in user.
    pub fn filtered(&self, filter: &ArtifactFilter) -> Vec<&ArtifactView> {
        let user = self.source.user_urn();
        filter_artifacts(self.artifacts(), filter, user.as_deref())
    }

    /// One artifact's view, fetching and normalizing it on first access.
    pub async fn artifact(
        &mut self,
        uuid: Uuid,
        sharing_key: Option<&str>,
    ) -> Result<&ArtifactView> {
        if !self.details.contains_key(&uuid) {
            let badges = self.badge_index().await;
            let artifact = self.source.get_artifact(uuid, sharing_key).await?;
            self.details.insert(uuid, ArtifactView::derive(artifact, &badges));
        }
        Ok(&self.details[&uuid])
    }

    /// Known artifact tags, fetched once per session.
    pub async fn tags(&mut self) -> Result<&[String]> {
        if self.tags.is_empty() {
            self.tags = self.source.list_tags().await?;
        }
        Ok(&self.tags)
    }

    /// Create an artifact and cache its normalized view.
    pub async fn create(&mut self, artifact: &Value) -> Result<&ArtifactView> {
        let badges = self.badge_index().await;
        let created = self.source.create_artifact(artifact).await?;
        let uuid = created.uuid;
        info!(%uuid, "created artifact");
        self.listing.push(uuid);
        self.details.insert(uuid, ArtifactView::derive(created, &badges));
        Ok(&self.details[&uuid])
    }

    /// Import an artifact from a GitHub repository and cache it.
    pub async fn import(
        &mut self,
        github_url: &str,
        existing: Option<Uuid>,
    ) -> Result<&ArtifactView> {
        let badges = self.badge_index().await;
        let imported = self.source.import_artifact(github_url, existing).await?;
        let uuid = imported.uuid;
        info!(%uuid, github_url, "imported artifact");
        if !self.listing.contains(&uuid) {
            self.listing.push(uuid);
        }
        self.details.insert(uuid, ArtifactView::derive(imported, &badges));
        Ok(&self.details[&uuid])
    }

    /// Apply a partial metadata update, replacing the cached view with
    /// the re-normalized server response.
    pub async fn update_metadata(&mut self, uuid: Uuid, patch: &Value) -> Result<&ArtifactView> {
        let badges = self.badge_index().await;
        let updated = self.source.update_artifact(uuid, patch).await?;
        self.details.insert(uuid, ArtifactView::derive(updated, &badges));
        Ok(&self.details[&uuid])
    }

    /// Delete an artifact and drop it from both caches.
    pub async fn delete(&mut self, uuid: Uuid) -> Result<()> {
        self.source.delete_artifact(uuid).await?;
        self.listing.retain(|entry| *entry != uuid);
        self.details.remove(&uuid);
        info!(%uuid, "deleted artifact");
        Ok(())
    }

    /// Grant and revoke roles on an artifact.
    pub async fn update_roles(
        &mut self,
        uuid: Uuid,
        add: &[ArtifactRole],
        remove: &[ArtifactRole],
    ) -> Result<()> {
        for role in add {
            self.source.add_role(uuid, role).await?;
        }
        for role in remove {
            self.source.remove_role(uuid, role).await?;
        }
        Ok(())
    }

    /// Remove versions from an artifact.
    pub async fn remove_versions(&mut self, uuid: Uuid, slugs: &[String]) -> Result<()> {
        for slug in slugs {
            self.source.delete_version(uuid, slug).await?;
        }
        Ok(())
    }

    /// Create a new version of an artifact.
    pub async fn create_version(&mut self, uuid: Uuid, version: &Value) -> Result<Version> {
        self.source.create_version(uuid, version).await
    }

    /// Request DOI assignment for a version.
    pub async fn request_doi(&mut self, uuid: Uuid, slug: &str, backend: &str) -> Result<Value> {
        self.source.request_doi(uuid, slug, backend).await
    }
}
