//! Derived artifact views.
//!
//! `ArtifactView` carries everything the dashboard needs that is not
//! stored on the server record itself: latest-version selection, summed
//! metrics, rendered description markup, GitHub source extraction, DOI
//! detection, and resolved badges. The server record is kept intact
//! inside the view so it stays authoritative and serializable.

use std::sync::OnceLock;

use pulldown_cmark::{html, Parser};
use regex::Regex;
use uuid::Uuid;

use crate::models::artifact::{Artifact, RoleKind, Version, VersionMetrics};
use crate::models::badge::Badge;
use crate::services::badge_index::BadgeIndex;
use crate::urn;

// Matches the repo slug and optional @ref of a GitHub remote inside a
// contents URN, e.g. urn:trovi:contents:git:https://github.com/org/repo.git@main
fn github_urn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)github\.com[:/]([^/]+/[^/]+?)(?:\.git)?(?:@(.+))?$").unwrap()
    })
}

/// GitHub source location extracted from a version's contents URN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSource {
    /// `org/repo` slug
    pub repo: String,
    /// Browsable repository URL
    pub url: String,
    /// Branch, tag, or commit following `@`, when present
    pub git_ref: Option<String>,
}

/// DOI carried by a Zenodo-backed version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoiInfo {
    pub doi: String,
    pub url: String,
}

/// Per-version derived fields, parallel to `Artifact::versions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionView {
    pub doi: Option<DoiInfo>,
    pub is_git: bool,
}

/// Derived view over one artifact.
#[derive(Debug, Clone)]
pub struct ArtifactView {
    /// The untouched server record
    pub artifact: Artifact,
    /// Version with the newest `created_at`; earliest-indexed wins ties
    pub latest_version: Version,
    /// Versions whose `created_at` differs from the latest's
    pub non_latest_versions: Vec<Version>,
    /// Element-wise sum of every version's metrics
    pub summed_metrics: VersionMetrics,
    /// `long_description` rendered from markdown; empty when absent
    pub description_html: String,
    /// First GitHub-backed version's source location, if any
    pub github: Option<GitHubSource>,
    /// First Zenodo-backed version's DOI, if any
    pub doi: Option<DoiInfo>,
    /// Per-version derived fields, parallel to `artifact.versions`
    pub version_views: Vec<VersionView>,
    /// Badge definitions assigned to this artifact
    pub badges: Vec<Badge>,
}

impl ArtifactView {
    /// Compute the derived view of `artifact`.
    ///
    /// Assumes `versions` is non-empty, which holds for every artifact
    /// the API returns. The raw record is stored unchanged.
    pub fn derive(artifact: Artifact, badges: &BadgeIndex) -> Self {
        let latest_version = artifact
            .versions
            .iter()
            .fold(&artifact.versions[0], |latest, version| {
                if version.created_at > latest.created_at {
                    version
                } else {
                    latest
                }
            })
            .clone();

        let non_latest_versions: Vec<Version> = artifact
            .versions
            .iter()
            .filter(|version| version.created_at != latest_version.created_at)
            .cloned()
            .collect();

        let summed_metrics =
            artifact
                .versions
                .iter()
                .fold(VersionMetrics::default(), |mut acc, version| {
                    acc.access_count += version.metrics.access_count;
                    acc.unique_access_count += version.metrics.unique_access_count;
                    acc.unique_cell_execution_count += version.metrics.unique_cell_execution_count;
                    acc
                });

        let description_html =
            render_markdown(artifact.long_description.as_deref().unwrap_or(""));

        let github = artifact
            .versions
            .iter()
            .find(|version| version.contents.urn.contains("github.com"))
            .and_then(|version| github_urn_regex().captures(&version.contents.urn))
            .map(|caps| {
                let repo = caps[1].trim_end_matches(".git").to_string();
                let url = format!("https://github.com/{repo}");
                GitHubSource {
                    repo,
                    url,
                    git_ref: caps.get(2).map(|m| m.as_str().to_string()),
                }
            });

        let version_views: Vec<VersionView> = artifact
            .versions
            .iter()
            .map(|version| VersionView {
                doi: urn::parse_doi(&version.contents.urn).ok().map(|doi| DoiInfo {
                    url: format!("https://doi.org/{doi}"),
                    doi,
                }),
                is_git: version.contents.urn.contains("git"),
            })
            .collect();

        let doi = version_views.iter().find_map(|view| view.doi.clone());

        let badges = badges.badges_for(&artifact.uuid);

        Self {
            latest_version,
            non_latest_versions,
            summed_metrics,
            description_html,
            github,
            doi,
            version_views,
            badges,
            artifact,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.artifact.uuid
    }

    pub fn has_doi(&self) -> bool {
        self.doi.is_some()
    }

    /// Whether `user_urn` owns this artifact.
    ///
    /// The signed-in user may change between when the view was derived
    /// and when it is used, so callers pass the current identity in.
    pub fn is_owned_by(&self, user_urn: Option<&str>) -> bool {
        user_urn.is_some_and(|urn| self.artifact.owner_urn == urn)
    }

    /// Whether `user_urn` may edit this artifact (owner, collaborator,
    /// or administrator).
    pub fn can_edit(&self, user_urn: Option<&str>) -> bool {
        self.is_owned_by(user_urn)
            || user_urn.is_some_and(|urn| {
                self.artifact.roles.iter().any(|role| {
                    role.user == urn
                        && matches!(role.role, RoleKind::Collaborator | RoleKind::Administrator)
                })
            })
    }

    /// Whether `user_urn` may manage roles (owner or administrator).
    pub fn can_edit_roles(&self, user_urn: Option<&str>) -> bool {
        self.is_owned_by(user_urn)
            || user_urn.is_some_and(|urn| {
                self.artifact
                    .roles
                    .iter()
                    .any(|role| role.user == urn && role.role == RoleKind::Administrator)
            })
    }

    /// Portal URL that launches a version in an interactive session.
    pub fn launch_url(
        &self,
        portal_url: &str,
        version_slug: &str,
        sharing_key: Option<&str>,
    ) -> String {
        self.share_url(
            portal_url,
            &format!("version/{version_slug}/launch"),
            sharing_key,
        )
    }

    /// Portal URL that downloads a version's contents.
    pub fn download_url(
        &self,
        portal_url: &str,
        version_slug: &str,
        sharing_key: Option<&str>,
    ) -> String {
        self.share_url(
            portal_url,
            &format!("version/{version_slug}/download"),
            sharing_key,
        )
    }

    /// Portal URL for granting day passes to this artifact.
    pub fn daypass_url(&self, portal_url: &str) -> String {
        self.share_url(portal_url, "share", None)
    }

    /// Portal URL for requesting a day pass.
    pub fn request_daypass_url(&self, portal_url: &str) -> String {
        self.share_url(portal_url, "request", None)
    }

    fn share_url(&self, portal_url: &str, suffix: &str, sharing_key: Option<&str>) -> String {
        let mut url = format!(
            "{}/experiment/share/{}/{}",
            portal_url, self.artifact.uuid, suffix
        );
        if let Some(key) = sharing_key {
            url.push_str("?sharing_key=");
            url.push_str(key);
        }
        url
    }
}

/// Render markdown to HTML; empty input yields empty output.
pub fn render_markdown(source: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(source));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifact_with_versions(versions: serde_json::Value) -> Artifact {
        serde_json::from_value(json!({
            "uuid": "7f000101-0000-0000-0000-000000000001",
            "title": "Power measurement on CHI@Edge",
            "short_description": "Reproducible power experiments",
            "long_description": "# Power\n\nMeasured under load.",
            "tags": ["edge"],
            "authors": [{"full_name": "Alice Birch", "affiliation": "UChicago", "email": "alice@example.org"}],
            "owner_urn": "urn:trovi:user:chameleon:alice",
            "roles": [
                {"user": "urn:trovi:user:chameleon:bob", "role": "collaborator"},
                {"user": "urn:trovi:user:chameleon:carol", "role": "administrator"}
            ],
            "visibility": "public",
            "linked_projects": [],
            "linked_artifacts": [],
            "versions": versions
        }))
        .unwrap()
    }

    fn version(slug: &str, created_at: &str, urn: &str, access_count: u64) -> serde_json::Value {
        json!({
            "slug": slug,
            "created_at": created_at,
            "contents": {"urn": urn},
            "metrics": {
                "access_count": access_count,
                "unique_access_count": access_count / 2,
                "unique_cell_execution_count": 1
            },
            "links": []
        })
    }

    #[test]
    fn end_to_end_derivation() {
        let artifact = artifact_with_versions(json!([
            version("v1", "2024-01-01T00:00:00Z", "urn:trovi:contents:chameleon:abc", 2),
            version(
                "v2",
                "2024-06-01T00:00:00Z",
                "urn:trovi:contents:git:https://github.com/org/repo.git@main",
                5
            ),
        ]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());

        assert_eq!(view.latest_version.slug, "v2");
        assert_eq!(view.summed_metrics.access_count, 7);
        let github = view.github.as_ref().unwrap();
        assert_eq!(github.url, "https://github.com/org/repo");
        assert_eq!(github.repo, "org/repo");
        assert_eq!(github.git_ref.as_deref(), Some("main"));
        assert!(!view.has_doi());
        assert_eq!(view.non_latest_versions.len(), 1);
        assert_eq!(view.non_latest_versions[0].slug, "v1");
    }

    #[test]
    fn latest_version_tie_keeps_first() {
        let artifact = artifact_with_versions(json!([
            version("first", "2024-03-01T00:00:00Z", "urn:trovi:contents:chameleon:a", 1),
            version("second", "2024-03-01T00:00:00Z", "urn:trovi:contents:chameleon:b", 1),
        ]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        assert_eq!(view.latest_version.slug, "first");
        // versions sharing the winning timestamp are not "non-latest"
        assert!(view.non_latest_versions.is_empty());
    }

    #[test]
    fn single_version_artifact() {
        let artifact = artifact_with_versions(json!([version(
            "only",
            "2023-01-01T00:00:00Z",
            "urn:trovi:contents:chameleon:x",
            4
        )]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        assert_eq!(view.latest_version.slug, "only");
        assert!(view.non_latest_versions.is_empty());
        assert_eq!(view.summed_metrics.access_count, 4);
        assert_eq!(view.summed_metrics.unique_access_count, 2);
        assert_eq!(view.summed_metrics.unique_cell_execution_count, 1);
    }

    #[test]
    fn missing_long_description_renders_empty() {
        let mut artifact = artifact_with_versions(json!([version(
            "v1",
            "2024-01-01T00:00:00Z",
            "urn:trovi:contents:chameleon:x",
            0
        )]));
        artifact.long_description = None;
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        assert!(view.description_html.is_empty());
    }

    #[test]
    fn markdown_renders_to_markup() {
        let artifact = artifact_with_versions(json!([version(
            "v1",
            "2024-01-01T00:00:00Z",
            "urn:trovi:contents:chameleon:x",
            0
        )]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        assert!(view.description_html.contains("<h1>"));
        assert!(view.description_html.contains("Measured under load."));
    }

    #[test]
    fn github_extraction_without_ref() {
        let artifact = artifact_with_versions(json!([version(
            "v1",
            "2024-01-01T00:00:00Z",
            "urn:trovi:contents:git:https://github.com/org/repo.git",
            0
        )]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        let github = view.github.unwrap();
        assert_eq!(github.repo, "org/repo");
        assert!(github.git_ref.is_none());
    }

    #[test]
    fn no_github_version_means_no_source() {
        let artifact = artifact_with_versions(json!([version(
            "v1",
            "2024-01-01T00:00:00Z",
            "urn:trovi:contents:zenodo:10.1234/abcd",
            0
        )]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        assert!(view.github.is_none());
    }

    #[test]
    fn zenodo_version_carries_doi() {
        let artifact = artifact_with_versions(json!([
            version("v1", "2024-01-01T00:00:00Z", "urn:trovi:contents:chameleon:x", 0),
            version("v2", "2024-02-01T00:00:00Z", "urn:trovi:contents:zenodo:10.1234/abcd", 0),
        ]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        assert!(view.has_doi());
        let doi = view.doi.unwrap();
        assert_eq!(doi.doi, "10.1234/abcd");
        assert_eq!(doi.url, "https://doi.org/10.1234/abcd");
        assert!(view.version_views[0].doi.is_none());
        assert!(view.version_views[1].doi.is_some());
    }

    #[test]
    fn git_indicator_is_per_version() {
        let artifact = artifact_with_versions(json!([
            version("v1", "2024-01-01T00:00:00Z", "urn:trovi:contents:git:https://github.com/a/b", 0),
            version("v2", "2024-02-01T00:00:00Z", "urn:trovi:contents:chameleon:x", 0),
        ]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        assert!(view.version_views[0].is_git);
        assert!(!view.version_views[1].is_git);
    }

    #[test]
    fn badges_resolve_through_index() {
        use crate::models::badge::{ArtifactBadge, Badge};

        let artifact = artifact_with_versions(json!([version(
            "v1",
            "2024-01-01T00:00:00Z",
            "urn:trovi:contents:chameleon:x",
            0
        )]));
        let uuid = artifact.uuid;
        let index = BadgeIndex::build(
            vec![Badge {
                name: "reproduced".into(),
                title: None,
                description: None,
                image_url: None,
            }],
            vec![ArtifactBadge {
                artifact_uuid: uuid,
                badge: "reproduced".into(),
            }],
        );
        let view = ArtifactView::derive(artifact, &index);
        assert_eq!(view.badges.len(), 1);
        assert_eq!(view.badges[0].name, "reproduced");
    }

    #[test]
    fn permissions_follow_the_supplied_identity() {
        let artifact = artifact_with_versions(json!([version(
            "v1",
            "2024-01-01T00:00:00Z",
            "urn:trovi:contents:chameleon:x",
            0
        )]));
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());

        let owner = Some("urn:trovi:user:chameleon:alice");
        let collaborator = Some("urn:trovi:user:chameleon:bob");
        let admin = Some("urn:trovi:user:chameleon:carol");
        let stranger = Some("urn:trovi:user:chameleon:mallory");

        assert!(view.is_owned_by(owner));
        assert!(!view.is_owned_by(collaborator));

        assert!(view.can_edit(owner));
        assert!(view.can_edit(collaborator));
        assert!(view.can_edit(admin));
        assert!(!view.can_edit(stranger));
        assert!(!view.can_edit(None));

        assert!(view.can_edit_roles(owner));
        assert!(!view.can_edit_roles(collaborator));
        assert!(view.can_edit_roles(admin));
        assert!(!view.can_edit_roles(None));
    }

    #[test]
    fn portal_share_urls() {
        let artifact = artifact_with_versions(json!([version(
            "v1",
            "2024-01-01T00:00:00Z",
            "urn:trovi:contents:chameleon:x",
            0
        )]));
        let uuid = artifact.uuid;
        let view = ArtifactView::derive(artifact, &BadgeIndex::default());
        let portal = "https://chameleoncloud.org";

        assert_eq!(
            view.launch_url(portal, "v1", None),
            format!("{portal}/experiment/share/{uuid}/version/v1/launch")
        );
        assert_eq!(
            view.download_url(portal, "v1", Some("k123")),
            format!("{portal}/experiment/share/{uuid}/version/v1/download?sharing_key=k123")
        );
        assert_eq!(
            view.daypass_url(portal),
            format!("{portal}/experiment/share/{uuid}/share")
        );
        assert_eq!(
            view.request_daypass_url(portal),
            format!("{portal}/experiment/share/{uuid}/request")
        );
    }
}
