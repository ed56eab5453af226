//! Client-side artifact filtering.
//!
//! Pure, order-preserving filtering over already-normalized views.
//! Every criterion is opt-in: an empty or false criterion passes
//! everything, and criteria combine with logical AND.

use crate::models::artifact::Visibility;
use crate::services::normalizer::ArtifactView;

/// Filter criteria for the artifact listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactFilter {
    /// Case-insensitive substring over titles, descriptions, and authors
    pub search_text: String,
    /// Artifact must carry every listed tag
    pub tags: Vec<String>,
    /// Artifact must carry every listed badge name
    pub badges: Vec<String>,
    /// Keep only artifacts the current user can edit
    pub owned_only: bool,
    /// Keep only public artifacts; a DOI makes an artifact public
    pub public_only: bool,
    /// Keep only artifacts with a DOI
    pub doi_only: bool,
    /// Keep only artifacts linking other artifacts (collections)
    pub collections_only: bool,
}

/// Apply `filter` to `artifacts`, preserving input order.
///
/// `current_user_urn` is the identity the ownership criterion is
/// evaluated against; it is passed in at call time because the signed-in
/// user can change after the views were derived.
pub fn filter_artifacts<'a, I>(
    artifacts: I,
    filter: &ArtifactFilter,
    current_user_urn: Option<&str>,
) -> Vec<&'a ArtifactView>
where
    I: IntoIterator<Item = &'a ArtifactView>,
{
    let search = filter.search_text.to_lowercase();
    artifacts
        .into_iter()
        .filter(|view| matches_search(view, &search))
        .filter(|view| carries_all_tags(view, &filter.tags))
        .filter(|view| carries_all_badges(view, &filter.badges))
        .filter(|view| !filter.owned_only || view.can_edit(current_user_urn))
        .filter(|view| {
            !filter.public_only
                || view.artifact.visibility == Visibility::Public
                || view.has_doi()
        })
        .filter(|view| !filter.doi_only || view.has_doi())
        .filter(|view| !filter.collections_only || !view.artifact.linked_artifacts.is_empty())
        .collect()
}

fn matches_search(view: &ArtifactView, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let artifact = &view.artifact;
    let in_artifact = [
        Some(artifact.title.as_str()),
        artifact.short_description.as_deref(),
        artifact.long_description.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(search));

    let in_authors = artifact.authors.iter().any(|author| {
        [
            Some(author.full_name.as_str()),
            author.affiliation.as_deref(),
            author.email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(search))
    });

    in_artifact || in_authors
}

fn carries_all_tags(view: &ArtifactView, selected: &[String]) -> bool {
    selected.is_empty() || selected.iter().all(|tag| view.artifact.tags.contains(tag))
}

fn carries_all_badges(view: &ArtifactView, selected: &[String]) -> bool {
    selected.is_empty()
        || selected
            .iter()
            .all(|name| view.badges.iter().any(|badge| badge.name == *name))
}
