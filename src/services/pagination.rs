//! Cursor-pagination accumulation over the artifact listing.
//!
//! The listing endpoint's `after` cursor is boundary-inclusive: a page
//! fetched with a cursor repeats the cursor record as its first item.
//! Accumulation drops that duplicate, normalizes each record as it
//! arrives, and stops at the end of the listing or on the first fetch
//! error, returning whatever was gathered so far alongside the error.

use std::future::Future;

use tracing::debug;

use crate::error::{Result, TroviError};
use crate::models::artifact::ArtifactListing;
use crate::services::badge_index::BadgeIndex;
use crate::services::normalizer::ArtifactView;

/// Outcome of driving the listing to exhaustion (or first error).
#[derive(Debug)]
pub struct Accumulation {
    /// Normalized artifacts, in listing order
    pub artifacts: Vec<ArtifactView>,
    /// Error that halted accumulation, if any
    pub error: Option<TroviError>,
}

impl Accumulation {
    /// Whether the full listing was accumulated.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Drive `fetch_page` from the start of the listing until exhaustion.
///
/// Pages are fetched one at a time, in cursor order; each artifact is
/// normalized exactly once, as its page arrives. Retrying a failed fetch
/// is the caller's concern.
pub async fn accumulate_pages<F, Fut>(mut fetch_page: F, badges: &BadgeIndex) -> Accumulation
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ArtifactListing>>,
{
    let mut views: Vec<ArtifactView> = Vec::new();
    let mut after: Option<String> = None;

    loop {
        let page = match fetch_page(after.clone()).await {
            Ok(page) => page,
            Err(err) => {
                return Accumulation {
                    artifacts: views,
                    error: Some(err),
                }
            }
        };

        // Non-initial pages repeat the cursor record first; drop it.
        let skip = usize::from(after.is_some());
        let fresh: Vec<_> = page.artifacts.into_iter().skip(skip).collect();

        after = if page.next.after.is_some() && !fresh.is_empty() {
            fresh.last().map(|artifact| artifact.uuid.to_string())
        } else {
            None
        };

        for artifact in fresh {
            views.push(ArtifactView::derive(artifact, badges));
        }
        debug!(total = views.len(), "accumulated artifact listing page");

        if after.is_none() {
            return Accumulation {
                artifacts: views,
                error: None,
            };
        }
    }
}
