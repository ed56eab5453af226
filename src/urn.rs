//! Trovi URN parsing and construction.
//!
//! Trovi identifies users, projects, and artifact contents with URNs of
//! the form `urn:trovi:<type>:<provider>:<id>`. Zenodo contents URNs
//! additionally carry a DOI as their final segment.

use crate::error::{Result, TroviError};

/// Identity provider used when constructing user URNs.
pub const USER_PROVIDER: &str = "chameleon";

/// A parsed Trovi URN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedUrn {
    User { provider: String, username: String },
    Project { provider: String, project: String },
    Contents { provider: String, id: String },
}

/// Parse a Trovi URN.
///
/// The URN must split into at least four colon-delimited segments and
/// begin with `urn:trovi`. Contents ids keep any further colon-separated
/// tail so full URLs survive (e.g. a git remote).
pub fn parse(urn: &str) -> Result<ParsedUrn> {
    let parts: Vec<&str> = urn.split(':').collect();
    if parts.len() < 4 {
        return Err(TroviError::MalformedUrn(format!("too few segments in {urn:?}")));
    }
    if parts[0] != "urn" || parts[1] != "trovi" {
        return Err(TroviError::MalformedUrn(format!(
            "{urn:?} does not start with urn:trovi"
        )));
    }

    let provider = parts[3].to_string();
    match parts[2] {
        "user" => Ok(ParsedUrn::User {
            provider,
            username: parts.get(4).unwrap_or(&"").to_string(),
        }),
        "project" => Ok(ParsedUrn::Project {
            provider,
            project: parts.get(4).unwrap_or(&"").to_string(),
        }),
        "contents" => Ok(ParsedUrn::Contents {
            provider,
            id: parts[4..].join(":"),
        }),
        other => Err(TroviError::UnknownUrnType(other.to_string())),
    }
}

/// Extract the DOI from a Zenodo contents URN.
///
/// Requires exactly five colon-delimited segments and the
/// `urn:trovi:contents:zenodo` prefix; the DOI is the final segment,
/// returned verbatim.
pub fn parse_doi(urn: &str) -> Result<String> {
    let parts: Vec<&str> = urn.split(':').collect();
    if parts.len() != 5 {
        return Err(TroviError::InvalidDoiUrn(format!(
            "expected 5 segments, got {} in {urn:?}",
            parts.len()
        )));
    }
    if !urn.starts_with("urn:trovi:contents:zenodo") {
        return Err(TroviError::InvalidDoiUrn(format!(
            "{urn:?} is not a zenodo contents URN"
        )));
    }
    Ok(parts[4].to_string())
}

/// Build a user URN for the default identity provider.
pub fn user_urn(username: &str) -> String {
    format!("urn:trovi:user:{USER_PROVIDER}:{username}")
}

/// Build a git contents URN pointing at `repo` pinned to `git_ref`.
pub fn git_content_urn(repo: &str, git_ref: &str) -> String {
    format!("urn:trovi:contents:git:{repo}@{git_ref}")
}
