//! Name-safe tokens and container names derived from caller input.

use crate::error::ValidationError;

const SITE_NAME_PREFIX: &str = "docklite-site-";
const DATABASE_NAME_PREFIX: &str = "docklite-db-";
const FALLBACK_TOKEN: &str = "site";

/// Reduce a domain to a lower-case `[a-z0-9-]` token.
///
/// Every character other than an ASCII letter or digit becomes `-`, leading
/// and trailing dashes are trimmed, and an empty result falls back to `site`.
#[must_use]
pub fn sanitize_domain(domain: &str) -> String {
    let replaced: String = domain
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '-' })
        .collect();
    let trimmed = replaced.trim_matches('-');
    if trimmed.is_empty() {
        String::from(FALLBACK_TOKEN)
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Reduce a database name to `[A-Za-z0-9_]`, trimming outer underscores.
///
/// The result may be empty; callers reject that case.
#[must_use]
pub fn sanitize_database_name(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    String::from(replaced.trim_matches('_'))
}

/// Trim and validate a site domain.
///
/// A domain is dot-separated labels of ASCII letters, digits and `-`. That
/// keeps it usable both as a directory name under the sites root and inside
/// a backtick-quoted `Host(...)` routing rule.
///
/// # Errors
///
/// Returns `ValidationError::EmptyDomain` for a blank domain and
/// `ValidationError::InvalidDomain` for any other character or an empty label.
pub fn validate_domain(domain: &str) -> Result<String, ValidationError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDomain);
    }
    let valid_labels = trimmed.split('.').all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    });
    if !valid_labels {
        return Err(ValidationError::InvalidDomain {
            domain: String::from(trimmed),
        });
    }
    Ok(String::from(trimmed))
}

/// Deterministic container name for a site.
#[must_use]
pub fn site_container_name(domain: &str) -> String {
    format!("{SITE_NAME_PREFIX}{}", sanitize_domain(domain))
}

/// Deterministic container name for a database.
#[must_use]
pub fn database_container_name(database: &str) -> String {
    format!("{DATABASE_NAME_PREFIX}{}", sanitize_domain(database))
}
