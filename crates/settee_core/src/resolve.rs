//! Constructor-input resolution.
//!
//! Pure computation from the options' `{name, url, conn}` triple to a
//! canonical target: a validated name, an optional remote url, and an
//! optional local path. All failures here are raised before any store
//! handle exists.

use crate::config::SetteeOptions;
use crate::error::{CoreError, CoreResult};
use crate::name::validate_name;
use std::path::PathBuf;

/// The canonical addressing of a database handle.
///
/// Exactly one of local-path-derivable or url-present holds, or both for a
/// local database replicating against a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Validated database name.
    pub name: String,
    /// Remote address, when one was given or derived.
    pub url: Option<String>,
    /// Local storage path; present iff an explicit `name` was given.
    pub local_path: Option<PathBuf>,
}

/// Resolves constructor options into a canonical target.
///
/// # Errors
///
/// Fails with a configuration error when `url` and `conn` are both given,
/// when no identifying input is given at all, or when a name can neither be
/// taken from the options nor derived from the url's final path segment.
/// Name validation failures surface as [`CoreError::UnsafeName`].
pub fn resolve(options: &SetteeOptions) -> CoreResult<ResolvedTarget> {
    if options.url.is_some() && options.conn.is_some() {
        return Err(CoreError::configuration(
            "provide only a url or conn option",
        ));
    }
    if options.name.is_none() && options.url.is_none() && options.conn.is_none() {
        return Err(CoreError::configuration("name, url, or conn required"));
    }

    let url = options
        .url
        .clone()
        .or_else(|| options.conn.as_ref().map(|conn| conn.format_url()));

    let raw_name = match (&options.name, &url) {
        (Some(name), _) => name.clone(),
        (None, Some(url)) => name_from_url(url)?,
        // Unreachable: the identifying-input check above covers this.
        (None, None) => return Err(CoreError::configuration("name, url, or conn required")),
    };

    let name = validate_name(&raw_name, options.couchdb_safe())?;

    // A local path exists only for databases created with an explicit name;
    // pure-remote handles have no on-disk footprint.
    let local_path = options
        .name
        .as_ref()
        .map(|name| options.path.clone().unwrap_or_default().join(name));

    Ok(ResolvedTarget {
        name,
        url,
        local_path,
    })
}

/// Derives a database name from a url's final path segment.
fn name_from_url(url: &str) -> CoreResult<String> {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);
    match path.rsplit_once('/') {
        Some((_, segment)) if !segment.is_empty() => Ok(segment.to_string()),
        _ => Err(CoreError::configuration(
            "unable to infer database name from url; add a pathname \
             (e.g. host.org/my-db-name) or pass a name option",
        )),
    }
}
