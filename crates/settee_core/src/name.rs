//! Database-name charset validation.

use crate::error::{CoreError, CoreResult};

/// Lower-cases `name` and strips every character outside the couchdb-safe
/// charset `[a-z0-9_$()+-]`.
///
/// A `/` is kept: it is legal in path contexts (a name derived from a url
/// pathname), though not meaningful in a standalone name.
pub fn couch_safe(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a'..='z' | '0'..='9' | '_' | '$' | '(' | ')' | '+' | '-' | '/'))
        .collect()
}

/// Validates a database name.
///
/// With `enforce` set, the name must already equal its lower-cased,
/// filtered form; otherwise the call fails with [`CoreError::UnsafeName`]
/// carrying both the unsafe and the would-be-safe variants. With `enforce`
/// unset the name passes through as-is and the caller assumes the risk of
/// incompatibility with the engine's identifier rules.
pub fn validate_name(name: &str, enforce: bool) -> CoreResult<String> {
    if !enforce {
        return Ok(name.to_string());
    }
    let safe = couch_safe(name);
    if name == safe {
        Ok(safe)
    } else {
        Err(CoreError::UnsafeName {
            unsafe_name: name.to_string(),
            safe_name: safe,
        })
    }
}
