//! Replication mode and option resolution.

use crate::error::{ReplicationError, ReplicationResult};
use settee_store::{ReplicationMode, ReplicationOptions};

/// Parses a replication mode string.
///
/// Only `out`, `in`, and `sync` are canonical; the historical `both` alias
/// is rejected like any other unknown mode.
pub fn parse_mode(mode: &str) -> ReplicationResult<ReplicationMode> {
    match mode {
        "out" => Ok(ReplicationMode::Out),
        "in" => Ok(ReplicationMode::In),
        "sync" => Ok(ReplicationMode::Sync),
        other => Err(ReplicationError::InvalidMode { mode: other.into() }),
    }
}

/// How a caller requests replication at construction time.
///
/// The shorthand form names a mode and takes the default options; the
/// configured form names a mode and passes its options through to the
/// engine. Either way, exactly one mode is honored per request.
#[derive(Debug, Clone)]
pub enum ReplicateSpec {
    /// Bare mode string: `"out"`, `"in"`, or `"sync"`.
    Shorthand(String),
    /// Mode string plus explicit engine options.
    Configured {
        /// Mode string, validated at session start.
        mode: String,
        /// Options passed through to the replication primitive.
        options: ReplicationOptions,
    },
}

impl ReplicateSpec {
    /// Creates a shorthand spec.
    pub fn shorthand(mode: impl Into<String>) -> Self {
        Self::Shorthand(mode.into())
    }

    /// Creates a configured spec.
    pub fn with_options(mode: impl Into<String>, options: ReplicationOptions) -> Self {
        Self::Configured {
            mode: mode.into(),
            options,
        }
    }

    /// Resolves the spec into a validated mode and concrete options.
    ///
    /// Shorthand implies `{retry: true}` with `live` taken from the
    /// caller-level `live_default` flag; configured options pass through
    /// untouched.
    pub fn resolve(
        &self,
        live_default: bool,
    ) -> ReplicationResult<(ReplicationMode, ReplicationOptions)> {
        match self {
            ReplicateSpec::Shorthand(mode) => {
                let mode = parse_mode(mode)?;
                let options = ReplicationOptions::live_retry().with_live(live_default);
                Ok((mode, options))
            }
            ReplicateSpec::Configured { mode, options } => {
                let mode = parse_mode(mode)?;
                Ok((mode, options.clone()))
            }
        }
    }
}
