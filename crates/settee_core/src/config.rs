//! Constructor options for a Settee database.

use settee_replication::ReplicateSpec;
use std::path::PathBuf;

/// A structured connection descriptor, an alternative to a url string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Scheme, e.g. `https`.
    pub protocol: String,
    /// Remote host name.
    pub hostname: String,
    /// Remote port; scheme default when absent.
    pub port: Option<u16>,
    /// Path to the database, e.g. `/dbname`.
    pub pathname: String,
}

impl ConnectionInfo {
    /// Creates a descriptor with no port and an empty pathname.
    pub fn new(protocol: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            port: None,
            pathname: String::new(),
        }
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the database pathname.
    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = pathname.into();
        self
    }

    /// Synthesizes a url string using standard composition rules.
    pub fn format_url(&self) -> String {
        let mut url = format!("{}://{}", self.protocol, self.hostname);
        if let Some(port) = self.port {
            url.push_str(&format!(":{port}"));
        }
        if !self.pathname.is_empty() {
            if !self.pathname.starts_with('/') {
                url.push('/');
            }
            url.push_str(&self.pathname);
        }
        url
    }
}

/// Constructor options for [`Database`](crate::Database).
///
/// A database is addressable locally (`name`, with an optional filesystem
/// `path`), remotely (`url` or `conn`), or both (a local database
/// replicating against a remote).
#[derive(Debug, Clone, Default)]
pub struct SetteeOptions {
    /// Logical database identifier. Required unless derivable from the url.
    pub name: Option<String>,
    /// Remote database address. Mutually exclusive with `conn`.
    pub url: Option<String>,
    /// Structured connection descriptor. Mutually exclusive with `url`.
    pub conn: Option<ConnectionInfo>,
    /// Enforce identifier charset restrictions. Defaults to true.
    pub couchdb_safe: Option<bool>,
    /// Local filesystem root for on-disk storage.
    pub path: Option<PathBuf>,
    /// Request a replication session at construction time.
    pub replicate: Option<ReplicateSpec>,
    /// Whether a requested replication runs indefinitely. Defaults to true.
    pub replicate_live: Option<bool>,
    /// Enable diagnostic output. No behavioral effect.
    pub verbose: bool,
}

impl SetteeOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the database name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the remote url.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the structured connection descriptor.
    pub fn with_conn(mut self, conn: ConnectionInfo) -> Self {
        self.conn = Some(conn);
        self
    }

    /// Sets charset enforcement.
    pub fn with_couchdb_safe(mut self, enforce: bool) -> Self {
        self.couchdb_safe = Some(enforce);
        self
    }

    /// Sets the local filesystem root.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Requests replication at construction time.
    pub fn with_replicate(mut self, spec: ReplicateSpec) -> Self {
        self.replicate = Some(spec);
        self
    }

    /// Sets whether requested replication runs indefinitely.
    pub fn with_replicate_live(mut self, live: bool) -> Self {
        self.replicate_live = Some(live);
        self
    }

    /// Enables diagnostic output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Charset enforcement with the default applied.
    pub fn couchdb_safe(&self) -> bool {
        self.couchdb_safe.unwrap_or(true)
    }

    /// Live-replication flag with the default applied.
    pub fn replicate_live(&self) -> bool {
        self.replicate_live.unwrap_or(true)
    }
}
