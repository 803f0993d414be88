//! Error types for Proxima
//!
//! All modules use `ProximaResult<T>` as their return type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Proxima operations
pub type ProximaResult<T> = Result<T, ProximaError>;

/// Error type returned by proxy construction and processing
pub type TransformError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which step of a proxy invocation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyStage {
    /// Building the transform from the asset and its arguments
    Construct,
    /// Running the transform against the working asset
    Process,
}

impl fmt::Display for ProxyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Construct => write!(f, "construct"),
            Self::Process => write!(f, "process"),
        }
    }
}

/// All errors that can occur in Proxima
#[derive(Error, Debug)]
pub enum ProximaError {
    // Proxy errors
    #[error("Unknown proxy {group}:{name} for tag '{tag}'")]
    UnknownProxy {
        group: String,
        name: String,
        tag: String,
    },

    #[error("Proxy {group}:{name} already registered")]
    ProxyExists { group: String, name: String },

    #[error("Proxy {group}:{name} failed during {stage}: {source}")]
    ProxyExecution {
        group: String,
        name: String,
        stage: ProxyStage,
        #[source]
        source: TransformError,
    },

    // Asset errors
    #[error("Asset not found: {name} (searched: {searched})")]
    AssetNotFound { name: String, searched: String },

    #[error("Invalid tag arguments '{input}': {reason}")]
    TagSyntax { input: String, reason: String },

    // Cache errors
    #[error("Cache entry not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ProximaError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a tag syntax error
    pub fn tag_syntax(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TagSyntax {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a path validation error
    pub fn path_invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::PathInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnknownProxy { .. } => {
                Some("Declare it under [[proxies]] in .proxima.toml, or check the tag name")
            }
            Self::AssetNotFound { .. } => Some("Check [assets] sources in your configuration"),
            Self::ConfigInvalid { .. } => Some("Run: proxima config show"),
            Self::TagSyntax { .. } => Some("Proxies are written as group:name or group:name=value"),
            _ => None,
        }
    }
}
