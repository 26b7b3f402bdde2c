//! Error types for faulttree-core

use thiserror::Error;

use crate::node::NodeId;

/// Failure to load a JSON document through the data store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Path escapes the data directory or is empty
    #[error("Invalid path: {path}")]
    InvalidPath { path: String },

    /// Transport or file system failure
    #[error("Failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },

    /// Non-success HTTP status
    #[error("Failed to fetch {path}: HTTP {status}")]
    Status { path: String, status: u16 },

    /// Document is not valid JSON
    #[error("Malformed JSON in {path}: {reason}")]
    Parse { path: String, reason: String },
}

impl LoadError {
    /// Create a fetch error
    pub fn fetch(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Fetch {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// The path the failed load was addressed by
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidPath { path }
            | Self::Fetch { path, .. }
            | Self::Status { path, .. }
            | Self::Parse { path, .. } => path,
        }
    }
}

/// Failure to produce detail content for one node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentLoadError {
    /// The node's external file could not be loaded
    #[error("Failed to load details for {node_id}: {source}")]
    Load {
        node_id: NodeId,
        #[source]
        source: LoadError,
    },

    /// The external file loaded but is not a detail document
    #[error("Invalid detail document {path} for {node_id}: {reason}")]
    Shape {
        node_id: NodeId,
        path: String,
        reason: String,
    },
}

impl ContentLoadError {
    pub fn node_id(&self) -> &NodeId {
        match self {
            Self::Load { node_id, .. } | Self::Shape { node_id, .. } => node_id,
        }
    }
}

/// Errors that can occur while building or browsing a fault tree
#[derive(Debug, Error)]
pub enum Error {
    /// Data store error
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The main document does not have the fault tree shape
    #[error("Invalid fault tree: {0}")]
    Schema(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for fault tree operations
pub type Result<T> = std::result::Result<T, Error>;
