//! Error types for node construction, graph operations and configuration

use crate::nodes::{DataType, NodeCategory, NodeId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building nodes or editing the graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A socket declared a datatype the color table does not know.
    #[error("socket '{socket}' declares unknown datatype '{datatype}'")]
    UnknownDatatype { socket: String, datatype: DataType },

    /// A node kind declared a category the color table does not know.
    #[error("unknown node category '{0}'")]
    UnknownCategory(NodeCategory),

    /// Two sockets of one node share an idname.
    #[error("duplicate socket idname '{socket}'")]
    DuplicateSocket { socket: String },

    /// No kind is registered under this idname.
    #[error("no node type registered as '{0}'")]
    UnknownNodeType(String),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("node {node} has no socket '{socket}'")]
    SocketNotFound { node: NodeId, socket: String },
}

/// Errors raised while loading a style configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read style file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid style file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A color entry is not `#RRGGBB` or `#RRGGBBAA`.
    #[error("invalid color '{value}' for '{key}'")]
    InvalidColor { key: String, value: String },
}
