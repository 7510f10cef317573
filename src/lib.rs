//! Nodecanvas core library
//!
//! Scene model for a node graph editor: nodes with typed sockets, their
//! layout and size, pointer hit testing, interaction state and a drawing
//! contract expressed through the [`rendering::Canvas`] trait.

// Public modules
pub mod assets;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod nodes;
pub mod rendering;
pub mod theme;

// Re-export commonly used types
pub use config::StyleConfig;
pub use error::{ConfigError, NodeError};
pub use nodes::{GraphContext, GraphHit, Node, NodeGraph, NodeId, NodeKind, NodeRegistry, NodeState, Socket, SocketRef};
pub use rendering::{Canvas, PainterCanvas, RecordingCanvas};
pub use theme::Theme;
