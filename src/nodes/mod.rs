//! Node system - sockets, nodes, the graph holding them and the built-in kinds

// Core node system modules
pub mod factory;
pub mod graph;
pub mod node;
pub mod socket;

// Node kind implementations
pub mod builtin;

// Re-export core types
pub use graph::{GraphContext, GraphHit, NodeGraph, Wire};
pub use node::{layout_sockets, Node, NodeId, NodeState, SocketSlot, Thumbnail, UninitNode};
pub use socket::{Socket, SocketDirection, SocketRef, WireId};

// Re-export factory types
pub use factory::{DataType, KindCreator, NodeCategory, NodeKind, NodeRegistry, Parameter};
