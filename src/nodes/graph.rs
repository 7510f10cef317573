//! Node graph data structures and operations

use super::factory::NodeRegistry;
use super::node::{Node, NodeId};
use super::socket::{SocketRef, WireId};
use crate::assets::Assets;
use crate::error::NodeError;
use crate::rendering::Canvas;
use crate::theme::{default_theme, Theme};
use egui::{Pos2, Rect};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// Read-only resources handed to every node of a graph
#[derive(Debug, Clone)]
pub struct GraphContext {
    pub theme: Arc<Theme>,
    pub assets: Arc<Assets>,
}

impl GraphContext {
    pub fn new(theme: Arc<Theme>, assets: Arc<Assets>) -> Self {
        Self { theme, assets }
    }
}

impl Default for GraphContext {
    /// Process-wide default theme and shared assets
    fn default() -> Self {
        Self::new(default_theme(), Assets::shared())
    }
}

/// A connection from an output socket to an input socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    pub id: WireId,
    pub output: SocketRef,
    pub input: SocketRef,
}

impl Wire {
    /// Whether either end sits on `node`
    pub fn touches(&self, node: NodeId) -> bool {
        self.output.node == node || self.input.node == node
    }
}

/// Result of a graph-level hit test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphHit {
    Socket(SocketRef),
    Node(NodeId),
}

/// Nodes in draw order plus the wires between them
#[derive(Debug)]
pub struct NodeGraph {
    context: GraphContext,
    registry: NodeRegistry,
    /// Back to front; the last node is drawn on top
    nodes: Vec<Node>,
    wires: BTreeMap<WireId, Wire>,
    next_wire_id: WireId,
}

impl NodeGraph {
    /// Creates a new empty node graph
    pub fn new(context: GraphContext, registry: NodeRegistry) -> Self {
        Self {
            context,
            registry,
            nodes: Vec::new(),
            wires: BTreeMap::new(),
            next_wire_id: 0,
        }
    }

    pub fn context(&self) -> &GraphContext {
        &self.context
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    // === Nodes ===

    /// Creates a node of the registered type `idname` at `position` and
    /// returns its id
    pub fn add_node(&mut self, idname: &str, position: Pos2) -> Result<NodeId, NodeError> {
        let kind = self.registry.create(idname).ok_or_else(|| {
            log::warn!("Cannot add node: no type registered as '{}'", idname);
            NodeError::UnknownNodeType(idname.to_string())
        })?;

        let mut node = Node::create(&self.context, Uuid::new_v4(), kind).init(idname)?;
        node.set_position(position.x, position.y);
        Ok(self.insert_node(node))
    }

    /// Adds an already initialized node on top of the draw order.
    ///
    /// A node with the same id is removed first, wires included.
    pub fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        if self.remove_node(id).is_some() {
            log::debug!("Replaced node {}", id);
        }
        log::debug!("Added node {} '{}' at {:?}", id, node.idname(), node.position());
        self.nodes.push(node);
        id
    }

    /// Removes a node and every wire attached to it
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let index = self.index_of(id)?;
        let node = self.nodes.remove(index);

        let attached: Vec<WireId> = self
            .wires
            .values()
            .filter(|wire| wire.touches(id))
            .map(|wire| wire.id)
            .collect();
        for wire in attached {
            self.disconnect(wire);
        }

        log::debug!("Removed node {} '{}'", id, node.idname());
        Some(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id() == id)
    }

    /// Nodes in draw order, topmost last
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Moves a node to the top of the draw order
    pub fn raise_to_top(&mut self, id: NodeId) {
        if let Some(index) = self.index_of(id) {
            let node = self.nodes.remove(index);
            self.nodes.push(node);
        }
    }

    /// Rebuilds a node's sockets from its current parameters.
    ///
    /// Wires are re-attached by socket idname; wires whose socket no longer
    /// exists are dropped.
    pub fn reinit_node(&mut self, id: NodeId) -> Result<(), NodeError> {
        let node = self.node_mut(id).ok_or(NodeError::NodeNotFound(id))?;
        node.rebuild_sockets()?;

        let attached: Vec<Wire> = self
            .wires
            .values()
            .filter(|wire| wire.touches(id))
            .cloned()
            .collect();

        let mut dropped = 0;
        for wire in attached {
            let ends = [&wire.output, &wire.input];
            let resolved = ends
                .iter()
                .filter(|end| end.node == id)
                .all(|end| self.socket_exists(end));

            if resolved {
                for end in ends.into_iter().filter(|end| end.node == id) {
                    self.attach(end, wire.id);
                }
            } else {
                self.disconnect(wire.id);
                dropped += 1;
            }
        }

        log::debug!("Reinitialized node {} ({} wires dropped)", id, dropped);
        Ok(())
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id() == id)
    }

    // === Wires ===

    /// Connects an output socket to an input socket.
    ///
    /// Only checks that both sockets exist.
    pub fn connect(&mut self, output: SocketRef, input: SocketRef) -> Result<WireId, NodeError> {
        self.check_socket(&output)?;
        self.check_socket(&input)?;

        let id = self.next_wire_id;
        self.next_wire_id += 1;

        self.attach(&output, id);
        self.attach(&input, id);
        log::debug!(
            "Connected {}:{} -> {}:{} as wire {}",
            output.node,
            output.socket,
            input.node,
            input.socket,
            id
        );
        self.wires.insert(id, Wire { id, output, input });
        Ok(id)
    }

    /// Removes a wire and detaches it from both sockets
    pub fn disconnect(&mut self, id: WireId) -> Option<Wire> {
        let wire = self.wires.remove(&id)?;
        for end in [&wire.output, &wire.input] {
            if let Some(socket) = self
                .node_mut(end.node)
                .and_then(|node| node.socket_mut(&end.socket))
            {
                socket.detach_wire(id);
            }
        }
        log::debug!("Disconnected wire {}", id);
        Some(wire)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(&id)
    }

    /// Wires ordered by id
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.values()
    }

    /// Graph-space positions of a wire's output and input sockets
    pub fn wire_endpoints(&self, id: WireId) -> Option<(Pos2, Pos2)> {
        let wire = self.wires.get(&id)?;
        Some((
            self.socket_position(&wire.output)?,
            self.socket_position(&wire.input)?,
        ))
    }

    /// Graph-space position of a socket
    pub fn socket_position(&self, socket: &SocketRef) -> Option<Pos2> {
        let node = self.node(socket.node)?;
        node.socket(&socket.socket)
            .map(|s| s.absolute_position(node.position()))
    }

    fn socket_exists(&self, socket: &SocketRef) -> bool {
        self.node(socket.node)
            .is_some_and(|node| node.socket(&socket.socket).is_some())
    }

    fn check_socket(&self, socket: &SocketRef) -> Result<(), NodeError> {
        let Some(node) = self.node(socket.node) else {
            log::warn!("Cannot connect: node {} not found", socket.node);
            return Err(NodeError::NodeNotFound(socket.node));
        };
        if node.socket(&socket.socket).is_none() {
            log::warn!("Cannot connect: node {} has no socket '{}'", socket.node, socket.socket);
            return Err(NodeError::SocketNotFound {
                node: socket.node,
                socket: socket.socket.clone(),
            });
        }
        Ok(())
    }

    fn attach(&mut self, socket: &SocketRef, wire: WireId) {
        if let Some(socket) = self
            .node_mut(socket.node)
            .and_then(|node| node.socket_mut(&socket.socket))
        {
            socket.attach_wire(wire);
        }
    }

    // === Interaction ===

    /// Resolves a pointer event against the topmost node under `pos`.
    ///
    /// Each node runs its own hit test, so a primary press on an expand
    /// affordance toggles that node. A node counts as hit through one of its
    /// sockets, its affordance, or its body.
    pub fn hit_test(&mut self, pos: Pos2, primary_down: bool) -> Option<GraphHit> {
        for node in self.nodes.iter_mut().rev() {
            let on_affordance = node.expand_affordance_hit(pos);
            if let Some(socket) = node.hit_test(pos, primary_down) {
                return Some(GraphHit::Socket(socket.socket_ref()));
            }
            if on_affordance || node.contains(pos) {
                return Some(GraphHit::Node(node.id()));
            }
        }
        None
    }

    /// Selects a node and makes it the active one.
    ///
    /// Without `multi` the selection is replaced. With `multi` the node's
    /// selection is toggled and it is active only if it ends up selected.
    pub fn select_node(&mut self, id: NodeId, multi: bool) {
        if self.index_of(id).is_none() {
            log::warn!("Cannot select node {}: not found", id);
            return;
        }

        for node in &mut self.nodes {
            node.set_active(false);
            if node.id() == id {
                let selected = !(multi && node.is_selected());
                node.set_selected(selected);
                node.set_active(selected);
            } else if !multi {
                node.set_selected(false);
            }
        }
    }

    /// Deselects every node; no node stays active
    pub fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.set_selected(false);
            node.set_active(false);
        }
    }

    /// Ids of selected nodes in draw order
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.is_selected())
            .map(Node::id)
            .collect()
    }

    /// Nodes whose body intersects `rect`, edges included
    pub fn nodes_in_rect(&self, rect: Rect) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.rect().intersects(rect))
            .map(Node::id)
            .collect()
    }

    /// Draws every node back to front
    pub fn draw(&self, canvas: &mut impl Canvas) {
        for node in &self.nodes {
            node.draw(canvas);
        }
    }
}
