//! Socket types: the typed connection points laid out on a node

use super::factory::DataType;
use super::node::NodeId;
use crate::constants::socket::{HIT_RADIUS, LABEL_MARGIN, RADIUS};
use crate::error::NodeError;
use crate::rendering::Canvas;
use crate::theme::Theme;
use egui::{Align2, Color32, Pos2, Stroke, Vec2};

/// Handle of a wire owned by the graph
pub type WireId = usize;

/// Direction of a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketDirection {
    Input,
    Output,
}

/// Stable reference to a socket: owning node plus socket idname.
///
/// Socket objects do not survive a relayout, so anything outside the node
/// refers to sockets this way and resolves them again when needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketRef {
    pub node: NodeId,
    pub socket: String,
}

impl SocketRef {
    pub fn new(node: NodeId, socket: impl Into<String>) -> Self {
        Self {
            node,
            socket: socket.into(),
        }
    }
}

/// A connection point on a node
#[derive(Debug, Clone)]
pub struct Socket {
    idname: String,
    label: String,
    datatype: DataType,
    direction: SocketDirection,
    /// Owning node, never dereferenced by the socket itself
    node: NodeId,
    /// Relative to the owning node's top-left corner
    position: Pos2,
    color: Color32,
    wires: Vec<WireId>,
}

impl Socket {
    /// Creates a socket, resolving its color from the datatype table.
    ///
    /// Fails when the datatype has no color: the node declared a datatype
    /// the editor does not know.
    pub(crate) fn new(
        node: NodeId,
        label: impl Into<String>,
        idname: impl Into<String>,
        datatype: DataType,
        direction: SocketDirection,
        position: Pos2,
        theme: &Theme,
    ) -> Result<Self, NodeError> {
        let idname = idname.into();
        let color = theme.datatype_color(&datatype, &idname)?;
        Ok(Self {
            idname,
            label: label.into(),
            datatype,
            direction,
            node,
            position,
            color,
            wires: Vec::new(),
        })
    }

    pub fn idname(&self) -> &str {
        &self.idname
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn datatype(&self) -> &DataType {
        &self.datatype
    }

    pub fn direction(&self) -> SocketDirection {
        self.direction
    }

    /// Checks if this socket is an input
    pub fn is_input(&self) -> bool {
        matches!(self.direction, SocketDirection::Input)
    }

    /// Checks if this socket is an output
    pub fn is_output(&self) -> bool {
        matches!(self.direction, SocketDirection::Output)
    }

    /// Id of the node this socket belongs to
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Position relative to the owning node
    pub fn position(&self) -> Pos2 {
        self.position
    }

    /// Position in graph space, given the owning node's position
    pub fn absolute_position(&self, node_position: Pos2) -> Pos2 {
        node_position + self.position.to_vec2()
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    /// Stable reference to this socket
    pub fn socket_ref(&self) -> SocketRef {
        SocketRef::new(self.node, self.idname.clone())
    }

    /// Wires attached to this socket. The graph owns them.
    pub fn wires(&self) -> &[WireId] {
        &self.wires
    }

    pub(crate) fn attach_wire(&mut self, wire: WireId) {
        if !self.wires.contains(&wire) {
            self.wires.push(wire);
        }
    }

    pub(crate) fn detach_wire(&mut self, wire: WireId) {
        self.wires.retain(|w| *w != wire);
    }

    /// Returns true if `local`, given in the owning node's space, lies
    /// strictly within the hit radius of the socket.
    pub fn hit_test(&self, local: Pos2) -> bool {
        let delta = local - self.position;
        delta.length() < HIT_RADIUS
    }

    /// Draws the connector point, then the label on the side facing away
    /// from the node body. `label_color` is the owning node's label color.
    pub fn draw(
        &self,
        canvas: &mut impl Canvas,
        node_position: Pos2,
        theme: &Theme,
        label_color: Color32,
    ) {
        let center = self.absolute_position(node_position);
        canvas.circle(
            center,
            RADIUS,
            self.color,
            Stroke::new(1.0, theme.colors.socket_border),
        );

        let (anchor, offset) = match self.direction {
            SocketDirection::Input => (Align2::LEFT_CENTER, Vec2::new(LABEL_MARGIN, 0.0)),
            SocketDirection::Output => (Align2::RIGHT_CENTER, Vec2::new(-LABEL_MARGIN, 0.0)),
        };
        canvas.text(center + offset, anchor, &self.label, label_color);
    }
}
