//! Node types and core node functionality: socket layout, sizing, hit testing
//! and the drawing contract

use super::factory::{DataType, NodeCategory, NodeKind, Parameter};
use super::graph::GraphContext;
use super::socket::{Socket, SocketDirection};
use crate::assets::empty_bitmap;
use crate::constants::{expand_icon, layout, node as dims, socket as socket_consts};
use crate::error::NodeError;
use crate::geometry::{change_lightness, overlaps, rect_xywh, to_local};
use crate::rendering::{Canvas, ImageKey};
use egui::{Align2, Color32, ColorImage, Pos2, Rect, Stroke, Vec2};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a node
pub type NodeId = Uuid;

/// Interaction and display flags. Independent of each other: a node may be
/// selected and active at the same time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    pub selected: bool,
    pub active: bool,
    pub muted: bool,
    pub expanded: bool,
}

/// One socket slot computed by [`layout_sockets`]
#[derive(Debug, Clone, PartialEq)]
pub struct SocketSlot {
    pub label: String,
    pub idname: String,
    pub datatype: DataType,
    pub direction: SocketDirection,
    pub position: Pos2,
}

/// Computes socket slots and the socket band offset.
///
/// Outputs come first, then one input per parameter in order. Slot `i` sits
/// at `y = 40 + 19 * i`; inputs on the left edge, outputs on the right edge
/// of a node `width` wide. The returned offset is `60 + 12 * i` for the last
/// slot, or 60 without slots.
pub fn layout_sockets(
    parameters: &[Parameter],
    is_output: bool,
    output_datatype: &DataType,
    width: f32,
) -> (Vec<SocketSlot>, f32) {
    let outputs = (!is_output).then(|| {
        (
            socket_consts::OUTPUT_LABEL.to_string(),
            socket_consts::OUTPUT_IDNAME.to_string(),
            output_datatype.clone(),
            SocketDirection::Output,
        )
    });
    let inputs = parameters.iter().map(|p| {
        (
            p.label.clone(),
            p.idname.clone(),
            p.datatype.clone(),
            SocketDirection::Input,
        )
    });

    let mut last_socket_offset = layout::SOCKET_BAND_START;
    let slots = outputs
        .into_iter()
        .chain(inputs)
        .enumerate()
        .map(|(i, (label, idname, datatype, direction))| {
            let x = match direction {
                SocketDirection::Input => layout::SOCKET_SIDE_MARGIN,
                SocketDirection::Output => width - layout::SOCKET_SIDE_MARGIN - 1.0,
            };
            let y = layout::SOCKET_TOP_MARGIN + layout::SOCKET_ROW_HEIGHT * i as f32;
            last_socket_offset = layout::SOCKET_BAND_START + layout::SOCKET_BAND_STEP * i as f32;
            SocketSlot {
                label,
                idname,
                datatype,
                direction,
                position: Pos2::new(x, y),
            }
        })
        .collect();

    (slots, last_socket_offset)
}

/// Sizes derived from the socket band and the thumbnail
#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutCache {
    last_socket_offset: f32,
    normal_size: Vec2,
    expanded_size: Vec2,
}

/// Thumbnail bitmap with a counter bumped on every replacement
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub image: Arc<ColorImage>,
    pub generation: u64,
}

impl Thumbnail {
    fn empty() -> Self {
        Self {
            image: Arc::new(empty_bitmap(dims::EMPTY_THUMBNAIL_SIZE, dims::EMPTY_THUMBNAIL_SIZE)),
            generation: 0,
        }
    }

    /// Bitmap height in graph units
    pub fn height(&self) -> f32 {
        self.image.size[1] as f32
    }

    /// Bitmap width in graph units
    pub fn width(&self) -> f32 {
        self.image.size[0] as f32
    }
}

/// A node that has an id and a kind but no sockets or size yet.
///
/// Call [`UninitNode::init`] to get a usable [`Node`].
#[derive(Debug)]
pub struct UninitNode {
    id: NodeId,
    kind: Box<dyn NodeKind>,
    context: GraphContext,
}

impl UninitNode {
    /// Lays out sockets, resolves colors and computes the size.
    ///
    /// Fails if the kind declares a category or a socket datatype the theme
    /// has no color for, or two sockets with the same idname.
    pub fn init(self, idname: impl Into<String>) -> Result<Node, NodeError> {
        let UninitNode { id, kind, context } = self;
        let thumbnail = kind.output_datatype().is_image().then(Thumbnail::empty);

        let mut node = Node {
            id,
            idname: String::new(),
            parameters: kind.parameters(),
            kind,
            context,
            position: Pos2::ZERO,
            size: Vec2::new(dims::DEFAULT_WIDTH, dims::DEFAULT_HEIGHT),
            state: NodeState::default(),
            sockets: Vec::new(),
            layout: LayoutCache {
                last_socket_offset: layout::SOCKET_BAND_START,
                normal_size: Vec2::new(dims::DEFAULT_WIDTH, dims::DEFAULT_HEIGHT),
                expanded_size: Vec2::new(dims::DEFAULT_WIDTH, dims::DEFAULT_HEIGHT),
            },
            thumbnail,
            header_color: Color32::GRAY,
        };

        node.init_sockets()?;
        node.init_header_color()?;
        node.init_size();
        node.idname = idname.into();

        log::debug!(
            "Initialized node {} '{}' with {} sockets, size {:?}",
            node.id,
            node.idname,
            node.sockets.len(),
            node.size
        );
        Ok(node)
    }
}

/// A node in the graph: sockets, geometry and interaction state
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    idname: String,
    kind: Box<dyn NodeKind>,
    context: GraphContext,
    position: Pos2,
    size: Vec2,
    state: NodeState,
    parameters: Vec<Parameter>,
    sockets: Vec<Socket>,
    layout: LayoutCache,
    thumbnail: Option<Thumbnail>,
    header_color: Color32,
}

impl Node {
    /// Creates a node for `kind` with the given id. The node must be
    /// initialized before use.
    pub fn create(context: &GraphContext, id: NodeId, kind: Box<dyn NodeKind>) -> UninitNode {
        UninitNode {
            id,
            kind,
            context: context.clone(),
        }
    }

    // === Layout ===

    /// Rebuilds the socket list from the current parameters.
    ///
    /// Socket idnames must be unique within the node. The new list is built
    /// completely before it replaces the old one; on error the node keeps its
    /// previous sockets.
    fn init_sockets(&mut self) -> Result<(), NodeError> {
        let (slots, last_socket_offset) = layout_sockets(
            &self.parameters,
            self.kind.is_output(),
            &self.kind.output_datatype(),
            dims::DEFAULT_WIDTH,
        );

        let duplicate = {
            let mut seen = HashSet::new();
            slots
                .iter()
                .find(|slot| !seen.insert(slot.idname.as_str()))
                .map(|slot| slot.idname.clone())
        };
        if let Some(socket) = duplicate {
            log::warn!("Node {} declares socket '{}' twice", self.id, socket);
            return Err(NodeError::DuplicateSocket { socket });
        }

        let sockets = slots
            .into_iter()
            .map(|slot| {
                Socket::new(
                    self.id,
                    slot.label,
                    slot.idname,
                    slot.datatype,
                    slot.direction,
                    slot.position,
                    &self.context.theme,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.sockets = sockets;
        self.layout.last_socket_offset = last_socket_offset;
        Ok(())
    }

    fn init_header_color(&mut self) -> Result<(), NodeError> {
        self.header_color = self.context.theme.category_color(&self.kind.category())?;
        Ok(())
    }

    fn init_size(&mut self) {
        self.layout.normal_size = Vec2::new(
            dims::DEFAULT_WIDTH,
            self.layout.last_socket_offset + dims::Y_PADDING * 2.0,
        );
        self.update_expanded_size();
        self.apply_size();
    }

    fn update_expanded_size(&mut self) {
        if let Some(thumbnail) = &self.thumbnail {
            self.layout.expanded_size = Vec2::new(
                dims::DEFAULT_WIDTH,
                self.layout.last_socket_offset + thumbnail.height() + dims::THUMB_PADDING * 2.0,
            );
        }
    }

    /// Sets the displayed size from the cache for the current mode
    fn apply_size(&mut self) {
        self.size = if self.state.expanded && self.has_thumbnail() {
            self.layout.expanded_size
        } else {
            self.layout.normal_size
        };
    }

    /// Re-reads the parameters from the kind and lays the node out again.
    ///
    /// Every socket is replaced, so wire handles are gone afterwards; the
    /// graph re-attaches them by socket idname.
    pub fn rebuild_sockets(&mut self) -> Result<(), NodeError> {
        let previous = std::mem::replace(&mut self.parameters, self.kind.parameters());
        if let Err(err) = self.init_sockets() {
            self.parameters = previous;
            return Err(err);
        }

        match (self.kind.output_datatype().is_image(), self.thumbnail.is_some()) {
            (true, false) => self.thumbnail = Some(Thumbnail::empty()),
            (false, true) => {
                self.thumbnail = None;
                self.state.expanded = false;
            }
            _ => {}
        }
        self.init_size();

        log::debug!("Rebuilt {} sockets for node {}", self.sockets.len(), self.id);
        Ok(())
    }

    // === Identity and kind queries ===

    /// Id assigned at creation
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Registered type name the node was initialized with
    pub fn idname(&self) -> &str {
        &self.idname
    }

    /// Header text, from the node kind
    pub fn label(&self) -> &str {
        self.kind.label()
    }

    /// Category selecting the header color
    pub fn category(&self) -> NodeCategory {
        self.kind.category()
    }

    /// Datatype of the output socket
    pub fn output_datatype(&self) -> DataType {
        self.kind.output_datatype()
    }

    /// Graph output nodes have inputs only
    pub fn is_output_node(&self) -> bool {
        self.kind.is_output()
    }

    /// Only image-producing nodes carry a thumbnail
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    /// The node's kind
    pub fn kind(&self) -> &dyn NodeKind {
        self.kind.as_ref()
    }

    /// Parameters the sockets were laid out from
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Category color resolved at init, before lightening
    pub fn header_color(&self) -> Color32 {
        self.header_color
    }

    // === Sockets ===

    /// Sockets in layout order: the output first, then one input per parameter
    pub fn sockets(&self) -> &[Socket] {
        &self.sockets
    }

    /// Finds a socket by idname
    pub fn socket(&self, idname: &str) -> Option<&Socket> {
        self.sockets.iter().find(|s| s.idname() == idname)
    }

    /// Finds a socket by idname for wire bookkeeping
    pub(crate) fn socket_mut(&mut self, idname: &str) -> Option<&mut Socket> {
        self.sockets.iter_mut().find(|s| s.idname() == idname)
    }

    // === Geometry ===

    /// Top-left corner in graph space
    pub fn position(&self) -> Pos2 {
        self.position
    }

    /// Moves the top-left corner to `(x, y)`
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Pos2::new(x, y);
    }

    /// Moves the node by `delta`
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Displayed size for the current mode
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Overrides the size of the current display mode.
    ///
    /// Updates the cached normal or expanded size as well, so switching modes
    /// back and forth returns to the overridden value. The next layout pass
    /// recomputes both from the sockets and thumbnail.
    pub fn set_size(&mut self, size: Vec2) {
        if self.state.expanded && self.has_thumbnail() {
            self.layout.expanded_size = size;
        } else {
            self.layout.normal_size = size;
        }
        self.size = size;
    }

    /// Bounding rectangle in graph space
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    /// Vertical offset where the socket band ends and the thumbnail band
    /// begins, relative to the node's top edge
    pub fn last_socket_offset(&self) -> f32 {
        self.layout.last_socket_offset
    }

    /// Size while collapsed
    pub fn normal_size(&self) -> Vec2 {
        self.layout.normal_size
    }

    /// Size while expanded; only meaningful for nodes with a thumbnail
    pub fn expanded_size(&self) -> Vec2 {
        self.layout.expanded_size
    }

    // === State ===

    /// Snapshot of all four flags
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Checks if the node is selected
    pub fn is_selected(&self) -> bool {
        self.state.selected
    }

    /// Marks the node as selected or not
    pub fn set_selected(&mut self, selected: bool) {
        self.state.selected = selected;
    }

    /// Checks if the node is the active one
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Marks the node as active or not
    pub fn set_active(&mut self, active: bool) {
        self.state.active = active;
    }

    /// Checks if the node is muted
    pub fn is_muted(&self) -> bool {
        self.state.muted
    }

    /// Mutes or unmutes the node; muted nodes draw dimmed
    pub fn set_muted(&mut self, muted: bool) {
        self.state.muted = muted;
    }

    /// Checks if the thumbnail band is shown
    pub fn is_expanded(&self) -> bool {
        self.state.expanded
    }

    /// Expands or collapses the node and resizes it accordingly.
    ///
    /// Nodes without a thumbnail stay collapsed.
    pub fn set_expanded(&mut self, expanded: bool) {
        if expanded && !self.has_thumbnail() {
            log::debug!("Ignoring expand request for node {} without thumbnail", self.id);
            return;
        }
        self.state.expanded = expanded;
        self.apply_size();
    }

    /// Flips the expand state of a thumbnail node; no-op otherwise
    pub fn toggle_expand(&mut self) {
        if !self.has_thumbnail() {
            return;
        }
        self.set_expanded(!self.state.expanded);
        log::debug!(
            "Node {} {} (size {:?})",
            self.id,
            if self.state.expanded { "expanded" } else { "collapsed" },
            self.size
        );
    }

    // === Thumbnail ===

    /// Current thumbnail, if the node has one
    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    /// Replaces the thumbnail and recomputes the expanded size.
    ///
    /// Ignored on nodes without a thumbnail.
    pub fn set_thumbnail(&mut self, image: ColorImage) {
        let Some(thumbnail) = self.thumbnail.as_mut() else {
            log::debug!("Node {} has no thumbnail, ignoring new image", self.id);
            return;
        };
        thumbnail.image = Arc::new(image);
        thumbnail.generation += 1;
        self.update_expanded_size();
        if self.state.expanded {
            self.size = self.layout.expanded_size;
        }
    }

    // === Parameters ===

    /// Forwards a parameter edit to the node kind
    pub fn edit_parameter(&mut self, idname: &str, value: &serde_json::Value) {
        if !self.parameters.iter().any(|p| p.idname == idname) {
            log::debug!("Node {} has no parameter '{}'", self.id, idname);
        }
        self.kind.edit_parameter(idname, value);
    }

    // === Hit testing ===

    /// Expand icon rectangle in graph space
    pub fn expand_icon_rect(&self) -> Rect {
        rect_xywh(
            self.position.x + dims::DEFAULT_WIDTH - expand_icon::RIGHT_OFFSET,
            self.position.y + expand_icon::TOP_OFFSET,
            expand_icon::SIZE,
            expand_icon::SIZE,
        )
    }

    /// Whether `pos` (graph space) touches the expand affordance.
    ///
    /// Always false for nodes without a thumbnail. Does not change anything.
    pub fn expand_affordance_hit(&self, pos: Pos2) -> bool {
        if !self.has_thumbnail() {
            return false;
        }
        let icon = self.expand_icon_rect().expand(expand_icon::HIT_MARGIN);
        let pointer = Rect::from_min_size(pos, Vec2::splat(expand_icon::POINTER_SIZE));
        overlaps(pointer, icon)
    }

    /// First socket, in socket order, hit by `pos` (graph space)
    pub fn hit_test_socket(&self, pos: Pos2) -> Option<&Socket> {
        let local = to_local(pos, self.position);
        self.sockets.iter().find(|socket| socket.hit_test(local))
    }

    /// Resolves a pointer event.
    ///
    /// With the primary button held over the expand affordance the node is
    /// toggled first, size included; the socket test runs afterwards in the
    /// same call.
    pub fn hit_test(&mut self, pos: Pos2, primary_down: bool) -> Option<&Socket> {
        if primary_down && self.expand_affordance_hit(pos) {
            self.toggle_expand();
        }
        self.hit_test_socket(pos)
    }

    /// Whether `pos` lies within the node body
    pub fn contains(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    // === Drawing ===

    /// Draws body, header, label, sockets, expand icon and thumbnail in
    /// that order.
    pub fn draw(&self, canvas: &mut impl Canvas) {
        let theme = &self.context.theme;
        let colors = &theme.colors;
        let Pos2 { x, y } = self.position;
        let Vec2 { x: w, y: h } = self.size;

        // Body and border
        let border = if self.state.selected || self.state.active {
            colors.border_highlight
        } else {
            colors.border
        };
        let fill = if self.state.muted {
            colors.body_fill_muted
        } else {
            colors.body_fill
        };
        canvas.rect(rect_xywh(x, y, w, h), dims::BODY_ROUNDING, fill, Stroke::new(1.0, border));

        // Header
        let header = if self.state.muted {
            colors.header_muted
        } else {
            change_lightness(self.header_color, 80)
        };
        canvas.rect(
            rect_xywh(x + 1.0, y + 1.0, w - 2.0, dims::HEADER_HEIGHT),
            dims::HEADER_ROUNDING,
            header,
            Stroke::NONE,
        );
        canvas.rect(
            rect_xywh(x + 1.0, y + 10.0, w - 2.0, dims::HEADER_HEIGHT),
            0.0,
            header,
            Stroke::NONE,
        );

        // Label
        let label_color = change_lightness(colors.label, if self.state.muted { 60 } else { 85 });
        canvas.text(
            Pos2::new(x + dims::LABEL_INSET, y),
            Align2::LEFT_TOP,
            self.label(),
            label_color,
        );

        for socket in &self.sockets {
            socket.draw(canvas, self.position, theme, label_color);
        }

        let Some(thumbnail) = &self.thumbnail else {
            return;
        };

        canvas.image(
            ImageKey::ExpandIcon,
            &self.context.assets.expand_icon,
            self.expand_icon_rect(),
        );

        if self.state.expanded {
            let frame = rect_xywh(
                x + dims::THUMB_PADDING / 2.0,
                y + self.layout.last_socket_offset + dims::Y_PADDING * 2.0,
                dims::DEFAULT_WIDTH - dims::THUMB_PADDING,
                thumbnail.height(),
            );
            canvas.pattern(ImageKey::Checkerboard, &self.context.assets.checkerboard, frame);
            canvas.rect(
                frame,
                0.0,
                Color32::TRANSPARENT,
                Stroke::new(1.0, colors.thumbnail_border),
            );
            canvas.image(
                ImageKey::Thumbnail {
                    node: self.id,
                    generation: thumbnail.generation,
                },
                &thumbnail.image,
                Rect::from_min_size(frame.min, Vec2::new(thumbnail.width(), thumbnail.height())),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::{DrawOp, RecordingCanvas};
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct TestKind {
        params: usize,
        output: bool,
        datatype: DataType,
    }

    impl TestKind {
        fn image(params: usize) -> Self {
            Self {
                params,
                output: false,
                datatype: DataType::RGBA_IMAGE,
            }
        }

        fn value(params: usize) -> Self {
            Self {
                datatype: DataType::VALUE,
                ..Self::image(params)
            }
        }

        fn output(params: usize) -> Self {
            Self {
                output: true,
                ..Self::image(params)
            }
        }
    }

    impl NodeKind for TestKind {
        fn label(&self) -> &str {
            "Test"
        }

        fn output_datatype(&self) -> DataType {
            self.datatype.clone()
        }

        fn is_output(&self) -> bool {
            self.output
        }

        fn parameters(&self) -> Vec<Parameter> {
            (1..=self.params)
                .map(|i| Parameter::new(format!("param_{i}"), format!("Param{i}"), DataType::VALUE))
                .collect()
        }
    }

    fn build(kind: TestKind) -> Node {
        Node::create(&GraphContext::default(), Uuid::new_v4(), Box::new(kind))
            .init("test_node")
            .unwrap()
    }

    // ========================================================================
    // Socket layout
    // ========================================================================

    #[test]
    fn test_two_parameter_layout() {
        let node = build(TestKind::image(2));
        let sockets = node.sockets();

        assert_eq!(sockets.len(), 3);
        assert_eq!(sockets[0].idname(), "Output");
        assert_eq!(sockets[0].label(), "Output");
        assert!(sockets[0].is_output());
        assert_eq!(sockets[0].position(), Pos2::new(dims::DEFAULT_WIDTH - 1.0, 40.0));

        assert_eq!(sockets[1].label(), "Param1");
        assert!(sockets[1].is_input());
        assert_eq!(sockets[1].position(), Pos2::new(0.0, 59.0));

        assert_eq!(sockets[2].label(), "Param2");
        assert_eq!(sockets[2].position(), Pos2::new(0.0, 78.0));

        assert_eq!(node.last_socket_offset(), 84.0);
    }

    #[test]
    fn test_empty_output_node() {
        let node = build(TestKind::output(0));

        assert!(node.sockets().is_empty());
        assert_eq!(node.last_socket_offset(), 60.0);
        assert_eq!(
            node.normal_size(),
            Vec2::new(dims::DEFAULT_WIDTH, 60.0 + 2.0 * dims::Y_PADDING)
        );
        assert_eq!(node.size(), node.normal_size());
    }

    #[test]
    fn test_output_node_has_only_inputs() {
        let node = build(TestKind::output(3));
        assert_eq!(node.sockets().len(), 3);
        assert!(node.sockets().iter().all(Socket::is_input));
        assert_eq!(node.sockets()[0].position(), Pos2::new(0.0, 40.0));
    }

    #[test]
    fn test_sockets_point_back_to_node() {
        let node = build(TestKind::image(2));
        assert!(node.sockets().iter().all(|s| s.node() == node.id()));
        assert_eq!(node.socket("param_2").map(|s| s.label()), Some("Param2"));
        assert!(node.socket("missing").is_none());
    }

    #[test]
    fn test_unknown_socket_datatype_fails_init() {
        #[derive(Debug)]
        struct Mesh;
        impl NodeKind for Mesh {
            fn label(&self) -> &str {
                "Mesh"
            }
            fn output_datatype(&self) -> DataType {
                DataType::new("MESH")
            }
        }

        let result = Node::create(&GraphContext::default(), Uuid::nil(), Box::new(Mesh)).init("mesh");
        assert!(matches!(result, Err(NodeError::UnknownDatatype { .. })));
    }

    #[test]
    fn test_unknown_category_fails_init() {
        #[derive(Debug)]
        struct Odd;
        impl NodeKind for Odd {
            fn label(&self) -> &str {
                "Odd"
            }
            fn category(&self) -> NodeCategory {
                NodeCategory::new("ODD")
            }
        }

        let result = Node::create(&GraphContext::default(), Uuid::nil(), Box::new(Odd)).init("odd");
        assert!(matches!(result, Err(NodeError::UnknownCategory(_))));
    }

    /// Kind declaring parameters by idname; editing `duplicate` repeats the last one
    #[derive(Debug)]
    struct Named {
        ids: Vec<&'static str>,
        output: bool,
    }

    impl NodeKind for Named {
        fn label(&self) -> &str {
            "Named"
        }

        fn is_output(&self) -> bool {
            self.output
        }

        fn parameters(&self) -> Vec<Parameter> {
            self.ids
                .iter()
                .map(|id| Parameter::new(*id, "Shadow", DataType::VALUE))
                .collect()
        }

        fn edit_parameter(&mut self, idname: &str, _value: &serde_json::Value) {
            if idname == "duplicate" {
                if let Some(last) = self.ids.last().copied() {
                    self.ids.push(last);
                }
            }
        }
    }

    fn init_named(ids: Vec<&'static str>, output: bool) -> Result<Node, NodeError> {
        Node::create(&GraphContext::default(), Uuid::new_v4(), Box::new(Named { ids, output }))
            .init("named")
    }

    #[test]
    fn test_parameter_named_like_output_fails_init() {
        let result = init_named(vec!["Output", "a"], false);
        assert_eq!(
            result.err(),
            Some(NodeError::DuplicateSocket { socket: "Output".into() })
        );
    }

    #[test]
    fn test_repeated_parameter_fails_init() {
        let result = init_named(vec!["a", "b", "a"], false);
        assert_eq!(
            result.err(),
            Some(NodeError::DuplicateSocket { socket: "a".into() })
        );
    }

    #[test]
    fn test_output_node_may_use_output_idname() {
        let node = init_named(vec!["Output"], true).unwrap();
        assert_eq!(node.sockets().len(), 1);
        assert!(node.socket("Output").unwrap().is_input());
    }

    #[test]
    fn test_rebuild_with_duplicate_keeps_sockets() {
        let mut node = init_named(vec!["a", "b"], false).unwrap();
        let before: Vec<String> = node.sockets().iter().map(|s| s.idname().to_string()).collect();

        node.edit_parameter("duplicate", &serde_json::Value::Null);
        let result = node.rebuild_sockets();

        assert_eq!(result, Err(NodeError::DuplicateSocket { socket: "b".into() }));
        let after: Vec<String> = node.sockets().iter().map(|s| s.idname().to_string()).collect();
        assert_eq!(after, before);
        assert_eq!(node.parameters().len(), 2);
    }

    // ========================================================================
    // Size and expand state
    // ========================================================================

    #[test]
    fn test_initial_sizes() {
        let node = build(TestKind::image(2));
        assert_eq!(node.size(), Vec2::new(dims::DEFAULT_WIDTH, 84.0 + 2.0 * dims::Y_PADDING));
        assert_eq!(
            node.expanded_size(),
            Vec2::new(
                dims::DEFAULT_WIDTH,
                84.0 + dims::EMPTY_THUMBNAIL_SIZE as f32 + 2.0 * dims::THUMB_PADDING
            )
        );
        assert!(node.has_thumbnail());
        assert!(!node.is_expanded());
    }

    #[test]
    fn test_toggle_expand_round_trip() {
        let mut node = build(TestKind::image(1));
        let before = (node.is_expanded(), node.size());

        node.toggle_expand();
        assert!(node.is_expanded());
        assert_eq!(node.size(), node.expanded_size());

        node.toggle_expand();
        assert_eq!((node.is_expanded(), node.size()), before);
    }

    #[test]
    fn test_expand_ignored_without_thumbnail() {
        let mut node = build(TestKind::value(2));
        let size = node.size();
        assert!(!node.has_thumbnail());

        node.toggle_expand();
        node.set_expanded(true);

        assert!(!node.is_expanded());
        assert_eq!(node.size(), size);
    }

    #[test]
    fn test_set_thumbnail_without_thumbnail_is_ignored() {
        let mut node = build(TestKind::value(1));
        let (size, state) = (node.size(), node.state());

        node.set_thumbnail(empty_bitmap(64, 300));

        assert_eq!(node.size(), size);
        assert_eq!(node.state(), state);
        assert!(node.thumbnail().is_none());
    }

    #[test]
    fn test_set_thumbnail_while_expanded_resizes() {
        let mut node = build(TestKind::image(0));
        node.set_expanded(true);

        node.set_thumbnail(empty_bitmap(100, 50));

        let expected = Vec2::new(dims::DEFAULT_WIDTH, 60.0 + 50.0 + 2.0 * dims::THUMB_PADDING);
        assert_eq!(node.expanded_size(), expected);
        assert_eq!(node.size(), expected);
        assert_eq!(node.thumbnail().map(|t| t.generation), Some(1));
    }

    #[test]
    fn test_set_thumbnail_while_collapsed_keeps_size() {
        let mut node = build(TestKind::image(0));
        let size = node.size();

        node.set_thumbnail(empty_bitmap(100, 50));

        assert_eq!(node.size(), size);
        node.toggle_expand();
        assert_eq!(node.size().y, 60.0 + 50.0 + 2.0 * dims::THUMB_PADDING);
    }

    #[test]
    fn test_set_size_overrides_current_mode() {
        let mut node = build(TestKind::image(0));
        node.set_size(Vec2::new(200.0, 90.0));
        assert_eq!(node.size(), Vec2::new(200.0, 90.0));

        node.toggle_expand();
        assert_eq!(node.size(), node.expanded_size());
        node.toggle_expand();
        assert_eq!(node.size(), Vec2::new(200.0, 90.0));
    }

    #[test]
    fn test_flags_are_independent() {
        let mut node = build(TestKind::image(0));
        node.set_selected(true);
        node.set_active(true);
        node.set_muted(true);

        assert_eq!(
            node.state(),
            NodeState {
                selected: true,
                active: true,
                muted: true,
                expanded: false,
            }
        );

        node.set_selected(false);
        assert!(node.is_active());
        assert!(node.is_muted());
    }

    #[test]
    fn test_edit_parameter_keeps_layout() {
        let mut node = build(TestKind::image(1));
        node.edit_parameter("param_1", &serde_json::json!(0.5));
        node.edit_parameter("nope", &serde_json::json!(true));
        // Sockets and size are untouched by edits
        assert_eq!(node.sockets().len(), 2);
    }

    // ========================================================================
    // Hit testing
    // ========================================================================

    #[test]
    fn test_hit_socket_at_exact_position() {
        let mut node = build(TestKind::image(2));
        node.set_position(100.0, 10.0);

        for socket in node.sockets().to_vec() {
            let pos = socket.absolute_position(node.position());
            assert_eq!(node.hit_test_socket(pos).map(|s| s.idname()), Some(socket.idname()));
        }
    }

    #[test]
    fn test_hit_miss_far_from_sockets() {
        let mut node = build(TestKind::image(2));
        node.set_position(100.0, 10.0);

        assert!(node.hit_test(Pos2::new(170.0, 70.0), false).is_none());
        assert!(node.hit_test(Pos2::new(-1000.0, -1000.0), true).is_none());
    }

    #[test]
    fn test_affordance_click_expands_before_socket_test() {
        let mut node = build(TestKind::image(1));
        node.set_position(100.0, 10.0);
        let icon = node.expand_icon_rect();
        assert_eq!(icon, rect_xywh(100.0 + dims::DEFAULT_WIDTH - 24.0, 13.0, 16.0, 16.0));

        let hit = node.hit_test(icon.center(), true).map(|s| s.idname().to_string());

        assert!(hit.is_none());
        assert!(node.is_expanded());
        assert_eq!(node.size(), node.expanded_size());
    }

    #[test]
    fn test_affordance_needs_primary_button() {
        let mut node = build(TestKind::image(1));
        let center = node.expand_icon_rect().center();

        assert!(node.expand_affordance_hit(center));
        node.hit_test(center, false);
        assert!(!node.is_expanded());
    }

    #[test]
    fn test_affordance_margin() {
        let node = build(TestKind::image(0));
        let icon = node.expand_icon_rect();

        // Inside the inflated margin
        assert!(node.expand_affordance_hit(Pos2::new(icon.max.x + 7.0, icon.center().y)));
        // Pointer square ends exactly at the inflated edge: no shared area
        assert!(!node.expand_affordance_hit(Pos2::new(icon.min.x - 10.0, icon.center().y)));
        assert!(!node.expand_affordance_hit(Pos2::new(icon.max.x + 8.0, icon.center().y)));
    }

    #[test]
    fn test_affordance_absent_without_thumbnail() {
        let mut node = build(TestKind::value(0));
        let center = node.expand_icon_rect().center();
        assert!(!node.expand_affordance_hit(center));
        node.hit_test(center, true);
        assert!(!node.is_expanded());
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    #[test]
    fn test_draw_order_collapsed() {
        let node = build(TestKind::image(1));
        let mut canvas = RecordingCanvas::new();
        node.draw(&mut canvas);

        assert!(matches!(canvas.ops[0], DrawOp::Rect { .. }));
        assert!(matches!(canvas.ops[1], DrawOp::Rect { .. }));
        assert!(matches!(canvas.ops[2], DrawOp::Rect { .. }));
        assert_eq!(canvas.texts(), vec!["Test", "Output", "Param1"]);
        assert_eq!(canvas.images(), vec![ImageKey::ExpandIcon]);
        assert!(matches!(canvas.ops.last(), Some(DrawOp::Image { key: ImageKey::ExpandIcon, .. })));
    }

    #[test]
    fn test_draw_expanded_thumbnail_placement() {
        let mut node = build(TestKind::image(2));
        node.set_position(10.0, 20.0);
        node.toggle_expand();

        let mut canvas = RecordingCanvas::new();
        node.draw(&mut canvas);

        assert_eq!(
            canvas.images(),
            vec![
                ImageKey::ExpandIcon,
                ImageKey::Checkerboard,
                ImageKey::Thumbnail { node: node.id(), generation: 0 },
            ]
        );
        let frame = canvas.ops.iter().find_map(|op| match op {
            DrawOp::Pattern { key: ImageKey::Checkerboard, rect } => Some(*rect),
            _ => None,
        });
        assert_eq!(
            frame,
            Some(rect_xywh(
                10.0 + dims::THUMB_PADDING / 2.0,
                20.0 + 84.0 + 2.0 * dims::Y_PADDING,
                dims::DEFAULT_WIDTH - dims::THUMB_PADDING,
                dims::EMPTY_THUMBNAIL_SIZE as f32,
            ))
        );
    }

    #[test]
    fn test_draw_border_reflects_state() {
        let mut node = build(TestKind::value(0));
        let theme = crate::theme::Theme::default();

        let border = |node: &Node| {
            let mut canvas = RecordingCanvas::new();
            node.draw(&mut canvas);
            match canvas.ops[0] {
                DrawOp::Rect { stroke, fill, .. } => (stroke.color, fill),
                _ => panic!("body must be drawn first"),
            }
        };

        assert_eq!(border(&node), (theme.colors.border, theme.colors.body_fill));
        node.set_active(true);
        assert_eq!(border(&node).0, theme.colors.border_highlight);
        node.set_muted(true);
        assert_eq!(border(&node).1, theme.colors.body_fill_muted);
        // No thumbnail: nothing drawn after the sockets
        let mut canvas = RecordingCanvas::new();
        node.draw(&mut canvas);
        assert!(canvas.images().is_empty());
    }

    #[test]
    fn test_muted_node_dims_socket_labels() {
        let mut node = build(TestKind::image(2));
        let text_colors = |node: &Node| -> Vec<Color32> {
            let mut canvas = RecordingCanvas::new();
            node.draw(&mut canvas);
            canvas
                .ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text { color, .. } => Some(*color),
                    _ => None,
                })
                .collect()
        };

        // Node label plus three socket labels
        assert_eq!(text_colors(&node), vec![change_lightness(Color32::WHITE, 85); 4]);
        node.set_muted(true);
        assert_eq!(text_colors(&node), vec![change_lightness(Color32::WHITE, 60); 4]);
    }

    // ========================================================================
    // Properties
    // ========================================================================

    proptest! {
        #[test]
        fn proptest_socket_counts(params in 0usize..24, output in any::<bool>()) {
            let kind = if output { TestKind::output(params) } else { TestKind::image(params) };
            let node = build(kind);
            let outputs: Vec<usize> = node
                .sockets()
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_output())
                .map(|(i, _)| i)
                .collect();

            if output {
                prop_assert_eq!(node.sockets().len(), params);
                prop_assert!(outputs.is_empty());
            } else {
                prop_assert_eq!(node.sockets().len(), params + 1);
                prop_assert_eq!(outputs, vec![0]);
            }
        }

        #[test]
        fn proptest_normal_height(params in 0usize..24, output in any::<bool>()) {
            let kind = if output { TestKind::output(params) } else { TestKind::value(params) };
            let node = build(kind);
            prop_assert_eq!(
                node.normal_size().y,
                node.last_socket_offset() + 2.0 * dims::Y_PADDING
            );
        }

        #[test]
        fn proptest_socket_rows_monotonic(params in 1usize..24) {
            let node = build(TestKind::image(params));
            for pair in node.sockets().windows(2) {
                prop_assert_eq!(pair[1].position().y - pair[0].position().y, layout::SOCKET_ROW_HEIGHT);
            }
        }

        #[test]
        fn proptest_far_points_miss(
            params in 0usize..8,
            output in any::<bool>(),
            x in -40.0f32..180.0,
            y in -20.0f32..250.0,
        ) {
            let kind = if output { TestKind::output(params) } else { TestKind::image(params) };
            let node = build(kind);
            let pos = Pos2::new(x, y);
            prop_assume!(node
                .sockets()
                .iter()
                .all(|s| (pos - s.position()).length() >= socket_consts::HIT_RADIUS));
            prop_assert!(node.hit_test_socket(pos).is_none());
        }

        #[test]
        fn proptest_near_points_hit(
            params in 0usize..8,
            index in 0usize..9,
            angle in 0.0f32..std::f32::consts::TAU,
            distance in 0.0f32..(socket_consts::HIT_RADIUS - 0.01),
        ) {
            let node = build(TestKind::image(params));
            let socket = &node.sockets()[index % node.sockets().len()];
            let pos = socket.position() + Vec2::angled(angle) * distance;
            prop_assert_eq!(
                node.hit_test_socket(pos).map(|s| s.idname()),
                Some(socket.idname())
            );
        }
    }
}
