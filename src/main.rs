//! Nodecanvas - demo editor for the node scene model
//!
//! Builds a small image-processing graph and lets you move nodes, expand
//! thumbnails, and drag wires from output sockets to input sockets.
//!
//! Shift-click adds to the selection, `M` mutes the selected nodes and
//! `Delete` removes them. Dragging empty space pans the view.

use eframe::egui;
use egui::{Color32, ColorImage, Key, Pos2, Sense, Stroke, Vec2};
use nodecanvas::assets::Assets;
use nodecanvas::nodes::builtin::register_builtin;
use nodecanvas::nodes::{GraphContext, GraphHit, NodeGraph, NodeId, NodeRegistry, SocketRef};
use nodecanvas::rendering::{PainterCanvas, TextureCache};
use nodecanvas::{NodeError, StyleConfig, Theme};
use std::sync::Arc;

/// Horizontal pull of wire control points
const MIN_WIRE_PULL: f32 = 40.0;

/// What the primary pointer is currently dragging
#[derive(Debug, Clone)]
enum Drag {
    Node(NodeId),
    Wire(SocketRef),
    Pan,
}

struct NodeEditor {
    graph: NodeGraph,
    textures: TextureCache,
    pan_offset: Vec2,
    drag: Option<Drag>,
}

impl NodeEditor {
    fn new(context: GraphContext) -> Result<Self, NodeError> {
        let mut registry = NodeRegistry::new();
        register_builtin(&mut registry);
        let mut graph = NodeGraph::new(context, registry);

        let image_1 = graph.add_node("image_node", Pos2::new(100.0, 10.0))?;
        let image_2 = graph.add_node("image_node", Pos2::new(450.0, 400.0))?;
        let mix = graph.add_node("mix_node", Pos2::new(400.0, 100.0))?;
        let blur = graph.add_node("blur_node", Pos2::new(700.0, 100.0))?;
        let blend = graph.add_node("blend_node", Pos2::new(720.0, 300.0))?;
        let output = graph.add_node("output_node", Pos2::new(1000.0, 290.0))?;

        let links = [
            (image_1, mix, "image_1"),
            (image_2, mix, "image_2"),
            (mix, blur, "image"),
            (blur, blend, "image_1"),
            (image_2, blend, "image_2"),
            (blend, output, "image"),
        ];
        for (from, to, input) in links {
            graph.connect(SocketRef::new(from, "Output"), SocketRef::new(to, input))?;
        }

        for (id, hue) in [(image_1, 0.0), (image_2, 0.6)] {
            if let Some(node) = graph.node_mut(id) {
                node.set_thumbnail(gradient(120, 90, hue));
            }
        }

        Ok(Self {
            graph,
            textures: TextureCache::new(),
            pan_offset: Vec2::ZERO,
            drag: None,
        })
    }

    fn on_press(&mut self, pos: Pos2, multi: bool) {
        self.drag = match self.graph.hit_test(pos, true) {
            Some(GraphHit::Socket(socket)) if self.is_output(&socket) => Some(Drag::Wire(socket)),
            Some(GraphHit::Socket(socket)) => {
                // Grabbing an input detaches what is plugged into it
                let wires: Vec<_> = self
                    .graph
                    .wires()
                    .filter(|wire| wire.input == socket)
                    .map(|wire| wire.id)
                    .collect();
                for wire in wires {
                    self.graph.disconnect(wire);
                }
                None
            }
            Some(GraphHit::Node(id)) => {
                self.graph.select_node(id, multi);
                self.graph.raise_to_top(id);
                Some(Drag::Node(id))
            }
            None => {
                if !multi {
                    self.graph.clear_selection();
                }
                Some(Drag::Pan)
            }
        };
    }

    fn on_release(&mut self, pos: Pos2) {
        let Some(Drag::Wire(output)) = self.drag.take() else {
            return;
        };
        if let Some(GraphHit::Socket(input)) = self.graph.hit_test(pos, false) {
            if self.is_output(&input) || input.node == output.node {
                return;
            }
            if let Err(err) = self.graph.connect(output, input) {
                log::warn!("Could not connect: {}", err);
            }
        }
    }

    fn on_drag(&mut self, delta: Vec2) {
        match &self.drag {
            Some(Drag::Node(_)) => {
                for id in self.graph.selected_nodes() {
                    if let Some(node) = self.graph.node_mut(id) {
                        node.translate(delta);
                    }
                }
            }
            Some(Drag::Pan) => self.pan_offset += delta,
            Some(Drag::Wire(_)) | None => {}
        }
    }

    fn on_keys(&mut self, ctx: &egui::Context) {
        let (mute, delete) = ctx.input(|i| (i.key_pressed(Key::M), i.key_pressed(Key::Delete)));
        for id in self.graph.selected_nodes() {
            if delete {
                self.graph.remove_node(id);
            } else if let (true, Some(node)) = (mute, self.graph.node_mut(id)) {
                let muted = node.is_muted();
                node.set_muted(!muted);
            }
        }
        if delete {
            let alive: Vec<NodeId> = self.graph.nodes().iter().map(|node| node.id()).collect();
            self.textures.retain_nodes(&alive);
        }
    }

    fn is_output(&self, socket: &SocketRef) -> bool {
        self.graph
            .node(socket.node)
            .and_then(|node| node.socket(&socket.socket))
            .is_some_and(|s| s.is_output())
    }
}

impl eframe::App for NodeEditor {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.on_keys(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let offset = response.rect.min.to_vec2() + self.pan_offset;
            let (pressed, released, pointer, multi) = ui.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_released(),
                    i.pointer.interact_pos(),
                    i.modifiers.shift,
                )
            });
            let pointer = pointer.map(|p| p - offset);

            // Handle input
            if let Some(pos) = pointer {
                if pressed && response.hovered() {
                    self.on_press(pos, multi);
                }
                if response.dragged() {
                    self.on_drag(response.drag_delta());
                }
                if released {
                    self.on_release(pos);
                }
            }
            if released {
                self.drag = None;
            }

            // Wires first so nodes cover their ends
            let wire_stroke = Stroke::new(2.0, self.graph.context().theme.colors.wire);
            let mut curves: Vec<(Pos2, Pos2)> = self
                .graph
                .wires()
                .filter_map(|wire| self.graph.wire_endpoints(wire.id))
                .collect();
            if let (Some(Drag::Wire(from)), Some(to)) = (&self.drag, pointer) {
                if let Some(from) = self.graph.socket_position(from) {
                    curves.push((from, to));
                }
            }
            for (from, to) in curves {
                painter.add(wire_shape(from + offset, to + offset, wire_stroke));
            }

            let mut canvas = PainterCanvas::new(&painter, &mut self.textures, offset);
            self.graph.draw(&mut canvas);
        });
    }
}

/// Horizontal cubic bezier from an output to an input
fn wire_shape(from: Pos2, to: Pos2, stroke: Stroke) -> egui::Shape {
    let pull = ((to.x - from.x).abs() * 0.5).max(MIN_WIRE_PULL);
    let points = [from, from + Vec2::new(pull, 0.0), to - Vec2::new(pull, 0.0), to];
    egui::Shape::CubicBezier(egui::epaint::CubicBezierShape {
        points,
        closed: false,
        fill: Color32::TRANSPARENT,
        stroke: stroke.into(),
    })
}

/// Placeholder thumbnail: a diagonal gradient tinted by `hue` in 0..1
fn gradient(width: usize, height: usize, hue: f32) -> ColorImage {
    let mut image = ColorImage::new([width, height], Color32::TRANSPARENT);
    for y in 0..height {
        for x in 0..width {
            let t = (x + y) as f32 / (width + height) as f32;
            let color = egui::ecolor::Hsva::new(hue, 0.6, 0.4 + 0.5 * t, 1.0);
            image.pixels[y * width + x] = color.into();
        }
    }
    image
}

/// Application entry point.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let theme = match StyleConfig::discover().and_then(StyleConfig::into_theme) {
        Ok(theme) => theme,
        Err(err) => {
            log::warn!("Ignoring style configuration: {}", err);
            Theme::default()
        }
    };
    let editor = NodeEditor::new(GraphContext::new(Arc::new(theme), Assets::shared()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 720.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Nodecanvas",
        options,
        Box::new(move |_cc| Ok(Box::new(editor))),
    )?;
    Ok(())
}
