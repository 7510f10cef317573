//! Built-in node kinds used by the demo graph
//!
//! Each kind declares its parameters and keeps their current values; none of
//! them compute anything.

use super::factory::{DataType, NodeCategory, NodeKind, NodeRegistry, Parameter};
use serde_json::Value;

/// Registers every built-in kind under its idname
pub fn register_builtin(registry: &mut NodeRegistry) {
    registry
        .register("image_node", || Box::new(ImageNode::default()))
        .register("mix_node", || Box::new(MixNode::default()))
        .register("blur_node", || Box::new(BlurNode::default()))
        .register("blend_node", || Box::new(BlendNode::default()))
        .register("output_node", || Box::new(OutputNode));
    log::debug!("Registered {} built-in node types", registry.node_types().len());
}

/// Image source
#[derive(Debug, Clone, Default)]
pub struct ImageNode {
    pub path: String,
}

impl NodeKind for ImageNode {
    fn label(&self) -> &str {
        "Image"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::INPUT
    }

    fn edit_parameter(&mut self, idname: &str, value: &Value) {
        if let ("path", Some(path)) = (idname, value.as_str()) {
            self.path = path.to_string();
        }
    }
}

/// Mixes two images by a factor
#[derive(Debug, Clone)]
pub struct MixNode {
    pub factor: f64,
}

impl Default for MixNode {
    fn default() -> Self {
        Self { factor: 0.5 }
    }
}

impl NodeKind for MixNode {
    fn label(&self) -> &str {
        "Mix"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::BLEND
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::new("image_1", "Image 1", DataType::RGBA_IMAGE),
            Parameter::new("image_2", "Image 2", DataType::RGBA_IMAGE),
            Parameter::new("factor", "Factor", DataType::VALUE),
        ]
    }

    fn edit_parameter(&mut self, idname: &str, value: &Value) {
        if let ("factor", Some(factor)) = (idname, value.as_f64()) {
            self.factor = factor.clamp(0.0, 1.0);
        }
    }
}

/// Gaussian blur
#[derive(Debug, Clone)]
pub struct BlurNode {
    pub radius: i64,
}

impl Default for BlurNode {
    fn default() -> Self {
        Self { radius: 4 }
    }
}

impl NodeKind for BlurNode {
    fn label(&self) -> &str {
        "Blur"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::FILTER
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::new("image", "Image", DataType::RGBA_IMAGE),
            Parameter::new("radius", "Radius", DataType::INTEGER),
        ]
    }

    fn edit_parameter(&mut self, idname: &str, value: &Value) {
        if let ("radius", Some(radius)) = (idname, value.as_i64()) {
            self.radius = radius.max(0);
        }
    }
}

/// Layers one image over another with a blend mode
#[derive(Debug, Clone)]
pub struct BlendNode {
    pub mode: String,
    pub opacity: f64,
}

impl Default for BlendNode {
    fn default() -> Self {
        Self {
            mode: "normal".into(),
            opacity: 1.0,
        }
    }
}

impl NodeKind for BlendNode {
    fn label(&self) -> &str {
        "Blend"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::BLEND
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::new("image_1", "Image 1", DataType::RGBA_IMAGE),
            Parameter::new("image_2", "Image 2", DataType::RGBA_IMAGE),
            Parameter::new("mode", "Mode", DataType::STRING),
            Parameter::new("opacity", "Opacity", DataType::VALUE),
        ]
    }

    fn edit_parameter(&mut self, idname: &str, value: &Value) {
        match idname {
            "mode" => {
                if let Some(mode) = value.as_str() {
                    self.mode = mode.to_string();
                }
            }
            "opacity" => {
                if let Some(opacity) = value.as_f64() {
                    self.opacity = opacity.clamp(0.0, 1.0);
                }
            }
            _ => {}
        }
    }
}

/// Graph output; has no output socket of its own
#[derive(Debug, Clone, Default)]
pub struct OutputNode;

impl NodeKind for OutputNode {
    fn label(&self) -> &str {
        "Output"
    }

    fn category(&self) -> NodeCategory {
        NodeCategory::OUTPUT
    }

    fn is_output(&self) -> bool {
        true
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::new("image", "Image", DataType::RGBA_IMAGE)]
    }
}
