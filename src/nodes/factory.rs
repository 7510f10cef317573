//! Node kinds: the capability contract every node variant implements, the
//! identifiers it declares, and the registry that creates kinds by idname

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of the kind of data flowing through a socket.
///
/// Drives socket color and thumbnail eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataType(Cow<'static, str>);

impl DataType {
    /// RGBA image; nodes producing it carry a thumbnail
    pub const RGBA_IMAGE: DataType = DataType(Cow::Borrowed("RGBAIMAGE"));
    pub const VALUE: DataType = DataType(Cow::Borrowed("VALUE"));
    pub const INTEGER: DataType = DataType(Cow::Borrowed("INTEGER"));
    pub const VECTOR: DataType = DataType(Cow::Borrowed("VECTOR"));
    pub const COLOR: DataType = DataType(Cow::Borrowed("COLOR"));
    pub const BOOLEAN: DataType = DataType(Cow::Borrowed("BOOLEAN"));
    pub const STRING: DataType = DataType(Cow::Borrowed("STRING"));

    /// Every datatype the default theme has a color for
    pub const BUILTIN: [DataType; 7] = [
        Self::RGBA_IMAGE,
        Self::VALUE,
        Self::INTEGER,
        Self::VECTOR,
        Self::COLOR,
        Self::BOOLEAN,
        Self::STRING,
    ];

    /// Datatype with a custom identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether nodes outputting this datatype show a thumbnail
    pub fn is_image(&self) -> bool {
        *self == Self::RGBA_IMAGE
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category a node kind belongs to; selects the header color
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeCategory(Cow<'static, str>);

impl NodeCategory {
    pub const INPUT: NodeCategory = NodeCategory(Cow::Borrowed("INPUT"));
    pub const DRAW: NodeCategory = NodeCategory(Cow::Borrowed("DRAW"));
    pub const MASK: NodeCategory = NodeCategory(Cow::Borrowed("MASK"));
    pub const CONVERT: NodeCategory = NodeCategory(Cow::Borrowed("CONVERT"));
    pub const VALUE: NodeCategory = NodeCategory(Cow::Borrowed("VALUE"));
    pub const FILTER: NodeCategory = NodeCategory(Cow::Borrowed("FILTER"));
    pub const BLEND: NodeCategory = NodeCategory(Cow::Borrowed("BLEND"));
    pub const COLOR: NodeCategory = NodeCategory(Cow::Borrowed("COLOR"));
    pub const DISTORT: NodeCategory = NodeCategory(Cow::Borrowed("DISTORT"));
    pub const OUTPUT: NodeCategory = NodeCategory(Cow::Borrowed("OUTPUT"));
    pub const DEFAULT: NodeCategory = NodeCategory(Cow::Borrowed("DEFAULT"));

    /// Every category the default theme has a color for
    pub const BUILTIN: [NodeCategory; 11] = [
        Self::INPUT,
        Self::DRAW,
        Self::MASK,
        Self::CONVERT,
        Self::VALUE,
        Self::FILTER,
        Self::BLEND,
        Self::COLOR,
        Self::DISTORT,
        Self::OUTPUT,
        Self::DEFAULT,
    ];

    /// Category with a custom identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for NodeCategory {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A node parameter; each one becomes an input socket
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub idname: String,
    pub label: String,
    pub datatype: DataType,
}

impl Parameter {
    pub fn new(idname: impl Into<String>, label: impl Into<String>, datatype: DataType) -> Self {
        Self {
            idname: idname.into(),
            label: label.into(),
            datatype,
        }
    }
}

/// Capability contract implemented per node variant.
///
/// The layout, hit-test and draw engine only ever talks to a node's kind
/// through this trait.
pub trait NodeKind: fmt::Debug {
    /// Text shown in the node header
    fn label(&self) -> &str;

    fn category(&self) -> NodeCategory {
        NodeCategory::DEFAULT
    }

    /// Datatype of the node's single output socket
    fn output_datatype(&self) -> DataType {
        DataType::RGBA_IMAGE
    }

    /// Graph output nodes have no output socket
    fn is_output(&self) -> bool {
        false
    }

    /// Parameters in display order
    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    /// Hook for kinds that store parameter values. Unknown ids are ignored.
    fn edit_parameter(&mut self, _idname: &str, _value: &serde_json::Value) {}
}

/// Function creating a fresh kind instance
pub type KindCreator = fn() -> Box<dyn NodeKind>;

/// Registry mapping node idnames to kind constructors
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    creators: BTreeMap<String, KindCreator>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind constructor under `idname`, replacing any previous one
    pub fn register(&mut self, idname: impl Into<String>, creator: KindCreator) -> &mut Self {
        let idname = idname.into();
        if self.creators.insert(idname.clone(), creator).is_some() {
            log::debug!("Replaced node type registration for '{}'", idname);
        }
        self
    }

    /// Create a kind by idname
    pub fn create(&self, idname: &str) -> Option<Box<dyn NodeKind>> {
        self.creators.get(idname).map(|creator| creator())
    }

    pub fn contains(&self, idname: &str) -> bool {
        self.creators.contains_key(idname)
    }

    /// All registered idnames, sorted
    pub fn node_types(&self) -> Vec<&str> {
        self.creators.keys().map(|s| s.as_str()).collect()
    }
}
