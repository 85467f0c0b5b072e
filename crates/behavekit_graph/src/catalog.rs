// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node catalog: the set of node kinds available to a graph.
//!
//! A catalog is built once at startup and passed by reference to whatever
//! needs it (the editor palette, the resolution engine). Kinds come from two
//! sources: hand-defined kinds registered in code, and generic kinds
//! synthesized from a declarative JSON spec. Hand-defined kinds always win
//! when a spec entry reuses their type identifier.

use crate::node::{Node, NodeBehavior, NodeKind, SocketSpec};
use crate::socket::EnumChoice;
use crate::value::{Value, ValueType};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Declarative node spec, one array entry in the catalog JSON
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogNodeSpec {
    /// Namespaced type identifier
    #[serde(rename = "type")]
    pub type_id: String,
    /// Display label; falls back to the type identifier
    #[serde(default)]
    pub label: Option<String>,
    /// Palette category
    pub category: String,
    /// Input socket specs
    #[serde(default)]
    pub inputs: Vec<CatalogSocketSpec>,
    /// Output socket specs
    #[serde(default)]
    pub outputs: Vec<CatalogSocketSpec>,
}

/// Declarative socket spec inside a [`CatalogNodeSpec`]
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSocketSpec {
    /// Socket name
    pub name: String,
    /// Value type tag, e.g. `"float"`; ignored when choices are present
    #[serde(rename = "valueType", default)]
    pub value_type: Option<String>,
    /// Default literal in wire form
    #[serde(rename = "defaultValue", default)]
    pub default_value: Option<serde_json::Value>,
    /// Present on enum sockets
    #[serde(default)]
    pub choices: Option<Vec<CatalogChoice>>,
    /// Tooltip text
    #[serde(default)]
    pub description: Option<String>,
}

/// One enum choice in a declarative socket spec
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogChoice {
    /// Internal value
    pub value: String,
    /// Display text
    pub text: String,
}

/// Error while building the catalog. This is the one fatal error class:
/// a missing or corrupt spec aborts initialization.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Spec file could not be read
    #[error("failed to read node spec: {0}")]
    Io(#[from] std::io::Error),

    /// Spec file is not valid JSON
    #[error("failed to parse node spec: {0}")]
    Parse(#[from] serde_json::Error),

    /// Spec names a value type the type system does not know
    #[error("node spec `{node_type}` socket `{socket}` has unknown value type `{value_type}`")]
    UnknownValueType {
        /// Offending node type
        node_type: String,
        /// Offending socket
        socket: String,
        /// The unrecognized tag
        value_type: String,
    },

    /// Spec default literal does not parse as its declared type
    #[error("node spec `{node_type}` socket `{socket}` has a malformed default value")]
    BadDefault {
        /// Offending node type
        node_type: String,
        /// Offending socket
        socket: String,
    },
}

/// Registry of available node kinds
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    kinds: IndexMap<String, NodeKind>,
    deprecated: HashSet<String>,
    filtered_categories: HashSet<String>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog pre-populated with the hand-defined kinds
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        crate::builtin::register_builtins(&mut catalog);
        catalog
    }

    /// Register a kind, replacing any existing kind with the same type id
    pub fn register(&mut self, kind: NodeKind) {
        self.kinds.insert(kind.type_id.clone(), kind);
    }

    /// Load declarative specs from a JSON string. Entries are sorted by
    /// label; entries colliding with an already-registered kind are skipped
    /// so hand-defined kinds take precedence. Returns the number of kinds
    /// added.
    pub fn register_spec_json(&mut self, json: &str) -> Result<usize, CatalogError> {
        let mut specs: Vec<CatalogNodeSpec> = serde_json::from_str(json)?;
        specs.sort_by(|a, b| spec_label(a).cmp(spec_label(b)));

        let mut added = 0;
        for spec in specs {
            if self.kinds.contains_key(&spec.type_id) {
                tracing::debug!(type_id = %spec.type_id, "skipping spec entry shadowed by a hand-defined kind");
                continue;
            }
            let kind = build_kind(&spec)?;
            self.kinds.insert(kind.type_id.clone(), kind);
            added += 1;
        }
        Ok(added)
    }

    /// Load declarative specs from a JSON file
    pub fn load_spec_file(&mut self, path: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        self.register_spec_json(&json)
    }

    /// Mark a kind deprecated: still instantiable for legacy documents, but
    /// hidden from the palette
    pub fn mark_deprecated(&mut self, type_id: impl Into<String>) {
        self.deprecated.insert(type_id.into());
    }

    /// Exclude a category from the palette wholesale
    pub fn filter_category(&mut self, category: impl Into<String>) {
        self.filtered_categories.insert(category.into());
    }

    /// Get a kind by type id
    pub fn get(&self, type_id: &str) -> Option<&NodeKind> {
        self.kinds.get(type_id)
    }

    /// Iterate all registered kinds in insertion order
    pub fn kinds(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values()
    }

    /// Iterate the kinds shown in the editor palette: everything except
    /// deprecated kinds and kinds in filtered categories
    pub fn palette(&self) -> impl Iterator<Item = &NodeKind> {
        self.kinds.values().filter(|kind| {
            !self.deprecated.contains(&kind.type_id)
                && !self.filtered_categories.contains(&kind.category)
        })
    }

    /// Distinct palette categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for kind in self.palette() {
            if !seen.contains(&kind.category.as_str()) {
                seen.push(kind.category.as_str());
            }
        }
        seen
    }

    /// Palette kinds within one category
    pub fn kinds_in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a NodeKind> {
        self.palette().filter(move |kind| kind.category == category)
    }

    /// Instantiate a node of the given kind
    pub fn instantiate(&self, type_id: &str) -> Option<Node> {
        let kind = self.kinds.get(type_id)?;
        let mut node = Node::from_kind(kind);
        // Set-entity-property nodes materialize their value socket from the
        // selected property; start them on the first property.
        if kind.behavior == NodeBehavior::SetEntityProperty {
            node.select_entity_property("visible");
        }
        Some(node)
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn spec_label(spec: &CatalogNodeSpec) -> &str {
    spec.label.as_deref().unwrap_or(&spec.type_id)
}

fn build_kind(spec: &CatalogNodeSpec) -> Result<NodeKind, CatalogError> {
    let mut kind = NodeKind::new(&spec.type_id, spec_label(spec), &spec.category);
    for input in &spec.inputs {
        kind.inputs.push(build_socket_spec(&spec.type_id, input)?);
    }
    for output in &spec.outputs {
        kind.outputs.push(build_socket_spec(&spec.type_id, output)?);
    }
    Ok(kind)
}

fn build_socket_spec(
    node_type: &str,
    socket: &CatalogSocketSpec,
) -> Result<SocketSpec, CatalogError> {
    let value_type = if socket.choices.is_some() {
        ValueType::Enum
    } else {
        let tag = socket.value_type.as_deref().unwrap_or("");
        ValueType::from_type_name(tag).ok_or_else(|| CatalogError::UnknownValueType {
            node_type: node_type.to_string(),
            socket: socket.name.clone(),
            value_type: tag.to_string(),
        })?
    };

    let mut spec = SocketSpec::new(&socket.name, value_type);
    if let Some(choices) = &socket.choices {
        // Enum sockets default to their first choice unless the spec says
        // otherwise
        if socket.default_value.is_none() {
            if let Some(first) = choices.first() {
                spec = spec.with_default(Value::Enum(first.value.clone()));
            }
        }
        spec = spec.with_choices(
            choices
                .iter()
                .map(|c| EnumChoice::with_text(&c.value, &c.text))
                .collect(),
        );
    }
    if let Some(default) = &socket.default_value {
        let literal = Value::from_catalog_json(value_type, default).ok_or_else(|| {
            CatalogError::BadDefault {
                node_type: node_type.to_string(),
                socket: socket.name.clone(),
            }
        })?;
        spec = spec.with_default(literal);
    }
    if let Some(description) = &socket.description {
        spec = spec.with_description(description);
    }
    Ok(spec)
}
