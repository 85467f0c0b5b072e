// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the behavior graph.

use crate::socket::{EnumChoice, Socket, SocketDirection, SocketId};
use crate::value::{ObjectRef, Value, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type identifier of the transparent passthrough node
pub const REROUTE_KIND: &str = "core/reroute";

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// How the serializer extracts parameters and configuration for a node kind.
///
/// Catalog-defined kinds reflect their declared properties verbatim; every
/// other variant carries its own extraction logic. Absence of a capability
/// is a variant case, never a runtime probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeBehavior {
    /// Generic kind synthesized from the declarative catalog
    Catalog,
    /// Transparent passthrough, never serialized
    Reroute,
    /// Read a scope variable
    VariableGet,
    /// Write a scope variable
    VariableSet,
    /// Fire a custom event
    EventTrigger,
    /// React to a custom event
    EventReceive,
    /// Event source with an optional target object
    EventSource,
    /// Write one of the fixed entity properties
    SetEntityProperty,
    /// Look up a component on an entity
    GetComponent,
    /// Write a component property
    SetComponentProperty,
    /// Read a component property
    GetComponentProperty,
    /// Read a replicated object property
    NetworkedVariableGet,
    /// Write a replicated object property
    NetworkedVariableSet,
    /// Swap an entity's material
    SetMaterial,
    /// Write a material property
    SetMaterialProperty,
    /// Read a material property
    GetMaterialProperty,
    /// Fan a flow out over a configurable number of outputs in order
    Sequence,
}

/// Kind-specific configuration state carried by a node instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeConfig {
    /// No configuration
    None,
    /// Declared catalog properties, reflected verbatim into the document
    Properties(IndexMap<String, Value>),
    /// Selected scope variable
    Variable {
        /// Local variable name within the owning scope
        name: String,
    },
    /// Selected custom event
    Event {
        /// Local event name within the owning scope
        name: String,
    },
    /// Selected entity property
    EntityProperty {
        /// One of the fixed settable properties
        property: String,
    },
    /// Selected component
    Component {
        /// Component kind name
        component: String,
    },
    /// Selected component property
    ComponentProperty {
        /// Component kind name
        component: String,
        /// Property name within the component
        property: String,
    },
    /// Selected replicated property on a target object
    NetworkedVariable {
        /// Object carrying the replicated state
        target: Option<ObjectRef>,
        /// Property name
        property: String,
        /// Declared property type, `None` until a property is selected
        value_type: Option<ValueType>,
    },
    /// Selected material property
    MaterialProperty {
        /// Property name
        property: String,
    },
    /// Sequence fan-out size
    Sequence {
        /// Number of flow outputs
        outputs: u32,
    },
    /// Event source target
    EventTarget {
        /// Object the event listens on; `None` means the owning object
        target: Option<ObjectRef>,
    },
}

/// Declarative socket description on a node kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketSpec {
    /// Socket name, unique within its side
    pub name: String,
    /// Data type
    pub value_type: ValueType,
    /// Default literal overriding the type default
    pub default: Option<Value>,
    /// Choices for enum sockets
    pub choices: Vec<EnumChoice>,
    /// Tooltip text
    pub description: Option<String>,
    /// Whether the socket starts hidden
    pub hidden: bool,
}

impl SocketSpec {
    /// Create a socket spec
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            default: None,
            choices: Vec::new(),
            description: None,
            hidden: false,
        }
    }

    /// Create a flow socket spec named `flow`
    pub fn flow() -> Self {
        Self::new("flow", ValueType::Flow)
    }

    /// Set the default literal
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Set the enum choices
    pub fn with_choices(mut self, choices: Vec<EnumChoice>) -> Self {
        self.choices = choices;
        self
    }

    /// Set the tooltip text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the socket as starting hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    fn build(&self, direction: SocketDirection) -> Socket {
        let mut socket = match direction {
            SocketDirection::Input => Socket::input(&self.name, self.value_type),
            SocketDirection::Output => Socket::output(&self.name, self.value_type),
        };
        if self.default.is_some() {
            socket.default = self.default.clone();
        }
        socket.choices = self.choices.clone();
        socket.description = self.description.clone();
        socket.hidden = self.hidden;
        socket
    }
}

/// Node kind descriptor: everything needed to instantiate a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeKind {
    /// Namespaced type identifier, e.g. `math/toString/float`
    pub type_id: String,
    /// Display label
    pub label: String,
    /// Palette category
    pub category: String,
    /// Input socket specs, in order
    pub inputs: Vec<SocketSpec>,
    /// Output socket specs, in order
    pub outputs: Vec<SocketSpec>,
    /// Serialization behavior
    pub behavior: NodeBehavior,
}

impl NodeKind {
    /// Create a catalog-behavior kind
    pub fn new(type_id: impl Into<String>, label: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            label: label.into(),
            category: category.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            behavior: NodeBehavior::Catalog,
        }
    }

    /// Set the behavior
    pub fn with_behavior(mut self, behavior: NodeBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Set the input socket specs
    pub fn with_inputs(mut self, inputs: Vec<SocketSpec>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Set the output socket specs
    pub fn with_outputs(mut self, outputs: Vec<SocketSpec>) -> Self {
        self.outputs = outputs;
        self
    }
}

/// A node instance in a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Instance name, unique within the owning graph
    pub name: String,
    /// Namespaced node type identifier
    pub kind: String,
    /// Optional display label overriding the name
    pub label: Option<String>,
    /// Position in the editor canvas
    pub position: [f32; 2],
    /// Selection state
    pub selected: bool,
    /// Whether the node body is collapsed in the editor
    pub collapsed: bool,
    /// Input sockets, in order
    pub inputs: Vec<Socket>,
    /// Output sockets, in order
    pub outputs: Vec<Socket>,
    /// Serialization behavior
    pub behavior: NodeBehavior,
    /// Kind-specific configuration
    pub config: NodeConfig,
}

impl Node {
    /// Create a new node from a kind descriptor
    pub fn from_kind(kind: &NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: kind.label.clone(),
            kind: kind.type_id.clone(),
            label: None,
            position: [0.0, 0.0],
            selected: false,
            collapsed: false,
            inputs: kind
                .inputs
                .iter()
                .map(|spec| spec.build(SocketDirection::Input))
                .collect(),
            outputs: kind
                .outputs
                .iter()
                .map(|spec| spec.build(SocketDirection::Output))
                .collect(),
            behavior: kind.behavior,
            config: default_config(kind.behavior),
        }
    }

    /// Create a reroute passthrough carrying the given type
    pub fn reroute(value_type: ValueType) -> Self {
        Self {
            id: NodeId::new(),
            name: "Reroute".to_string(),
            kind: REROUTE_KIND.to_string(),
            label: None,
            position: [0.0, 0.0],
            selected: false,
            collapsed: true,
            inputs: vec![Socket::input("input", value_type)],
            outputs: vec![Socket::output("output", value_type)],
            behavior: NodeBehavior::Reroute,
            config: NodeConfig::None,
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Name shown in the editor and in export diagnostics
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Whether this is a transparent passthrough
    pub fn is_reroute(&self) -> bool {
        self.behavior == NodeBehavior::Reroute
    }

    /// Get an input socket by index
    pub fn input(&self, index: usize) -> Option<&Socket> {
        self.inputs.get(index)
    }

    /// Get an output socket by index
    pub fn output(&self, index: usize) -> Option<&Socket> {
        self.outputs.get(index)
    }

    /// Get an input socket by name
    pub fn input_named(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Get an output socket by name
    pub fn output_named(&self, name: &str) -> Option<&Socket> {
        self.outputs.iter().find(|s| s.name == name)
    }

    /// Get a socket on either side by ID
    pub fn socket(&self, socket_id: SocketId) -> Option<&Socket> {
        self.sockets().find(|s| s.id == socket_id)
    }

    /// Get a mutable socket on either side by ID
    pub fn socket_mut(&mut self, socket_id: SocketId) -> Option<&mut Socket> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|s| s.id == socket_id)
    }

    /// Iterate all sockets, inputs first
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Select the scope variable a variable get/set node operates on,
    /// rebuilding its value socket to the variable's type
    pub fn select_variable(&mut self, name: impl Into<String>, value_type: ValueType) {
        match self.behavior {
            NodeBehavior::VariableGet => {
                self.outputs = vec![Socket::output("value", value_type)];
            }
            NodeBehavior::VariableSet => {
                self.inputs.truncate(1);
                self.inputs.push(Socket::input("value", value_type));
            }
            _ => return,
        }
        self.config = NodeConfig::Variable { name: name.into() };
    }

    /// Select the custom event a trigger/listener node refers to
    pub fn select_event(&mut self, name: impl Into<String>) {
        if matches!(
            self.behavior,
            NodeBehavior::EventTrigger | NodeBehavior::EventReceive
        ) {
            self.config = NodeConfig::Event { name: name.into() };
        }
    }

    /// Select the property written by a set-entity-property node. The value
    /// socket is rebuilt from the property table and the node's wire type
    /// becomes `entity/set/{property}`. Returns false for unknown properties.
    pub fn select_entity_property(&mut self, property: &str) -> bool {
        if self.behavior != NodeBehavior::SetEntityProperty {
            return false;
        }
        let Some((value_type, default)) = entity_property_setting(property) else {
            return false;
        };
        self.inputs.truncate(2);
        self.inputs
            .push(Socket::input(property, value_type).with_default(default));
        self.kind = format!("entity/set/{property}");
        self.config = NodeConfig::EntityProperty {
            property: property.to_string(),
        };
        true
    }

    /// Select the component a get-component node looks up
    pub fn select_component(&mut self, component: impl Into<String>) {
        if self.behavior == NodeBehavior::GetComponent {
            self.config = NodeConfig::Component {
                component: component.into(),
            };
        }
    }

    /// Select the component property accessed by a component property node,
    /// rebuilding the value socket to the property's type
    pub fn select_component_property(
        &mut self,
        component: impl Into<String>,
        property: impl Into<String>,
        value_type: ValueType,
    ) {
        match self.behavior {
            NodeBehavior::SetComponentProperty => {
                self.inputs.truncate(2);
                self.inputs.push(Socket::input("value", value_type));
            }
            NodeBehavior::GetComponentProperty => {
                self.outputs = vec![Socket::output("value", value_type)];
            }
            _ => return,
        }
        self.config = NodeConfig::ComponentProperty {
            component: component.into(),
            property: property.into(),
        };
    }

    /// Select the material property accessed by a material property node,
    /// rebuilding the value socket to the property's type
    pub fn select_material_property(&mut self, property: impl Into<String>, value_type: ValueType) {
        match self.behavior {
            NodeBehavior::SetMaterialProperty => {
                self.inputs.truncate(2);
                self.inputs.push(Socket::input("value", value_type));
            }
            NodeBehavior::GetMaterialProperty => {
                self.outputs = vec![Socket::output("value", value_type)];
            }
            _ => return,
        }
        self.config = NodeConfig::MaterialProperty {
            property: property.into(),
        };
    }

    /// Select the replicated property a networked variable node accesses.
    /// One typed socket exists per networked type; all but the selected
    /// property's socket are hidden.
    pub fn select_networked_property(
        &mut self,
        target: Option<ObjectRef>,
        property: impl Into<String>,
        value_type: ValueType,
    ) {
        let sockets = match self.behavior {
            NodeBehavior::NetworkedVariableSet => &mut self.inputs,
            NodeBehavior::NetworkedVariableGet => &mut self.outputs,
            _ => return,
        };
        for socket in sockets.iter_mut() {
            if socket.is_flow() {
                continue;
            }
            socket.hidden = socket.value_type != value_type;
        }
        self.config = NodeConfig::NetworkedVariable {
            target,
            property: property.into(),
            value_type: Some(value_type),
        };
    }

    /// Resize a sequence node's flow fan-out, keeping existing outputs
    pub fn set_sequence_outputs(&mut self, count: u32) {
        if self.behavior != NodeBehavior::Sequence {
            return;
        }
        let count = count.max(1);
        let existing = self.outputs.len() as u32;
        if existing < count {
            for i in existing..count {
                self.outputs
                    .push(Socket::output((i + 1).to_string(), ValueType::Flow));
            }
        } else {
            self.outputs.truncate(count as usize);
        }
        self.config = NodeConfig::Sequence { outputs: count };
    }

    /// Assign the target object an event source listens on
    pub fn set_event_target(&mut self, target: Option<ObjectRef>) {
        if self.behavior == NodeBehavior::EventSource {
            self.config = NodeConfig::EventTarget { target };
        }
    }
}

fn default_config(behavior: NodeBehavior) -> NodeConfig {
    match behavior {
        NodeBehavior::Catalog => NodeConfig::Properties(IndexMap::new()),
        NodeBehavior::VariableGet | NodeBehavior::VariableSet => NodeConfig::Variable {
            name: String::new(),
        },
        NodeBehavior::EventTrigger | NodeBehavior::EventReceive => NodeConfig::Event {
            name: String::new(),
        },
        NodeBehavior::EventSource => NodeConfig::EventTarget { target: None },
        NodeBehavior::SetEntityProperty => NodeConfig::EntityProperty {
            property: "visible".to_string(),
        },
        NodeBehavior::GetComponent => NodeConfig::Component {
            component: String::new(),
        },
        NodeBehavior::SetComponentProperty | NodeBehavior::GetComponentProperty => {
            NodeConfig::ComponentProperty {
                component: String::new(),
                property: String::new(),
            }
        }
        NodeBehavior::NetworkedVariableGet | NodeBehavior::NetworkedVariableSet => {
            NodeConfig::NetworkedVariable {
                target: None,
                property: String::new(),
                value_type: None,
            }
        }
        NodeBehavior::SetMaterialProperty | NodeBehavior::GetMaterialProperty => {
            NodeConfig::MaterialProperty {
                property: "color".to_string(),
            }
        }
        NodeBehavior::Sequence => NodeConfig::Sequence { outputs: 2 },
        NodeBehavior::Reroute | NodeBehavior::SetMaterial => NodeConfig::None,
    }
}

/// Socket type and default literal for each settable entity property
pub fn entity_property_setting(property: &str) -> Option<(ValueType, Value)> {
    Some(match property {
        "visible" => (ValueType::Boolean, Value::Boolean(false)),
        "position" => (ValueType::Vec3, Value::Vec3([0.0, 0.0, 0.0])),
        "rotation" => (ValueType::Euler, Value::Euler([0.0, 0.0, 0.0])),
        "scale" => (ValueType::Vec3, Value::Vec3([1.0, 1.0, 1.0])),
        _ => return None,
    })
}

/// The settable entity properties, in display order
pub const ENTITY_PROPERTIES: &[&str] = &["visible", "position", "rotation", "scale"];

#[cfg(test)]
mod tests {
    use super::*;

    fn variable_set_kind() -> NodeKind {
        NodeKind::new("variable/set", "Set Variable", "Variables")
            .with_behavior(NodeBehavior::VariableSet)
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("value", ValueType::Float),
            ])
            .with_outputs(vec![SocketSpec::flow()])
    }

    #[test]
    fn test_from_kind_builds_sockets_in_order() {
        let node = Node::from_kind(&variable_set_kind());
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.inputs[0].name, "flow");
        assert_eq!(node.inputs[1].name, "value");
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.behavior, NodeBehavior::VariableSet);
    }

    #[test]
    fn test_select_variable_retypes_value_socket() {
        let mut node = Node::from_kind(&variable_set_kind());
        node.select_variable("speed", ValueType::String);
        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.inputs[1].value_type, ValueType::String);
        assert_eq!(
            node.config,
            NodeConfig::Variable {
                name: "speed".to_string()
            }
        );
    }

    #[test]
    fn test_select_entity_property_rewrites_kind() {
        let kind = NodeKind::new("entity/setProperty", "Set Entity Property", "Entity")
            .with_behavior(NodeBehavior::SetEntityProperty)
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("entity", ValueType::Entity),
            ])
            .with_outputs(vec![SocketSpec::flow()]);
        let mut node = Node::from_kind(&kind);
        assert!(node.select_entity_property("rotation"));
        assert_eq!(node.kind, "entity/set/rotation");
        assert_eq!(node.inputs[2].value_type, ValueType::Euler);
        assert!(!node.select_entity_property("velocity"));
    }

    #[test]
    fn test_sequence_resize_keeps_existing_outputs() {
        let kind = NodeKind::new("flow/sequence", "Sequence", "Flow")
            .with_behavior(NodeBehavior::Sequence)
            .with_inputs(vec![SocketSpec::flow()])
            .with_outputs(vec![
                SocketSpec::new("1", ValueType::Flow),
                SocketSpec::new("2", ValueType::Flow),
            ]);
        let mut node = Node::from_kind(&kind);
        let first = node.outputs[0].id;
        node.set_sequence_outputs(4);
        assert_eq!(node.outputs.len(), 4);
        assert_eq!(node.outputs[0].id, first);
        assert_eq!(node.outputs[3].name, "4");
        node.set_sequence_outputs(1);
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.outputs[0].id, first);
    }

    #[test]
    fn test_reroute_shape() {
        let node = Node::reroute(ValueType::Vec3);
        assert!(node.is_reroute());
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.inputs[0].value_type, ValueType::Vec3);
    }
}
