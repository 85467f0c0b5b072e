// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.

use crate::value::{ObjectRef, Value, ValueType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketId(pub Uuid);

impl SocketId {
    /// Create a new random socket ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

/// Socket direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketDirection {
    /// Input socket
    Input,
    /// Output socket
    Output,
}

/// What an entity socket resolves to when it is left unlinked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityRole {
    /// The object whose graph is currently being exported
    SelfRef,
    /// The socket's explicitly assigned target object
    Other,
    /// The scene scope itself
    Scene,
    /// The scope that owns the graph, whichever kind it is
    GraphLocal,
    /// No role assigned; falls back to the assigned target
    #[default]
    Unset,
}

impl EntityRole {
    /// Stable tag used when the role is reflected into configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfRef => "self",
            Self::Other => "other",
            Self::Scene => "scene",
            Self::GraphLocal => "graph",
            Self::Unset => "unset",
        }
    }
}

/// One selectable choice on an enum socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumChoice {
    /// Internal value, serialized into the document
    pub value: String,
    /// Display text shown in the editor
    pub text: String,
}

impl EnumChoice {
    /// Create a choice whose display text equals its value
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            text: value.clone(),
            value,
        }
    }

    /// Create a choice with distinct value and display text
    pub fn with_text(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// A socket on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Socket {
    /// Unique socket ID
    pub id: SocketId,
    /// Wire identifier, unique within the node side it belongs to
    pub name: String,
    /// Socket direction
    pub direction: SocketDirection,
    /// Data type
    pub value_type: ValueType,
    /// Literal used when the socket is unlinked (inputs only)
    pub default: Option<Value>,
    /// Hidden sockets are skipped by the serializer
    pub hidden: bool,
    /// Sockets flagged non-exported are skipped by the serializer
    pub export: bool,
    /// Optional tooltip text
    pub description: Option<String>,
    /// Resolution role for entity sockets
    pub entity_role: EntityRole,
    /// Assigned object for entity sockets
    pub target: Option<ObjectRef>,
    /// Choices for enum sockets, in display order
    pub choices: Vec<EnumChoice>,
}

impl Socket {
    /// Create a new input socket with the type's canonical default
    pub fn input(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: SocketId::new(),
            name: name.into(),
            direction: SocketDirection::Input,
            value_type,
            default: value_type.default_value(),
            hidden: false,
            export: true,
            description: None,
            entity_role: EntityRole::Unset,
            target: None,
            choices: Vec::new(),
        }
    }

    /// Create a new output socket
    pub fn output(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: SocketId::new(),
            name: name.into(),
            direction: SocketDirection::Output,
            value_type,
            default: None,
            hidden: false,
            export: true,
            description: None,
            entity_role: EntityRole::Unset,
            target: None,
            choices: Vec::new(),
        }
    }

    /// Create a flow input socket named `flow`
    pub fn flow_in() -> Self {
        Self::input("flow", ValueType::Flow)
    }

    /// Create a flow output socket named `flow`
    pub fn flow_out() -> Self {
        Self::output("flow", ValueType::Flow)
    }

    /// Set the default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Set the enum choices
    pub fn with_choices(mut self, choices: Vec<EnumChoice>) -> Self {
        self.choices = choices;
        self
    }

    /// Set the entity resolution role
    pub fn with_role(mut self, role: EntityRole) -> Self {
        self.entity_role = role;
        self
    }

    /// Set the tooltip text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the socket hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Whether this is a control-flow socket
    pub fn is_flow(&self) -> bool {
        self.value_type.is_flow()
    }

    /// Maximum number of links this socket accepts, `None` for unlimited.
    ///
    /// Flow sockets invert the data-socket rule: a flow output feeds at most
    /// one target while a flow input accepts unlimited fan-in; a data input
    /// accepts at most one producer while a data output fans out freely.
    pub fn link_limit(&self) -> Option<usize> {
        match (self.direction, self.is_flow()) {
            (SocketDirection::Output, true) | (SocketDirection::Input, false) => Some(1),
            (SocketDirection::Input, true) | (SocketDirection::Output, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_limits_invert_for_flow() {
        assert_eq!(Socket::flow_out().link_limit(), Some(1));
        assert_eq!(Socket::flow_in().link_limit(), None);
        assert_eq!(Socket::input("a", ValueType::Float).link_limit(), Some(1));
        assert_eq!(Socket::output("result", ValueType::Float).link_limit(), None);
    }

    #[test]
    fn test_input_gets_type_default() {
        let socket = Socket::input("a", ValueType::Integer);
        assert_eq!(socket.default, Some(Value::Integer(0)));
        assert!(Socket::flow_in().default.is_none());
    }
}
