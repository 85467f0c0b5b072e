// SPDX-License-Identifier: MIT OR Apache-2.0
//! Wire format of the behavior extension fragment.
//!
//! These types serialize to the JSON embedded by the outer document
//! exporter under the behavior extension name. Field names and shapes are
//! part of the runtime contract and must not drift.

use indexmap::IndexMap;
use serde::Serialize;

/// Extension name the outer exporter embeds the fragment under
pub const EXTENSION_NAME: &str = "KHR_behavior";

/// The complete behavior fragment for one document export pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorFragment {
    /// Exported custom events, in id order
    pub custom_events: Vec<CustomEventRecord>,
    /// Exported variables, in id order
    pub variables: Vec<VariableRecord>,
    /// Exported nodes across every scope and graph
    pub nodes: Vec<NodeRecord>,
}

/// One exported custom event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomEventRecord {
    /// Composite `{scope}_{name}` key
    pub name: String,
    /// Sequential event id
    pub id: u32,
    /// Typed parameters, omitted when the event has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<EventParameterRecord>>,
}

/// One typed parameter on an exported custom event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParameterRecord {
    /// Parameter name
    pub name: String,
    /// Canonical value type tag
    pub value_type_name: String,
    /// Resolved default value in wire form
    pub default_value: serde_json::Value,
}

/// One exported variable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRecord {
    /// Composite `{scope}_{name}` key
    pub name: String,
    /// Sequential variable id
    pub id: u32,
    /// Canonical value type tag
    pub value_type_name: String,
    /// Resolved initial value in wire form
    pub initial_value: serde_json::Value,
}

/// One exported node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    /// Globally unique composite id:
    /// `{scope}_{scopeIdx}_{graph}_{slotIdx}_{node}`
    pub id: String,
    /// Namespaced node type identifier
    #[serde(rename = "type")]
    pub node_type: String,
    /// Input bindings keyed by socket identifier
    pub parameters: IndexMap<String, ParameterBinding>,
    /// Kind-specific static fields
    pub configuration: IndexMap<String, serde_json::Value>,
    /// Outgoing flow targets keyed by flow socket identifier
    pub flows: IndexMap<String, SocketRef>,
}

/// A parameter is either a resolved literal or a link to a producer socket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterBinding {
    /// Resolved literal value
    Value {
        /// The literal in wire form
        value: serde_json::Value,
    },
    /// Link to the producing node's output socket
    Link {
        /// The producing endpoint
        link: SocketRef,
    },
}

/// Reference to a socket on another exported node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketRef {
    /// Composite node record id
    pub node_id: String,
    /// Socket identifier on that node
    pub socket: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_binding_wire_shapes() {
        let value = ParameterBinding::Value {
            value: serde_json::json!(2.5),
        };
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"value":2.5}"#
        );

        let link = ParameterBinding::Link {
            link: SocketRef {
                node_id: "Cube_1_Graph_0_Add".to_string(),
                socket: "result".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_string(&link).unwrap(),
            r#"{"link":{"nodeId":"Cube_1_Graph_0_Add","socket":"result"}}"#
        );
    }

    #[test]
    fn test_event_parameters_omitted_when_absent() {
        let record = CustomEventRecord {
            name: "Scene_onReset".to_string(),
            id: 0,
            parameters: None,
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"name":"Scene_onReset","id":0}"#
        );
    }
}
