// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node and graph serialization.
//!
//! One resolved graph becomes an ordered list of [`NodeRecord`]s. A node
//! that fails to resolve is reported and omitted; its siblings are never
//! affected. Reroutes disappear here: links are always written against the
//! real producer or consumer.

use crate::document::{NodeRecord, ParameterBinding, SocketRef};
use crate::gather::{
    gather_socket_value, gather_value, resolve_entity_ref, DocumentGatherer, ExportPhase,
    ExportSettings, GatherError, NetworkTarget, ValueContext,
};
use crate::symbols::SymbolTables;
use behavekit_graph::graph::{Graph, RerouteCycle, ResolvedEndpoint};
use behavekit_graph::node::{Node, NodeBehavior, NodeConfig};
use behavekit_graph::scope::Scope;
use indexmap::IndexMap;

/// Replication component required on objects carrying networked variables
pub const NETWORKED_BEHAVIOR_COMPONENT: &str = "networked-behavior";

/// Replication component required on objects whose material gets swapped
pub const NETWORKED_MATERIAL_COMPONENT: &str = "networked-object-material";

/// Everything needed to serialize one (scope, slot) graph
pub struct GraphContext<'a> {
    /// The scope owning the graph
    pub scope: &'a Scope,
    /// Index of the scope in the export pass, scene first
    pub scope_index: usize,
    /// Slot index of the graph on its scope
    pub slot_index: usize,
    /// The resolved graph
    pub graph: &'a Graph,
    /// Global symbol tables
    pub symbols: &'a SymbolTables,
    /// Export settings
    pub settings: &'a ExportSettings,
    /// Scene-or-object marker
    pub phase: ExportPhase,
    /// Name of the scene scope
    pub scene_name: &'a str,
}

impl GraphContext<'_> {
    /// The id prefix shared by every node record of this graph
    fn prefix(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.scope.name, self.scope_index, self.graph.name, self.slot_index
        )
    }

    fn value_context(&self) -> ValueContext<'_> {
        ValueContext {
            settings: self.settings,
            phase: self.phase,
            scope: self.scope,
            scene_name: self.scene_name,
        }
    }
}

/// Error while serializing one node
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// A reference failed to resolve
    #[error(transparent)]
    Gather(#[from] GatherError),

    /// A reroute chain on a link loops back on itself
    #[error(transparent)]
    RerouteCycle(#[from] RerouteCycle),

    /// The selected variable is not declared in any exported scope
    #[error("variable `{0}` is not declared in the owning scope")]
    UnknownVariable(String),

    /// The selected custom event is not declared in any exported scope
    #[error("custom event `{0}` is not declared in the owning scope")]
    UnknownEvent(String),

    /// The node was never configured
    #[error("no {0} selected")]
    MissingSelection(&'static str),
}

/// Serialize every node of the graph, appending one report line per failed
/// node and omitting it from the result
pub fn serialize_graph(
    ctx: &GraphContext,
    gatherer: &mut dyn DocumentGatherer,
    report: &mut Vec<String>,
) -> Vec<NodeRecord> {
    let mut records = Vec::new();
    for node in ctx.graph.nodes() {
        if node.is_reroute() {
            continue;
        }
        match serialize_node(ctx, node, gatherer) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(
                    scope = %ctx.scope.name,
                    graph = %ctx.graph.name,
                    node = %node.display_name(),
                    %error,
                    "skipping node"
                );
                report.push(format!(
                    "{}/{}/{}: {}",
                    ctx.scope.name,
                    ctx.graph.name,
                    node.display_name(),
                    error
                ));
            }
        }
    }
    records
}

fn serialize_node(
    ctx: &GraphContext,
    node: &Node,
    gatherer: &mut dyn DocumentGatherer,
) -> Result<NodeRecord, SerializeError> {
    let prefix = ctx.prefix();
    let mut record = NodeRecord {
        id: format!("{prefix}_{}", node.name),
        node_type: node.kind.clone(),
        parameters: IndexMap::new(),
        configuration: IndexMap::new(),
        flows: IndexMap::new(),
    };

    for output in &node.outputs {
        if !output.is_flow() {
            continue;
        }
        if let Some(endpoint) = ctx.graph.resolve_output_link(output.id)? {
            if let Some(target) = socket_ref(ctx, &prefix, endpoint) {
                record.flows.insert(output.name.clone(), target);
            }
        }
    }

    let value_ctx = ctx.value_context();
    for input in &node.inputs {
        if input.is_flow() || input.hidden || !input.export {
            continue;
        }
        if ctx.graph.links_to_socket(input.id).next().is_some() {
            if let Some(endpoint) = ctx.graph.resolve_input_link(input.id)? {
                if let Some(source) = socket_ref(ctx, &prefix, endpoint) {
                    record
                        .parameters
                        .insert(input.name.clone(), ParameterBinding::Link { link: source });
                    continue;
                }
            }
            // A reroute with a dangling upstream behaves like an unlinked
            // socket and falls through to its literal
        }
        if let Some(value) = gather_socket_value(input, &value_ctx, gatherer)? {
            record
                .parameters
                .insert(input.name.clone(), ParameterBinding::Value { value });
        }
    }

    gather_configuration(ctx, node, &mut record.configuration, gatherer)?;
    push_network_dependencies(ctx, node, gatherer)?;

    Ok(record)
}

fn socket_ref(ctx: &GraphContext, prefix: &str, endpoint: ResolvedEndpoint) -> Option<SocketRef> {
    let node = ctx.graph.node(endpoint.node)?;
    let socket = node.socket(endpoint.socket)?;
    Some(SocketRef {
        node_id: format!("{prefix}_{}", node.name),
        socket: socket.name.clone(),
    })
}

fn gather_configuration(
    ctx: &GraphContext,
    node: &Node,
    configuration: &mut IndexMap<String, serde_json::Value>,
    gatherer: &mut dyn DocumentGatherer,
) -> Result<(), SerializeError> {
    match node.behavior {
        NodeBehavior::Catalog => {
            if let NodeConfig::Properties(properties) = &node.config {
                for (key, value) in properties {
                    configuration.insert(
                        key.clone(),
                        gather_value(value, ctx.settings, gatherer)?,
                    );
                }
            }
        }

        NodeBehavior::VariableGet | NodeBehavior::VariableSet => {
            let NodeConfig::Variable { name } = &node.config else {
                return Err(SerializeError::MissingSelection("variable"));
            };
            if name.is_empty() {
                return Err(SerializeError::MissingSelection("variable"));
            }
            if ctx.scope.variable(name).is_some_and(|v| v.networked) {
                // Networked variables resolve by name at runtime and stay
                // outside the static id space
                configuration.insert("variableId".to_string(), serde_json::json!(-1));
                configuration.insert("variableName".to_string(), serde_json::json!(name));
            } else {
                let id = ctx
                    .symbols
                    .variable_id(&ctx.scope.name, name)
                    .ok_or_else(|| SerializeError::UnknownVariable(name.clone()))?;
                configuration.insert("variableId".to_string(), serde_json::json!(id));
            }
        }

        NodeBehavior::EventTrigger | NodeBehavior::EventReceive => {
            let NodeConfig::Event { name } = &node.config else {
                return Err(SerializeError::MissingSelection("custom event"));
            };
            if name.is_empty() {
                return Err(SerializeError::MissingSelection("custom event"));
            }
            let id = ctx
                .symbols
                .event_id(&ctx.scope.name, name)
                .ok_or_else(|| SerializeError::UnknownEvent(name.clone()))?;
            configuration.insert("customEventId".to_string(), serde_json::json!(id));
        }

        NodeBehavior::EventSource => {
            if let NodeConfig::EventTarget {
                target: Some(target),
            } = &node.config
            {
                let index = gatherer.gather_object_property(target)?;
                configuration.insert("target".to_string(), serde_json::json!(index));
            }
            // No target means the event listens on the owning object
        }

        NodeBehavior::SetEntityProperty => {
            let NodeConfig::EntityProperty { property } = &node.config else {
                return Err(SerializeError::MissingSelection("entity property"));
            };
            configuration.insert("targetProperty".to_string(), serde_json::json!(property));
        }

        NodeBehavior::GetComponent => {
            let NodeConfig::Component { component } = &node.config else {
                return Err(SerializeError::MissingSelection("component"));
            };
            if component.is_empty() {
                return Err(SerializeError::MissingSelection("component"));
            }
            configuration.insert("component".to_string(), serde_json::json!(component));
        }

        NodeBehavior::SetComponentProperty | NodeBehavior::GetComponentProperty => {
            let NodeConfig::ComponentProperty {
                component,
                property,
            } = &node.config
            else {
                return Err(SerializeError::MissingSelection("component property"));
            };
            if component.is_empty() || property.is_empty() {
                return Err(SerializeError::MissingSelection("component property"));
            }
            configuration.insert("component".to_string(), serde_json::json!(component));
            configuration.insert("property".to_string(), serde_json::json!(property));
        }

        NodeBehavior::NetworkedVariableGet | NodeBehavior::NetworkedVariableSet => {
            let NodeConfig::NetworkedVariable {
                target,
                property,
                value_type,
            } = &node.config
            else {
                return Err(SerializeError::MissingSelection("networked property"));
            };
            let Some(value_type) = value_type else {
                return Err(SerializeError::MissingSelection("networked property"));
            };
            if property.is_empty() {
                return Err(SerializeError::MissingSelection("networked property"));
            }
            let target = target
                .as_ref()
                .ok_or(GatherError::EmptyReference("entity"))
                .map_err(SerializeError::Gather)?;
            let index = gatherer.gather_object_property(target)?;
            configuration.insert("target".to_string(), serde_json::json!(index));
            configuration.insert("name".to_string(), serde_json::json!(property));
            configuration.insert(
                "valueTypeName".to_string(),
                serde_json::json!(value_type.type_name()),
            );
        }

        NodeBehavior::SetMaterialProperty | NodeBehavior::GetMaterialProperty => {
            let NodeConfig::MaterialProperty { property } = &node.config else {
                return Err(SerializeError::MissingSelection("material property"));
            };
            configuration.insert("property".to_string(), serde_json::json!(property));
        }

        NodeBehavior::Sequence => {
            if let NodeConfig::Sequence { outputs } = &node.config {
                configuration.insert("numOutputs".to_string(), serde_json::json!(outputs));
            }
        }

        NodeBehavior::SetMaterial | NodeBehavior::Reroute => {}
    }
    Ok(())
}

/// Push replication requirements to the host before its document finalizes
fn push_network_dependencies(
    ctx: &GraphContext,
    node: &Node,
    gatherer: &mut dyn DocumentGatherer,
) -> Result<(), SerializeError> {
    match node.behavior {
        NodeBehavior::NetworkedVariableGet | NodeBehavior::NetworkedVariableSet => {
            if let NodeConfig::NetworkedVariable {
                target: Some(target),
                property,
                value_type: Some(value_type),
            } = &node.config
            {
                gatherer.register_network_dependency(
                    NetworkTarget::Object(target.clone()),
                    NETWORKED_BEHAVIOR_COMPONENT,
                    serde_json::json!({
                        "name": property,
                        "type": value_type.type_name(),
                    }),
                );
            }
        }
        NodeBehavior::SetMaterial => {
            // Only a statically known entity can carry the requirement; a
            // linked entity input is resolved at runtime instead
            if let Some(socket) = node.input_named("entity") {
                if ctx.graph.links_to_socket(socket.id).next().is_none() {
                    if let Ok(target) = resolve_entity_ref(socket, &ctx.value_context()) {
                        gatherer.register_network_dependency(
                            NetworkTarget::Object(target),
                            NETWORKED_MATERIAL_COMPONENT,
                            serde_json::json!({}),
                        );
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}
