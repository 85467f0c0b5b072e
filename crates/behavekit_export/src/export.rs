// SPDX-License-Identifier: MIT OR Apache-2.0
//! Export orchestration: one entry point per document export pass.
//!
//! Walks every scope and every authored graph slot, drives the symbol table
//! builder and the serializer, and assembles the behavior fragment. Export
//! is partial-success: a failing node costs only its own record and one
//! report line, never the pass.

use crate::document::BehaviorFragment;
use crate::gather::{DocumentGatherer, ExportPhase, ExportSettings};
use crate::serialize::{serialize_graph, GraphContext};
use crate::symbols::build_symbol_tables;
use behavekit_graph::scope::{Project, ScopeKind};

/// Result of one export pass
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The assembled fragment, `None` when no nodes were exported
    pub fragment: Option<BehaviorFragment>,
    /// Human-readable diagnostics, one line per skipped node
    pub report: Vec<String>,
}

impl ExportOutput {
    /// Whether the pass finished without diagnostics
    pub fn is_clean(&self) -> bool {
        self.report.is_empty()
    }
}

/// Produce the behavior fragment for one document export pass.
///
/// Scopes are visited scene first, then objects in document order; on each
/// scope every non-empty slot is serialized with the scope-kind marker the
/// entity-role resolver reads.
pub fn export_project(
    project: &Project,
    settings: &ExportSettings,
    gatherer: &mut dyn DocumentGatherer,
) -> ExportOutput {
    let mut report = Vec::new();

    let symbols = match build_symbol_tables(project, settings, gatherer) {
        Ok(tables) => tables,
        Err(error) => {
            tracing::warn!(%error, "symbol table construction failed");
            report.push(error.to_string());
            return ExportOutput {
                fragment: None,
                report,
            };
        }
    };

    let mut nodes = Vec::new();
    for (scope_index, scope) in project.scopes().enumerate() {
        let phase = match scope.kind {
            ScopeKind::Scene => ExportPhase::Scene,
            ScopeKind::Object(_) => ExportPhase::Object,
        };
        for (slot_index, graph) in scope.graphs() {
            tracing::debug!(
                scope = %scope.name,
                graph = %graph.name,
                slot = slot_index,
                "serializing graph"
            );
            let ctx = GraphContext {
                scope,
                scope_index,
                slot_index,
                graph,
                symbols: &symbols,
                settings,
                phase,
                scene_name: &project.scene.name,
            };
            nodes.extend(serialize_graph(&ctx, gatherer, &mut report));
        }
    }

    let fragment = if nodes.is_empty() {
        None
    } else {
        Some(BehaviorFragment {
            custom_events: symbols.event_records(),
            variables: symbols.variable_records(),
            nodes,
        })
    };

    ExportOutput { fragment, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gather::stub::StubGatherer;
    use behavekit_graph::catalog::Catalog;
    use behavekit_graph::graph::Graph;
    use behavekit_graph::scope::{CustomEvent, Scope, Variable};
    use behavekit_graph::value::{Value, ValueType};
    use std::collections::HashSet;

    fn behavior_graph(catalog: &Catalog, variable: &str) -> Graph {
        let mut graph = Graph::new("Behavior");
        let event = graph.add_node(catalog.instantiate("lifecycle/onStart").unwrap());
        let mut setter_node = catalog.instantiate("variable/set").unwrap();
        setter_node.select_variable(variable, ValueType::Float);
        let setter = graph.add_node(setter_node);
        let event_out = graph.node(event).unwrap().outputs[0].id;
        let flow_in = graph.node(setter).unwrap().inputs[0].id;
        graph.connect(event, event_out, setter, flow_in).unwrap();
        graph
    }

    fn sample_project(catalog: &Catalog) -> Project {
        let mut project = Project::new("Scene");
        project
            .scene
            .add_variable(Variable::new("tempo", ValueType::Float).with_default(Value::Float(1.0)));
        project.scene.add_event(CustomEvent::new("onReset"));
        project.scene.add_graph(behavior_graph(catalog, "tempo"));

        let cube = project.add_object(Scope::object("Cube"));
        cube.add_variable(
            Variable::new("speed", ValueType::Float).with_default(Value::Float(2.5)),
        );
        // Same graph name on a different scope, plus a second slot
        cube.add_graph(behavior_graph(catalog, "speed"));
        cube.add_graph(behavior_graph(catalog, "speed"));
        project
    }

    #[test]
    fn test_fragment_assembly() {
        let catalog = Catalog::with_builtins();
        let project = sample_project(&catalog);
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Scene", "Cube"]);

        let output = export_project(&project, &settings, &mut gatherer);
        assert!(output.is_clean(), "{:?}", output.report);
        let fragment = output.fragment.unwrap();

        assert_eq!(fragment.variables.len(), 2);
        assert_eq!(fragment.variables[0].name, "Scene_tempo");
        assert_eq!(fragment.variables[0].id, 0);
        assert_eq!(fragment.variables[1].name, "Cube_speed");
        assert_eq!(fragment.variables[1].id, 1);
        assert_eq!(fragment.custom_events.len(), 1);
        assert_eq!(fragment.nodes.len(), 6);
    }

    #[test]
    fn test_node_ids_are_unique_across_scopes_and_slots() {
        let catalog = Catalog::with_builtins();
        let project = sample_project(&catalog);
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Scene", "Cube"]);

        let output = export_project(&project, &settings, &mut gatherer);
        let fragment = output.fragment.unwrap();
        let ids: HashSet<_> = fragment.nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids.len(), fragment.nodes.len());
    }

    #[test]
    fn test_repeated_export_is_byte_identical() {
        let catalog = Catalog::with_builtins();
        let project = sample_project(&catalog);
        let settings = ExportSettings::default();

        let mut gatherer = StubGatherer::new(&["Scene", "Cube"]);
        let first = export_project(&project, &settings, &mut gatherer);
        let mut gatherer = StubGatherer::new(&["Scene", "Cube"]);
        let second = export_project(&project, &settings, &mut gatherer);

        let first_json = serde_json::to_string(&first.fragment.unwrap()).unwrap();
        let second_json = serde_json::to_string(&second.fragment.unwrap()).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn test_bad_node_still_yields_partial_fragment() {
        let catalog = Catalog::with_builtins();
        let mut project = sample_project(&catalog);
        // Break one graph: select a variable that does not exist
        let cube = &mut project.objects[0];
        let graph = cube.graph_mut(0).unwrap();
        let mut broken = catalog.instantiate("variable/set").unwrap();
        broken.select_variable("missing", ValueType::Float);
        graph.add_node(broken);

        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Scene", "Cube"]);
        let output = export_project(&project, &settings, &mut gatherer);

        assert_eq!(output.report.len(), 1);
        assert!(output.report[0].starts_with("Cube/Behavior/"));
        // All six healthy nodes still exported
        assert_eq!(output.fragment.unwrap().nodes.len(), 6);
    }

    #[test]
    fn test_empty_project_produces_no_fragment() {
        let project = Project::new("Scene");
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Scene"]);
        let output = export_project(&project, &settings, &mut gatherer);
        assert!(output.fragment.is_none());
        assert!(output.is_clean());
    }
}
