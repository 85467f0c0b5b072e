// SPDX-License-Identifier: MIT OR Apache-2.0
//! Link repair and auto-coercion.
//!
//! [`resolve_graph`] runs after every topology-affecting mutation and keeps
//! the link-type invariant: for every link, producer and consumer types
//! match, modulo reroute passthroughs and the string-into-enum case. Links
//! between convertible types get an adapter node spliced in; everything else
//! mismatched is dropped. The repair is idempotent, so the editor can call
//! it from inside its own change notifications without guarding against
//! re-entry.

use crate::catalog::Catalog;
use crate::graph::Graph;
use crate::link::Link;
use crate::value::{auto_cast, ValueType};

/// What a repair run did to the graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Adapter nodes spliced into mismatched links
    pub inserted_adapters: usize,
    /// Links dropped as unrepairable
    pub removed_links: usize,
    /// Reroute sockets retyped to match what flows through them
    pub retyped_sockets: usize,
}

impl ResolveReport {
    /// Whether the run left the graph untouched
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Repair every link in the graph, inserting coercion adapters where the
/// type table allows and dropping links it cannot make valid.
pub fn resolve_graph(graph: &mut Graph, catalog: &Catalog) -> ResolveReport {
    let mut report = ResolveReport::default();
    // Each productive pass either retypes a reroute socket toward its
    // endpoint, removes a link, or replaces one invalid link with two valid
    // ones. The bound only guards degenerate graphs where reroute fan-out
    // demands two types at once.
    let max_passes = graph.link_count() + graph.node_count() + 2;
    for _ in 0..max_passes {
        if !repair_pass(graph, catalog, &mut report) {
            break;
        }
    }
    report
}

fn repair_pass(graph: &mut Graph, catalog: &Catalog, report: &mut ResolveReport) -> bool {
    let mut changed = false;
    let snapshot: Vec<_> = graph.link_ids().collect();

    for link_id in snapshot {
        // Earlier repairs in this pass may have removed the link already
        let Some(link) = graph.link(link_id).cloned() else {
            continue;
        };

        let Some((from_type, to_type)) = graph.endpoint_types(&link) else {
            // A socket rebuild (variable retype, property selection) left
            // this link dangling
            graph.disconnect(link_id);
            report.removed_links += 1;
            changed = true;
            tracing::debug!(graph = %graph.name, "dropped link with a missing socket");
            continue;
        };

        if from_type == to_type {
            continue;
        }

        let producer_is_reroute = graph
            .node(link.from_node)
            .is_some_and(|n| n.is_reroute());
        let consumer_is_reroute = graph.node(link.to_node).is_some_and(|n| n.is_reroute());

        if producer_is_reroute {
            // The reroute becomes whatever its consumer expects
            retype_socket(graph, &link, true, to_type);
            report.retyped_sockets += 1;
            changed = true;
        } else if consumer_is_reroute {
            retype_socket(graph, &link, false, from_type);
            report.retyped_sockets += 1;
            changed = true;
        } else if let Some(adapter_kind) = auto_cast(from_type, to_type) {
            if insert_adapter(graph, &link, adapter_kind, catalog) {
                report.inserted_adapters += 1;
            } else {
                graph.disconnect(link_id);
                report.removed_links += 1;
                tracing::warn!(
                    graph = %graph.name,
                    adapter = adapter_kind,
                    "adapter instantiation failed, dropping link"
                );
            }
            changed = true;
        } else if from_type == ValueType::String && to_type == ValueType::Enum {
            // Enums serialize as strings, so a string producer is fine
        } else {
            graph.disconnect(link_id);
            report.removed_links += 1;
            changed = true;
            tracing::debug!(
                graph = %graph.name,
                from = from_type.type_name(),
                to = to_type.type_name(),
                "removed link between incompatible sockets"
            );
        }
    }

    changed
}

fn retype_socket(graph: &mut Graph, link: &Link, producer_side: bool, value_type: ValueType) {
    let (node_id, socket_id) = if producer_side {
        (link.from_node, link.from_socket)
    } else {
        (link.to_node, link.to_socket)
    };
    if let Some(socket) = graph
        .node_mut(node_id)
        .and_then(|node| node.socket_mut(socket_id))
    {
        socket.value_type = value_type;
        socket.default = match socket.direction {
            crate::socket::SocketDirection::Input => value_type.default_value(),
            crate::socket::SocketDirection::Output => None,
        };
    }
}

/// Splice an adapter node into the link. Returns false when the adapter
/// could not be instantiated or wired; the caller drops the link instead.
fn insert_adapter(graph: &mut Graph, link: &Link, adapter_kind: &str, catalog: &Catalog) -> bool {
    let Some(mut adapter) = catalog.instantiate(adapter_kind) else {
        return false;
    };
    let (Some(producer), Some(consumer)) = (graph.node(link.from_node), graph.node(link.to_node))
    else {
        return false;
    };

    adapter.position = [
        producer.position[0] + (producer.position[0] - consumer.position[0]).abs() / 2.0,
        producer.position[1],
    ];
    adapter.collapsed = adapter.inputs.len() <= 1 && adapter.outputs.len() <= 1;
    adapter.selected = true;

    let (Some(adapter_in), Some(adapter_out)) = (
        adapter.inputs.first().map(|s| s.id),
        adapter.outputs.first().map(|s| s.id),
    ) else {
        return false;
    };

    let adapter_id = graph.add_node(adapter);

    // Free the consumer's input slot before rewiring through the adapter
    graph.disconnect(link.id);

    let upstream = graph.connect(link.from_node, link.from_socket, adapter_id, adapter_in);
    let downstream = graph.connect(adapter_id, adapter_out, link.to_node, link.to_socket);
    if upstream.is_err() || downstream.is_err() {
        graph.remove_node(adapter_id);
        return false;
    }

    if let Some(producer) = graph.node_mut(link.from_node) {
        producer.selected = false;
    }
    tracing::debug!(
        graph = %graph.name,
        adapter = adapter_kind,
        "spliced coercion adapter into mismatched link"
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind, SocketSpec};
    use crate::value::ValueType;

    fn source(value_type: ValueType) -> Node {
        Node::from_kind(
            &NodeKind::new("test/source", "Source", "Test")
                .with_outputs(vec![SocketSpec::new("result", value_type)]),
        )
    }

    fn sink(value_type: ValueType) -> Node {
        Node::from_kind(
            &NodeKind::new("test/sink", "Sink", "Test")
                .with_inputs(vec![SocketSpec::new("a", value_type)]),
        )
    }

    #[test]
    fn test_adapter_splice_replaces_illegal_link() {
        let catalog = Catalog::with_builtins();
        let mut graph = Graph::new("g");
        let producer = graph.add_node(source(ValueType::Float).with_position(0.0, 0.0));
        let consumer = graph.add_node(sink(ValueType::String).with_position(200.0, 0.0));
        let out = graph.node(producer).unwrap().outputs[0].id;
        let input = graph.node(consumer).unwrap().inputs[0].id;
        graph.connect(producer, out, consumer, input).unwrap();

        let report = resolve_graph(&mut graph, &catalog);

        assert_eq!(report.inserted_adapters, 1);
        assert_eq!(report.removed_links, 0);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.link_count(), 2);

        let adapter = graph
            .nodes()
            .find(|n| n.kind == "math/toString/float")
            .expect("adapter inserted");
        assert!(adapter.collapsed);
        assert!(adapter.selected);
        // Horizontal midpoint between producer and consumer
        assert_eq!(adapter.position, [100.0, 0.0]);
        assert!(graph.invalid_links().is_empty());

        // The consumer's real producer resolves to the adapter
        let resolved = graph.resolve_input_link(input).unwrap().unwrap();
        assert_eq!(resolved.node, adapter.id);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let catalog = Catalog::with_builtins();
        let mut graph = Graph::new("g");
        let producer = graph.add_node(source(ValueType::Float));
        let consumer = graph.add_node(sink(ValueType::String));
        let out = graph.node(producer).unwrap().outputs[0].id;
        let input = graph.node(consumer).unwrap().inputs[0].id;
        graph.connect(producer, out, consumer, input).unwrap();

        resolve_graph(&mut graph, &catalog);
        let nodes_after_first = graph.node_count();
        let links_after_first = graph.link_count();

        let second = resolve_graph(&mut graph, &catalog);
        assert!(second.is_clean());
        assert_eq!(graph.node_count(), nodes_after_first);
        assert_eq!(graph.link_count(), links_after_first);
    }

    #[test]
    fn test_reroute_adopts_types_flowing_through_it() {
        let catalog = Catalog::with_builtins();
        let mut graph = Graph::new("g");
        let producer = graph.add_node(source(ValueType::Boolean));
        let reroute = graph.add_node(Node::reroute(ValueType::Float));
        let consumer = graph.add_node(sink(ValueType::Integer));

        let out = graph.node(producer).unwrap().outputs[0].id;
        let r_in = graph.node(reroute).unwrap().inputs[0].id;
        let r_out = graph.node(reroute).unwrap().outputs[0].id;
        let input = graph.node(consumer).unwrap().inputs[0].id;
        graph.connect(producer, out, reroute, r_in).unwrap();
        graph.connect(reroute, r_out, consumer, input).unwrap();

        let report = resolve_graph(&mut graph, &catalog);

        assert_eq!(report.removed_links, 0);
        assert_eq!(report.retyped_sockets, 2);
        let reroute_node = graph.node(reroute).unwrap();
        assert_eq!(reroute_node.inputs[0].value_type, ValueType::Boolean);
        assert_eq!(reroute_node.outputs[0].value_type, ValueType::Integer);

        // The logical path is intact
        let resolved = graph.resolve_input_link(input).unwrap().unwrap();
        assert_eq!(resolved.node, producer);
        assert!(resolve_graph(&mut graph, &catalog).is_clean());
    }

    #[test]
    fn test_string_into_enum_is_left_alone() {
        let catalog = Catalog::with_builtins();
        let mut graph = Graph::new("g");
        let producer = graph.add_node(source(ValueType::String));
        let consumer = graph.add_node(sink(ValueType::Enum));
        let out = graph.node(producer).unwrap().outputs[0].id;
        let input = graph.node(consumer).unwrap().inputs[0].id;
        graph.connect(producer, out, consumer, input).unwrap();

        let report = resolve_graph(&mut graph, &catalog);
        assert!(report.is_clean());
        assert_eq!(graph.link_count(), 1);
    }

    #[test]
    fn test_unconvertible_link_is_removed() {
        let catalog = Catalog::with_builtins();
        let mut graph = Graph::new("g");
        let producer = graph.add_node(source(ValueType::Color));
        let consumer = graph.add_node(sink(ValueType::Boolean));
        let out = graph.node(producer).unwrap().outputs[0].id;
        let input = graph.node(consumer).unwrap().inputs[0].id;
        graph.connect(producer, out, consumer, input).unwrap();

        let report = resolve_graph(&mut graph, &catalog);
        assert_eq!(report.removed_links, 1);
        assert_eq!(graph.link_count(), 0);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_missing_adapter_kind_falls_back_to_removal() {
        // Empty catalog: the coercion table knows float -> string but the
        // adapter kind cannot be instantiated
        let catalog = Catalog::new();
        let mut graph = Graph::new("g");
        let producer = graph.add_node(source(ValueType::Float));
        let consumer = graph.add_node(sink(ValueType::String));
        let out = graph.node(producer).unwrap().outputs[0].id;
        let input = graph.node(consumer).unwrap().inputs[0].id;
        graph.connect(producer, out, consumer, input).unwrap();

        let report = resolve_graph(&mut graph, &catalog);
        assert_eq!(report.inserted_adapters, 0);
        assert_eq!(report.removed_links, 1);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn test_dangling_links_are_pruned_after_socket_rebuild() {
        let catalog = Catalog::with_builtins();
        let mut graph = Graph::new("g");
        let producer = graph.add_node(source(ValueType::Float));
        let setter = graph.add_node(catalog.instantiate("variable/set").unwrap());
        let out = graph.node(producer).unwrap().outputs[0].id;
        let value_in = graph.node(setter).unwrap().inputs[1].id;
        graph.connect(producer, out, setter, value_in).unwrap();

        // Re-selecting the variable rebuilds the value socket, orphaning
        // the old link
        graph
            .node_mut(setter)
            .unwrap()
            .select_variable("label", ValueType::String);
        let report = resolve_graph(&mut graph, &catalog);
        assert_eq!(report.removed_links, 1);
        assert_eq!(graph.link_count(), 0);
    }
}
