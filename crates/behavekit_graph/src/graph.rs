// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and links.

use crate::link::{Link, LinkId};
use crate::node::{Node, NodeId};
use crate::socket::{Socket, SocketDirection, SocketId};
use crate::value::ValueType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A behavior graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph, in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Links between sockets, in insertion order
    links: IndexMap<LinkId, Link>,
}

/// A link endpoint after resolving through any chain of reroutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// The real (non-reroute) node
    pub node: NodeId,
    /// The socket on that node
    pub socket: SocketId,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            links: IndexMap::new(),
        }
    }

    /// Add a node, unique-ifying its name within the graph
    pub fn add_node(&mut self, mut node: Node) -> NodeId {
        node.name = self.unique_name(&node.name);
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.nodes.values().any(|n| n.name == base) {
            return base.to_string();
        }
        let mut counter = 1usize;
        loop {
            let candidate = format!("{base}.{counter:03}");
            if !self.nodes.values().any(|n| n.name == candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Remove a node and every link touching it
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.links.retain(|_, link| !link.involves_node(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get a node by its unique name
    pub fn node_named(&self, name: &str) -> Option<&Node> {
        self.nodes.values().find(|n| n.name == name)
    }

    /// Iterate all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate all node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a socket on a node
    pub fn socket(&self, node_id: NodeId, socket_id: SocketId) -> Option<&Socket> {
        self.nodes.get(&node_id)?.socket(socket_id)
    }

    /// Add a link between an output socket and an input socket.
    ///
    /// Admission checks structure only (existence, direction, fan limits,
    /// self-loops); type mismatches are admitted and left for the resolution
    /// engine to repair or reject.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_socket: SocketId,
        to_node: NodeId,
        to_socket: SocketId,
    ) -> Result<LinkId, LinkError> {
        let source = self
            .nodes
            .get(&from_node)
            .ok_or(LinkError::NodeNotFound(from_node))?;
        let target = self
            .nodes
            .get(&to_node)
            .ok_or(LinkError::NodeNotFound(to_node))?;

        let source_socket = source
            .socket(from_socket)
            .ok_or(LinkError::SocketNotFound(from_socket))?;
        let target_socket = target
            .socket(to_socket)
            .ok_or(LinkError::SocketNotFound(to_socket))?;

        if source_socket.direction != SocketDirection::Output
            || target_socket.direction != SocketDirection::Input
        {
            return Err(LinkError::WrongDirection);
        }

        if from_node == to_node {
            return Err(LinkError::SelfLoop);
        }

        if let Some(limit) = source_socket.link_limit() {
            if self.links_from_socket(from_socket).count() >= limit {
                return Err(LinkError::AlreadyLinked(from_socket));
            }
        }
        if let Some(limit) = target_socket.link_limit() {
            if self.links_to_socket(to_socket).count() >= limit {
                return Err(LinkError::AlreadyLinked(to_socket));
            }
        }

        let link = Link::new(from_node, from_socket, to_node, to_socket);
        let id = link.id;
        self.links.insert(id, link);
        Ok(id)
    }

    /// Remove a link
    pub fn disconnect(&mut self, link_id: LinkId) -> Option<Link> {
        self.links.shift_remove(&link_id)
    }

    /// Get a link by ID
    pub fn link(&self, link_id: LinkId) -> Option<&Link> {
        self.links.get(&link_id)
    }

    /// Iterate all links in insertion order
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Iterate all link IDs in insertion order
    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.links.keys().copied()
    }

    /// Number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Links leaving a specific output socket
    pub fn links_from_socket(&self, socket_id: SocketId) -> impl Iterator<Item = &Link> {
        self.links
            .values()
            .filter(move |l| l.from_socket == socket_id)
    }

    /// Links arriving at a specific input socket
    pub fn links_to_socket(&self, socket_id: SocketId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.to_socket == socket_id)
    }

    /// Links touching a node
    pub fn links_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Link> {
        self.links
            .values()
            .filter(move |l| l.involves_node(node_id))
    }

    /// Whether any link touches the socket
    pub fn is_linked(&self, socket_id: SocketId) -> bool {
        self.links.values().any(|l| l.involves_socket(socket_id))
    }

    /// Resolve the producer feeding an input socket, skipping through any
    /// chain of reroutes to the real producing node.
    ///
    /// Returns `Ok(None)` when the socket (or the upstream side of a reroute
    /// on the path) is unlinked. A reroute cycle is an error, not a hang.
    pub fn resolve_input_link(
        &self,
        to_socket: SocketId,
    ) -> Result<Option<ResolvedEndpoint>, RerouteCycle> {
        let Some(mut link) = self.links_to_socket(to_socket).next() else {
            return Ok(None);
        };
        let mut visited = HashSet::new();
        loop {
            let Some(producer) = self.node(link.from_node) else {
                return Ok(None);
            };
            if !producer.is_reroute() {
                return Ok(Some(ResolvedEndpoint {
                    node: link.from_node,
                    socket: link.from_socket,
                }));
            }
            if !visited.insert(link.from_node) {
                return Err(RerouteCycle);
            }
            let Some(reroute_input) = producer.inputs.first() else {
                return Ok(None);
            };
            match self.links_to_socket(reroute_input.id).next() {
                Some(upstream) => link = upstream,
                None => return Ok(None),
            }
        }
    }

    /// Resolve the consumer fed by an output socket, skipping through any
    /// chain of reroutes to the real consuming node. Used for flow outputs,
    /// which carry at most one link.
    pub fn resolve_output_link(
        &self,
        from_socket: SocketId,
    ) -> Result<Option<ResolvedEndpoint>, RerouteCycle> {
        let Some(mut link) = self.links_from_socket(from_socket).next() else {
            return Ok(None);
        };
        let mut visited = HashSet::new();
        loop {
            let Some(consumer) = self.node(link.to_node) else {
                return Ok(None);
            };
            if !consumer.is_reroute() {
                return Ok(Some(ResolvedEndpoint {
                    node: link.to_node,
                    socket: link.to_socket,
                }));
            }
            if !visited.insert(link.to_node) {
                return Err(RerouteCycle);
            }
            let Some(reroute_output) = consumer.outputs.first() else {
                return Ok(None);
            };
            match self.links_from_socket(reroute_output.id).next() {
                Some(downstream) => link = downstream,
                None => return Ok(None),
            }
        }
    }

    /// Endpoint socket types of a link, `None` when either socket is gone
    pub fn endpoint_types(&self, link: &Link) -> Option<(ValueType, ValueType)> {
        let from = self.socket(link.from_node, link.from_socket)?;
        let to = self.socket(link.to_node, link.to_socket)?;
        Some((from.value_type, to.value_type))
    }

    /// Links whose endpoint types mismatch (after any repair pass this
    /// should be empty). String producers feeding enum consumers are legal
    /// since enums serialize as strings.
    pub fn invalid_links(&self) -> Vec<LinkId> {
        self.links
            .values()
            .filter(|link| match self.endpoint_types(link) {
                Some((from, to)) => {
                    from != to && !(from == ValueType::String && to == ValueType::Enum)
                }
                None => true,
            })
            .map(|link| link.id)
            .collect()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Behavior Graph")
    }
}

/// Error when creating a link
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Socket not found
    #[error("Socket not found: {0:?}")]
    SocketNotFound(SocketId),

    /// Links must run from an output socket to an input socket
    #[error("Links must run from an output socket to an input socket")]
    WrongDirection,

    /// Socket has reached its link limit
    #[error("Socket already linked: {0:?}")]
    AlreadyLinked(SocketId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}

/// Error when a reroute chain loops back on itself
#[derive(Debug, thiserror::Error)]
#[error("Reroute chain contains a cycle")]
pub struct RerouteCycle;
