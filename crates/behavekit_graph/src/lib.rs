// SPDX-License-Identifier: MIT OR Apache-2.0
//! Behavior graph model for `BehaveKit`.
//!
//! This crate provides the authoring-side graph core:
//! - Typed sockets with a fixed value-type vocabulary
//! - Nodes, links, and reroute passthroughs
//! - Link repair with automatic coercion adapters
//! - A node catalog combining declarative specs and hand-defined kinds
//! - Scopes owning variables, custom events, and graph slots
//!
//! ## Architecture
//!
//! The editor mutates a [`Graph`] and calls [`resolve::resolve_graph`] after
//! every topology change to keep the link-type invariant. At export time the
//! companion crate walks the resolved graphs read-only.

pub mod builtin;
pub mod catalog;
pub mod graph;
pub mod link;
pub mod node;
pub mod resolve;
pub mod scope;
pub mod socket;
pub mod value;

pub use catalog::{Catalog, CatalogError};
pub use graph::{Graph, LinkError, RerouteCycle, ResolvedEndpoint};
pub use link::{Link, LinkId};
pub use node::{Node, NodeBehavior, NodeConfig, NodeId, NodeKind, SocketSpec};
pub use resolve::{resolve_graph, ResolveReport};
pub use scope::{CustomEvent, EventParameter, GraphSlot, Project, Scope, ScopeKind, Variable};
pub use socket::{EntityRole, EnumChoice, Socket, SocketDirection, SocketId};
pub use value::{auto_cast, ObjectRef, Value, ValueType};
