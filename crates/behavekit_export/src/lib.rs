// SPDX-License-Identifier: MIT OR Apache-2.0
//! Behavior graph export pipeline for `BehaveKit`.
//!
//! This crate turns resolved authoring graphs into the JSON behavior
//! fragment embedded in the exported document:
//! - Symbol tables assigning stable ids to variables and custom events
//! - A per-node serializer with reference resolution and error isolation
//! - An orchestrator walking every scope and graph slot
//!
//! ## Architecture
//!
//! The pipeline is read-only over the graphs and talks to the outer
//! document exporter exclusively through [`gather::DocumentGatherer`]:
//! references resolve to document indices, and replication requirements are
//! pushed back before the host finalizes its document.

pub mod document;
pub mod export;
pub mod gather;
pub mod serialize;
pub mod symbols;

pub use document::{
    BehaviorFragment, CustomEventRecord, EventParameterRecord, NodeRecord, ParameterBinding,
    SocketRef, VariableRecord, EXTENSION_NAME,
};
pub use export::{export_project, ExportOutput};
pub use gather::{
    AxisConvention, DocumentGatherer, ExportPhase, ExportSettings, GatherError, NetworkTarget,
};
pub use serialize::{serialize_graph, GraphContext, SerializeError};
pub use symbols::{build_symbol_tables, EventSymbol, SymbolError, SymbolTables, VariableSymbol};
