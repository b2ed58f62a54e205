// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! walker-core: path enumeration and mode construction over ER diagrams.
//!
//! The pipeline is pure and synchronous: Graph → Paths → Bindings → Modes.
//! The graph is read-only after construction, every traversal is
//! deterministic, and the only I/O is optional `tracing` instrumentation.
//! Diagram ingestion (and its validation) lives in `walker-diagram`; this
//! crate assumes well-formed inputs.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod binding;
mod graph;
mod modes;
mod node;
mod paths;
mod prng;

// Re-exports for stable public API
/// Binding tables and the path-to-mode binder.
pub use binding::{
    bind, bind_unwalked, AttributeBinding, BindError, Bindings, PathsByFeature, RelationVars,
};
/// Undirected diagram graph and its builder.
pub use graph::{Graph, GraphBuilder};
/// Mode strings, polarity sigils, and the rendered mode document.
pub use modes::{attribute_mode, relation_mode, ModeSet, Polarity, MODE_PREFIX};
/// Node kind and cardinality tags plus entity-variable derivation.
pub use node::{entity_variable, Cardinality, NodeKind};
/// Path enumeration: exhaustive, shortest-filtered, and random walks.
pub use paths::{find_all_paths, random_walk, shortest_paths, Path};
/// Deterministic xoroshiro128+ PRNG driving the random strategies.
pub use prng::Prng;
