// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! walker-diagram: ingestion of entity-relationship diagrams.
//!
//! Two input formats produce the same [`Diagram`] value: the JSON shape of
//! ERDPlus exports (extended with `target`/`important` keys, since Walker has
//! no interactive prompting) and a sectioned text format. All structural
//! validation happens here; the core crate assumes well-formed inputs and
//! never re-validates.
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
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

use std::collections::BTreeMap;

use thiserror::Error;

use walker_core::{Bindings, Cardinality, Graph, NodeKind};

mod json;
mod text;

/// Error raised while ingesting a diagram.
#[derive(Debug, Error)]
pub enum DiagramError {
    /// The input looked like JSON but did not deserialize.
    #[error("diagram is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The diagram declares no shapes at all.
    #[error("diagram has no shapes")]
    MissingShapes,
    /// No target predicate was named.
    #[error("diagram has no target")]
    MissingTarget,
    /// Two shapes share a name; every binding table is keyed by name.
    #[error("duplicate shape name `{0}`")]
    DuplicateName(String),
    /// A shape whose `type` is none of Entity/Relationship/Attribute.
    #[error("unknown shape type `{0}`")]
    UnknownShapeType(String),
    /// A connector points at a shape id that does not exist.
    #[error("connector references unknown shape id {0}")]
    UnknownShapeId(u64),
    /// Relations bind exactly two slots.
    #[error("relation `{relation}` must have exactly two slots")]
    BadSlots {
        /// The offending relation.
        relation: String,
    },
    /// A relation slot must reference an entity shape.
    #[error("relation `{relation}` slot references id {id}, which is not an entity")]
    SlotNotEntity {
        /// The offending relation.
        relation: String,
        /// The non-entity shape id.
        id: u64,
    },
    /// A slot cardinality other than `one`/`many`.
    #[error("slot of `{relation}` has cardinality `{value}` (expected `one` or `many`)")]
    BadCardinality {
        /// The offending relation.
        relation: String,
        /// The rejected cardinality text.
        value: String,
    },
    /// An attribute with no owning entity.
    #[error("attribute `{attribute}` is not connected to an entity")]
    UnattachedAttribute {
        /// The offending attribute.
        attribute: String,
    },
    /// An important feature that is neither a relation nor an attribute.
    #[error("important feature `{0}` is not a relation or attribute")]
    UnknownFeature(String),
    /// A malformed line in the sectioned text format.
    #[error("line {line}: {message}")]
    Text {
        /// 1-based line number.
        line: usize,
        /// What went wrong on that line.
        message: String,
    },
}

/// A fully ingested, validated diagram.
///
/// Immutable by convention: built once per run and passed by shared reference
/// into the core pipeline.
#[derive(Debug, Clone)]
pub struct Diagram {
    /// Undirected adjacency over node names.
    pub graph: Graph,
    /// Relation and attribute binding tables.
    pub bindings: Bindings,
    /// Kind tag per node name.
    pub kinds: BTreeMap<String, NodeKind>,
    /// Slot cardinality pair per relation name.
    pub cardinalities: BTreeMap<String, (Cardinality, Cardinality)>,
    /// The predicate being predicted.
    pub target: String,
    /// Important features, declaration order, deduplicated, target removed.
    pub importants: Vec<String>,
}

impl Diagram {
    /// Parses a diagram from either supported format.
    ///
    /// Format sniffing: a first non-whitespace `{` means JSON, anything else
    /// the sectioned text format.
    ///
    /// # Errors
    ///
    /// Any [`DiagramError`] from the selected parser.
    pub fn parse(input: &str) -> Result<Self, DiagramError> {
        if input.trim_start().starts_with('{') {
            json::parse(input)
        } else {
            text::parse(input)
        }
    }

    /// Parses the JSON format explicitly.
    ///
    /// # Errors
    ///
    /// Any [`DiagramError`] raised during deserialization or validation.
    pub fn from_json_str(input: &str) -> Result<Self, DiagramError> {
        json::parse(input)
    }

    /// Parses the sectioned text format explicitly.
    ///
    /// # Errors
    ///
    /// Any [`DiagramError`] raised during parsing or validation.
    pub fn from_text_str(input: &str) -> Result<Self, DiagramError> {
        text::parse(input)
    }
}

/// Deduplicates `importants` preserving declaration order, drops the target,
/// and checks that every survivor names a bound predicate.
fn finish_importants(
    importants: Vec<String>,
    target: &str,
    bindings: &Bindings,
) -> Result<Vec<String>, DiagramError> {
    let mut seen = std::collections::BTreeSet::new();
    let mut kept = Vec::new();
    for name in importants {
        if name == target || !seen.insert(name.clone()) {
            continue;
        }
        if bindings.relation(&name).is_none() && bindings.attribute(&name).is_none() {
            return Err(DiagramError::UnknownFeature(name));
        }
        kept.push(name);
    }
    Ok(kept)
}

fn parse_cardinality(relation: &str, value: &str) -> Result<Cardinality, DiagramError> {
    match value.to_lowercase().as_str() {
        "one" => Ok(Cardinality::One),
        "many" => Ok(Cardinality::Many),
        _ => Err(DiagramError::BadCardinality {
            relation: relation.to_owned(),
            value: value.to_owned(),
        }),
    }
}
