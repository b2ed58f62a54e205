// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Node classification for entity-relationship diagrams.

use serde::{Deserialize, Serialize};

/// Kind tag carried by every diagram node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeKind {
    /// An entity (contributes a logic variable, `name.to_lowercase() + "id"`).
    Entity,
    /// A relation between one or two entities.
    Relation,
    /// An attribute owned by a single entity.
    Attribute,
}

impl NodeKind {
    /// Human-readable label used in diagnostics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Relation => "relation",
            Self::Attribute => "attribute",
        }
    }
}

/// Cardinality of one relation slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Cardinality {
    /// At most one participant on this side.
    One,
    /// Any number of participants on this side.
    Many,
}

impl Cardinality {
    /// Human-readable label used in diagnostics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::One => "one",
            Self::Many => "many",
        }
    }
}

/// Derives the logic variable for an entity name (`Professor` → `professorid`).
#[must_use]
pub fn entity_variable(entity: &str) -> String {
    let mut var = entity.to_lowercase();
    var.push_str("id");
    var
}
