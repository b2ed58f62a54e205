// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sectioned text ingestion.
//!
//! A keyword-led line format for hand-written diagrams:
//!
//! ```text
//! # university advising
//! entity Professor
//! entity Student
//! relation Advises Professor one Student many
//! attribute Salary Professor multivalued
//! target Advises
//! important Salary
//! ```
//!
//! Entities must be declared before the relations and attributes that
//! reference them. `#` starts a comment line; blank lines are ignored.

use std::collections::BTreeMap;

use tracing::debug;

use walker_core::{
    entity_variable, AttributeBinding, Bindings, GraphBuilder, NodeKind, RelationVars,
};

use crate::{finish_importants, parse_cardinality, Diagram, DiagramError};

fn err(line: usize, message: impl Into<String>) -> DiagramError {
    DiagramError::Text {
        line,
        message: message.into(),
    }
}

pub(crate) fn parse(input: &str) -> Result<Diagram, DiagramError> {
    let mut kinds: BTreeMap<String, NodeKind> = BTreeMap::new();
    let mut bindings = Bindings::new();
    let mut cardinalities = BTreeMap::new();
    let mut builder = GraphBuilder::new();
    let mut target: Option<String> = None;
    let mut importants: Vec<String> = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut words = trimmed.split_whitespace();
        let Some(keyword) = words.next() else {
            continue;
        };
        match keyword {
            "entity" => {
                let name = words
                    .next()
                    .ok_or_else(|| err(line, "entity needs a name"))?;
                declare(&mut kinds, name, NodeKind::Entity)?;
                builder.add_node(name);
                expect_end(line, words)?;
            }
            "attribute" => {
                let name = words
                    .next()
                    .ok_or_else(|| err(line, "attribute needs a name"))?;
                let owner = words
                    .next()
                    .ok_or_else(|| err(line, "attribute needs an owning entity"))?;
                let multivalued = match words.next() {
                    None => false,
                    Some("multivalued") => true,
                    Some(other) => {
                        return Err(err(line, format!("unexpected token `{other}`")));
                    }
                };
                expect_entity(&kinds, line, owner)?;
                declare(&mut kinds, name, NodeKind::Attribute)?;
                builder.add_edge(name, owner);
                bindings.insert_attribute(
                    name,
                    AttributeBinding {
                        variable: entity_variable(owner),
                        multivalued,
                    },
                );
                expect_end(line, words)?;
            }
            "relation" => {
                let name = words
                    .next()
                    .ok_or_else(|| err(line, "relation needs a name"))?;
                let (first_entity, first_card) = slot(line, &mut words)?;
                let (second_entity, second_card) = slot(line, &mut words)?;
                expect_entity(&kinds, line, first_entity)?;
                expect_entity(&kinds, line, second_entity)?;
                declare(&mut kinds, name, NodeKind::Relation)?;
                builder.add_edge(name, first_entity);
                builder.add_edge(name, second_entity);
                cardinalities.insert(
                    name.to_owned(),
                    (
                        parse_cardinality(name, first_card)?,
                        parse_cardinality(name, second_card)?,
                    ),
                );
                bindings.insert_relation(
                    name,
                    RelationVars::from_slots(
                        entity_variable(first_entity),
                        entity_variable(second_entity),
                    ),
                );
                expect_end(line, words)?;
            }
            "target" => {
                let name = words
                    .next()
                    .ok_or_else(|| err(line, "target needs a name"))?;
                if target.replace(name.to_owned()).is_some() {
                    return Err(err(line, "target already declared"));
                }
                expect_end(line, words)?;
            }
            "important" => {
                let mut any = false;
                for name in words.by_ref() {
                    importants.push(name.to_owned());
                    any = true;
                }
                if !any {
                    return Err(err(line, "important needs at least one name"));
                }
            }
            other => {
                return Err(err(line, format!("unknown keyword `{other}`")));
            }
        }
    }

    if kinds.is_empty() {
        return Err(DiagramError::MissingShapes);
    }
    let target = target.ok_or(DiagramError::MissingTarget)?;
    let importants = finish_importants(importants, &target, &bindings)?;
    debug!(
        shapes = kinds.len(),
        importants = importants.len(),
        "parsed text diagram"
    );

    Ok(Diagram {
        graph: builder.build(),
        bindings,
        kinds,
        cardinalities,
        target,
        importants,
    })
}

fn slot<'a>(
    line: usize,
    words: &mut std::str::SplitWhitespace<'a>,
) -> Result<(&'a str, &'a str), DiagramError> {
    let entity = words
        .next()
        .ok_or_else(|| err(line, "relation needs two `ENTITY CARDINALITY` slots"))?;
    let cardinality = words
        .next()
        .ok_or_else(|| err(line, "relation slot needs a cardinality"))?;
    Ok((entity, cardinality))
}

fn declare(
    kinds: &mut BTreeMap<String, NodeKind>,
    name: &str,
    kind: NodeKind,
) -> Result<(), DiagramError> {
    if kinds.insert(name.to_owned(), kind).is_some() {
        return Err(DiagramError::DuplicateName(name.to_owned()));
    }
    Ok(())
}

fn expect_entity(
    kinds: &BTreeMap<String, NodeKind>,
    line: usize,
    name: &str,
) -> Result<(), DiagramError> {
    if kinds.get(name) == Some(&NodeKind::Entity) {
        return Ok(());
    }
    Err(err(line, format!("`{name}` is not a declared entity")))
}

fn expect_end<'a>(
    line: usize,
    mut words: impl Iterator<Item = &'a str>,
) -> Result<(), DiagramError> {
    match words.next() {
        None => Ok(()),
        Some(extra) => Err(err(line, format!("unexpected trailing token `{extra}`"))),
    }
}
