// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! ERDPlus-style JSON ingestion.
//!
//! Wire shape follows the ERDPlus export: a `shapes` array (entities,
//! attributes, relationships keyed by numeric `details.id`) and a
//! `connectors` array joining shape ids. Walker additionally reads top-level
//! `target` and `important` keys, which the ERDPlus editor does not emit;
//! they select the predicate to predict and the features to walk to.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use walker_core::{
    entity_variable, AttributeBinding, Bindings, GraphBuilder, NodeKind, RelationVars,
};

use crate::{finish_importants, parse_cardinality, Diagram, DiagramError};

#[derive(Debug, Deserialize)]
struct DiagramFile {
    #[serde(default)]
    shapes: Vec<Shape>,
    #[serde(default)]
    connectors: Vec<Connector>,
    target: Option<String>,
    #[serde(default)]
    important: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Shape {
    #[serde(rename = "type")]
    kind: String,
    details: Details,
}

#[derive(Debug, Deserialize)]
struct Details {
    id: u64,
    name: String,
    #[serde(rename = "isMultivalued", default)]
    is_multivalued: bool,
    #[serde(default)]
    slots: Vec<Slot>,
}

#[derive(Debug, Deserialize)]
struct Slot {
    #[serde(rename = "entityId")]
    entity_id: u64,
    cardinality: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Connector {
    #[serde(rename = "type")]
    kind: String,
    source: u64,
    destination: u64,
}

pub(crate) fn parse(input: &str) -> Result<Diagram, DiagramError> {
    let file: DiagramFile = serde_json::from_str(input)?;
    if file.shapes.is_empty() {
        return Err(DiagramError::MissingShapes);
    }
    let target = file.target.ok_or(DiagramError::MissingTarget)?;

    // Pass 1: shape ids → names/kinds, entity ids → variables.
    let mut names: BTreeMap<u64, String> = BTreeMap::new();
    let mut kinds: BTreeMap<String, NodeKind> = BTreeMap::new();
    let mut variables: BTreeMap<u64, String> = BTreeMap::new();
    for shape in &file.shapes {
        let kind = match shape.kind.as_str() {
            "Entity" => NodeKind::Entity,
            "Relationship" => NodeKind::Relation,
            "Attribute" => NodeKind::Attribute,
            other => return Err(DiagramError::UnknownShapeType(other.to_owned())),
        };
        let name = shape.details.name.clone();
        if kinds.insert(name.clone(), kind).is_some() {
            return Err(DiagramError::DuplicateName(name));
        }
        if kind == NodeKind::Entity {
            variables.insert(shape.details.id, entity_variable(&name));
        }
        names.insert(shape.details.id, name);
    }

    let mut bindings = Bindings::new();
    let mut cardinalities = BTreeMap::new();
    let mut builder = GraphBuilder::new();
    for name in kinds.keys() {
        builder.add_node(name.clone());
    }

    // Pass 2: relationships bind their slot entities and border them in the
    // graph.
    for shape in &file.shapes {
        if shape.kind != "Relationship" {
            continue;
        }
        let name = &shape.details.name;
        let [first, second] = shape.details.slots.as_slice() else {
            return Err(DiagramError::BadSlots {
                relation: name.clone(),
            });
        };
        let resolve = |slot: &Slot| -> Result<String, DiagramError> {
            variables
                .get(&slot.entity_id)
                .cloned()
                .ok_or_else(|| DiagramError::SlotNotEntity {
                    relation: name.clone(),
                    id: slot.entity_id,
                })
        };
        let first_var = resolve(first)?;
        let second_var = resolve(second)?;
        for slot in [first, second] {
            if let Some(entity) = names.get(&slot.entity_id) {
                builder.add_edge(name, entity);
            }
        }
        let cardinality = |slot: &Slot| {
            let value = slot.cardinality.as_deref().unwrap_or("(missing)");
            parse_cardinality(name, value)
        };
        cardinalities.insert(name.clone(), (cardinality(first)?, cardinality(second)?));
        bindings.insert_relation(name.clone(), RelationVars::from_slots(first_var, second_var));
    }

    // Pass 3: connectors give attributes their owners and the graph its
    // remaining edges.
    let mut owners: BTreeMap<String, String> = BTreeMap::new();
    for connector in &file.connectors {
        if connector.kind != "Connector" {
            continue;
        }
        let source = names
            .get(&connector.source)
            .ok_or(DiagramError::UnknownShapeId(connector.source))?;
        let destination = names
            .get(&connector.destination)
            .ok_or(DiagramError::UnknownShapeId(connector.destination))?;
        builder.add_edge(source, destination);

        // First connector wins when an attribute is wired twice.
        if kinds.get(source) == Some(&NodeKind::Attribute)
            && kinds.get(destination) == Some(&NodeKind::Entity)
            && !owners.contains_key(source)
        {
            owners.insert(source.clone(), destination.clone());
        } else if kinds.get(destination) == Some(&NodeKind::Attribute)
            && kinds.get(source) == Some(&NodeKind::Entity)
            && !owners.contains_key(destination)
        {
            owners.insert(destination.clone(), source.clone());
        }
    }

    for shape in &file.shapes {
        if shape.kind != "Attribute" {
            continue;
        }
        let name = &shape.details.name;
        let owner = owners
            .get(name)
            .ok_or_else(|| DiagramError::UnattachedAttribute {
                attribute: name.clone(),
            })?;
        bindings.insert_attribute(
            name.clone(),
            AttributeBinding {
                variable: entity_variable(owner),
                multivalued: shape.details.is_multivalued,
            },
        );
    }

    let importants = finish_importants(file.important, &target, &bindings)?;
    debug!(
        shapes = file.shapes.len(),
        connectors = file.connectors.len(),
        importants = importants.len(),
        "parsed JSON diagram"
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

#[cfg(test)]
mod tests {
    use crate::{Diagram, DiagramError};
    use walker_core::{Cardinality, NodeKind};

    const ADVISES: &str = r#"{
        "shapes": [
            {"type": "Entity", "details": {"id": 1, "name": "Professor"}},
            {"type": "Entity", "details": {"id": 2, "name": "Student"}},
            {"type": "Relationship", "details": {"id": 3, "name": "Advises", "slots": [
                {"entityId": 1, "cardinality": "one"},
                {"entityId": 2, "cardinality": "many"}
            ]}},
            {"type": "Attribute", "details": {"id": 4, "name": "Salary", "isMultivalued": true}}
        ],
        "connectors": [
            {"type": "Connector", "source": 4, "destination": 1}
        ],
        "target": "Advises",
        "important": ["Salary", "Salary"]
    }"#;

    #[test]
    fn parses_the_advises_diagram() {
        let diagram = Diagram::from_json_str(ADVISES).expect("diagram should parse");
        assert_eq!(diagram.target, "Advises");
        assert_eq!(diagram.importants, vec!["Salary".to_owned()]);
        assert_eq!(diagram.kinds.get("Advises"), Some(&NodeKind::Relation));
        assert_eq!(
            diagram.cardinalities.get("Advises"),
            Some(&(Cardinality::One, Cardinality::Many))
        );

        let advises = diagram.bindings.relation("Advises").expect("relation bound");
        assert_eq!(advises.first(), "professorid");
        assert_eq!(advises.second(), "studentid");

        let salary = diagram.bindings.attribute("Salary").expect("attribute bound");
        assert_eq!(salary.variable, "professorid");
        assert!(salary.multivalued);

        // Graph borders: relation ↔ entities, attribute ↔ owner.
        assert!(diagram.graph.neighbors("Advises").any(|n| n == "Professor"));
        assert!(diagram.graph.neighbors("Salary").any(|n| n == "Professor"));
    }

    #[test]
    fn missing_target_is_rejected() {
        let input = r#"{"shapes": [{"type": "Entity", "details": {"id": 1, "name": "A"}}]}"#;
        assert!(matches!(
            Diagram::from_json_str(input),
            Err(DiagramError::MissingTarget)
        ));
    }

    #[test]
    fn empty_shapes_are_rejected() {
        let input = r#"{"shapes": [], "target": "X"}"#;
        assert!(matches!(
            Diagram::from_json_str(input),
            Err(DiagramError::MissingShapes)
        ));
    }

    #[test]
    fn dangling_attribute_is_rejected() {
        let input = r#"{
            "shapes": [
                {"type": "Entity", "details": {"id": 1, "name": "Person"}},
                {"type": "Attribute", "details": {"id": 2, "name": "Age"}}
            ],
            "target": "Age"
        }"#;
        assert!(matches!(
            Diagram::from_json_str(input),
            Err(DiagramError::UnattachedAttribute { .. })
        ));
    }

    #[test]
    fn bad_cardinality_is_rejected() {
        let input = r#"{
            "shapes": [
                {"type": "Entity", "details": {"id": 1, "name": "Person"}},
                {"type": "Relationship", "details": {"id": 2, "name": "Knows", "slots": [
                    {"entityId": 1, "cardinality": "one"},
                    {"entityId": 1, "cardinality": "several"}
                ]}}
            ],
            "target": "Knows"
        }"#;
        assert!(matches!(
            Diagram::from_json_str(input),
            Err(DiagramError::BadCardinality { .. })
        ));
    }

    #[test]
    fn reflexive_slots_collapse() {
        let input = r#"{
            "shapes": [
                {"type": "Entity", "details": {"id": 1, "name": "Person"}},
                {"type": "Relationship", "details": {"id": 2, "name": "Friends", "slots": [
                    {"entityId": 1, "cardinality": "many"},
                    {"entityId": 1, "cardinality": "many"}
                ]}}
            ],
            "target": "Friends"
        }"#;
        let diagram = Diagram::from_json_str(input).expect("diagram should parse");
        let friends = diagram.bindings.relation("Friends").expect("relation bound");
        assert!(friends.is_reflexive());
        // The slot edge is a plain relation↔entity border, not a self-loop.
        assert!(diagram.graph.neighbors("Friends").any(|n| n == "Person"));
    }

    #[test]
    fn unknown_important_is_rejected() {
        let input = r#"{
            "shapes": [
                {"type": "Entity", "details": {"id": 1, "name": "Person"}},
                {"type": "Relationship", "details": {"id": 2, "name": "Knows", "slots": [
                    {"entityId": 1, "cardinality": "many"},
                    {"entityId": 1, "cardinality": "many"}
                ]}}
            ],
            "target": "Knows",
            "important": ["Person"]
        }"#;
        assert!(matches!(
            Diagram::from_json_str(input),
            Err(DiagramError::UnknownFeature(name)) if name == "Person"
        ));
    }
}
