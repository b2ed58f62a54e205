// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Variable binding: turning walked paths into polarity-annotated modes.
//!
//! The binder walks each path in order, tracking which entity variables have
//! been instantiated so far (seeded with the target's own variables), and
//! emits one mode per relation/attribute node encountered. Entity nodes are
//! structural and produce nothing.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::debug;

use crate::modes::{attribute_mode, relation_mode, ModeSet, Polarity};
use crate::paths::Path;

/// Entity variables of one relation.
///
/// A relation connecting two distinct entities keeps its ordered pair; a
/// reflexive relation (both slots naming the same entity) collapses to a
/// singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationVars {
    /// Ordered pair of distinct entity variables, in declaration order.
    Pair(String, String),
    /// Both slots refer to this one entity variable.
    Reflexive(String),
}

impl RelationVars {
    /// Builds from two slot variables, collapsing equal slots.
    #[must_use]
    pub fn from_slots(first: String, second: String) -> Self {
        if first == second {
            Self::Reflexive(first)
        } else {
            Self::Pair(first, second)
        }
    }

    /// Variable of the first slot.
    #[must_use]
    pub fn first(&self) -> &str {
        match self {
            Self::Pair(first, _) | Self::Reflexive(first) => first,
        }
    }

    /// Variable of the second slot (the same as the first when reflexive).
    #[must_use]
    pub fn second(&self) -> &str {
        match self {
            Self::Pair(_, second) => second,
            Self::Reflexive(only) => only,
        }
    }

    /// Returns `true` for a reflexive relation.
    #[must_use]
    pub fn is_reflexive(&self) -> bool {
        matches!(self, Self::Reflexive(_))
    }
}

/// Binding of one attribute to its owning entity's variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    /// Entity variable the attribute is predicated on.
    pub variable: String,
    /// Multivalued attributes gain an extra `#name` hashed output slot.
    pub multivalued: bool,
}

/// The two binding tables, keyed by predicate name.
///
/// A name lives in at most one table; inserting a name into one table evicts
/// it from the other (last insertion wins). Ingestion rejects duplicate
/// names before they get here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    relations: BTreeMap<String, RelationVars>,
    attributes: BTreeMap<String, AttributeBinding>,
}

impl Bindings {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to a relation over the given slot variables.
    pub fn insert_relation(&mut self, name: impl Into<String>, vars: RelationVars) {
        let name = name.into();
        self.attributes.remove(&name);
        self.relations.insert(name, vars);
    }

    /// Binds `name` to an attribute of the entity owning `variable`.
    pub fn insert_attribute(&mut self, name: impl Into<String>, binding: AttributeBinding) {
        let name = name.into();
        self.relations.remove(&name);
        self.attributes.insert(name, binding);
    }

    /// Looks up a relation binding.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationVars> {
        self.relations.get(name)
    }

    /// Looks up an attribute binding.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
        self.attributes.get(name)
    }

    /// The target's own (deduplicated) variables, or `None` for a name bound
    /// in neither table.
    #[must_use]
    pub fn target_variables(&self, target: &str) -> Option<Vec<String>> {
        if let Some(vars) = self.relations.get(target) {
            return Some(match vars {
                RelationVars::Pair(a, b) => vec![a.clone(), b.clone()],
                RelationVars::Reflexive(v) => vec![v.clone()],
            });
        }
        self.attributes
            .get(target)
            .map(|attr| vec![attr.variable.clone()])
    }
}

/// Error raised by the binder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The target is neither a relation nor an attribute.
    #[error("target `{name}` is neither a relation nor an attribute")]
    UnknownTarget {
        /// The offending target name.
        name: String,
    },
}

/// Walked paths grouped by the feature they were walked for.
///
/// A feature with an empty path list is unreachable from the target; that is
/// not an error — it simply contributes no path-derived modes and falls
/// through to the unexplored pass.
pub type PathsByFeature = BTreeMap<String, Vec<Path>>;

/// Converts walked paths into a polarity-annotated [`ModeSet`].
///
/// The target's own mode(s) come first, fully bound. Then every path is
/// walked with a fresh instantiated-variable set seeded with the target's
/// variables; the set is local to that one path and discarded afterwards.
/// Finally, any bound predicate never visited by any path is emitted once,
/// fully bound, so the diagram's predicates are always covered regardless of
/// reachability.
///
/// # Errors
///
/// [`BindError::UnknownTarget`] when `target` is bound in neither table.
pub fn bind(
    paths_per_feature: &PathsByFeature,
    target: &str,
    bindings: &Bindings,
) -> Result<ModeSet, BindError> {
    let mut set = ModeSet::new();
    let target_vars = emit_target(&mut set, target, bindings)?;

    let mut visited: BTreeSet<&str> = BTreeSet::new();
    for (feature, paths) in paths_per_feature {
        debug!(feature = feature.as_str(), paths = paths.len(), "binding feature paths");
        for path in paths {
            walk_path(&mut set, path, target, &target_vars, bindings, &mut visited);
        }
    }

    emit_unexplored(&mut set, target, bindings, &visited);
    Ok(set)
}

/// The no-walk base case: polarity comes straight from target membership.
///
/// An important feature's variable is free exactly when it is not one of the
/// target's variables; everything unimportant is fully bound. Reflexive
/// important relations still emit the reversed line pair.
///
/// # Errors
///
/// [`BindError::UnknownTarget`] when `target` is bound in neither table.
pub fn bind_unwalked(
    target: &str,
    features: &BTreeSet<String>,
    bindings: &Bindings,
) -> Result<ModeSet, BindError> {
    let mut set = ModeSet::new();
    let target_vars = emit_target(&mut set, target, bindings)?;
    let instantiated: BTreeSet<&str> = target_vars.iter().map(String::as_str).collect();

    for (name, vars) in &bindings.relations {
        if name == target {
            continue;
        }
        if features.contains(name) {
            emit_relation(&mut set, name, vars, &instantiated);
        } else {
            set.push_background(relation_mode(
                name,
                (Polarity::Bound, vars.first()),
                (Polarity::Bound, vars.second()),
            ));
        }
    }
    for (name, attr) in &bindings.attributes {
        if name == target {
            continue;
        }
        let free = features.contains(name) && !instantiated.contains(attr.variable.as_str());
        set.push_background(attribute_mode(
            name,
            Polarity::from_bound(!free),
            &attr.variable,
            attr.multivalued,
        ));
    }
    Ok(set)
}

/// Emits the target's fully-bound mode(s) and returns its variables.
fn emit_target(
    set: &mut ModeSet,
    target: &str,
    bindings: &Bindings,
) -> Result<Vec<String>, BindError> {
    if let Some(vars) = bindings.relations.get(target) {
        // A reflexive target collapses to one line: the reversed duplicate
        // is identical when both polarities are `+`.
        set.push_target(relation_mode(
            target,
            (Polarity::Bound, vars.first()),
            (Polarity::Bound, vars.second()),
        ));
        return Ok(match vars {
            RelationVars::Pair(a, b) => vec![a.clone(), b.clone()],
            RelationVars::Reflexive(v) => vec![v.clone()],
        });
    }
    if let Some(attr) = bindings.attributes.get(target) {
        set.push_target(attribute_mode(
            target,
            Polarity::Bound,
            &attr.variable,
            attr.multivalued,
        ));
        return Ok(vec![attr.variable.clone()]);
    }
    Err(BindError::UnknownTarget {
        name: target.to_owned(),
    })
}

/// Walks one path, emitting modes with a path-local instantiated set.
fn walk_path<'b>(
    set: &mut ModeSet,
    path: &Path,
    target: &str,
    target_vars: &[String],
    bindings: &'b Bindings,
    visited: &mut BTreeSet<&'b str>,
) {
    let mut instantiated: BTreeSet<&str> = target_vars.iter().map(String::as_str).collect();
    for node in path {
        if node == target {
            continue;
        }
        if let Some((name, vars)) = bindings.relations.get_key_value(node) {
            visited.insert(name.as_str());
            emit_relation(set, name, vars, &instantiated);
            // All of the relation's variables are now available to later
            // path steps.
            instantiated.insert(vars.first());
            instantiated.insert(vars.second());
        } else if let Some((name, attr)) = bindings.attributes.get_key_value(node) {
            visited.insert(name.as_str());
            let polarity = Polarity::from_bound(instantiated.contains(attr.variable.as_str()));
            set.push_background(attribute_mode(name, polarity, &attr.variable, attr.multivalued));
        }
        // Entity nodes are structural only.
    }
}

/// Emits one relation mode (or the reversed pair for reflexive relations).
fn emit_relation(
    set: &mut ModeSet,
    name: &str,
    vars: &RelationVars,
    instantiated: &BTreeSet<&str>,
) {
    match vars {
        RelationVars::Pair(a, b) => {
            let pa = Polarity::from_bound(instantiated.contains(a.as_str()));
            let pb = Polarity::from_bound(instantiated.contains(b.as_str()));
            set.push_background(relation_mode(name, (pa, a), (pb, b)));
        }
        RelationVars::Reflexive(v) => {
            // Both directions of the self-relation: bound→free and free→bound.
            set.push_background(relation_mode(name, (Polarity::Bound, v), (Polarity::Free, v)));
            set.push_background(relation_mode(name, (Polarity::Free, v), (Polarity::Bound, v)));
        }
    }
}

/// Fallback pass: every bound predicate no path visited, fully bound.
fn emit_unexplored(set: &mut ModeSet, target: &str, bindings: &Bindings, visited: &BTreeSet<&str>) {
    for (name, vars) in &bindings.relations {
        if name == target || visited.contains(name.as_str()) {
            continue;
        }
        set.push_background(relation_mode(
            name,
            (Polarity::Bound, vars.first()),
            (Polarity::Bound, vars.second()),
        ));
    }
    for (name, attr) in &bindings.attributes {
        if name == target || visited.contains(name.as_str()) {
            continue;
        }
        set.push_background(attribute_mode(
            name,
            Polarity::Bound,
            &attr.variable,
            attr.multivalued,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn university_bindings() -> Bindings {
        let mut bindings = Bindings::new();
        bindings.insert_relation(
            "Advises",
            RelationVars::from_slots("professorid".to_owned(), "studentid".to_owned()),
        );
        bindings.insert_attribute(
            "Salary",
            AttributeBinding {
                variable: "professorid".to_owned(),
                multivalued: false,
            },
        );
        bindings
    }

    #[test]
    fn unknown_target_is_an_error() {
        let bindings = university_bindings();
        let err = bind(&PathsByFeature::new(), "Professor", &bindings);
        assert_eq!(
            err,
            Err(BindError::UnknownTarget {
                name: "Professor".to_owned()
            })
        );
    }

    #[test]
    fn reinsertion_moves_a_name_between_tables() {
        let mut bindings = Bindings::new();
        bindings.insert_attribute(
            "Twin",
            AttributeBinding {
                variable: "personid".to_owned(),
                multivalued: false,
            },
        );
        bindings.insert_relation(
            "Twin",
            RelationVars::from_slots("personid".to_owned(), "personid".to_owned()),
        );
        assert!(bindings.attribute("Twin").is_none());
        assert!(bindings.relation("Twin").is_some_and(RelationVars::is_reflexive));
    }

    #[test]
    fn equal_slots_collapse_to_reflexive() {
        let vars = RelationVars::from_slots("personid".to_owned(), "personid".to_owned());
        assert!(vars.is_reflexive());
        assert_eq!(vars.first(), vars.second());
    }

    #[test]
    fn target_variables_deduplicate_reflexive_slots() {
        let mut bindings = Bindings::new();
        bindings.insert_relation(
            "Friends",
            RelationVars::from_slots("personid".to_owned(), "personid".to_owned()),
        );
        assert_eq!(
            bindings.target_variables("Friends"),
            Some(vec!["personid".to_owned()])
        );
        assert_eq!(bindings.target_variables("Enemies"), None);
    }
}
