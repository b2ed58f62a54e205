// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mode formatting: predicate strings and the rendered mode document.
//!
//! A mode describes a predicate's argument binding pattern for the learner:
//! `advises(+professorid,-studentid).` Bound arguments carry `+`, free ones
//! `-`, and multivalued attributes gain a trailing `#name` hashed slot.

use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Literal prefix applied to every rendered mode line.
pub const MODE_PREFIX: &str = "mode: ";

/// Binding polarity of one predicate argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Already instantiated (`+`).
    Bound,
    /// Free to be grounded by the learner (`-`).
    Free,
}

impl Polarity {
    /// `Bound` when the variable is already instantiated.
    #[must_use]
    pub fn from_bound(bound: bool) -> Self {
        if bound {
            Self::Bound
        } else {
            Self::Free
        }
    }

    /// The polarity sigil (`+` or `-`).
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Bound => '+',
            Self::Free => '-',
        }
    }
}

/// Formats a relation predicate: `name(p1var1,p2var2).`
///
/// Predicate names are lowercased on the way out; variables are expected to
/// be lowercase already (entity variables are derived lowercase).
#[must_use]
pub fn relation_mode(name: &str, first: (Polarity, &str), second: (Polarity, &str)) -> String {
    let mut mode = name.to_lowercase();
    let _ = write!(
        mode,
        "({}{},{}{}).",
        first.0.symbol(),
        first.1,
        second.0.symbol(),
        second.1
    );
    mode
}

/// Formats an attribute predicate: `name(pvar).`, or `name(pvar,#name).`
/// when the attribute is multivalued.
#[must_use]
pub fn attribute_mode(name: &str, polarity: Polarity, variable: &str, multivalued: bool) -> String {
    let lower = name.to_lowercase();
    let mut mode = lower.clone();
    let _ = write!(mode, "({}{}", polarity.symbol(), variable);
    if multivalued {
        let _ = write!(mode, ",#{lower}");
    }
    mode.push_str(").");
    mode
}

/// Duplicate-free, order-insensitive collection of generated modes.
///
/// Target modes and background modes are kept apart so the rendered document
/// can frame them with `//target` / `//background` comment lines. Both pools
/// deduplicate on insertion and emit in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeSet {
    target: BTreeSet<String>,
    background: BTreeSet<String>,
}

impl ModeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mode for the target predicate.
    pub fn push_target(&mut self, mode: String) {
        self.target.insert(mode);
    }

    /// Adds a background (non-target) mode.
    pub fn push_background(&mut self, mode: String) {
        self.background.insert(mode);
    }

    /// Target modes in lexicographic order.
    pub fn target_modes(&self) -> impl Iterator<Item = &String> {
        self.target.iter()
    }

    /// Background modes in lexicographic order.
    pub fn background_modes(&self) -> impl Iterator<Item = &String> {
        self.background.iter()
    }

    /// Total number of distinct modes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.target.len() + self.background.len()
    }

    /// Returns `true` when no modes were generated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target.is_empty() && self.background.is_empty()
    }

    /// Renders the full mode document, fully materialized.
    ///
    /// Layout: a `//target` comment, the target's mode line(s), a
    /// `//background` comment, then the sorted background modes. Each mode is
    /// prefixed with [`MODE_PREFIX`]. Rendering is idempotent: two renders of
    /// the same set are identical.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.len() + 2);
        lines.push("//target".to_owned());
        for mode in &self.target {
            lines.push(format!("{MODE_PREFIX}{mode}"));
        }
        lines.push("//background".to_owned());
        for mode in &self.background {
            lines.push(format!("{MODE_PREFIX}{mode}"));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_mode_formats_polarities() {
        assert_eq!(
            relation_mode(
                "Advises",
                (Polarity::Bound, "professorid"),
                (Polarity::Free, "studentid")
            ),
            "advises(+professorid,-studentid)."
        );
    }

    #[test]
    fn attribute_mode_appends_hash_slot_when_multivalued() {
        assert_eq!(
            attribute_mode("Salary", Polarity::Bound, "professorid", false),
            "salary(+professorid)."
        );
        assert_eq!(
            attribute_mode("Salary", Polarity::Free, "professorid", true),
            "salary(-professorid,#salary)."
        );
    }

    #[test]
    fn duplicates_collapse() {
        let mut set = ModeSet::new();
        set.push_background("takes(+courseid,+studentid).".to_owned());
        set.push_background("takes(+courseid,+studentid).".to_owned());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn render_is_sorted_and_idempotent() {
        let mut set = ModeSet::new();
        set.push_target("advises(+professorid,+studentid).".to_owned());
        set.push_background("tenure(+professorid).".to_owned());
        set.push_background("gpa(+studentid).".to_owned());

        let rendered = set.render();
        assert_eq!(
            rendered,
            vec![
                "//target".to_owned(),
                "mode: advises(+professorid,+studentid).".to_owned(),
                "//background".to_owned(),
                "mode: gpa(+studentid).".to_owned(),
                "mode: tenure(+professorid).".to_owned(),
            ]
        );
        assert_eq!(set.render(), rendered);
    }
}
