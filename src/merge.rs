//! Combining a child's fields with a resolved parent's.

use crate::value::{Mapping, Value};

/// This trait is implemented by tree types that can absorb a child's value
/// on top of a parent's.
pub trait Combine: Clone + Sized {
    /// Given this (parent) value and a child's value for the same field,
    /// produce the combined value.
    fn combine(&self, child: &Self) -> Self;
}

impl Combine for Value {
    /// Two mappings merge key by key, two sequences concatenate, and in
    /// every other case the child simply wins: a child scalar overrides a
    /// parent scalar, and mismatched kinds fall back to the child rather
    /// than failing.
    ///
    /// ```
    /// use compose_linearise::{Combine, Value};
    ///
    /// let parent: Value = "ports: [80]".parse().unwrap();
    /// let child: Value = "ports: [443]".parse().unwrap();
    /// let merged: Value = "ports: [80, 443]".parse().unwrap();
    /// assert_eq!(parent.combine(&child), merged);
    /// ```
    fn combine(&self, child: &Self) -> Self {
        match (self, child) {
            (Value::Mapping(parent), Value::Mapping(child)) => {
                Value::Mapping(parent.combine(child))
            }
            (Value::Sequence(parent), Value::Sequence(child)) => {
                Value::Sequence(parent.combine(child))
            }
            (_, child) => child.clone(),
        }
    }
}

impl Combine for Vec<Value> {
    /// Appends the child's entries to the parent's, keeping duplicates.
    fn combine(&self, child: &Self) -> Self {
        let mut combined = self.clone();
        combined.extend_from_slice(child);
        combined
    }
}

impl Combine for Mapping {
    /// Merges the child into the parent, combining values recursively for
    /// keys present in both.  The parent's keys come first in their
    /// original order, followed by keys only the child defines, in the
    /// child's order.
    fn combine(&self, child: &Self) -> Self {
        let mut combined = Mapping::with_capacity(self.len() + child.len());
        for (key, parent_value) in self {
            let value = match child.get(key) {
                Some(child_value) => parent_value.combine(child_value),
                None => parent_value.clone(),
            };
            combined.insert(key.clone(), value);
        }
        for (key, child_value) in child {
            if !combined.contains_key(key) {
                combined.insert(key.clone(), child_value.clone());
            }
        }
        combined
    }
}

#[cfg(test)]
fn tree(yaml: &str) -> Value {
    yaml.parse().unwrap()
}

#[test]
fn child_scalar_overrides_parent_scalar() {
    assert_eq!(tree("image: a").combine(&tree("image: b")), tree("image: b"));
}

#[test]
fn sequences_concatenate_in_parent_then_child_order() {
    assert_eq!(
        tree("[80, 8080]").combine(&tree("[443]")),
        tree("[80, 8080, 443]")
    );
}

#[test]
fn duplicate_sequence_entries_are_kept() {
    assert_eq!(tree("[80]").combine(&tree("[80]")), tree("[80, 80]"));
}

#[test]
fn mappings_merge_by_key() {
    let parent = tree("A: 1\nB: 2");
    let child = tree("B: 3\nC: 4");
    assert_eq!(parent.combine(&child), tree("A: 1\nB: 3\nC: 4"));
}

#[test]
fn mapping_merge_recurses_into_shared_keys() {
    let parent = tree("environment:\n  A: 1\n  B: 2\nports: [80]");
    let child = tree("environment:\n  B: 3\nports: [443]");
    assert_eq!(
        parent.combine(&child),
        tree("environment:\n  A: 1\n  B: 3\nports: [80, 443]")
    );
}

#[test]
fn merged_mappings_keep_parent_key_order_first() {
    let parent = tree("z: 1\na: 2");
    let child = tree("m: 3\na: 4");
    let merged = match parent.combine(&child) {
        Value::Mapping(entries) => entries,
        _ => panic!("expected a mapping"),
    };
    let keys: Vec<_> = merged.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn mismatched_kinds_fall_back_to_the_child() {
    assert_eq!(tree("[80]").combine(&tree("a: 1")), tree("a: 1"));
    assert_eq!(tree("a: 1").combine(&tree("plain")), tree("plain"));
}
