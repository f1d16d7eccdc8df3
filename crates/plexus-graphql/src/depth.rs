//! Query depth validation.
//!
//! Runs on the parsed document before any resolver. The depth of a field is
//! one more than the depth of its deepest child; a leaf has depth 0, so
//! `{ users { posts { title } } }` measures 2 at `users`. Fragment spreads and
//! inline fragments count as if their selections were written in place.
//! Fields whose names start with `__` are introspection and are not counted.

use std::collections::{HashMap, HashSet};

use async_graphql::Name;
use async_graphql_parser::Positioned;
use async_graphql_parser::types::{
    ExecutableDocument, FragmentDefinition, Selection, SelectionSet,
};
use tracing::debug;

use crate::error::GraphQLError;

/// A root field whose selection nests deeper than allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthViolation {
    /// Response key (alias or name) of the root field.
    pub field: String,
    /// Measured depth of the root field.
    pub depth: usize,
    /// The configured maximum.
    pub max_depth: usize,
}

impl From<DepthViolation> for GraphQLError {
    fn from(v: DepthViolation) -> Self {
        Self::DepthExceeded {
            field: v.field,
            actual: v.depth,
            max: v.max_depth,
        }
    }
}

/// Measures every root field of every operation in `document`.
///
/// Returns one violation per root field deeper than `max_depth`; an empty
/// list means the document is accepted.
#[must_use]
pub fn validate(document: &ExecutableDocument, max_depth: usize) -> Vec<DepthViolation> {
    let walker = Walker {
        fragments: &document.fragments,
    };
    let mut violations = Vec::new();

    for (_, operation) in document.operations.iter() {
        for item in &operation.node.selection_set.node.items {
            walker.root_violations(item, max_depth, &mut HashSet::new(), &mut violations);
        }
    }

    if !violations.is_empty() {
        debug!(count = violations.len(), max_depth, "Query rejected by depth guard");
    }
    violations
}

struct Walker<'a> {
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
}

impl<'a> Walker<'a> {
    /// Finds root fields under one top-level selection, unwrapping fragments.
    fn root_violations(
        &self,
        selection: &'a Positioned<Selection>,
        max_depth: usize,
        visiting: &mut HashSet<&'a str>,
        out: &mut Vec<DepthViolation>,
    ) {
        match &selection.node {
            Selection::Field(field) => {
                let field = &field.node;
                if field.name.node.starts_with("__") {
                    return;
                }
                let depth = self.field_depth(&field.selection_set.node, visiting);
                if depth > max_depth {
                    out.push(DepthViolation {
                        field: field.response_key().node.to_string(),
                        depth,
                        max_depth,
                    });
                }
            }
            Selection::InlineFragment(fragment) => {
                for item in &fragment.node.selection_set.node.items {
                    self.root_violations(item, max_depth, visiting, out);
                }
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.node.fragment_name.node.as_str();
                let Some(definition) = self.fragments.get(name) else {
                    return;
                };
                if !visiting.insert(name) {
                    return;
                }
                for item in &definition.node.selection_set.node.items {
                    self.root_violations(item, max_depth, visiting, out);
                }
                visiting.remove(name);
            }
        }
    }

    /// Depth of a field given its selection set.
    fn field_depth(&self, set: &'a SelectionSet, visiting: &mut HashSet<&'a str>) -> usize {
        if set.items.is_empty() {
            0
        } else {
            1 + self.set_depth(set, visiting)
        }
    }

    /// Deepest field depth among the items of a selection set.
    fn set_depth(&self, set: &'a SelectionSet, visiting: &mut HashSet<&'a str>) -> usize {
        let mut deepest = 0;
        for item in &set.items {
            let depth = match &item.node {
                Selection::Field(field) => {
                    let field = &field.node;
                    if field.name.node.starts_with("__") {
                        0
                    } else {
                        self.field_depth(&field.selection_set.node, visiting)
                    }
                }
                Selection::InlineFragment(fragment) => {
                    self.set_depth(&fragment.node.selection_set.node, visiting)
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    // A spread already on the current path adds nothing.
                    match self.fragments.get(name) {
                        Some(definition) if !visiting.contains(name) => {
                            visiting.insert(name);
                            let depth = self.set_depth(&definition.node.selection_set.node, visiting);
                            visiting.remove(name);
                            depth
                        }
                        _ => 0,
                    }
                }
            };
            deepest = deepest.max(depth);
        }
        deepest
    }
}
