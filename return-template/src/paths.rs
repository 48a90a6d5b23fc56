//! Copy-path resolution over an annotated schema.
//!
//! The walk is depth-first and pre-order. Object properties extend the
//! destination prefix with their name; array items and `oneOf` branches keep
//! the prefix of their parent, so conditional fields surface at the same
//! level as regular ones and array elements are addressed without an index.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::schema::{DependencyNode, ObjectNode, SchemaNode};

/// One field copy: the value at `from` in the source tree is written to `to`
/// in the destination tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingPath {
    /// Destination key path (schema position)
    pub to: Vec<String>,
    /// Source key path (`sourceKey`)
    pub from: Vec<String>,
}

impl MappingPath {
    pub fn new<T, F>(to: T, from: F) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            to: to.into_iter().map(Into::into).collect(),
            from: from.into_iter().map(Into::into).collect(),
        }
    }

    /// The same copy in the opposite direction.
    pub fn swapped(&self) -> Self {
        Self {
            to: self.from.clone(),
            from: self.to.clone(),
        }
    }
}

/// Key prefixes that address arrays on one side of a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayLayout {
    prefixes: BTreeSet<Vec<String>>,
}

impl ArrayLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: Vec<String>) -> bool {
        self.prefixes.insert(prefix)
    }

    pub fn contains(&self, prefix: &[String]) -> bool {
        self.prefixes.contains(prefix)
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Prefixes in lexicographic order (shorter prefixes first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Vec<String>> {
        self.prefixes.iter()
    }
}

impl<P: Into<String>> FromIterator<Vec<P>> for ArrayLayout {
    fn from_iter<I: IntoIterator<Item = Vec<P>>>(iter: I) -> Self {
        Self {
            prefixes: iter
                .into_iter()
                .map(|prefix| prefix.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

/// Derive the ordered copy paths described by a schema's `sourceKey`s.
pub fn resolve(schema: &SchemaNode) -> Vec<MappingPath> {
    let mut paths = Vec::new();
    let mut prefix = Vec::new();
    walk(schema, &mut prefix, &mut |node: &SchemaNode, prefix: &[String]| {
        if let SchemaNode::Leaf(leaf) = node {
            if let Some(from) = &leaf.source_key {
                paths.push(MappingPath {
                    to: prefix.to_vec(),
                    from: from.clone(),
                });
            }
        }
    });
    paths
}

/// Destination prefixes whose schema node is an array.
pub fn array_layout(schema: &SchemaNode) -> ArrayLayout {
    let mut layout = ArrayLayout::new();
    let mut prefix = Vec::new();
    walk(schema, &mut prefix, &mut |node: &SchemaNode, prefix: &[String]| {
        if matches!(node, SchemaNode::Array(_)) {
            layout.insert(prefix.to_vec());
        }
    });
    layout
}

/// Infer the array legs of the source side of `paths`.
///
/// For every destination array prefix, the longest common proper prefix of
/// the `from` paths mapped beneath it is taken as the matching source array.
/// Nested arrays are resolved innermost first and an enclosing array is kept
/// strictly shorter than the legs inside it. When the `from` paths share
/// nothing, the source keeps element values as parallel arrays at the leaves
/// and no leg is recorded.
pub fn infer_source_layout(paths: &[MappingPath], destination: &ArrayLayout) -> ArrayLayout {
    let mut layout = ArrayLayout::new();
    let mut legs: Vec<(&[String], Vec<String>)> = Vec::new();

    // descendants sort after their ancestors
    for prefix in destination.iter().rev() {
        let parents = paths
            .iter()
            .filter(|path| path.to.len() > prefix.len() && path.to.starts_with(prefix))
            .map(|path| &path.from[..path.from.len().saturating_sub(1)]);

        let Some(mut common) = common_prefix(parents) else {
            continue;
        };
        for (inner, leg) in &legs {
            if inner.starts_with(prefix) && common.len() >= leg.len() {
                common.truncate(leg.len().saturating_sub(1));
            }
        }
        if !common.is_empty() {
            layout.insert(common.clone());
            legs.push((prefix.as_slice(), common));
        }
    }

    layout
}

fn common_prefix<'a>(mut keys: impl Iterator<Item = &'a [String]>) -> Option<Vec<String>> {
    let first = keys.next()?;
    let mut len = first.len();
    for other in keys {
        len = first
            .iter()
            .zip(other)
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    Some(first[..len].to_vec())
}

fn walk<F>(node: &SchemaNode, prefix: &mut Vec<String>, visit: &mut F)
where
    F: FnMut(&SchemaNode, &[String]),
{
    visit(node, prefix);
    match node {
        SchemaNode::Object(obj) => walk_object(obj, prefix, visit),
        SchemaNode::Array(array) => walk(&array.items, prefix, visit),
        SchemaNode::Dependency(dependency) => walk_branches(dependency, prefix, visit),
        SchemaNode::Leaf(_) => {}
    }
}

fn walk_object<F>(obj: &ObjectNode, prefix: &mut Vec<String>, visit: &mut F)
where
    F: FnMut(&SchemaNode, &[String]),
{
    for (name, child) in &obj.properties {
        prefix.push(name.clone());
        walk(child, prefix, visit);
        prefix.pop();
    }
    for (_, dependency) in &obj.dependencies {
        walk_branches(dependency, prefix, visit);
    }
}

fn walk_branches<F>(dependency: &DependencyNode, prefix: &mut Vec<String>, visit: &mut F)
where
    F: FnMut(&SchemaNode, &[String]),
{
    for branch in &dependency.branches {
        walk_object(&branch.schema, prefix, visit);
    }
}
