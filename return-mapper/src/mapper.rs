//! Path-driven copy of values from a source tree into a fresh destination tree.
//!
//! Paths carry no array indices. Reading broadcasts over any array met while
//! keys remain, yielding one result per element. Writing places those results
//! element-wise at the first destination key that is an array leg: a prefix
//! listed in the mapper's [`ArrayLayout`], or a position already holding an
//! array from an earlier path.

use return_template::{ArrayLayout, MappingPath, Template};
use serde_json::{Map, Value};
use tracing::trace;

/// Copies values along an ordered list of mapping paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralMapper {
    paths: Vec<MappingPath>,
    layout: ArrayLayout,
}

impl StructuralMapper {
    /// Mapper with no known destination arrays.
    pub fn new(paths: Vec<MappingPath>) -> Self {
        Self {
            paths,
            layout: ArrayLayout::new(),
        }
    }

    /// Set the destination prefixes that hold arrays.
    pub fn with_destination_layout(mut self, layout: ArrayLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Core to UI mapper for a template: its copy paths, writing into the
    /// template's own array positions.
    pub fn from_template(template: &Template) -> Self {
        Self::new(template.copy_paths().to_vec())
            .with_destination_layout(template.array_layout().clone())
    }

    pub fn paths(&self) -> &[MappingPath] {
        &self.paths
    }

    pub fn destination_layout(&self) -> &ArrayLayout {
        &self.layout
    }

    /// Build the destination tree for `source`.
    ///
    /// An absent (`null`) or empty source produces `{}`.
    pub fn apply(&self, source: &Value) -> Value {
        apply_with_layout(&self.paths, &self.layout, source)
    }
}

/// Apply `paths` to `source` without any destination layout.
///
/// Array results from the source land at the destination leaf as a plain
/// array unless an earlier path already created an array on the way.
pub fn apply(paths: &[MappingPath], source: &Value) -> Value {
    apply_with_layout(paths, &ArrayLayout::new(), source)
}

fn apply_with_layout(paths: &[MappingPath], layout: &ArrayLayout, source: &Value) -> Value {
    let mut destination = Value::Object(Map::new());
    let mut at = Vec::new();

    for path in paths {
        match read(source, &path.from) {
            Some(value) => write(&mut destination, &path.to, &mut at, value, layout),
            None => trace!(to = ?path.to, from = ?path.from, "Source value absent"),
        }
    }

    destination
}

/// A value read from the source, possibly fanned out over source arrays.
#[derive(Debug, Clone, PartialEq)]
enum Extracted {
    Value(Value),
    /// One entry per element of a source array; `None` where the element
    /// did not resolve
    Each(Vec<Option<Extracted>>),
}

impl Extracted {
    fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Each(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| item.map_or(Value::Null, Extracted::into_value))
                    .collect(),
            ),
        }
    }

    /// Per-element entries, or the single value when there is nothing to
    /// spread.
    fn into_items(self) -> Result<Vec<Option<Extracted>>, Value> {
        match self {
            Self::Each(items) => Ok(items),
            Self::Value(Value::Array(values)) => {
                Ok(values.into_iter().map(|value| Some(Self::Value(value))).collect())
            }
            Self::Value(other) => Err(other),
        }
    }
}

fn read(node: &Value, keys: &[String]) -> Option<Extracted> {
    let Some((key, rest)) = keys.split_first() else {
        return Some(Extracted::Value(node.clone()));
    };

    match node {
        Value::Object(map) => map.get(key).and_then(|child| read(child, rest)),
        Value::Array(elements) => {
            let each: Vec<_> = elements.iter().map(|element| read(element, keys)).collect();
            if !each.is_empty() && each.iter().all(Option::is_none) {
                None
            } else {
                Some(Extracted::Each(each))
            }
        }
        _ => None,
    }
}

fn write(slot: &mut Value, keys: &[String], at: &mut Vec<String>, value: Extracted, layout: &ArrayLayout) {
    let Some((key, rest)) = keys.split_first() else {
        *slot = value.into_value();
        return;
    };

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    let Value::Object(map) = slot else {
        return;
    };
    let child = map.entry(key.clone()).or_insert(Value::Null);

    at.push(key.clone());
    if layout.contains(at) || (child.is_array() && !rest.is_empty()) {
        write_elements(child, rest, at, value, layout);
    } else {
        write(child, rest, at, value, layout);
    }
    at.pop();
}

fn write_elements(
    slot: &mut Value,
    keys: &[String],
    at: &mut Vec<String>,
    value: Extracted,
    layout: &ArrayLayout,
) {
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    let Value::Array(elements) = slot else {
        return;
    };

    match value.into_items() {
        Ok(items) => {
            for (index, item) in items.into_iter().enumerate() {
                if elements.len() <= index {
                    elements.push(Value::Null);
                }
                let element = &mut elements[index];
                match item {
                    Some(item) => write(element, keys, at, item, layout),
                    // keep later elements aligned
                    None if !keys.is_empty() && element.is_null() => *element = Value::Object(Map::new()),
                    None => {}
                }
            }
        }
        Err(single) => {
            if elements.is_empty() {
                elements.push(Value::Null);
            }
            for element in elements.iter_mut() {
                write(element, keys, at, Extracted::Value(single.clone()), layout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(to: &[&str], from: &[&str]) -> MappingPath {
        MappingPath::new(to.iter().copied(), from.iter().copied())
    }

    fn layout(prefixes: &[&[&str]]) -> ArrayLayout {
        prefixes.iter().map(|prefix| prefix.to_vec()).collect()
    }

    #[test]
    fn test_copies_single_value() {
        let paths = vec![path(&["noise"], &["cats"])];
        assert_eq!(apply(&paths, &json!({ "cats": "meow" })), json!({ "noise": "meow" }));
    }

    #[test]
    fn test_empty_or_absent_source_gives_empty_tree() {
        let paths = vec![
            path(&["noise"], &["cats"]),
            path(&["cows", "sound"], &["cows", "moo"]),
        ];
        assert_eq!(apply(&paths, &json!({})), json!({}));
        assert_eq!(apply(&paths, &Value::Null), json!({}));
        assert_eq!(apply(&[], &json!({ "cats": "meow" })), json!({}));
    }

    #[test]
    fn test_creates_intermediate_objects() {
        let paths = vec![
            path(&["animals", "cats", "noise"], &["meow"]),
            path(&["animals", "dogs", "noise"], &["sounds", "woof"]),
        ];
        let source = json!({ "meow": "purr", "sounds": { "woof": "bark" } });

        assert_eq!(
            apply(&paths, &source),
            json!({ "animals": { "cats": { "noise": "purr" }, "dogs": { "noise": "bark" } } })
        );
    }

    #[test]
    fn test_missing_keys_are_not_written() {
        let paths = vec![
            path(&["noise"], &["cats"]),
            path(&["sound"], &["dogs", "bark"]),
            path(&["other"], &["cats", "deeper"]),
        ];
        assert_eq!(apply(&paths, &json!({ "cats": "meow" })), json!({ "noise": "meow" }));
    }

    #[test]
    fn test_null_source_value_is_copied() {
        let paths = vec![path(&["noise"], &["cats"])];
        assert_eq!(apply(&paths, &json!({ "cats": null })), json!({ "noise": null }));
    }

    #[test]
    fn test_whole_subtrees_are_copied() {
        let paths = vec![path(&["pets"], &["animals"])];
        let source = json!({ "animals": { "cats": ["Tabby", "Siamese"], "dogs": { "count": 2 } } });
        assert_eq!(
            apply(&paths, &source),
            json!({ "pets": { "cats": ["Tabby", "Siamese"], "dogs": { "count": 2 } } })
        );
    }

    #[test]
    fn test_source_array_spreads_into_destination_array() {
        let mapper = StructuralMapper::new(vec![path(&["parents", "breed"], &["breed"])])
            .with_destination_layout(layout(&[&["parents"]]));

        let expected = json!({ "parents": [{ "breed": "Tabby" }, { "breed": "Siamese" }] });
        assert_eq!(mapper.apply(&json!({ "breed": ["Tabby", "Siamese"] })), expected);
        assert_eq!(
            mapper.apply(&json!([{ "breed": "Tabby" }, { "breed": "Siamese" }])),
            expected
        );
    }

    #[test]
    fn test_array_elements_align_across_paths() {
        let mapper = StructuralMapper::new(vec![
            path(&["cats", "name"], &["pets", "called"]),
            path(&["cats", "noise"], &["pets", "says"]),
        ])
        .with_destination_layout(layout(&[&["cats"]]));
        let source = json!({
            "pets": [
                { "called": "Tom", "says": "meow" },
                { "says": "hiss" },
                { "called": "Felix" }
            ]
        });

        assert_eq!(
            mapper.apply(&source),
            json!({
                "cats": [
                    { "name": "Tom", "noise": "meow" },
                    { "noise": "hiss" },
                    { "name": "Felix" }
                ]
            })
        );
    }

    #[test]
    fn test_without_layout_arrays_stay_at_leaf() {
        let paths = vec![
            path(&["cats", "name"], &["pets", "called"]),
            path(&["cats", "noise"], &["pets", "says"]),
        ];
        let source = json!({ "pets": [{ "called": "Tom", "says": "meow" }, { "says": "hiss" }] });

        assert_eq!(
            apply(&paths, &source),
            json!({ "cats": { "name": ["Tom", null], "noise": ["meow", "hiss"] } })
        );
    }

    #[test]
    fn test_nested_arrays_broadcast_per_level() {
        let mapper = StructuralMapper::new(vec![
            path(&["sites", "name"], &["plots", "label"]),
            path(&["sites", "phases", "units"], &["plots", "stages", "homes"]),
        ])
        .with_destination_layout(layout(&[&["sites"], &["sites", "phases"]]));
        let source = json!({
            "plots": [
                { "label": "North", "stages": [{ "homes": 10 }, { "homes": 12 }] },
                { "label": "South", "stages": [{ "homes": 4 }] }
            ]
        });

        assert_eq!(
            mapper.apply(&source),
            json!({
                "sites": [
                    { "name": "North", "phases": [{ "units": 10 }, { "units": 12 }] },
                    { "name": "South", "phases": [{ "units": 4 }] }
                ]
            })
        );
    }

    #[test]
    fn test_nested_source_arrays_keep_absolute_paths() {
        // the leaf path is absolute from the root; both array legs fan out
        let mapper = StructuralMapper::new(vec![path(
            &["rows", "cells", "value"],
            &["table", "rows", "cells"],
        )])
        .with_destination_layout(layout(&[&["rows"], &["rows", "cells"]]));
        let source = json!({ "table": { "rows": [{ "cells": [1, 2] }, { "cells": [3] }] } });

        assert_eq!(
            mapper.apply(&source),
            json!({ "rows": [
                { "cells": [{ "value": 1 }, { "value": 2 }] },
                { "cells": [{ "value": 3 }] }
            ] })
        );
    }

    #[test]
    fn test_scalar_is_written_into_each_existing_element() {
        let mapper = StructuralMapper::new(vec![
            path(&["cats", "name"], &["names"]),
            path(&["cats", "owner"], &["owner"]),
        ])
        .with_destination_layout(layout(&[&["cats"]]));
        let source = json!({ "names": ["Tom", "Felix"], "owner": "Jo" });

        assert_eq!(
            mapper.apply(&source),
            json!({ "cats": [{ "name": "Tom", "owner": "Jo" }, { "name": "Felix", "owner": "Jo" }] })
        );
    }

    #[test]
    fn test_scalar_into_empty_array_leg_creates_one_element() {
        let mapper = StructuralMapper::new(vec![path(&["parents", "breed"], &["breed"])])
            .with_destination_layout(layout(&[&["parents"]]));
        assert_eq!(
            mapper.apply(&json!({ "breed": "Tabby" })),
            json!({ "parents": [{ "breed": "Tabby" }] })
        );
    }

    #[test]
    fn test_empty_source_array_is_kept() {
        let mapper = StructuralMapper::new(vec![path(&["parents", "breed"], &["cats", "breed"])])
            .with_destination_layout(layout(&[&["parents"]]));
        assert_eq!(mapper.apply(&json!({ "cats": [] })), json!({ "parents": [] }));
    }

    #[test]
    fn test_array_of_unresolved_elements_is_absent() {
        let mapper = StructuralMapper::new(vec![path(&["parents", "breed"], &["cats", "breed"])])
            .with_destination_layout(layout(&[&["parents"]]));
        assert_eq!(mapper.apply(&json!({ "cats": [{ "name": "Tom" }, 7] })), json!({}));
    }

    #[test]
    fn test_from_template_uses_schema_arrays() {
        let template = Template::from_document(
            "cats",
            json!({
                "type": "object",
                "properties": {
                    "noise": { "type": "string", "sourceKey": ["cats"] },
                    "parents": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": { "breed": { "type": "string", "sourceKey": ["breed"] } }
                        }
                    }
                }
            }),
        )
        .unwrap();
        let mapper = StructuralMapper::from_template(&template);

        assert_eq!(mapper.paths(), template.copy_paths());
        assert_eq!(
            mapper.apply(&json!({ "cats": "meow", "breed": ["Tabby", "Siamese"] })),
            json!({ "noise": "meow", "parents": [{ "breed": "Tabby" }, { "breed": "Siamese" }] })
        );
    }
}
