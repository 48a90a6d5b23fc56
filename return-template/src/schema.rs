//! The supported template schema grammar.
//!
//! Only the JSON Schema keywords that matter for copy-path derivation are
//! modelled: `type`, `properties`, `items`, `dependencies`, `oneOf`, `enum`
//! and the custom `sourceKey` annotation. Every other keyword is ignored.
//!
//! Property order is preserved from the document (serde_json is built with
//! `preserve_order`), so traversal order equals declaration order.

use std::path::PathBuf;

use serde_json::{Map, Value};

/// Error types for template parsing and loading.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A node does not fit the supported grammar
    #[error("Malformed schema at '{pointer}': {reason}")]
    Malformed { pointer: String, reason: String },

    /// A registered template failed to parse
    #[error("Template '{template_type}' is malformed: {source}")]
    InvalidTemplate {
        template_type: String,
        #[source]
        source: Box<SchemaError>,
    },

    /// A template document is not valid JSON
    #[error("Template '{template_type}' is not valid JSON: {source}")]
    Json {
        template_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// A template directory could not be read
    #[error("Failed to read templates from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A node of an annotated template schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `{ properties, dependencies? }`
    Object(ObjectNode),
    /// `{ type: array, items }`
    Array(ArrayNode),
    /// Anything else; maps a value only when `sourceKey` is present
    Leaf(LeafNode),
    /// A bare `oneOf` selecting among alternative property sets
    Dependency(DependencyNode),
}

/// An object with ordered properties and optional conditional branches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectNode {
    /// Properties in declaration order
    pub properties: Vec<(String, SchemaNode)>,
    /// `dependencies` entries in declaration order
    pub dependencies: Vec<(String, DependencyNode)>,
}

/// An array whose elements all share the `items` schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub items: Box<SchemaNode>,
}

/// A scalar (or unrecognised) field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafNode {
    /// Absolute key path into the paired representation
    pub source_key: Option<Vec<String>>,
    /// The `type` keyword, if any
    pub kind: Option<String>,
    /// The `enum` keyword, if any
    pub allowed: Option<Vec<Value>>,
}

/// Alternative property sets (`oneOf`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyNode {
    pub branches: Vec<Branch>,
}

/// One `oneOf` alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    /// Properties pinned to a single `enum` literal, e.g. `cows == "Yes"`
    pub condition: Vec<(String, Value)>,
    /// The branch's own properties, surfaced at the parent's level
    pub schema: ObjectNode,
}

impl SchemaNode {
    /// Parse a template document.
    ///
    /// The root must be a JSON object. Below the root, nodes that match no
    /// known shape become leaves without a `sourceKey`; a `sourceKey` that is
    /// not a non-empty array of strings is rejected.
    pub fn parse(document: &Value) -> Result<Self, SchemaError> {
        if !document.is_object() {
            return Err(SchemaError::Malformed {
                pointer: "/".to_string(),
                reason: "template root must be an object".to_string(),
            });
        }
        let mut at = Vec::new();
        parse_node(document, &mut at)
    }

    /// Whether this node carries a `sourceKey`.
    pub fn is_mapped_leaf(&self) -> bool {
        matches!(self, Self::Leaf(LeafNode { source_key: Some(_), .. }))
    }
}

impl ObjectNode {
    /// Look up a direct property by name.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }
}

fn parse_node(value: &Value, at: &mut Vec<String>) -> Result<SchemaNode, SchemaError> {
    let Some(obj) = value.as_object() else {
        return Ok(SchemaNode::Leaf(LeafNode::default()));
    };

    let properties = obj.get("properties");
    let dependencies = obj.get("dependencies");
    let items = obj.get("items");
    let one_of = obj.get("oneOf");

    if properties.is_some_and(Value::is_object)
        || (properties.is_none() && dependencies.is_some_and(Value::is_object))
    {
        return parse_object(obj, at).map(SchemaNode::Object);
    }

    if properties.is_none() {
        if let Some(items @ Value::Object(_)) = items {
            at.push("items".to_string());
            let items = parse_node(items, at)?;
            at.pop();
            return Ok(SchemaNode::Array(ArrayNode {
                items: Box::new(items),
            }));
        }
        if items.is_none() {
            if let Some(Value::Array(branches)) = one_of {
                at.push("oneOf".to_string());
                let node = parse_one_of(branches, at)?;
                at.pop();
                return Ok(SchemaNode::Dependency(node));
            }
            if one_of.is_none() {
                return parse_leaf(obj, at).map(SchemaNode::Leaf);
            }
        }
    }

    Ok(SchemaNode::Leaf(LeafNode::default()))
}

fn parse_object(obj: &Map<String, Value>, at: &mut Vec<String>) -> Result<ObjectNode, SchemaError> {
    let mut node = ObjectNode::default();

    if let Some(Value::Object(props)) = obj.get("properties") {
        at.push("properties".to_string());
        for (name, child) in props {
            at.push(name.clone());
            node.properties.push((name.clone(), parse_node(child, at)?));
            at.pop();
        }
        at.pop();
    }

    if let Some(Value::Object(deps)) = obj.get("dependencies") {
        at.push("dependencies".to_string());
        for (name, dep) in deps {
            at.push(name.clone());
            node.dependencies.push((name.clone(), parse_dependency(dep, at)?));
            at.pop();
        }
        at.pop();
    }

    Ok(node)
}

fn parse_dependency(dep: &Value, at: &mut Vec<String>) -> Result<DependencyNode, SchemaError> {
    let Some(obj) = dep.as_object() else {
        // property dependency: a list of required names
        return Ok(DependencyNode::default());
    };

    match obj.get("oneOf") {
        Some(Value::Array(branches)) => {
            at.push("oneOf".to_string());
            let node = parse_one_of(branches, at)?;
            at.pop();
            Ok(node)
        }
        _ if obj.get("properties").is_some_and(Value::is_object) => Ok(DependencyNode {
            branches: vec![parse_branch(obj, at)?],
        }),
        _ => Ok(DependencyNode::default()),
    }
}

fn parse_one_of(branches: &[Value], at: &mut Vec<String>) -> Result<DependencyNode, SchemaError> {
    let mut node = DependencyNode::default();
    for (index, branch) in branches.iter().enumerate() {
        let Some(obj) = branch.as_object() else {
            continue;
        };
        if !obj.get("properties").is_some_and(Value::is_object) {
            continue;
        }
        at.push(index.to_string());
        node.branches.push(parse_branch(obj, at)?);
        at.pop();
    }
    Ok(node)
}

fn parse_branch(obj: &Map<String, Value>, at: &mut Vec<String>) -> Result<Branch, SchemaError> {
    let schema = parse_object(obj, at)?;
    let condition = schema
        .properties
        .iter()
        .filter_map(|(name, node)| match node {
            SchemaNode::Leaf(LeafNode {
                source_key: None,
                allowed: Some(allowed),
                ..
            }) if allowed.len() == 1 => Some((name.clone(), allowed[0].clone())),
            _ => None,
        })
        .collect();

    Ok(Branch { condition, schema })
}

fn parse_leaf(obj: &Map<String, Value>, at: &[String]) -> Result<LeafNode, SchemaError> {
    let source_key = match obj.get("sourceKey") {
        None => None,
        Some(Value::Array(keys)) if !keys.is_empty() => Some(
            keys.iter()
                .map(|key| {
                    key.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| malformed(at, "sourceKey entries must be strings"))
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(_) => return Err(malformed(at, "sourceKey must be a non-empty array of strings")),
    };

    Ok(LeafNode {
        source_key,
        kind: obj.get("type").and_then(Value::as_str).map(str::to_owned),
        allowed: obj.get("enum").and_then(Value::as_array).cloned(),
    })
}

fn malformed(at: &[String], reason: &str) -> SchemaError {
    SchemaError::Malformed {
        pointer: format!("/{}", at.join("/")),
        reason: reason.to_string(),
    }
}
