//! Structural validation of algorithm source documents.
//!
//! The document is decoded node by node from raw JSON so that every issue
//! carries the exact path of the offending field, e.g.
//! `[0].enfants[2].abscisse`. All issues are collected; decoding does not
//! stop at the first one.

use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use algohub_core::error::FieldIssue;
use algohub_entity::algorithm::content::{TYPE_FIELD, validate_position};
use algohub_entity::algorithm::{DataEntry, Node, NodeKind, SourceCode};

use crate::validation::field_issues;

/// Coordinates every node carries.
const POSITION_FIELDS: [&str; 2] = ["abscisse", "ordonnee"];

/// Entry array of a data dictionary.
const ENTRIES_FIELD: &str = "entrees";

/// Validates and normalizes algorithm source documents.
#[derive(Debug, Clone, Copy)]
pub struct ContentValidator {
    /// Deepest nesting accepted, top-level nodes being depth 1.
    max_depth: usize,
}

impl ContentValidator {
    /// Creates a validator accepting up to `max_depth` levels of nesting.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Decodes `document` into a typed tree, or reports every violated constraint.
    pub fn validate(&self, document: &Value) -> Result<SourceCode, Vec<FieldIssue>> {
        let Value::Array(items) = document else {
            return Err(vec![FieldIssue::new(
                "$",
                "type",
                "document must be an array of nodes",
            )]);
        };

        let mut issues = Vec::new();
        let nodes = self.decode_list(items, "", 1, None, &mut issues);

        if issues.is_empty() {
            Ok(SourceCode(nodes))
        } else {
            Err(issues)
        }
    }

    fn decode_list(
        &self,
        items: &[Value],
        prefix: &str,
        depth: usize,
        required: Option<NodeKind>,
        issues: &mut Vec<FieldIssue>,
    ) -> Vec<Node> {
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let path = format!("{prefix}[{i}]");
                self.decode_node(item, &path, depth, required, issues)
            })
            .collect()
    }

    fn decode_node(
        &self,
        value: &Value,
        path: &str,
        depth: usize,
        required: Option<NodeKind>,
        issues: &mut Vec<FieldIssue>,
    ) -> Option<Node> {
        if depth > self.max_depth {
            issues.push(FieldIssue::new(
                path,
                "depth",
                format!("nesting exceeds {} levels", self.max_depth),
            ));
            return None;
        }

        let Value::Object(fields) = value else {
            issues.push(FieldIssue::new(path, "type", "node must be an object"));
            return None;
        };

        let kind = node_kind(fields, path, issues)?;
        if let Some(expected) = required {
            if kind != expected {
                issues.push(FieldIssue::new(
                    path,
                    "child_kind",
                    format!("expected a {expected} node, found {kind}"),
                ));
            }
        }

        // Children are decoded separately so their issues keep full paths.
        let mut shell = fields.clone();
        let children = kind.child_field().map(|field| {
            match shell.remove(field) {
                Some(Value::Array(items)) => items,
                None | Some(Value::Null) => Vec::new(),
                Some(_) => {
                    issues.push(FieldIssue::new(
                        format!("{path}.{field}"),
                        "type",
                        "must be an array",
                    ));
                    Vec::new()
                }
            }
        });

        let fields_ok = check_fields(kind, &shell, path, issues);

        let decoded = match (kind.child_field(), children) {
            (Some(field), Some(items)) => Some(self.decode_list(
                &items,
                &format!("{path}.{field}"),
                depth + 1,
                kind.required_child_kind(),
                issues,
            )),
            _ => None,
        };

        // A node whose own fields are invalid is not decoded; its children
        // were still checked above.
        if !fields_ok {
            return None;
        }

        let mut node: Node = match serde_json::from_value(Value::Object(shell)) {
            Ok(node) => node,
            Err(e) => {
                issues.push(FieldIssue::new(path, "decode", e.to_string()));
                return None;
            }
        };

        if let (Some(slot), Some(decoded)) = (node.children_mut(), decoded) {
            *slot = decoded;
        }

        Some(node)
    }
}

/// Checks the node's own fields straight from the raw object, one issue
/// per offending field. Returns `true` when the object will decode.
fn check_fields(
    kind: NodeKind,
    fields: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> bool {
    let before = issues.len();

    for field in POSITION_FIELDS {
        let field_path = format!("{path}.{field}");
        match fields.get(field) {
            Some(Value::String(value)) => {
                if let Err(e) = validate_position(value) {
                    issues.push(issue_from(field_path, &e));
                }
            }
            Some(_) => issues.push(FieldIssue::new(field_path, "type", "must be a string")),
            None => issues.push(FieldIssue::new(field_path, "required", "is missing")),
        }
    }

    for field in text_fields(kind) {
        if let Some(value) = fields.get(*field) {
            if !value.is_string() {
                issues.push(FieldIssue::new(
                    format!("{path}.{field}"),
                    "type",
                    "must be a string",
                ));
            }
        }
    }

    for field in list_fields(kind) {
        if let Some(value) = fields.get(*field) {
            check_string_list(value, &format!("{path}.{field}"), issues);
        }
    }

    if kind == NodeKind::DataDictionary {
        match fields.get(ENTRIES_FIELD) {
            Some(Value::Array(entries)) => {
                for (j, entry) in entries.iter().enumerate() {
                    check_entry(entry, &format!("{path}.{ENTRIES_FIELD}[{j}]"), issues);
                }
            }
            Some(_) => issues.push(FieldIssue::new(
                format!("{path}.{ENTRIES_FIELD}"),
                "type",
                "must be an array",
            )),
            None => {}
        }
    }

    issues.len() == before
}

fn check_string_list(value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
    let Value::Array(items) = value else {
        issues.push(FieldIssue::new(path, "type", "must be an array of strings"));
        return;
    };
    for (i, item) in items.iter().enumerate() {
        if !item.is_string() {
            issues.push(FieldIssue::new(format!("{path}[{i}]"), "type", "must be a string"));
        }
    }
}

fn check_entry(value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
    let Value::Object(fields) = value else {
        issues.push(FieldIssue::new(path, "type", "entry must be an object"));
        return;
    };

    let before = issues.len();
    match fields.get("nom") {
        Some(Value::String(_)) => {}
        Some(_) => issues.push(FieldIssue::new(format!("{path}.nom"), "type", "must be a string")),
        None => issues.push(FieldIssue::new(format!("{path}.nom"), "required", "is missing")),
    }
    for field in ["type", "signification"] {
        if fields.get(field).is_some_and(|v| !v.is_string()) {
            issues.push(FieldIssue::new(
                format!("{path}.{field}"),
                "type",
                "must be a string",
            ));
        }
    }
    if issues.len() > before {
        return;
    }

    match serde_json::from_value::<DataEntry>(value.clone()) {
        Ok(entry) => {
            if let Err(errors) = entry.validate() {
                issues.extend(field_issues(path, &errors));
            }
        }
        Err(e) => issues.push(FieldIssue::new(path, "decode", e.to_string())),
    }
}

fn text_fields(kind: NodeKind) -> &'static [&'static str] {
    match kind {
        NodeKind::Problem | NodeKind::Condition | NodeKind::ExitCondition => &["libelle"],
        _ => &[],
    }
}

fn list_fields(kind: NodeKind) -> &'static [&'static str] {
    match kind {
        NodeKind::Problem => &["listeDonnees", "listeResultats"],
        _ => &[],
    }
}

fn issue_from(path: String, error: &ValidationError) -> FieldIssue {
    let message = error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("invalid value ({})", error.code));
    FieldIssue::new(path, error.code.to_string(), message)
}

fn node_kind(
    fields: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<NodeKind> {
    let tag_path = format!("{path}.{TYPE_FIELD}");
    match fields.get(TYPE_FIELD) {
        Some(Value::String(tag)) => match tag.parse::<NodeKind>() {
            Ok(kind) => Some(kind),
            Err(message) => {
                issues.push(FieldIssue::new(tag_path, "unknown_type", message));
                None
            }
        },
        Some(_) => {
            issues.push(FieldIssue::new(tag_path, "type", "must be a string"));
            None
        }
        None => {
            issues.push(FieldIssue::new(tag_path, "required", "node type is missing"));
            None
        }
    }
}
