//! Typed model of an algorithm's source document.
//!
//! A document is an array of top-level nodes. Each node is tagged by its
//! `typeElement` field and is one of a closed set of kinds. Node kinds that
//! hold children declare exactly one child array (see [`NodeKind::child_field`]).

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// JSON field holding the node discriminator.
pub const TYPE_FIELD: &str = "typeElement";

/// Unit suffix required on node coordinates.
pub const POSITION_UNIT: &str = "vw";

/// The root of an algorithm document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceCode(pub Vec<Node>);

impl SourceCode {
    /// Encode into the normalized JSON form stored and mirrored.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Array(self.0.iter().map(Node::to_value).collect())
    }

    /// Total number of nodes, children included.
    pub fn node_count(&self) -> usize {
        self.0.iter().map(Node::node_count).sum()
    }
}

/// Discriminator values for [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Problem,
    Condition,
    ExitCondition,
    UnboundedLoopStructure,
    IfStructure,
    DataDictionary,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: [NodeKind; 6] = [
        Self::Problem,
        Self::Condition,
        Self::ExitCondition,
        Self::UnboundedLoopStructure,
        Self::IfStructure,
        Self::DataDictionary,
    ];

    /// Return the `typeElement` value for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Problem => "Problem",
            Self::Condition => "Condition",
            Self::ExitCondition => "ExitCondition",
            Self::UnboundedLoopStructure => "UnboundedLoopStructure",
            Self::IfStructure => "IfStructure",
            Self::DataDictionary => "DataDictionary",
        }
    }

    /// Name of the array holding child nodes, if this kind has children.
    pub fn child_field(&self) -> Option<&'static str> {
        match self {
            Self::Problem | Self::Condition | Self::UnboundedLoopStructure => Some("enfants"),
            Self::IfStructure => Some("conditions"),
            Self::ExitCondition | Self::DataDictionary => None,
        }
    }

    /// Restriction on the kind of children, if any.
    pub fn required_child_kind(&self) -> Option<NodeKind> {
        match self {
            Self::IfStructure => Some(Self::Condition),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown node type '{s}'"))
    }
}

/// A node of an algorithm document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "typeElement")]
pub enum Node {
    Problem(ProblemNode),
    Condition(ConditionNode),
    ExitCondition(ExitConditionNode),
    UnboundedLoopStructure(LoopNode),
    IfStructure(IfNode),
    DataDictionary(DataDictionaryNode),
}

impl Node {
    /// The discriminator of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Problem(_) => NodeKind::Problem,
            Self::Condition(_) => NodeKind::Condition,
            Self::ExitCondition(_) => NodeKind::ExitCondition,
            Self::UnboundedLoopStructure(_) => NodeKind::UnboundedLoopStructure,
            Self::IfStructure(_) => NodeKind::IfStructure,
            Self::DataDictionary(_) => NodeKind::DataDictionary,
        }
    }

    /// Child nodes, empty for leaf kinds.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Problem(n) => &n.enfants,
            Self::Condition(n) => &n.enfants,
            Self::UnboundedLoopStructure(n) => &n.enfants,
            Self::IfStructure(n) => &n.conditions,
            Self::ExitCondition(_) | Self::DataDictionary(_) => &[],
        }
    }

    /// Mutable child array, None for leaf kinds.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Problem(n) => Some(&mut n.enfants),
            Self::Condition(n) => Some(&mut n.enfants),
            Self::UnboundedLoopStructure(n) => Some(&mut n.enfants),
            Self::IfStructure(n) => Some(&mut n.conditions),
            Self::ExitCondition(_) | Self::DataDictionary(_) => None,
        }
    }

    /// Encode this node, tag included.
    pub fn to_value(&self) -> serde_json::Value {
        // Plain structs of strings and arrays always encode.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }
}

/// Top-level statement of a problem and its decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemNode {
    pub abscisse: String,
    pub ordonnee: String,
    #[serde(default)]
    pub libelle: String,
    #[serde(default)]
    pub liste_donnees: Vec<String>,
    #[serde(default)]
    pub liste_resultats: Vec<String>,
    #[serde(default)]
    pub enfants: Vec<Node>,
}

/// A guarded branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionNode {
    pub abscisse: String,
    pub ordonnee: String,
    #[serde(default)]
    pub libelle: String,
    #[serde(default)]
    pub enfants: Vec<Node>,
}

/// Exit point of an unbounded loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitConditionNode {
    pub abscisse: String,
    pub ordonnee: String,
    #[serde(default)]
    pub libelle: String,
}

/// A loop without a fixed iteration count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopNode {
    pub abscisse: String,
    pub ordonnee: String,
    #[serde(default)]
    pub enfants: Vec<Node>,
}

/// A conditional made of `Condition` branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfNode {
    pub abscisse: String,
    pub ordonnee: String,
    #[serde(default)]
    pub conditions: Vec<Node>,
}

/// Glossary of the data manipulated by the algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDictionaryNode {
    pub abscisse: String,
    pub ordonnee: String,
    #[serde(default)]
    pub entrees: Vec<DataEntry>,
}

/// One line of a data dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DataEntry {
    #[validate(length(min = 1, max = 255))]
    pub nom: String,
    #[serde(rename = "type", default)]
    pub type_donnee: String,
    #[serde(default)]
    pub signification: String,
}

/// Checks a coordinate such as `"12.5vw"`.
pub fn validate_position(value: &str) -> Result<(), ValidationError> {
    let Some(number) = value.strip_suffix(POSITION_UNIT) else {
        return Err(position_error("must end with the 'vw' unit"));
    };

    match number.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(()),
        _ => Err(position_error("must be a number followed by 'vw'")),
    }
}

fn position_error(message: &'static str) -> ValidationError {
    ValidationError::new("vw_unit").with_message(Cow::Borrowed(message))
}
