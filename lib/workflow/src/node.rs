//! Workflow node types and configurations.
//!
//! Nodes are the building blocks of a pipeline. Each node has:
//! - An ID assigned by the visual editor, unique within the workflow
//! - A kind (UserQuery, KnowledgeBase, LLM Engine, Output)
//! - An optional display label
//! - A free-form configuration map whose meaning depends on the kind

use crate::error::NodeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Identifier of a node within a workflow, as assigned by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node ID from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The kind of a pipeline node.
///
/// The four known kinds form a closed set. Tags written by a newer editor are
/// preserved as [`NodeKind::Unknown`] so that the graph still loads and the
/// node fails locally at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Entry point carrying the user's free-text query.
    UserQuery,
    /// Document ingestion and context retrieval.
    KnowledgeBase,
    /// Response generation.
    LlmEngine,
    /// Final response formatting.
    Output,
    /// A tag this engine does not understand.
    Unknown(String),
}

impl NodeKind {
    /// Type-priority order used when a workflow has no UserQuery entry point.
    pub const PRIORITY: [NodeKind; 4] = [
        NodeKind::UserQuery,
        NodeKind::KnowledgeBase,
        NodeKind::LlmEngine,
        NodeKind::Output,
    ];

    /// Returns the wire tag for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::UserQuery => "userQuery",
            Self::KnowledgeBase => "knowledgeBase",
            Self::LlmEngine => "llmEngine",
            Self::Output => "output",
            Self::Unknown(tag) => tag,
        }
    }

    /// Returns the label shown for nodes of this kind that have none of their own.
    #[must_use]
    pub fn default_label(&self) -> &str {
        match self {
            Self::UserQuery => "User Query",
            Self::KnowledgeBase => "Knowledge Base",
            Self::LlmEngine => "LLM Engine",
            Self::Output => "Output",
            Self::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "userQuery" => Self::UserQuery,
            "knowledgeBase" => Self::KnowledgeBase,
            "llmEngine" => Self::LlmEngine,
            "output" => Self::Output,
            _ => Self::Unknown(tag),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Free-form node configuration as produced by the editor's form fields.
///
/// Values are read leniently: the editor stores toggles, numbers and text
/// without a schema, so the accessors coerce where the editor is known to be
/// loose and report [`NodeError::InvalidConfig`] where it cannot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeConfig(Map<String, JsonValue>);

impl NodeConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, returning the updated configuration.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Returns the configured keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns whether a key holds a truthy value.
    ///
    /// Missing keys, `null`, `false`, zero, and empty strings, arrays or
    /// objects are all false.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    /// Returns a string value with surrounding whitespace removed.
    ///
    /// Blank strings and non-string values read as absent.
    #[must_use]
    pub fn trimmed_text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Returns a string value verbatim, treating empty strings as absent.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Returns a numeric value, accepting numbers and numeric strings.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidConfig`] if the value is present but is
    /// neither a number nor a string that parses as one.
    pub fn number(&self, key: &str) -> Result<Option<f64>, NodeError> {
        let invalid = |value: &JsonValue| NodeError::InvalidConfig {
            key: key.to_string(),
            reason: format!("expected a number, found {value}"),
        };

        match self.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::Number(n)) => Ok(n.as_f64()),
            Some(JsonValue::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| invalid(&JsonValue::String(s.clone()))),
            Some(other) => Err(invalid(other)),
        }
    }

    /// Returns an array value, or an empty slice when absent or not an array.
    #[must_use]
    pub fn list(&self, key: &str) -> &[JsonValue] {
        self.get(key)
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl From<Map<String, JsonValue>> for NodeConfig {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(o) => !o.is_empty(),
    }
}

/// Editor-side payload of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Display label chosen by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Form values for this node.
    #[serde(default)]
    pub config: NodeConfig,
}

/// A pipeline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier, unique within the workflow.
    pub id: NodeId,
    /// Node kind.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Label and configuration.
    #[serde(default)]
    pub data: NodeData,
}

impl Node {
    /// Creates a node with no label and empty configuration.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            data: NodeData::default(),
        }
    }

    /// Sets the display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.data.label = Some(label.into());
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.data.config = config;
        self
    }

    /// Returns the node configuration.
    #[must_use]
    pub fn config(&self) -> &NodeConfig {
        &self.data.config
    }

    /// Returns the label to show in traces: the user's label when set,
    /// otherwise a name derived from the node kind.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.data
            .label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| self.kind.default_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_parses_known_tags() {
        let kind: NodeKind = serde_json::from_value(json!("knowledgeBase")).expect("parse");
        assert_eq!(kind, NodeKind::KnowledgeBase);
    }

    #[test]
    fn kind_keeps_unknown_tags() {
        let kind: NodeKind = serde_json::from_value(json!("webSearch")).expect("parse");
        assert_eq!(kind, NodeKind::Unknown("webSearch".to_string()));
        assert_eq!(serde_json::to_value(&kind).expect("serialize"), json!("webSearch"));
    }

    #[test]
    fn node_parses_editor_shape() {
        let node: Node = serde_json::from_value(json!({
            "id": "llm-1",
            "type": "llmEngine",
            "position": { "x": 10, "y": 20 },
            "data": {
                "label": "Answerer",
                "config": { "model": "gpt-4o", "temperature": "0.2" }
            }
        }))
        .expect("parse");

        assert_eq!(node.id.as_str(), "llm-1");
        assert_eq!(node.kind, NodeKind::LlmEngine);
        assert_eq!(node.display_label(), "Answerer");
        assert_eq!(node.config().text("model"), Some("gpt-4o"));
        assert_eq!(node.config().number("temperature").expect("number"), Some(0.2));
    }

    #[test]
    fn node_without_data_uses_kind_label() {
        let node: Node =
            serde_json::from_value(json!({ "id": "out", "type": "output" })).expect("parse");
        assert_eq!(node.display_label(), "Output");
        assert!(node.config().get("includeMetadata").is_none());
    }

    #[test]
    fn flag_follows_truthiness() {
        let config = NodeConfig::new()
            .with("on", true)
            .with("off", false)
            .with("one", 1)
            .with("zero", 0)
            .with("text", "yes")
            .with("blank", "")
            .with("null", JsonValue::Null);

        assert!(config.flag("on"));
        assert!(!config.flag("off"));
        assert!(config.flag("one"));
        assert!(!config.flag("zero"));
        assert!(config.flag("text"));
        assert!(!config.flag("blank"));
        assert!(!config.flag("null"));
        assert!(!config.flag("missing"));
    }

    #[test]
    fn trimmed_text_treats_blank_as_absent() {
        let config = NodeConfig::new()
            .with("api-key", "  sk-test  ")
            .with("blank", "   ");
        assert_eq!(config.trimmed_text("api-key"), Some("sk-test"));
        assert_eq!(config.trimmed_text("blank"), None);
    }

    #[test]
    fn number_rejects_garbage() {
        let config = NodeConfig::new().with("temperature", "warm");
        let err = config.number("temperature").unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }
}
