//! Authored template widgets.
//!
//! A [`TemplateNode`] is the single definition of a widget that lives inside a
//! repeating list. The generator never mutates templates; it reads a
//! [`TemplateTree`] snapshot on every pass and materializes one copy of the
//! relevant nodes per visible row.

use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a template widget or of a generated meta widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    #[inline]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for WidgetId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl Borrow<str> for WidgetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A configuration field of a template node.
///
/// Fields are a loosely typed bag in the authoring layer. Strings that carry a
/// `{{ … }}` segment are bindings and get rewritten per row; everything else
/// is copied verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FieldValue {
    Literal(Value),
    Binding(String),
}

impl FieldValue {
    /// Classifies a raw authoring value.
    pub fn from_raw(raw: Value) -> Self {
        match raw {
            Value::String(text) if is_binding(&text) => FieldValue::Binding(text),
            other => FieldValue::Literal(other),
        }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        FieldValue::Literal(value.into())
    }

    pub fn binding(text: impl Into<String>) -> Self {
        FieldValue::Binding(text.into())
    }

    pub fn as_binding(&self) -> Option<&str> {
        match self {
            FieldValue::Binding(text) => Some(text),
            FieldValue::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            FieldValue::Literal(value) => Some(value),
            FieldValue::Binding(_) => None,
        }
    }

    pub fn is_binding(&self) -> bool {
        matches!(self, FieldValue::Binding(_))
    }

    pub fn to_raw(&self) -> Value {
        match self {
            FieldValue::Literal(value) => value.clone(),
            FieldValue::Binding(text) => Value::String(text.clone()),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(raw: Value) -> Self {
        FieldValue::from_raw(raw)
    }
}

impl From<FieldValue> for Value {
    fn from(field: FieldValue) -> Self {
        match field {
            FieldValue::Literal(value) => value,
            FieldValue::Binding(text) => Value::String(text),
        }
    }
}

/// Returns whether `text` contains at least one `{{ … }}` segment.
pub fn is_binding(text: &str) -> bool {
    match text.find("{{") {
        Some(open) => text[open + 2..].contains("}}"),
        None => false,
    }
}

/// One authored widget definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateNode {
    #[serde(rename = "widgetId")]
    pub id: WidgetId,
    #[serde(rename = "widgetName")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<WidgetId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WidgetId>,
    #[serde(default, flatten)]
    pub props: IndexMap<String, FieldValue>,
}

impl TemplateNode {
    pub fn new(id: impl Into<WidgetId>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            parent_id: None,
            children: Vec::new(),
            props: IndexMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<WidgetId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<WidgetId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a field, classifying strings with `{{ … }}` as bindings.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props
            .insert(key.into(), FieldValue::from_raw(value.into()));
        self
    }

    pub fn prop(&self, key: &str) -> Option<&FieldValue> {
        self.props.get(key)
    }
}

/// Template snapshot keyed by widget id, in authoring order.
pub type TemplateTree = IndexMap<WidgetId, TemplateNode>;

/// Collects nodes into a [`TemplateTree`].
pub fn template_tree(nodes: impl IntoIterator<Item = TemplateNode>) -> TemplateTree {
    nodes
        .into_iter()
        .map(|node| (node.id.clone(), node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_with_mustache_segments_are_bindings() {
        assert!(FieldValue::from_raw(json!("{{currentItem.name}}")).is_binding());
        assert!(FieldValue::from_raw(json!("Hello {{ Text1.text }}!")).is_binding());
        assert!(!FieldValue::from_raw(json!("plain")).is_binding());
        assert!(!FieldValue::from_raw(json!("{{ unterminated")).is_binding());
        assert!(!FieldValue::from_raw(json!(12)).is_binding());
    }

    #[test]
    fn node_deserializes_from_authoring_json() {
        let node: TemplateNode = serde_json::from_value(json!({
            "widgetId": "9qcijo7ri3",
            "widgetName": "Text1",
            "type": "TEXT_WIDGET",
            "parentId": "qpgtpiw3cu",
            "text": "{{currentItem.name}}",
            "fontSize": 14
        }))
        .expect("valid node");

        assert_eq!(node.id.as_str(), "9qcijo7ri3");
        assert_eq!(node.parent_id, Some(WidgetId::from("qpgtpiw3cu")));
        assert!(node.children.is_empty());
        assert_eq!(
            node.prop("text"),
            Some(&FieldValue::binding("{{currentItem.name}}"))
        );
        assert_eq!(node.prop("fontSize"), Some(&FieldValue::literal(14)));
    }

    #[test]
    fn tree_lookup_by_str() {
        let tree = template_tree([TemplateNode::new("a", "A", "TEXT_WIDGET")]);
        assert!(tree.contains_key("a"));
        assert!(!tree.contains_key("b"));
    }
}
