//! Ancestor row context for nested lists.
//!
//! When a row contains a nested list, the nested list's generator runs one
//! level deeper and needs to resolve `level_N` references against the rows
//! that contain it. [`LevelData`] is that context: one [`LevelEntry`] per
//! ancestor level, built from the outermost list inwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::row::RowContext;
use crate::template::WidgetId;

pub const LEVEL_PREFIX: &str = "level_";

/// `level_<n>`.
pub fn level_key(level: usize) -> String {
    format!("{LEVEL_PREFIX}{level}")
}

/// Parses `level_<n>` back into `n`.
pub fn parse_level_key(key: &str) -> Option<usize> {
    let digits = key.strip_prefix(LEVEL_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Snapshot of one generated widget in an ancestor row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowCacheEntry {
    pub entity_definition: String,
    pub row_index: usize,
    pub view_index: usize,
    pub meta_widget_id: WidgetId,
    pub meta_widget_name: String,
    pub template_widget_id: WidgetId,
    pub template_widget_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Values offered to editor autocompletion inside the nested list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteContext {
    pub current_item: Value,
    pub current_view: String,
}

/// Context of one ancestor row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEntry {
    pub current_index: usize,
    /// Binding that reads the ancestor record, e.g. `{{List1.listData[0]}}`.
    pub current_item: String,
    /// Generated widgets of the ancestor row, keyed by template widget name.
    pub current_row_cache: IndexMap<String, RowCacheEntry>,
    pub autocomplete: AutocompleteContext,
}

impl LevelEntry {
    pub fn new(
        row: &RowContext,
        current_item: impl Into<String>,
        current_row_cache: IndexMap<String, RowCacheEntry>,
        autocomplete: AutocompleteContext,
    ) -> Self {
        Self {
            current_index: row.row_index,
            current_item: current_item.into(),
            current_row_cache,
            autocomplete,
        }
    }

    /// Meta widget name standing in for `template_name` in this row.
    pub fn meta_name(&self, template_name: &str) -> Option<&str> {
        self.current_row_cache
            .get(template_name)
            .map(|entry| entry.meta_widget_name.as_str())
    }

    /// Object literal of the row's exposed properties, without braces
    /// around the whole.
    pub fn view_literal(&self) -> String {
        view_literal(
            self.current_row_cache
                .values()
                .filter(|entry| !entry.entity_definition.is_empty())
                .map(|entry| (entry.template_widget_name.as_str(), entry.entity_definition.as_str())),
        )
    }

    /// What a widget one level deeper sees under `level_N`.
    pub fn binding(&self) -> LevelBinding {
        LevelBinding {
            current_item: self.current_item.clone(),
            current_index: self.current_index,
            current_view: self
                .current_row_cache
                .iter()
                .filter(|(_, entry)| !entry.entity_definition.is_empty())
                .map(|(name, entry)| (name.clone(), format!("{{{{{{{}}}}}}}", entry.entity_definition)))
                .collect(),
        }
    }
}

/// Per-level view attached to every generated widget of a nested list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelBinding {
    pub current_item: String,
    pub current_index: usize,
    pub current_view: IndexMap<String, String>,
}

/// Ancestor context keyed by `level_<n>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelData(IndexMap<String, LevelEntry>);

impl LevelData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&LevelEntry> {
        self.0.get(key)
    }

    pub fn level(&self, level: usize) -> Option<&LevelEntry> {
        self.0.get(&level_key(level))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LevelEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of `self` with `entry` stored under `key`.
    pub fn with_level(&self, key: impl Into<String>, entry: LevelEntry) -> Self {
        let mut next = self.0.clone();
        next.insert(key.into(), entry);
        Self(next)
    }

    /// Bindings for every level, in level order.
    pub fn bindings(&self) -> IndexMap<String, LevelBinding> {
        self.0
            .iter()
            .map(|(key, entry)| (key.clone(), entry.binding()))
            .collect()
    }
}

impl FromIterator<(String, LevelEntry)> for LevelData {
    fn from_iter<T: IntoIterator<Item = (String, LevelEntry)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Merges the context of the current row under `level_<level>` with the
/// ancestor context. Ancestor entries are carried over untouched.
pub fn build_level_data(ancestors: Option<&LevelData>, level: usize, entry: LevelEntry) -> LevelData {
    match ancestors {
        Some(ancestors) => ancestors.with_level(level_key(level), entry),
        None => LevelData::new().with_level(level_key(level), entry),
    }
}

/// `{ Name: { defs }, … }` body shared by row views.
pub(crate) fn view_literal<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let body = entries
        .map(|(name, definition)| format!("{name}: {{ {definition} }}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{ {body} }}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowKey;
    use serde_json::json;

    fn text_entry(name: &str, meta: &str) -> RowCacheEntry {
        RowCacheEntry {
            entity_definition: format!("isVisible: {meta}.isVisible,text: {meta}.text"),
            row_index: 0,
            view_index: 0,
            meta_widget_id: WidgetId::from(meta),
            meta_widget_name: meta.to_owned(),
            template_widget_id: WidgetId::from(name),
            template_widget_name: name.to_owned(),
            kind: "TEXT_WIDGET".to_owned(),
        }
    }

    fn entry(index: usize) -> LevelEntry {
        let row = RowContext::new(index, index, index, RowKey::from(index));
        let mut cache = IndexMap::new();
        cache.insert("Text1".to_owned(), text_entry("Text1", "Text1"));
        cache.insert(
            "Canvas1".to_owned(),
            RowCacheEntry {
                entity_definition: String::new(),
                kind: "CANVAS_WIDGET".to_owned(),
                ..text_entry("Canvas1", "Canvas1")
            },
        );
        LevelEntry::new(
            &row,
            format!("{{{{List1.listData[{index}]}}}}"),
            cache,
            AutocompleteContext {
                current_item: json!({ "id": index }),
                current_view: "{{Container1.data}}".to_owned(),
            },
        )
    }

    #[test]
    fn level_keys_round_trip() {
        assert_eq!(level_key(3), "level_3");
        assert_eq!(parse_level_key("level_3"), Some(3));
        assert_eq!(parse_level_key("level_"), None);
        assert_eq!(parse_level_key("level_x"), None);
        assert_eq!(parse_level_key("levels_1"), None);
    }

    #[test]
    fn building_does_not_touch_ancestors() {
        let ancestors = build_level_data(None, 1, entry(0));
        let nested = build_level_data(Some(&ancestors), 2, entry(4));

        assert_eq!(ancestors.len(), 1);
        assert!(ancestors.get("level_2").is_none());
        assert_eq!(nested.len(), 2);
        assert_eq!(nested.get("level_1"), ancestors.get("level_1"));
        assert_eq!(nested.level(2).map(|e| e.current_index), Some(4));
        let keys: Vec<_> = nested.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["level_1", "level_2"]);
    }

    #[test]
    fn binding_skips_widgets_without_exposed_properties() {
        let binding = entry(0).binding();
        assert_eq!(binding.current_item, "{{List1.listData[0]}}");
        assert_eq!(binding.current_index, 0);
        assert_eq!(
            binding.current_view.get("Text1").map(String::as_str),
            Some("{{{isVisible: Text1.isVisible,text: Text1.text}}}")
        );
        assert!(!binding.current_view.contains_key("Canvas1"));
    }

    #[test]
    fn level_data_serializes_with_camel_case_fields() {
        let data = build_level_data(None, 1, entry(0));
        let raw = serde_json::to_value(&data).expect("serializes");
        assert_eq!(raw["level_1"]["currentIndex"], json!(0));
        assert_eq!(raw["level_1"]["currentRowCache"]["Text1"]["type"], json!("TEXT_WIDGET"));
        assert_eq!(raw["level_1"]["autocomplete"]["currentView"], json!("{{Container1.data}}"));
    }
}
