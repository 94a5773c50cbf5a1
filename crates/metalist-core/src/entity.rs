//! Exposed properties per widget kind.
//!
//! `currentView` snapshots, container `data` and ancestor row caches list the
//! properties a widget exposes to bindings. Which ones depends on its kind.

use indexmap::IndexMap;

/// Registry of the properties each widget kind exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDefinitions {
    by_kind: IndexMap<String, Vec<String>>,
}

impl EntityDefinitions {
    /// Registry without any kinds.
    pub fn empty() -> Self {
        Self {
            by_kind: IndexMap::new(),
        }
    }

    pub fn with<I, S>(mut self, kind: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(kind, properties);
        self
    }

    pub fn register<I, S>(&mut self, kind: impl Into<String>, properties: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by_kind
            .insert(kind.into(), properties.into_iter().map(Into::into).collect());
    }

    pub fn properties(&self, kind: &str) -> &[String] {
        self.by_kind.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `prop: Name.prop` pairs joined by commas, e.g.
    /// `isVisible: Text1.isVisible,text: Text1.text`.
    pub fn definition(&self, kind: &str, widget_name: &str) -> String {
        self.properties(kind)
            .iter()
            .map(|prop| format!("{prop}: {widget_name}.{prop}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for EntityDefinitions {
    fn default() -> Self {
        Self::empty()
            .with("CANVAS_WIDGET", Vec::<String>::new())
            .with("CONTAINER_WIDGET", ["backgroundColor", "isVisible"])
            .with("TEXT_WIDGET", ["isVisible", "text"])
            .with("IMAGE_WIDGET", ["image", "isVisible"])
            .with("BUTTON_WIDGET", ["isVisible", "text", "isDisabled"])
            .with(
                "INPUT_WIDGET_V2",
                ["isValid", "isVisible", "isDisabled", "text", "inputText"],
            )
            .with("CHECKBOX_WIDGET", ["isChecked", "isVisible", "isDisabled"])
            .with(
                "LIST_WIDGET_V2",
                [
                    "backgroundColor",
                    "isVisible",
                    "itemSpacing",
                    "selectedItem",
                    "selectedItemView",
                    "triggeredItemView",
                    "items",
                    "listData",
                    "pageNo",
                    "pageSize",
                    "selectedItemIndex",
                    "triggeredItemIndex",
                ],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_lists_each_property() {
        let defs = EntityDefinitions::default();
        assert_eq!(
            defs.definition("TEXT_WIDGET", "Text1"),
            "isVisible: Text1.isVisible,text: Text1.text"
        );
        assert_eq!(
            defs.definition("IMAGE_WIDGET", "Image1_test_4"),
            "image: Image1_test_4.image,isVisible: Image1_test_4.isVisible"
        );
    }

    #[test]
    fn unknown_kinds_expose_nothing() {
        let defs = EntityDefinitions::default();
        assert_eq!(defs.definition("CHART_WIDGET", "Chart1"), "");
        assert_eq!(defs.definition("CANVAS_WIDGET", "Canvas1"), "");
    }

    #[test]
    fn registration_replaces_kind() {
        let defs = EntityDefinitions::default().with("TEXT_WIDGET", ["text"]);
        assert_eq!(defs.definition("TEXT_WIDGET", "T"), "text: T.text");
    }
}
