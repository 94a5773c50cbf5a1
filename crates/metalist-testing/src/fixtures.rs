//! Template trees and data sets shared by generator tests.

use indexmap::IndexMap;
use metalist_core::{
    build_level_data, template_tree, AutocompleteContext, EntityDefinitions, LevelData,
    LevelEntry, RowCacheEntry, RowContext, RowKey, TemplateNode, TemplateTree, WidgetId,
};
use serde_json::{json, Value};

/// Ids of one list's row template.
#[derive(Debug, Clone)]
pub struct ListInput {
    /// Canvas the row containers are mounted in.
    pub container_parent_id: WidgetId,
    /// Root of the row template.
    pub main_container_id: WidgetId,
    /// Canvas directly under the row container.
    pub main_container_canvas_id: WidgetId,
    pub template_widgets: TemplateTree,
}

pub const SIMPLE_CONTAINER_PARENT: &str = "l9v6x3nt8s";
pub const CONTAINER: &str = "lneohookgm";
pub const SIMPLE_CANVAS: &str = "qpgtpiw3cu";
pub const SIMPLE_IMAGE: &str = "epowimtfiu";
pub const TEXT1: &str = "9qcijo7ri3";
pub const TEXT2: &str = "25x15bnona";
pub const INPUT1: &str = "2qz9v3l5hx";

/// Container > Canvas > { Image1, Text1, Text2, Input1 }.
pub fn simple_list() -> ListInput {
    let template_widgets = template_tree([
        TemplateNode::new(CONTAINER, "Container1", "CONTAINER_WIDGET")
            .with_parent(SIMPLE_CONTAINER_PARENT)
            .with_children([SIMPLE_CANVAS])
            .with_prop("backgroundColor", "white"),
        TemplateNode::new(SIMPLE_CANVAS, "Canvas1", "CANVAS_WIDGET")
            .with_parent(CONTAINER)
            .with_children([SIMPLE_IMAGE, TEXT1, TEXT2, INPUT1]),
        TemplateNode::new(SIMPLE_IMAGE, "Image1", "IMAGE_WIDGET")
            .with_parent(SIMPLE_CANVAS)
            .with_prop("image", "{{currentItem.img}}"),
        TemplateNode::new(TEXT1, "Text1", "TEXT_WIDGET")
            .with_parent(SIMPLE_CANVAS)
            .with_prop("text", "{{currentItem.name}}"),
        TemplateNode::new(TEXT2, "Text2", "TEXT_WIDGET")
            .with_parent(SIMPLE_CANVAS)
            .with_prop("text", "{{currentItem.id}}"),
        TemplateNode::new(INPUT1, "Input1", "INPUT_WIDGET_V2")
            .with_parent(SIMPLE_CANVAS)
            .with_prop("defaultText", "{{currentView.Text1.text}}"),
    ]);

    ListInput {
        container_parent_id: WidgetId::from(SIMPLE_CONTAINER_PARENT),
        main_container_id: WidgetId::from(CONTAINER),
        main_container_canvas_id: WidgetId::from(SIMPLE_CANVAS),
        template_widgets,
    }
}

pub const NESTED_CONTAINER_PARENT: &str = "h6x2w0mqcm";
pub const NESTED_CANVAS: &str = "qpgtpiw3cu";
pub const NESTED_IMAGE: &str = "623fj7t7ld";
pub const NESTED_LIST: &str = "fs2d2lqjgd";
pub const INNER_MAIN_CANVAS: &str = "gkzg4fg1r5";
pub const INNER_CONTAINER: &str = "ch4ob7e1ku";
pub const INNER_CANVAS: &str = "8bnrxy0hs2";
pub const TEXT4: &str = "7xkm2b7d8e";
pub const TEXT5: &str = "q8e2zhxsdb";
pub const IMAGE2: &str = "pjx5gl1sjq";

/// Outer row with a nested `List6` whose own row is
/// Container2 > Canvas3 > { Text4, Text5, Image2 }.
pub fn nested_list() -> ListInput {
    let template_widgets = template_tree([
        TemplateNode::new(CONTAINER, "Container1", "CONTAINER_WIDGET")
            .with_parent(NESTED_CONTAINER_PARENT)
            .with_children([NESTED_CANVAS]),
        TemplateNode::new(NESTED_CANVAS, "Canvas2", "CANVAS_WIDGET")
            .with_parent(CONTAINER)
            .with_children([NESTED_IMAGE, TEXT1, TEXT2, NESTED_LIST]),
        TemplateNode::new(NESTED_IMAGE, "Image1", "IMAGE_WIDGET")
            .with_parent(NESTED_CANVAS)
            .with_prop("image", "{{currentItem.img}}"),
        TemplateNode::new(TEXT1, "Text1", "TEXT_WIDGET")
            .with_parent(NESTED_CANVAS)
            .with_prop("text", "{{currentItem.name}}"),
        TemplateNode::new(TEXT2, "Text2", "TEXT_WIDGET")
            .with_parent(NESTED_CANVAS)
            .with_prop("text", "{{currentIndex}}"),
        TemplateNode::new(NESTED_LIST, "List6", "LIST_WIDGET_V2")
            .with_parent(NESTED_CANVAS)
            .with_children([INNER_MAIN_CANVAS])
            .with_prop("mainCanvasId", INNER_MAIN_CANVAS)
            .with_prop("mainContainerId", INNER_CONTAINER),
        TemplateNode::new(INNER_MAIN_CANVAS, "Canvas1", "CANVAS_WIDGET")
            .with_parent(NESTED_LIST)
            .with_children([INNER_CONTAINER]),
        TemplateNode::new(INNER_CONTAINER, "Container2", "CONTAINER_WIDGET")
            .with_parent(INNER_MAIN_CANVAS)
            .with_children([INNER_CANVAS]),
        TemplateNode::new(INNER_CANVAS, "Canvas3", "CANVAS_WIDGET")
            .with_parent(INNER_CONTAINER)
            .with_children([TEXT4, TEXT5, IMAGE2]),
        TemplateNode::new(TEXT4, "Text4", "TEXT_WIDGET")
            .with_parent(INNER_CANVAS)
            .with_prop("text", "{{level_1.currentItem.name}}"),
        TemplateNode::new(TEXT5, "Text5", "TEXT_WIDGET")
            .with_parent(INNER_CANVAS)
            .with_prop("text", "{{currentIndex}}: {{level_1.currentView.Text1.text}}"),
        TemplateNode::new(IMAGE2, "Image2", "IMAGE_WIDGET")
            .with_parent(INNER_CANVAS)
            .with_prop("image", "{{currentItem.img}}"),
    ]);

    ListInput {
        container_parent_id: WidgetId::from(NESTED_CONTAINER_PARENT),
        main_container_id: WidgetId::from(CONTAINER),
        main_container_canvas_id: WidgetId::from(NESTED_CANVAS),
        template_widgets,
    }
}

/// Row template of the list nested inside [`nested_list`].
pub fn inner_list() -> ListInput {
    ListInput {
        container_parent_id: WidgetId::from(INNER_MAIN_CANVAS),
        main_container_id: WidgetId::from(INNER_CONTAINER),
        main_container_canvas_id: WidgetId::from(INNER_CANVAS),
        template_widgets: nested_list().template_widgets,
    }
}

/// A button dropped onto a row canvas.
pub fn button(id: &str, parent: &str) -> TemplateNode {
    TemplateNode::new(id, "Button1", "BUTTON_WIDGET")
        .with_parent(parent)
        .with_prop("text", "Open {{currentItem.name}}")
}

pub fn sample_data() -> Vec<Value> {
    vec![
        json!({ "id": 1, "name": "Blue" }),
        json!({ "id": 2, "name": "Pink" }),
        json!({ "id": 3, "name": "Black" }),
        json!({ "id": 4, "name": "White" }),
    ]
}

/// Primary keys read from the `id` column.
pub fn keys_of(data: &[Value]) -> Vec<RowKey> {
    data.iter()
        .map(|record| RowKey::from_value(&record["id"]))
        .collect()
}

/// Context of the first row of the outer list in [`nested_list`], as the
/// nested list's generator receives it.
pub fn level_one() -> LevelData {
    let definitions = EntityDefinitions::default();
    let list = nested_list();
    let mut cache = IndexMap::new();
    for id in [CONTAINER, NESTED_CANVAS, NESTED_IMAGE, TEXT1, TEXT2, NESTED_LIST] {
        let Some(node) = list.template_widgets.get(id) else {
            continue;
        };
        cache.insert(
            node.name.clone(),
            RowCacheEntry {
                entity_definition: definitions.definition(&node.kind, &node.name),
                row_index: 0,
                view_index: 0,
                meta_widget_id: node.id.clone(),
                meta_widget_name: node.name.clone(),
                template_widget_id: node.id.clone(),
                template_widget_name: node.name.clone(),
                kind: node.kind.clone(),
            },
        );
    }

    let row = RowContext::new(0, 0, 0, RowKey::from(1_i64));
    build_level_data(
        None,
        1,
        LevelEntry::new(
            &row,
            "{{List1.listData[0]}}",
            cache,
            AutocompleteContext {
                current_item: json!({ "id": 1, "name": "Blue" }),
                current_view: "{{Container1.data}}".to_owned(),
            },
        ),
    )
}
