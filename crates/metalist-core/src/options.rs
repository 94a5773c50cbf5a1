//! Construction-time configuration and per-pass options.

use std::ops::Range;

use serde_json::Value;

use crate::entity::EntityDefinitions;
use crate::error::GeneratorError;
use crate::level::LevelData;
use crate::row::RowKey;
use crate::template::{TemplateTree, WidgetId};

/// Whether the list is being edited or viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Editor canvas: the first row of each page stays directly editable.
    #[default]
    Canvas,
    /// Published page: every row is a read-only projection.
    Page,
}

/// Fixed for the lifetime of a generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Nesting depth, 1 for a top level list.
    pub level: usize,
    pub render_mode: RenderMode,
    /// Namespace of minted meta widget ids.
    pub prefix_meta_widget_id: String,
    /// Kind of the repeating container itself; nested occurrences stop the
    /// template walk.
    pub primary_widget_type: String,
    /// Fallback for options that carry no widget name.
    pub widget_name: String,
    pub infinite_scroll: bool,
    /// The list was copied from another one; stored ids belong to the source.
    pub is_list_cloned: bool,
    pub entity_definitions: EntityDefinitions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            level: 1,
            render_mode: RenderMode::Canvas,
            prefix_meta_widget_id: "meta".to_owned(),
            primary_widget_type: "LIST_WIDGET_V2".to_owned(),
            widget_name: "List1".to_owned(),
            infinite_scroll: false,
            is_list_cloned: false,
            entity_definitions: EntityDefinitions::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_meta_widget_id = prefix.into();
        self
    }

    pub fn with_widget_name(mut self, name: impl Into<String>) -> Self {
        self.widget_name = name.into();
        self
    }

    pub fn with_infinite_scroll(mut self, infinite_scroll: bool) -> Self {
        self.infinite_scroll = infinite_scroll;
        self
    }

    pub fn with_list_cloned(mut self, is_list_cloned: bool) -> Self {
        self.is_list_cloned = is_list_cloned;
        self
    }

    pub fn with_entity_definitions(mut self, definitions: EntityDefinitions) -> Self {
        self.entity_definitions = definitions;
        self
    }
}

/// Full snapshot handed to the generator on every state change.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorOptions {
    pub data: Vec<Value>,
    /// One key per record of `data`.
    pub primary_keys: Vec<RowKey>,
    /// 1-based.
    pub page_no: usize,
    pub page_size: usize,
    /// `data` holds only the current page.
    pub server_side_pagination: bool,
    pub infinite_scroll: bool,
    pub curr_template_widgets: TemplateTree,
    pub prev_template_widgets: TemplateTree,
    /// Canvas the row containers are mounted in.
    pub container_parent_id: WidgetId,
    /// Root of the row template.
    pub container_widget_id: WidgetId,
    pub item_spacing: f32,
    /// Layout boundary of the template row; not used for reconciliation.
    pub template_bottom_row: f32,
    pub level_data: Option<LevelData>,
    pub widget_name: String,
}

impl GeneratorOptions {
    pub fn new(
        widget_name: impl Into<String>,
        container_parent_id: impl Into<WidgetId>,
        container_widget_id: impl Into<WidgetId>,
        template: TemplateTree,
    ) -> Self {
        Self {
            data: Vec::new(),
            primary_keys: Vec::new(),
            page_no: 1,
            page_size: 1,
            server_side_pagination: false,
            infinite_scroll: false,
            curr_template_widgets: template,
            prev_template_widgets: TemplateTree::new(),
            container_parent_id: container_parent_id.into(),
            container_widget_id: container_widget_id.into(),
            item_spacing: 0.0,
            template_bottom_row: 0.0,
            level_data: None,
            widget_name: widget_name.into(),
        }
    }

    /// Sets the rows, keying each record by `key_field`.
    pub fn with_keyed_data(mut self, data: Vec<Value>, key_field: &str) -> Self {
        self.primary_keys = data
            .iter()
            .enumerate()
            .map(|(index, record)| match record.get(key_field) {
                Some(key) => RowKey::from_value(key),
                None => RowKey::from(index),
            })
            .collect();
        self.data = data;
        self
    }

    pub fn with_data(mut self, data: Vec<Value>, primary_keys: Vec<RowKey>) -> Self {
        self.data = data;
        self.primary_keys = primary_keys;
        self
    }

    pub fn with_page(mut self, page_no: usize, page_size: usize) -> Self {
        self.page_no = page_no;
        self.page_size = page_size;
        self
    }

    pub fn with_server_side_pagination(mut self, enabled: bool) -> Self {
        self.server_side_pagination = enabled;
        self
    }

    pub fn with_infinite_scroll(mut self, enabled: bool) -> Self {
        self.infinite_scroll = enabled;
        self
    }

    pub fn with_level_data(mut self, level_data: LevelData) -> Self {
        self.level_data = Some(level_data);
        self
    }

    pub fn with_item_spacing(mut self, item_spacing: f32) -> Self {
        self.item_spacing = item_spacing;
        self
    }

    /// Marks the current template as the baseline for the next pass.
    pub fn commit_template(&mut self) {
        self.prev_template_widgets = self.curr_template_widgets.clone();
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.page_size == 0 {
            return Err(GeneratorError::InvalidPageSize);
        }
        if self.page_no == 0 {
            return Err(GeneratorError::InvalidPageNo);
        }
        if self.primary_keys.len() != self.data.len() {
            return Err(GeneratorError::PrimaryKeyMismatch {
                keys: self.primary_keys.len(),
                rows: self.data.len(),
            });
        }
        Ok(())
    }

    /// Absolute index of the first row on the current page.
    pub fn start_index(&self, infinite_scroll: bool) -> usize {
        if infinite_scroll {
            return 0;
        }
        self.page_no.saturating_sub(1) * self.page_size
    }

    /// Indices into `data` of the rows in the rendered window.
    pub fn window(&self, infinite_scroll: bool) -> Range<usize> {
        let len = self.data.len();
        if infinite_scroll {
            return 0..len;
        }
        let start = if self.server_side_pagination {
            0
        } else {
            self.start_index(false).min(len)
        };
        start..(start + self.page_size).min(len)
    }
}
