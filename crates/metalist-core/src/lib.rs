#![doc = r"Meta widget generation for repeating list templates."]

pub mod binding;
pub mod collections;
pub mod entity;
pub mod error;
pub mod generator;
pub mod hash;
pub mod identity;
pub mod level;
pub mod meta_widget;
pub mod options;
pub mod row;
pub mod template;
pub mod walker;

pub use binding::{strip_mustache, BindingRewriter, CurrentItem, RowScope};
pub use entity::EntityDefinitions;
pub use error::GeneratorError;
pub use generator::{GenerateResult, MetaContainers, MetaWidgetGenerator, ScrollCallback, ScrollRange};
pub use identity::{CacheSnapshot, IdentityCache, MemoryCacheStore, SlotEntry, SlotKey, WidgetCacheStore};
pub use level::{
    build_level_data, level_key, parse_level_key, AutocompleteContext, LevelBinding, LevelData,
    LevelEntry, RowCacheEntry,
};
pub use meta_widget::{Capabilities, MetaWidget, ResizeHandle, PROJECTION_RESIZE_HANDLES};
pub use options::{GeneratorConfig, GeneratorOptions, RenderMode};
pub use row::{RowContext, RowKey};
pub use template::{template_tree, FieldValue, TemplateNode, TemplateTree, WidgetId};
pub use walker::{walk_template, TemplateWalk};
