//! Reconciliation of generated rows against the previous pass.
//!
//! A [`MetaWidgetGenerator`] is owned by one repeating list. Every call to
//! [`MetaWidgetGenerator::generate`] receives a full options snapshot, lays the
//! rendered window out as rows, and compares each row with the row rendered at
//! the same view index by the previous call:
//!
//! * A row whose context moved (key, index, record, editability) is rebuilt
//!   entirely.
//! * A row that stayed put only rebuilds the template widgets whose
//!   definition changed, plus its container when the row's shape changed.
//! * Instances rendered before and absent now are reported as removed, and
//!   their identity slots are released for later passes.
//!
//! Nested lists are not expanded here. Their instance carries the ancestor
//! context a generator one level deeper needs.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::binding::{BindingRewriter, CurrentItem, RowScope};
use crate::collections::map::HashSet;
use crate::collections::IdSet;
use crate::error::GeneratorError;
use crate::hash::{hash_one, record_fingerprint};
use crate::identity::{IdentityCache, SlotKey, WidgetCacheStore};
use crate::level::{
    build_level_data, view_literal, AutocompleteContext, LevelBinding, LevelData, LevelEntry,
    RowCacheEntry,
};
use crate::meta_widget::{Capabilities, MetaWidget, PROJECTION_RESIZE_HANDLES};
use crate::options::{GeneratorConfig, GeneratorOptions, RenderMode};
use crate::row::{RowContext, RowKey};
use crate::template::{FieldValue, TemplateNode, TemplateTree, WidgetId};
use crate::walker::{walk_template, TemplateWalk};

/// Rows covered by an infinite-scroll pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRange {
    pub start_index: usize,
    pub stop_index: usize,
}

pub type ScrollCallback = Box<dyn FnMut(ScrollRange) + Send>;

/// Output of one generation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateResult {
    /// Instances created or rebuilt by this pass, keyed by instance id.
    pub meta_widgets: IndexMap<WidgetId, MetaWidget>,
    /// Instances rendered by the previous pass that are gone now.
    pub removed_meta_widget_ids: Vec<WidgetId>,
}

impl GenerateResult {
    pub fn is_empty(&self) -> bool {
        self.meta_widgets.is_empty() && self.removed_meta_widget_ids.is_empty()
    }
}

/// Row containers of the rendered window, in view order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaContainers {
    pub ids: Vec<WidgetId>,
    pub names: Vec<String>,
}

#[derive(Debug, Clone)]
struct RenderedRow {
    context: RowContext,
    fingerprint: u64,
    canonical: bool,
    slots: Vec<SlotKey>,
    instance_ids: Vec<WidgetId>,
    container_id: WidgetId,
    container_name: String,
}

/// What the next pass compares against.
#[derive(Debug, Clone)]
struct PreviousPass {
    page_no: usize,
    list_name: String,
    level_data: Option<LevelData>,
    container_parent_id: WidgetId,
    container_widget_id: WidgetId,
    template: TemplateTree,
    walk: TemplateWalk,
    shape: u64,
    rows: Vec<RenderedRow>,
}

/// Identity of one template widget in one row.
#[derive(Debug, Clone)]
struct PlannedSlot {
    key: SlotKey,
    slot_id: WidgetId,
    instance_id: WidgetId,
    name: String,
}

/// Ids and names of every widget of a row, fixed before any instance is
/// built so parents, children and sibling bindings can point at each other.
#[derive(Debug)]
struct RowPlan {
    slots: IndexMap<WidgetId, PlannedSlot>,
    names: IndexMap<String, String>,
    view: String,
}

impl RowPlan {
    fn instance_id(&self, template_id: &WidgetId) -> Option<&WidgetId> {
        self.slots.get(template_id).map(|slot| &slot.instance_id)
    }
}

/// Per-call inputs shared by every row.
struct Pass<'a> {
    config: &'a GeneratorConfig,
    options: &'a GeneratorOptions,
    walk: &'a TemplateWalk,
    list_name: &'a str,
    ancestor_levels: IndexMap<String, LevelBinding>,
}

impl<'a> Pass<'a> {
    fn node(&self, id: &WidgetId) -> Option<&'a TemplateNode> {
        self.options.curr_template_widgets.get(id)
    }

    fn plan(&self, identity: &mut IdentityCache, row: &RowContext, canonical: bool) -> RowPlan {
        let mut slots = IndexMap::with_capacity(self.walk.len());
        let mut names = IndexMap::with_capacity(self.walk.len());

        for id in &self.walk.order {
            let Some(node) = self.node(id) else { continue };
            let key = SlotKey::new(row.key.clone(), id.clone());
            let slot_id = identity.acquire(&key);
            let (instance_id, name) = if canonical {
                (id.clone(), node.name.clone())
            } else {
                (slot_id.clone(), format!("{}_{}", node.name, slot_id))
            };
            names.insert(node.name.clone(), name.clone());
            slots.insert(
                id.clone(),
                PlannedSlot {
                    key,
                    slot_id,
                    instance_id,
                    name,
                },
            );
        }

        // The row container exposes the view, so it is not part of it.
        let definitions: Vec<(&str, String)> = slots
            .iter()
            .filter(|(id, _)| self.walk.root() != Some(*id))
            .filter_map(|(id, slot)| {
                let node = self.node(id)?;
                let definition = self
                    .config
                    .entity_definitions
                    .definition(&node.kind, &slot.name);
                (!definition.is_empty()).then_some((node.name.as_str(), definition))
            })
            .collect();
        let view = view_literal(definitions.iter().map(|(name, def)| (*name, def.as_str())));

        RowPlan { slots, names, view }
    }

    fn current_item<'r>(&self, row: &RowContext, record: &'r Value, canonical: bool) -> CurrentItem<'r>
    where
        'a: 'r,
    {
        if canonical {
            CurrentItem::Literal(record)
        } else {
            CurrentItem::Indexed {
                list_name: self.list_name,
                data_index: row.data_index,
            }
        }
    }

    /// Context handed to the nested lists of this row.
    fn nested_level_data(&self, plan: &RowPlan, row: &RowContext, record: &Value) -> LevelData {
        let row_cache = plan
            .slots
            .iter()
            .filter_map(|(id, slot)| {
                let node = self.node(id)?;
                let entry = RowCacheEntry {
                    entity_definition: self
                        .config
                        .entity_definitions
                        .definition(&node.kind, &slot.name),
                    row_index: row.row_index,
                    view_index: row.view_index,
                    meta_widget_id: slot.instance_id.clone(),
                    meta_widget_name: slot.name.clone(),
                    template_widget_id: id.clone(),
                    template_widget_name: node.name.clone(),
                    kind: node.kind.clone(),
                };
                Some((node.name.clone(), entry))
            })
            .collect();
        let entry = LevelEntry::new(
            row,
            format!("{{{{{}.listData[{}]}}}}", self.list_name, row.data_index),
            row_cache,
            AutocompleteContext {
                current_item: record.clone(),
                current_view: container_view(plan, self.walk),
            },
        );
        build_level_data(self.options.level_data.as_ref(), self.config.level, entry)
    }

    /// Builds the instances of `row` for the template widgets in `only`, or
    /// for every widget of the walk.
    fn render_row(
        &self,
        plan: &RowPlan,
        row: &RowContext,
        record: &Value,
        canonical: bool,
        only: Option<&IdSet<'_>>,
    ) -> Vec<MetaWidget> {
        let item = self.current_item(row, record, canonical);
        let rewriter = BindingRewriter::new(RowScope {
            row,
            current_item: item,
            names: &plan.names,
            view: &plan.view,
            levels: self.options.level_data.as_ref(),
        });
        let nested = (!self.walk.stops.is_empty())
            .then(|| self.nested_level_data(plan, row, record));
        let current_view = FieldValue::Binding(container_view(plan, self.walk));
        let root = self.walk.root();

        let mut widgets = Vec::new();
        for (id, slot) in &plan.slots {
            if only.is_some_and(|only| !only.contains(id)) {
                continue;
            }
            let Some(node) = self.node(id) else { continue };
            let is_root = root == Some(id);
            let is_stop = self.walk.is_stop(id);

            let parent_id = if is_root {
                Some(self.options.container_parent_id.clone())
            } else {
                node.parent_id
                    .as_ref()
                    .map(|parent| plan.instance_id(parent).unwrap_or(parent).clone())
            };
            let children = if is_stop {
                node.children.clone()
            } else {
                node.children
                    .iter()
                    .filter_map(|child| plan.instance_id(child).cloned())
                    .collect()
            };

            let mut props: IndexMap<String, FieldValue> = node
                .props
                .iter()
                .map(|(key, value)| (key.clone(), rewriter.rewrite_field(value)))
                .collect();
            if is_root {
                props.insert(
                    "data".to_owned(),
                    FieldValue::Binding(format!("{{{{ {} }}}}", plan.view)),
                );
            }

            let (capabilities, disabled_resize_handles) = if canonical {
                let caps = if is_root {
                    Capabilities::DRAG_DISABLED
                } else {
                    Capabilities::empty()
                };
                (caps, Vec::new())
            } else {
                (Capabilities::PROJECTION, PROJECTION_RESIZE_HANDLES.to_vec())
            };

            widgets.push(MetaWidget {
                widget_id: slot.instance_id.clone(),
                meta_widget_id: slot.slot_id.clone(),
                widget_name: slot.name.clone(),
                template_widget_id: id.clone(),
                template_widget_name: node.name.clone(),
                kind: node.kind.clone(),
                parent_id,
                children,
                row_index: row.row_index,
                view_index: row.view_index,
                current_item: item.to_field(),
                current_view: current_view.clone(),
                ancestor_levels: self.ancestor_levels.clone(),
                props,
                capabilities,
                disabled_resize_handles,
                level: if is_stop {
                    self.config.level + 1
                } else {
                    self.config.level
                },
                level_data: if is_stop { nested.clone() } else { None },
                prefix_meta_widget_id: is_stop.then(|| slot.slot_id.clone()),
            });
        }
        widgets
    }
}

/// `{{<container>.data}}`: the row view as read from the row container.
fn container_view(plan: &RowPlan, walk: &TemplateWalk) -> String {
    let name = walk
        .root()
        .and_then(|root| plan.slots.get(root))
        .map(|slot| slot.name.as_str())
        .unwrap_or_default();
    format!("{{{{{name}.data}}}}")
}

/// Fingerprint of the walk's node ids, names and kinds; the row view depends
/// on exactly these.
fn walk_shape(tree: &TemplateTree, walk: &TemplateWalk) -> u64 {
    let signature: Vec<(&str, &str, &str)> = walk
        .order
        .iter()
        .filter_map(|id| tree.get(id))
        .map(|node| (node.id.as_str(), node.name.as_str(), node.kind.as_str()))
        .collect();
    hash_one(&signature)
}

/// Materializes and reconciles the rows of one repeating list.
pub struct MetaWidgetGenerator {
    config: GeneratorConfig,
    store: Box<dyn WidgetCacheStore>,
    identity: IdentityCache,
    options: Option<GeneratorOptions>,
    previous: Option<PreviousPass>,
    on_virtual_list_scroll: Option<ScrollCallback>,
}

impl fmt::Debug for MetaWidgetGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaWidgetGenerator")
            .field("config", &self.config)
            .field("identity", &self.identity)
            .field("has_options", &self.options.is_some())
            .field(
                "rendered_rows",
                &self.previous.as_ref().map_or(0, |prev| prev.rows.len()),
            )
            .field("has_scroll_callback", &self.on_virtual_list_scroll.is_some())
            .finish()
    }
}

impl MetaWidgetGenerator {
    /// Creates a generator, restoring identities from `store` unless the list
    /// is a copy of another one.
    pub fn new(config: GeneratorConfig, store: impl WidgetCacheStore) -> Self {
        let prefix = config.prefix_meta_widget_id.clone();
        let identity = match store.load() {
            Some(_) if config.is_list_cloned => {
                log::debug!(
                    "{}: cloned list, ignoring stored identities",
                    config.widget_name
                );
                IdentityCache::new(prefix)
            }
            Some(snapshot) => IdentityCache::from_snapshot(prefix, snapshot),
            None => IdentityCache::new(prefix),
        };
        Self {
            config,
            store: Box::new(store),
            identity,
            options: None,
            previous: None,
            on_virtual_list_scroll: None,
        }
    }

    /// Registers the callback told which rows an infinite-scroll pass covers.
    pub fn with_virtual_list_scroll<F>(mut self, callback: F) -> Self
    where
        F: FnMut(ScrollRange) + Send + 'static,
    {
        self.on_virtual_list_scroll = Some(Box::new(callback));
        self
    }

    /// Replaces the options used by the next [`generate`](Self::generate).
    pub fn with_options(&mut self, options: GeneratorOptions) -> &mut Self {
        self.options = Some(options);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn options(&self) -> Option<&GeneratorOptions> {
        self.options.as_ref()
    }

    pub fn identity(&self) -> &IdentityCache {
        &self.identity
    }

    fn infinite_scroll(&self, options: &GeneratorOptions) -> bool {
        self.config.infinite_scroll || options.infinite_scroll
    }

    /// Reconciles the current options against the previous pass.
    pub fn generate(&mut self) -> Result<GenerateResult, GeneratorError> {
        let options = self.options.as_ref().ok_or(GeneratorError::MissingOptions)?;
        options.validate()?;

        let infinite = self.infinite_scroll(options);
        let primary_widget_type = self.config.primary_widget_type.as_str();
        let walk = walk_template(
            &options.curr_template_widgets,
            &options.container_widget_id,
            |node| node.kind == primary_widget_type,
        );
        let shape = walk_shape(&options.curr_template_widgets, &walk);
        let list_name = if options.widget_name.is_empty() {
            self.config.widget_name.as_str()
        } else {
            options.widget_name.as_str()
        };

        let previous = self.previous.as_ref();
        let reset = previous.map_or(true, |prev| {
            (!infinite && prev.page_no != options.page_no)
                || prev.list_name != list_name
                || prev.level_data != options.level_data
                || prev.container_parent_id != options.container_parent_id
                || prev.container_widget_id != options.container_widget_id
        });
        let shape_changed = previous.map_or(true, |prev| prev.shape != shape);
        let changed: IdSet<'_> = match previous {
            None => walk.order.iter().collect(),
            Some(prev) => {
                if !options.prev_template_widgets.is_empty()
                    && options.prev_template_widgets != prev.template
                {
                    log::trace!("{list_name}: comparing against the last rendered template");
                }
                walk.order
                    .iter()
                    .filter(|id| {
                        !prev.walk.contains(id)
                            || prev.template.get(*id) != options.curr_template_widgets.get(*id)
                    })
                    .collect()
            }
        };
        let mut patch = changed.clone();
        if shape_changed {
            if let Some(root) = walk.root() {
                patch.insert(root);
            }
        }

        let pass = Pass {
            config: &self.config,
            options,
            walk: &walk,
            list_name,
            ancestor_levels: options
                .level_data
                .as_ref()
                .map(LevelData::bindings)
                .unwrap_or_default(),
        };

        // Without a row container there is nothing to render; the rows of the
        // previous pass are reported as removed.
        let window = if walk.is_empty() {
            0..0
        } else {
            options.window(infinite)
        };
        let start = options.start_index(infinite);
        let mut seen: HashSet<RowKey> = HashSet::new();
        let mut rows = Vec::with_capacity(window.len());
        let mut meta_widgets = IndexMap::new();
        let mut rebuilt_rows = 0usize;

        for (view_index, data_index) in window.enumerate() {
            let mut key = options.primary_keys[data_index].clone();
            if !seen.insert(key.clone()) {
                log::warn!("{list_name}: duplicate primary key {key} at view index {view_index}");
                let original = key;
                let mut attempt = 0usize;
                // A rekeyed row must not take over the slots of a real key.
                key = loop {
                    let candidate = if attempt == 0 {
                        RowKey::new(format!("{original}#{view_index}"))
                    } else {
                        RowKey::new(format!("{original}#{view_index}.{attempt}"))
                    };
                    if seen.insert(candidate.clone()) {
                        break candidate;
                    }
                    attempt += 1;
                };
            }
            let context = RowContext::new(start + view_index, view_index, data_index, key);
            let record = &options.data[data_index];
            let fingerprint = record_fingerprint(record);
            let canonical = self.config.render_mode == RenderMode::Canvas && view_index == 0;

            let prior = previous.and_then(|prev| prev.rows.get(view_index));
            let rebuild = reset
                || prior.map_or(true, |prior| {
                    prior.context != context
                        || prior.fingerprint != fingerprint
                        || prior.canonical != canonical
                });

            let plan = pass.plan(&mut self.identity, &context, canonical);
            let widgets = if rebuild {
                rebuilt_rows += 1;
                log::trace!("{list_name}: rebuilding row {} ({})", context.row_index, context.key);
                pass.render_row(&plan, &context, record, canonical, None)
            } else if patch.is_empty() {
                Vec::new()
            } else {
                pass.render_row(&plan, &context, record, canonical, Some(&patch))
            };
            for widget in widgets {
                meta_widgets.insert(widget.widget_id.clone(), widget);
            }

            let (container_id, container_name) = walk
                .root()
                .and_then(|root| plan.slots.get(root))
                .map(|slot| (slot.slot_id.clone(), slot.name.clone()))
                .unwrap_or_else(|| (options.container_widget_id.clone(), String::new()));
            rows.push(RenderedRow {
                context,
                fingerprint,
                canonical,
                slots: plan.slots.values().map(|slot| slot.key.clone()).collect(),
                instance_ids: plan.slots.values().map(|slot| slot.instance_id.clone()).collect(),
                container_id,
                container_name,
            });
        }

        let mut removed_meta_widget_ids = Vec::new();
        if let Some(prev) = previous {
            let live_ids: IdSet<'_> =
                rows.iter().flat_map(|row| row.instance_ids.iter()).collect();
            let live_slots: HashSet<&SlotKey> = rows.iter().flat_map(|row| row.slots.iter()).collect();
            let mut reported = IdSet::new();

            for row in &prev.rows {
                for id in &row.instance_ids {
                    if !live_ids.contains(id) && reported.insert(id) {
                        removed_meta_widget_ids.push(id.clone());
                    }
                }
                for slot in &row.slots {
                    if !live_slots.contains(slot) {
                        self.identity.release(slot);
                    }
                }
            }
        }

        log::debug!(
            "{list_name}: {} rows ({} rebuilt, reset: {reset}, template changes: {}), {} generated, {} removed",
            rows.len(),
            rebuilt_rows,
            changed.len(),
            meta_widgets.len(),
            removed_meta_widget_ids.len()
        );

        let scroll = ScrollRange {
            start_index: start,
            stop_index: start + rows.len(),
        };
        let next = PreviousPass {
            page_no: options.page_no,
            list_name: list_name.to_owned(),
            level_data: options.level_data.clone(),
            container_parent_id: options.container_parent_id.clone(),
            container_widget_id: options.container_widget_id.clone(),
            template: options.curr_template_widgets.clone(),
            walk: walk.clone(),
            shape,
            rows,
        };
        self.previous = Some(next);
        self.store.save(self.identity.snapshot());

        if infinite {
            if let Some(callback) = self.on_virtual_list_scroll.as_mut() {
                callback(scroll);
            }
        }

        Ok(GenerateResult {
            meta_widgets,
            removed_meta_widget_ids,
        })
    }

    /// Absolute index of the first row on the current page.
    pub fn start_index(&self) -> Result<usize, GeneratorError> {
        let options = self.options.as_ref().ok_or(GeneratorError::MissingOptions)?;
        Ok(options.start_index(self.infinite_scroll(options)))
    }

    /// Row containers rendered by the last pass.
    pub fn meta_containers(&self) -> MetaContainers {
        let mut containers = MetaContainers::default();
        for row in self.previous.iter().flat_map(|prev| prev.rows.iter()) {
            containers.ids.push(row.container_id.clone());
            containers.names.push(row.container_name.clone());
        }
        containers
    }

    /// Every instance id mounted after the last pass, in row order.
    pub fn rendered_instance_ids(&self) -> Vec<WidgetId> {
        self.previous
            .iter()
            .flat_map(|prev| prev.rows.iter())
            .flat_map(|row| row.instance_ids.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/generator_tests.rs"]
mod tests;
