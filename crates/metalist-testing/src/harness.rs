//! Drives a generator the way a list widget does: build, generate once,
//! then feed it edited options.

use indexmap::IndexMap;
use metalist_core::{
    GenerateResult, GeneratorConfig, GeneratorOptions, MemoryCacheStore, MetaWidgetGenerator,
};

use crate::fixtures::{keys_of, sample_data, simple_list, ListInput};

pub const PREFIX: &str = "test";

/// Canvas mode, level 1, ids minted under [`PREFIX`].
pub fn default_config() -> GeneratorConfig {
    GeneratorConfig::default()
        .with_prefix(PREFIX)
        .with_widget_name("List1")
}

/// Options of a list showing `input` over `data`, two rows per page.
pub fn list_options(input: &ListInput, data: Vec<serde_json::Value>) -> GeneratorOptions {
    let keys = keys_of(&data);
    let mut options = GeneratorOptions::new(
        "List1",
        input.container_parent_id.clone(),
        input.main_container_id.clone(),
        input.template_widgets.clone(),
    )
    .with_data(data, keys)
    .with_page(1, 2)
    .with_item_spacing(8.0);
    options.template_bottom_row = 12.0;
    options
}

/// The simple list over the sample data.
pub fn default_options() -> GeneratorOptions {
    list_options(&simple_list(), sample_data())
}

pub struct Harness {
    pub generator: MetaWidgetGenerator,
    pub options: GeneratorOptions,
    pub store: MemoryCacheStore,
    pub initial: GenerateResult,
}

impl Harness {
    /// Default config and options.
    pub fn init() -> Self {
        Self::with(default_config(), default_options())
    }

    /// Builds a generator, runs the first pass and marks its template as
    /// rendered.
    pub fn with(config: GeneratorConfig, options: GeneratorOptions) -> Self {
        let store = MemoryCacheStore::new();
        let mut generator = MetaWidgetGenerator::new(config, store.clone());
        let initial = generator
            .with_options(options.clone())
            .generate()
            .unwrap_or_else(|err| panic!("initial generation failed: {err}"));

        let mut options = options;
        options.commit_template();

        Self {
            generator,
            options,
            store,
            initial,
        }
    }

    /// Runs a pass with the harness's current options.
    pub fn generate(&mut self) -> GenerateResult {
        self.generate_with(self.options.clone())
    }

    /// Runs a pass with `options`, leaving the harness's options untouched.
    pub fn generate_with(&mut self, options: GeneratorOptions) -> GenerateResult {
        self.generator
            .with_options(options)
            .generate()
            .unwrap_or_else(|err| panic!("generation failed: {err}"))
    }
}

/// Number of generated widgets per kind.
pub fn count_kinds(result: &GenerateResult) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for widget in result.meta_widgets.values() {
        *counts.entry(widget.kind.clone()).or_insert(0) += 1;
    }
    counts
}

/// Asserts that `result` generated exactly `expected` widgets per kind.
#[track_caller]
pub fn assert_kinds(result: &GenerateResult, expected: &[(&str, usize)]) {
    let counts = count_kinds(result);
    let total: usize = expected.iter().map(|(_, count)| count).sum();
    assert_eq!(
        result.meta_widgets.len(),
        total,
        "generated kinds: {counts:?}"
    );
    for (kind, count) in expected {
        assert_eq!(
            counts.get(*kind).copied().unwrap_or(0),
            *count,
            "count of {kind}, generated kinds: {counts:?}"
        );
    }
}

/// Kinds of a full row of the simple list, times `rows`.
pub fn simple_row_kinds(rows: usize) -> [(&'static str, usize); 5] {
    [
        ("CANVAS_WIDGET", rows),
        ("CONTAINER_WIDGET", rows),
        ("IMAGE_WIDGET", rows),
        ("TEXT_WIDGET", 2 * rows),
        ("INPUT_WIDGET_V2", rows),
    ]
}
