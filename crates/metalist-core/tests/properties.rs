//! Property tests for reconciliation and identity recycling.

use std::collections::BTreeSet;

use metalist_core::{IdentityCache, RenderMode, RowKey, SlotKey, WidgetId};
use metalist_testing::prelude::*;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Widgets per row of the simple list.
const ROW_WIDGETS: usize = 6;

fn records_strategy() -> impl Strategy<Value = Vec<Value>> {
    proptest::collection::vec(
        prop_oneof![Just("Blue"), Just("Pink"), Just("Black"), Just("White")],
        0..=12,
    )
    .prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(id, name)| json!({ "id": id, "name": name }))
            .collect()
    })
}

fn mode_strategy() -> impl Strategy<Value = RenderMode> {
    prop_oneof![Just(RenderMode::Canvas), Just(RenderMode::Page)]
}

fn options(data: Vec<Value>, page_no: usize, page_size: usize) -> metalist_core::GeneratorOptions {
    list_options(&simple_list(), data).with_page(page_no, page_size)
}

fn rows_on_page(len: usize, page_no: usize, page_size: usize) -> usize {
    let start = ((page_no - 1) * page_size).min(len);
    (start + page_size).min(len) - start
}

proptest! {
    #[test]
    fn repeated_options_generate_nothing(
        data in records_strategy(),
        page_no in 1usize..=4,
        page_size in 1usize..=5,
        mode in mode_strategy(),
    ) {
        let mut harness = Harness::with(
            default_config().with_render_mode(mode),
            options(data, page_no, page_size),
        );
        let again = harness.generate();
        prop_assert!(again.is_empty(), "second pass produced {:?}", again);
    }

    #[test]
    fn first_pass_materializes_every_row(
        data in records_strategy(),
        page_no in 1usize..=4,
        page_size in 1usize..=5,
        mode in mode_strategy(),
    ) {
        let rows = rows_on_page(data.len(), page_no, page_size);
        let harness = Harness::with(
            default_config().with_render_mode(mode),
            options(data, page_no, page_size),
        );
        prop_assert_eq!(harness.initial.meta_widgets.len(), rows * ROW_WIDGETS);
        prop_assert!(harness.initial.removed_meta_widget_ids.is_empty());
    }

    #[test]
    fn only_the_first_canvas_row_keeps_template_ids(
        data in records_strategy(),
        page_no in 1usize..=4,
        page_size in 1usize..=5,
        mode in mode_strategy(),
    ) {
        let harness = Harness::with(
            default_config().with_render_mode(mode),
            options(data, page_no, page_size),
        );
        for widget in harness.initial.meta_widgets.values() {
            let canonical = mode == RenderMode::Canvas && widget.view_index == 0;
            prop_assert_eq!(widget.is_canonical(), canonical);
            prop_assert_eq!(widget.widget_id == widget.template_widget_id, canonical);
        }
    }

    #[test]
    fn page_changes_never_report_live_instances(
        data in records_strategy(),
        pages in proptest::collection::vec(1usize..=4, 1..6),
        page_size in 1usize..=4,
        mode in mode_strategy(),
    ) {
        let mut harness = Harness::with(
            default_config().with_render_mode(mode),
            options(data, 1, page_size),
        );
        for page_no in pages {
            harness.options.page_no = page_no;
            let result = harness.generate();
            let live: BTreeSet<WidgetId> =
                harness.generator.rendered_instance_ids().into_iter().collect();
            prop_assert_eq!(live.len(), harness.generator.rendered_instance_ids().len());
            for removed in &result.removed_meta_widget_ids {
                prop_assert!(!live.contains(removed), "{} removed while live", removed);
            }
            for generated in result.meta_widgets.keys() {
                prop_assert!(live.contains(generated));
            }
        }
    }

    #[test]
    fn recycled_ids_never_exceed_peak_usage(
        ops in proptest::collection::vec((any::<bool>(), 0usize..16), 1..64),
    ) {
        let template = WidgetId::from("text");
        let mut cache = IdentityCache::new("meta");
        let mut live: BTreeSet<usize> = BTreeSet::new();
        let mut peak = 0usize;

        for (acquire, row) in ops {
            let key = SlotKey::new(RowKey::from(row), template.clone());
            if acquire {
                let id = cache.acquire(&key);
                prop_assert_eq!(cache.acquire(&key), id);
                live.insert(row);
                peak = peak.max(live.len());
            } else if live.remove(&row) {
                prop_assert!(cache.release(&key).is_some());
            } else {
                prop_assert!(cache.release(&key).is_none());
            }

            let ids: BTreeSet<WidgetId> = live
                .iter()
                .filter_map(|row| cache.get(&SlotKey::new(RowKey::from(*row), template.clone())).cloned())
                .collect();
            prop_assert_eq!(ids.len(), live.len());
        }

        prop_assert_eq!(cache.minted(), peak as u64);
    }
}
