use metalist_core::{
    GenerateResult, GeneratorError, MemoryCacheStore, MetaWidgetGenerator, RenderMode,
};
use metalist_testing::{
    default_config, list_options, nested_list, sample_data, simple_list, NESTED_LIST,
};

fn report(step: &str, result: &GenerateResult) {
    println!(
        "{step}: {} generated, {} removed",
        result.meta_widgets.len(),
        result.removed_meta_widget_ids.len()
    );
    for widget in result.meta_widgets.values() {
        println!(
            "  row {:>2} {:<24} {:<12} {:?}",
            widget.row_index,
            widget.widget_name,
            widget.widget_id.as_str(),
            widget.prop("text").and_then(|text| text.as_binding())
        );
    }
}

fn paging(mode: RenderMode) -> Result<(), GeneratorError> {
    println!("--- {mode:?} mode ---");
    let store = MemoryCacheStore::new();
    let mut generator =
        MetaWidgetGenerator::new(default_config().with_render_mode(mode), store.clone());
    let mut options = list_options(&simple_list(), sample_data());

    report("page 1", &generator.with_options(options.clone()).generate()?);

    options.page_no = 2;
    report("page 2", &generator.with_options(options.clone()).generate()?);

    options.page_no = 1;
    report("page 1 again", &generator.with_options(options.clone()).generate()?);
    println!("containers: {:?}", generator.meta_containers().names);

    if let Some(snapshot) = store.snapshot() {
        match snapshot.to_json() {
            Ok(raw) => log::debug!("stored identities: {raw}"),
            Err(err) => log::warn!("identity snapshot not serializable: {err}"),
        }
    }
    Ok(())
}

fn nested() -> Result<(), GeneratorError> {
    println!("--- nested list ---");
    let mut generator = MetaWidgetGenerator::new(default_config(), MemoryCacheStore::new());
    let options = list_options(&nested_list(), sample_data());
    let result = generator.with_options(options).generate()?;
    report("outer", &result);

    if let Some(level_data) = result
        .meta_widgets
        .get(NESTED_LIST)
        .and_then(|widget| widget.level_data.as_ref())
    {
        match serde_json::to_string_pretty(level_data) {
            Ok(raw) => println!("context handed to {NESTED_LIST}:\n{raw}"),
            Err(err) => log::warn!("level data not serializable: {err}"),
        }
    }
    Ok(())
}

fn run() -> Result<(), GeneratorError> {
    paging(RenderMode::Canvas)?;
    paging(RenderMode::Page)?;
    nested()
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        log::error!("generation failed: {err}");
        std::process::exit(1);
    }
}
