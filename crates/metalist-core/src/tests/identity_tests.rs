use super::*;

fn slot(row: &str, template: &str) -> SlotKey {
    SlotKey::new(RowKey::from(row), WidgetId::from(template))
}

#[test]
fn exact_slot_wins() {
    let mut cache = IdentityCache::new("test");
    let first = cache.acquire(&slot("1", "text"));
    let again = cache.acquire(&slot("1", "text"));
    assert_eq!(first, again);
    assert_eq!(first.as_str(), "test_1");
    assert_eq!(cache.minted(), 1);
}

#[test]
fn distinct_slots_get_distinct_ids() {
    let mut cache = IdentityCache::new("test");
    let a = cache.acquire(&slot("1", "text"));
    let b = cache.acquire(&slot("2", "text"));
    let c = cache.acquire(&slot("1", "image"));
    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_ne!(b, c);
    assert_eq!(cache.slot_count(), 3);
}

#[test]
fn released_ids_are_recycled_oldest_first() {
    let mut cache = IdentityCache::new("test");
    let a = cache.acquire(&slot("1", "text"));
    let b = cache.acquire(&slot("2", "text"));

    assert_eq!(cache.release(&slot("1", "text")), Some(a.clone()));
    assert_eq!(cache.release(&slot("2", "text")), Some(b.clone()));
    assert_eq!(cache.released_count(), 2);

    assert_eq!(cache.acquire(&slot("3", "text")), a);
    assert_eq!(cache.acquire(&slot("4", "text")), b);
    assert_eq!(cache.minted(), 2);
    assert_eq!(cache.released_count(), 0);
}

#[test]
fn recycling_never_crosses_templates() {
    let mut cache = IdentityCache::new("test");
    let text = cache.acquire(&slot("1", "text"));
    cache.release(&slot("1", "text"));

    let image = cache.acquire(&slot("1", "image"));
    assert_ne!(text, image);
    assert_eq!(cache.released_count(), 1);
}

#[test]
fn release_of_unknown_slot_is_a_no_op() {
    let mut cache = IdentityCache::new("test");
    assert_eq!(cache.release(&slot("9", "text")), None);
    assert_eq!(cache.released_count(), 0);
}

#[test]
fn set_pins_an_external_id() {
    let mut cache = IdentityCache::new("test");
    assert_eq!(cache.set(slot("1", "text"), WidgetId::from("external")), None);
    assert_eq!(cache.get(&slot("1", "text")).map(WidgetId::as_str), Some("external"));
    assert_eq!(cache.acquire(&slot("1", "text")).as_str(), "external");
    assert_eq!(cache.minted(), 0);
}

#[test]
fn snapshot_restores_slots_pool_and_sequence() {
    let mut cache = IdentityCache::new("test");
    cache.acquire(&slot("1", "text"));
    cache.acquire(&slot("2", "text"));
    cache.release(&slot("2", "text"));

    let json = cache.snapshot().to_json().expect("snapshot serializes");
    let snapshot = CacheSnapshot::from_json(&json).expect("snapshot parses");
    let mut restored = IdentityCache::from_snapshot("test", snapshot);

    assert_eq!(restored.get(&slot("1", "text")).map(WidgetId::as_str), Some("test_1"));
    assert_eq!(restored.acquire(&slot("5", "text")).as_str(), "test_2");
    assert_eq!(restored.acquire(&slot("6", "text")).as_str(), "test_3");
}

#[test]
fn memory_store_clones_share_contents() {
    let store = MemoryCacheStore::new();
    let mut writer = store.clone();
    assert!(store.load().is_none());

    let mut cache = IdentityCache::new("test");
    cache.acquire(&slot("1", "text"));
    writer.save(cache.snapshot());

    let loaded = store.load().expect("saved snapshot visible through clone");
    assert_eq!(loaded.slots.len(), 1);
    assert_eq!(loaded.next_seq, 1);
}
