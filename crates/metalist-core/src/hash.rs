use core::hash::Hash;
use std::hash::Hasher;

use serde_json::Value;

#[cfg(feature = "std-hash")]
pub mod default {
    pub use std::collections::hash_map::DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::new()
    }
}

#[cfg(not(feature = "std-hash"))]
pub mod default {
    pub use ahash::AHasher as DefaultHasher;

    #[inline]
    pub fn new() -> DefaultHasher {
        DefaultHasher::default()
    }
}

/// convenience: hash a single value with whichever default is active
#[inline]
pub fn hash_one<T: Hash + ?Sized>(v: &T) -> u64 {
    let mut h = default::new();
    v.hash(&mut h);
    h.finish()
}

/// Fingerprint of a row record. `Value` is not `Hash`, so the compact JSON
/// rendering stands in for it.
pub fn record_fingerprint(record: &Value) -> u64 {
    hash_one(record.to_string().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equal_records_share_a_fingerprint() {
        let a = json!({ "id": 1, "name": "Blue" });
        let b = json!({ "id": 1, "name": "Blue" });
        assert_eq!(record_fingerprint(&a), record_fingerprint(&b));
    }

    #[test]
    fn edited_record_changes_fingerprint() {
        let a = json!({ "id": 1, "name": "Blue" });
        let b = json!({ "id": 1, "name": "Navy" });
        assert_ne!(record_fingerprint(&a), record_fingerprint(&b));
    }
}
