//! Set types used for per-pass bookkeeping. The `std-hash` feature swaps
//! hashbrown for the standard library sets.

use crate::template::WidgetId;

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::HashSet;
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use hashbrown::HashSet;
}

/// Borrowed widget ids seen during one pass.
pub type IdSet<'a> = map::HashSet<&'a WidgetId>;
