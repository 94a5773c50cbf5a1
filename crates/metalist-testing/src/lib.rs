//! Fixtures and harness for exercising the meta widget generator.

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;

pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::harness::*;
}
