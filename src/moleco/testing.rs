//! Testing utilities
//!
//! Reference identifiers and tree factories shared by unit and integration tests.
//!
//! Use the [fixtures] rather than writing mixture identifiers inline: real MInChI strings
//! are long and easy to get subtly wrong, and a typo usually produces a different but still
//! valid mixture, so the test passes against the wrong input. The fixtures are copied from
//! published examples and have been checked by hand.
//!
//! The [factories] build trees directly, for tests of the later stages that should not
//! depend on the notation at all:
//!
//! ```rust-example
//! use moleco::moleco::testing::factories::{group, leaf, table};
//!
//! let components = table(&["A", "B", "C"]);
//! let root = group(vec![leaf(0, "60wf-2"), group(vec![leaf(1, ""), leaf(2, "")], "")], "");
//! ```

mod testing_factories;
mod testing_fixtures;

// Public submodule path: crate::moleco::testing::factories
pub mod factories {
    pub use super::testing_factories::*;
}

// Public submodule path: crate::moleco::testing::fixtures
pub mod fixtures {
    pub use super::testing_fixtures::*;
}
