//! Scaffolding for tests that run against a real or mocked File service
//!
//! Credentials come from the environment, resource names are generated per
//! test, and the `create_new_*` helpers fail the calling test on any error.

mod account;
mod assertions;
mod names;
mod resources;

pub use account::*;
pub use assertions::*;
pub use names::*;
pub use resources::*;
