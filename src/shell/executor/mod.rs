#[allow(clippy::module_inception)]
mod executor;

pub use executor::{run, EXIT_FAILURE};
