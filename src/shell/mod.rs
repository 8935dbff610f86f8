mod executor;
pub mod history;
mod jobs;
mod parser;
mod readline;
#[allow(clippy::module_inception)]
mod shell;

pub use shell::Shell;
