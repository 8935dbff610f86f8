use anyhow::Result;
use log::debug;

mod shell;
mod utils;

use crate::shell::Shell;
use crate::utils::config::Config;
use crate::utils::log::init_logger;

fn main() -> Result<()> {
    let config = Config::new();
    init_logger(&config);
    debug!("config loaded, state under {}", config.config_dir.display());

    let interactive = atty::is(atty::Stream::Stdin);
    let mut shell = Shell::new(&config, interactive)?;
    shell.run()
}
