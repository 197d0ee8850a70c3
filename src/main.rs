use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use resource_manager::cli::Cli;
use resource_manager::error::Error;
use resource_manager::io::loader;
use resource_manager::kernel::Driver;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(&cli) {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = cli.resolve_config()?;

    info!(path = %cli.program.display(), "loading program file");
    let program = loader::load_from_path(&cli.program)?;

    let driver = Driver::new(config);
    driver.start(program);

    Ok(())
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
