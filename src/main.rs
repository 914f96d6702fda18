use clap::Parser;
use gtmerge::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::merge::merge,
    utils::util::{handle_error_and_exit, Result},
};
use std::time;

fn runner() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = init_verbose(&cli) {
        // No logger is installed yet.
        eprintln!("{e}");
        std::process::exit(1);
    }
    log::trace!("CLI options set: {:?}", cli);

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        &**FULL_VERSION,
        cli.command.name()
    );

    let start_timer = time::Instant::now();
    match cli.command {
        Command::Merge(args) => {
            log::trace!("Merge arguments: {:#?}", args);
            let metrics = merge(args)?;
            log::info!("Merge summary: {}", metrics);
        }
    }
    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
