use clap::Parser;
use log::{debug, LevelFilter};

mod args;
mod cli;

fn main() {
    let args = args::Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();
    debug!("args: {:?}", args);

    if let Err(e) = cli::run(&args) {
        cli::report_error(&e);
        std::process::exit(1);
    }
}
