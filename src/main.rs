mod args;
mod optpr;

use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

fn main() {
    let args = args::Args::parse();

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
    debug!("args: {:?}", args);

    if let Err(e) = optpr::run(&args) {
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("{}", bt);
        }
        std::process::exit(1);
    }
}
