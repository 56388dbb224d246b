mod app;
mod config;
mod driver;
mod field;
mod glyph;
mod render;
mod rng;
mod stream;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    config::init_logging(args.log_file.as_deref())?;
    app::run(&args)
}
