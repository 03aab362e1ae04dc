use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = snowfall::config::Config::parse();
    snowfall::logging::init(cfg.log_file.as_deref())?;
    snowfall::app::run(cfg)
}
