use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cfg = storm_show::config::Config::parse();
    if cfg.list_devices {
        storm_show::audio::list_input_devices()?;
        return Ok(());
    }

    storm_show::app::run(cfg)
}
