//! Posture agent entrypoint. Runs an immediate check at startup, then repeats
//! on a fixed interval; `--once` performs a single cycle and exits with a
//! status reflecting delivery success.

use clap::Parser;
use posture_agent::{
    config::AgentConfig, identity::IdentityStore, logging::StructuredLogger, platform::HostOs,
    report::ReportBuilder, reporter::Reporter, scheduler::Scheduler,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "posture-agent", version, about = "Endpoint security posture reporting agent")]
struct Cli {
    /// API endpoint URL (overrides config file)
    #[arg(long)]
    api: Option<String>,
    /// Check interval in seconds (overrides config file)
    #[arg(long)]
    interval: Option<u64>,
    /// Run a single check cycle and exit
    #[arg(long)]
    once: bool,
    /// Path to config file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut config = AgentConfig::load(&cli.config);
    if let Some(api) = cli.api {
        config.api_endpoint = api;
    }
    if let Some(interval) = cli.interval {
        config.check_interval_secs = interval;
    }

    StructuredLogger::init(config.log.json, &config.log.level);

    let os = HostOs::detect();
    let identity = IdentityStore::new(IdentityStore::default_path());
    let builder = ReportBuilder::new(&identity, os);
    let reporter = Reporter::new(config.api_endpoint.clone(), os)?;

    info!(
        endpoint = %config.api_endpoint,
        interval_secs = config.check_interval_secs,
        machine_id = %builder.machine_id(),
        "posture agent starting"
    );

    let mut scheduler = Scheduler::new(builder, reporter, config.check_interval_secs);

    if cli.once {
        scheduler.run_cycle()?;
        info!("single check cycle complete");
        return Ok(());
    }

    info!("daemon mode (Ctrl+C to stop)");
    static STOP: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);
    let _ = ctrlc::set_handler(|| {
        STOP.store(true, std::sync::atomic::Ordering::Relaxed);
    });
    scheduler.run(&STOP);
    info!("posture agent stopping");

    Ok(())
}
