use clap::Parser;
use movies_api::config::{Cli, load_config};
use movies_api::observability::{Telemetry, init_logging};
use std::panic;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Exporters spawn their own worker threads, so they can come up before
    // the runtime and the log subscriber.
    let telemetry = Telemetry::init(&config.telemetry, config.environment);

    if let Err(e) = init_logging(&config.logging, &telemetry) {
        eprintln!("Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    // Set up panic handler once logging is available
    panic::set_hook(Box::new(|panic_info| {
        error!(?panic_info, "FATAL: Panic occurred");
        std::process::exit(1);
    }));

    telemetry.log_startup();
    info!(environment = config.environment.as_str(), "Configuration loaded");

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            telemetry.shutdown_blocking();
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(movies_api::run_server(config, telemetry)) {
        error!(error = %e, "Movies API exited with an error");
        std::process::exit(1);
    }
}
