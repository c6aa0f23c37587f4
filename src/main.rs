use std::process::ExitCode;

use oidc_redirect_receiver::config::Config;
use oidc_redirect_receiver::server::{self, HttpListenerService};
use oidc_redirect_receiver::{logger, Router};

/// Configuration, logger or runtime could not be set up
const EXIT_SETUP_FAILED: u8 = 1;
/// The listener could not be opened
const EXIT_BIND_FAILED: u8 = 2;

fn main() -> ExitCode {
    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[ERROR] Failed to load configuration: {e}");
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    if let Err(e) = logger::init(&cfg) {
        eprintln!("[ERROR] Failed to open log files: {e}");
        return ExitCode::from(EXIT_SETUP_FAILED);
    }

    // Worker thread count follows the config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            logger::log_error(&format!("Failed to build Tokio runtime: {e}"));
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> ExitCode {
    let service = HttpListenerService::new(
        cfg.server.base_url.clone(),
        Router::with_default_routes(),
        cfg.performance.clone(),
    );

    let local_addr = match service.start().await {
        Ok(addr) => addr,
        Err(e) => {
            logger::log_bind_failed(service.base_url(), &e);
            return ExitCode::from(EXIT_BIND_FAILED);
        }
    };
    logger::log_service_start(service.base_url(), &local_addr, &cfg);

    let reason = server::wait_for_shutdown().await;
    logger::log_shutdown_requested(reason);
    service.stop().await;

    ExitCode::SUCCESS
}
