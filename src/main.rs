use static_responder::config::{AppState, Config};
use static_responder::logger;
use static_responder::server::{self, SignalHandler};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (cfg, config_path) = Config::load()?;
    logger::init(&cfg.logging)?;

    // Size the runtime from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, config_path))
}

async fn async_main(
    cfg: Config,
    config_path: String,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(AppState::new(cfg, config_path));
    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals), Arc::clone(&state));

    server::run(listener, state, signals).await;
    Ok(())
}
