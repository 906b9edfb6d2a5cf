use std::sync::Arc;

use specgen_rs::api::SpecServer;
use specgen_rs::helpers::build_gateway;
use specgen_rs::{observability, GeneratorConfig};
use tracing::{error, info};

fn main() {
    let cfg = GeneratorConfig::from_env();
    observability::init(cfg.log_json);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cfg.pool.core_workers.max(1))
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to start runtime");
            std::process::exit(1);
        }
    };

    runtime.block_on(async move {
        let gateway = match build_gateway(&cfg) {
            Ok(gateway) => Arc::new(gateway),
            Err(err) => {
                error!(error = %err, "invalid configuration");
                std::process::exit(1);
            }
        };
        let _sweeper = gateway.registry().spawn_sweeper();

        info!(
            provider = %cfg.provider,
            model = %cfg.model,
            wait_timeout_secs = cfg.wait_timeout.as_secs(),
            "specgen starting"
        );
        let server = SpecServer::new(cfg.port, gateway);
        if let Err(err) = server.start().await {
            error!(error = %err, "server error");
        }
    });
}
