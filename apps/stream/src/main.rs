use lichess_tg_stream::infra::state::{build_state, resubscribe_all};
use lichess_tg_stream::repos::SeaStore;
use lichess_tg_stream::{telemetry, DbProfile, QueueConsumer, StreamConfig};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or `set -a; . ./.env; set +a` locally).
    let config = match StreamConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let state = match build_state(config).with_db(DbProfile::Prod).build().await {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, code = %e.code(), "failed to build application state");
            std::process::exit(1);
        }
    };
    info!("database connected");

    let store = SeaStore::new(state.db.clone());
    if let Err(e) = resubscribe_all(&store, &state.registry).await {
        error!(error = %e, code = %e.code(), "startup resubscription failed");
        std::process::exit(1);
    }

    let shutdown = CancellationToken::new();
    let consumer = QueueConsumer::new(&state.config, state.registry.clone());
    let mut consumer_task = tokio::spawn(consumer.run(shutdown.clone()));

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("shutdown requested"),
                Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
            }
            shutdown.cancel();
            if let Err(e) = consumer_task.await {
                error!(error = %e, "queue consumer task panicked");
            }
        }
        joined = &mut consumer_task => {
            if let Err(e) = joined {
                error!(error = %e, "queue consumer task panicked");
            }
            error!("queue consumer exited; shutting down");
        }
    }

    state.registry.stop_all();
    info!("stream service stopped");
}
