use axum_helpers::server::{close_postgres, create_production_app};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{connect_from_config_with_retry, run_migrations};
use migration::Migrator;
use shareit_api::config::{Config, StorageConfig};
use shareit_api::state::AppState;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Before any fallible operation
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let state = match config.storage.clone() {
        StorageConfig::Postgres {
            database,
            run_migrations: migrate,
            connect_retry,
        } => {
            let db = connect_from_config_with_retry(database, Some(connect_retry))
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
            if migrate {
                run_migrations::<Migrator>(&db, config.app.name).await?;
            }
            AppState::postgres(config, db)
        }
        StorageConfig::Memory => {
            warn!("Using in-memory storage; data is lost on shutdown");
            AppState::in_memory(config)
        }
    };

    let app = shareit_api::app(&state)?;

    let db = state.db().cloned();
    let cleanup = async move {
        if let Some(db) = db {
            close_postgres(db).await;
        }
    };

    info!(
        backend = %state.config.storage.backend(),
        "Starting {} v{}",
        state.config.app.name,
        state.config.app.version
    );
    create_production_app(app, &state.config.server, cleanup)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("ShareIt API shutdown complete");
    Ok(())
}
