use tracing::{error, info};

/// Close a SeaORM pool during shutdown, logging the outcome.
pub async fn close_postgres(db: sea_orm::DatabaseConnection) {
    match db.close().await {
        Ok(()) => info!("PostgreSQL pool closed"),
        Err(e) => error!("Error closing PostgreSQL pool: {}", e),
    }
}
