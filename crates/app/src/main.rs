mod problem;
mod router;
mod service;
mod telemetry;

use std::net::SocketAddr;

use tracing::{error, info};
use todo_api_storage::Database;
use todo_api_util::{load_env_file, AppConfig};

use crate::service::TodoService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env_file();
    let config = AppConfig::from_env()?;

    telemetry::init_tracing(&config)?;
    let metrics = telemetry::init_metrics()?;

    let database = match Database::connect(&config.database_url).await {
        Ok(database) => database,
        Err(err) => {
            error!(stage = "storage", error = %err, "DB Error");
            return Err(err.into());
        }
    };
    database.run_migrations().await?;
    info!(stage = "storage", url = %config.database_url, "database ready");

    let state = router::AppState::new(metrics, TodoService::new(database));

    let addr: SocketAddr = config.bind_addr;
    info!(stage = "app", %addr, env = %config.environment.as_str(), "starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router::app_router(state))
        .await
        .map_err(|err| err.into())
}
