use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing_subscriber::FmtSubscriber;

use clinislot_db::{create_pool, schema::initialize_database};
use clinislot_engine::config::EngineConfig;
use clinislot_engine::maintainer::WindowMaintainer;
use clinislot_engine::scheduler::{MaintenanceScheduler, ScheduleConfig};
use clinislot_engine::store::{PgAppointmentStore, PgSlotStore, PgStaffDirectory};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = EngineConfig::from_env()?;

    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    // Wire the maintainer to its Postgres stores
    let maintainer = Arc::new(WindowMaintainer::new(
        Arc::new(PgSlotStore::new(db_pool.clone())),
        Arc::new(PgAppointmentStore::new(db_pool.clone())),
        Arc::new(PgStaffDirectory::new(db_pool)),
        config.timezone,
        config.window_days,
        config.retention_days,
    ));

    // Run the startup repair pass and register the daily triggers
    let mut scheduler = MaintenanceScheduler::new(maintainer, ScheduleConfig::from(&config));
    scheduler.initialize().await?;

    // Run until interrupted
    tokio::signal::ctrl_c().await?;
    scheduler.shutdown().await?;

    Ok(())
}
