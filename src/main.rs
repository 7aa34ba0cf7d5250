use dotenvy::dotenv;
use pos_ingest::config::{database, settings::Settings};
use pos_ingest::core::pipeline;
use pos_ingest::errors::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Settings; a missing DATABASE_URL ends the run here
    let settings = Settings::from_env()
        .inspect_err(|e| error!("Critical error loading configuration: {}", e))?;
    info!(
        "Ingesting {} for branch '{}'",
        settings.data_dir.display(),
        settings.branch_name
    );

    // 4. Store
    let db = database::connect(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to the store: {}", e))?;

    // 5. Schema, then the run itself; the pool is closed on every path
    let outcome = match database::create_tables(&db).await {
        Ok(()) => pipeline::run(&db, &settings).await.map(|_| ()),
        Err(e) => Err(e),
    };
    if let Err(e) = &outcome {
        error!("Run aborted: {}", e);
    }
    if let Err(e) = db.close().await {
        error!("Failed to close the store connection: {}", e);
    }
    outcome
}
