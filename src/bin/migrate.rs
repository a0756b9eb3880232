use scrapemaster::{config::Config, telemetry::init_tracing};
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let pool: Pool<Postgres> = PgPoolOptions::new()
        .max_connections(5)
        .connect(config.database_url())
        .await?;

    // runs all pending migrations; no-op if up-to-date
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations applied");

    Ok(())
}
