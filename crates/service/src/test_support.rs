#![cfg(test)]
use migration::MigratorTrait;
use models::db::{connect_with_config, load_db_config};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Fresh connection for the current test; migrates the schema on first use.
/// Returns Err when no database is reachable so callers can skip gracefully.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = load_db_config();
    cfg.validate()?;

    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_with_config(&cfg).await?;
            migration::Migrator::up(&db, None).await?;
            drop(db);
            Ok::<_, anyhow::Error>(())
        })
        .await?;

    let db = connect_with_config(&cfg).await?;
    Ok(db)
}
