use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub use configs::DatabaseConfig;

/// Database config from `config.toml` when present, otherwise from env vars.
pub fn load_db_config() -> DatabaseConfig {
    let _ = dotenvy::dotenv();
    match configs::load_default() {
        Ok(cfg) => {
            let mut db = cfg.database;
            db.normalize_from_env();
            db
        }
        Err(_) => DatabaseConfig::from_env(),
    }
}

/// Connect using the default config resolution.
pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let cfg = load_db_config();
    cfg.validate()?;
    connect_with_config(&cfg).await
}

/// Connect with explicit pool settings.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .sqlx_logging(cfg.sqlx_logging);
    let db = Database::connect(opts).await?;
    Ok(db)
}
