#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use models::db::{connect_with_config, ensure_schema};

// Ensure the schema is created only once across the entire test process
static SCHEMA_READY: OnceCell<bool> = OnceCell::const_new();

fn db_config() -> Option<configs::DatabaseConfig> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let mut cfg = configs::DatabaseConfig::default();
    if cfg.normalize_from_env().is_err() || cfg.validate().is_err() {
        return None;
    }
    Some(cfg)
}

/// Fresh pool for the current test runtime, or `None` when no database is configured.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    let Some(cfg) = db_config() else {
        eprintln!("skip: DB_* settings not provided");
        return Ok(None);
    };

    let ready = *SCHEMA_READY
        .get_or_init(|| async {
            match connect_with_config(&cfg).await {
                Ok(db) => ensure_schema(&db).await.is_ok(),
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {}", e);
                    false
                }
            }
        })
        .await;
    if !ready {
        return Ok(None);
    }

    let db = connect_with_config(&cfg).await?;
    Ok(Some(db))
}
