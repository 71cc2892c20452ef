use std::{path::PathBuf, str::FromStr};

use anyhow::Result;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub type DB = SqlitePool;

pub async fn open(path: &str) -> Result<DB> {
    let opts = SqliteConnectOptions::from_str(path)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Everything lives in one key/value table of JSON documents:
/// the plan collection under `workouts`, the theme under `theme`,
/// and one edit-history stack per `history:{plan_id}:{exercise_id}`.
async fn ensure_schema(pool: &DB) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key        TEXT PRIMARY KEY,
            value      TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Default database location: the user data dir, falling back to the
/// working directory when the platform offers none.
pub fn default_path() -> Result<PathBuf> {
    match dirs::data_dir() {
        Some(base) => {
            let dir = base.join("gymscan");
            std::fs::create_dir_all(&dir)?;
            Ok(dir.join("gymscan.db"))
        }
        None => Ok(PathBuf::from("./gymscan.db")),
    }
}
