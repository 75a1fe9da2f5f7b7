use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::DatabaseSetupError;

pub async fn connect_sqlite(database_url: &url::Url) -> Result<SqlitePool, DatabaseSetupError> {
    let options = SqliteConnectOptions::from_str(database_url.as_str())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn connect_sqlite_memory() -> Result<SqlitePool, DatabaseSetupError> {
    // every connection to :memory: is its own database
    let options = SqliteConnectOptions::new().filename(":memory:");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn migrate_sqlite(pool: &SqlitePool) -> Result<(), DatabaseSetupError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
