use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;

use common::store::{new_record_id, Collection, Record, RecordStore, StoreError};

use super::Database;

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn record_from_row(row: &SqliteRow) -> Result<Record, StoreError> {
    let id: String = row.try_get("id").map_err(unavailable)?;
    let data: String = row.try_get("data").map_err(unavailable)?;
    let data = serde_json::from_str(&data)
        .map_err(|e| StoreError::Corrupt(id.clone(), e.to_string()))?;

    Ok(Record {
        id,
        owner: row.try_get("owner").map_err(unavailable)?,
        data,
        created_at: row.try_get("created_at").map_err(unavailable)?,
    })
}

#[async_trait]
impl RecordStore for Database {
    async fn list(
        &self,
        collection: Collection,
        owner: &str,
        offset: u64,
        limit: u64,
    ) -> Result<(u64, Vec<Record>), StoreError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM records
            WHERE collection = ? AND owner = ?
            "#,
        )
        .bind(collection.as_str())
        .bind(owner)
        .fetch_one(&**self)
        .await
        .map_err(unavailable)?;

        let rows = sqlx::query(
            r#"
            SELECT id, owner, data, created_at FROM records
            WHERE collection = ? AND owner = ?
            ORDER BY seq DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(collection.as_str())
        .bind(owner)
        .bind(clamp(limit))
        .bind(clamp(offset))
        .fetch_all(&**self)
        .await
        .map_err(unavailable)?;

        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total.max(0) as u64, records))
    }

    async fn get(
        &self,
        collection: Collection,
        id: &str,
        owner: &str,
    ) -> Result<Option<Record>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner, data, created_at FROM records
            WHERE collection = ? AND id = ? AND owner = ?
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(owner)
        .fetch_optional(&**self)
        .await
        .map_err(unavailable)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn put(
        &self,
        collection: Collection,
        id: Option<&str>,
        owner: &str,
        data: serde_json::Value,
    ) -> Result<String, StoreError> {
        let payload = data.to_string();

        if let Some(id) = id {
            let result = sqlx::query(
                r#"
                UPDATE records SET data = ?
                WHERE collection = ? AND id = ? AND owner = ?
                "#,
            )
            .bind(&payload)
            .bind(collection.as_str())
            .bind(id)
            .bind(owner)
            .execute(&**self)
            .await
            .map_err(unavailable)?;

            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
            return Ok(id.to_string());
        }

        let id = new_record_id();
        sqlx::query(
            r#"
            INSERT INTO records (collection, id, owner, data, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(collection.as_str())
        .bind(&id)
        .bind(owner)
        .bind(&payload)
        .bind(OffsetDateTime::now_utc())
        .execute(&**self)
        .await
        .map_err(unavailable)?;

        Ok(id)
    }

    async fn delete(
        &self,
        collection: Collection,
        id: &str,
        owner: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM records
            WHERE collection = ? AND id = ? AND owner = ?
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(owner)
        .execute(&**self)
        .await
        .map_err(unavailable)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&**self)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_sqlite_store_pages_newest_first() {
        let db = Database::in_memory().await.unwrap();
        let mut ids = Vec::new();
        for n in 0..5 {
            ids.push(
                db.put(Collection::Allocations, None, "alice", json!({ "n": n }))
                    .await
                    .unwrap(),
            );
        }
        db.put(Collection::Allocations, None, "bob", json!({}))
            .await
            .unwrap();

        let (total, records) = db
            .list(Collection::Allocations, "alice", 1, 2)
            .await
            .unwrap();
        assert_eq!(total, 5);
        let got: Vec<_> = records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(got, vec![ids[3].clone(), ids[2].clone()]);
        assert_eq!(records[0].data, json!({ "n": 3 }));
    }

    #[tokio::test]
    async fn test_sqlite_store_is_owner_scoped() {
        let db = Database::in_memory().await.unwrap();
        let id = db
            .put(Collection::Deployments, None, "alice", json!({"v": 1}))
            .await
            .unwrap();

        assert!(db
            .get(Collection::Deployments, &id, "bob")
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            db.put(Collection::Deployments, Some(&id), "bob", json!({}))
                .await,
            Err(StoreError::NotFound(_))
        ));
        assert!(!db.delete(Collection::Deployments, &id, "bob").await.unwrap());

        db.put(Collection::Deployments, Some(&id), "alice", json!({"v": 2}))
            .await
            .unwrap();
        let record = db
            .get(Collection::Deployments, &id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.data, json!({"v": 2}));

        assert!(db.delete(Collection::Deployments, &id, "alice").await.unwrap());
        db.ping().await.unwrap();
    }
}
