use axum::routing::get;
use axum::Router;

use common::store::{Collection, RecordStore, StoreError};

use crate::local::StoredDeployment;
use crate::ServiceState;

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

const SCAN_BATCH: u64 = 100;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/allocations", get(list::handler).post(create::handler))
        .route(
            "/allocation/:allocation_id",
            get(get::handler)
                .put(update::handler)
                .delete(delete::handler),
        )
        .with_state(state)
}

/// Whether any of the owner's deployments points at the allocation.
pub async fn in_use(
    store: &dyn RecordStore,
    owner: &str,
    allocation_id: &str,
) -> Result<bool, StoreError> {
    let mut offset = 0;
    loop {
        let (count, records) = store
            .list(Collection::Deployments, owner, offset, SCAN_BATCH)
            .await?;

        for record in &records {
            let stored = record.decode::<StoredDeployment>()?;
            if stored.deployment.allocation.id == allocation_id {
                return Ok(true);
            }
        }

        offset += records.len() as u64;
        if records.is_empty() || offset >= count {
            return Ok(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use common::models::{AllocationId, Deployment, DeploymentStatus, ToolId};
    use common::store::MemoryStore;

    use super::*;

    async fn deploy(store: &MemoryStore, owner: &str, allocation_id: &str) {
        let stored = StoredDeployment {
            deployment: Deployment {
                allocation: AllocationId {
                    id: allocation_id.to_string(),
                    info_link: None,
                },
                tool: ToolId {
                    id: "tool".to_string(),
                    version: "latest".to_string(),
                    info_link: None,
                },
            },
            status: DeploymentStatus::Pending,
        };
        store
            .put(
                Collection::Deployments,
                None,
                owner,
                serde_json::to_value(&stored).unwrap(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_in_use_scans_past_first_batch() {
        let store = MemoryStore::new();
        deploy(&store, "alice", "target").await;
        for _ in 0..SCAN_BATCH + 5 {
            deploy(&store, "alice", "other").await;
        }
        // the oldest deployment sits beyond the first batch
        assert!(in_use(&store, "alice", "target").await.unwrap());
        assert!(!in_use(&store, "alice", "missing").await.unwrap());
        assert!(!in_use(&store, "bob", "target").await.unwrap());
    }
}
