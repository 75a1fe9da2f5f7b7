use axum::Json;

use common::models::UserInfo;

use crate::auth::Identity;

/// Claims of the authenticated caller. Never federated.
#[tracing::instrument(skip(identity), fields(subject = %identity.subject))]
pub async fn handler(identity: Identity) -> Json<UserInfo> {
    Json(identity.user_info())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claims_map_to_user_info() {
        let mut identity = Identity::new("user-123", "token");
        identity.name = Some("/DC=org/CN=User".to_string());
        identity.entitlements = vec!["vo1".to_string(), "vo2".to_string()];

        let Json(info) = handler(identity).await;
        assert_eq!(info.base_id, "user-123");
        assert_eq!(info.user_dn.as_deref(), Some("/DC=org/CN=User"));
        assert_eq!(info.vos, ["vo1", "vo2"]);
    }
}
