use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tokio::time::timeout;

use super::data_source::{DataSource, DataSourceError, StateDataSource};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Body of `/_status/readyz`. A failure names the dependency at fault
///  when one is known.
#[derive(Debug, Serialize)]
struct Readiness {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependency: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl Readiness {
    fn failure(dependency: Option<&'static str>, message: String) -> Self {
        Self {
            status: "failure",
            dependency,
            message: Some(message),
        }
    }
}

#[tracing::instrument]
pub async fn handler(data_src: StateDataSource) -> Response {
    let report = match timeout(HEALTH_CHECK_TIMEOUT, data_src.is_ready()).await {
        Ok(Ok(())) => {
            let ready = Readiness {
                status: "ok",
                dependency: None,
                message: None,
            };
            return (StatusCode::OK, Json(ready)).into_response();
        }
        Ok(Err(err)) => {
            let DataSourceError::DependencyFailure { dependency, .. } = &err;
            Readiness::failure(Some(*dependency), err.to_string())
        }
        Err(_) => Readiness::failure(None, "readiness check timed out".to_string()),
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(report)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http_body_util::BodyExt;

    use super::*;

    use crate::http_server::health::data_source::tests::*;

    async fn body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ready_has_no_failure_fields() {
        let response = handler(StateDataSource::new(Arc::new(MockReadiness::Ready))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_failure_names_the_dependency() {
        let response = handler(StateDataSource::new(Arc::new(
            MockReadiness::DependencyFailure,
        )))
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body(response).await;
        assert_eq!(body["status"], "failure");
        assert_eq!(body["dependency"], "record store");
        assert_eq!(body["message"], "record store unavailable: connection refused");
    }
}
