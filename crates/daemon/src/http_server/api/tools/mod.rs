use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod get;
pub mod list;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/tools", get(list::handler))
        .route("/tool/:tool_id", get(get::handler))
        .with_state(state)
}
