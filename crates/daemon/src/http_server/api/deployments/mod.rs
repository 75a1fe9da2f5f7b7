use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod create;
pub mod delete;
pub mod get;
pub mod list;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/deployments", get(list::handler).post(create::handler))
        .route(
            "/deployment/:deployment_id",
            get(get::handler).delete(delete::handler),
        )
        .with_state(state)
}
