use axum::routing::get;
use axum::Router;

use crate::ServiceState;

pub mod info;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/user/info", get(info::handler))
        .with_state(state)
}
