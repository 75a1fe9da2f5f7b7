use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use common::models::AllocationInfo;
use common::page::Page;

use crate::auth::Identity;
use crate::http_server::api::extract::RequestUrl;
use crate::http_server::api::listing::{federated_page, ListError, ListQuery};
use crate::local::StoreSource;
use crate::ServiceState;

#[tracing::instrument(skip_all, fields(subject = %identity.subject))]
pub async fn handler(
    State(state): State<ServiceState>,
    identity: Identity,
    url: RequestUrl,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Page<AllocationInfo>>, ListError> {
    let window = ListQuery::window(query)?;
    let local = StoreSource::<AllocationInfo>::new(state.store(), &identity.subject, url.base());

    let page = federated_page(&state, &identity, &url, window, &local).await?;
    Ok(Json(page))
}
