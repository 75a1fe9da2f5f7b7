use axum::async_trait;
use axum::extract::{FromRequestParts, OriginalUri};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use http::request::Parts;
use http::{header, StatusCode};
use url::Url;

use crate::auth::{AuthError, Identity};
use crate::ServiceState;

use super::error_response;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => {
                error_response(StatusCode::UNAUTHORIZED, self.to_string())
            }
            AuthError::Unavailable(_) => {
                tracing::warn!(error = %self, "identity provider unavailable");
                error_response(StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
        }
    }
}

/// The caller, authenticated from its bearer token.
#[async_trait]
impl FromRequestParts<ServiceState> for Identity {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::MissingCredentials)?;

        state.authenticator().authenticate(bearer.token()).await
    }
}

/// Where the inbound request was addressed, as seen from outside.
///
/// `base` is the node's public URL (or `http://{Host}/`) and is
///  what local `self` links hang off; `url` is `base` plus the
///  request path and feeds page links.
#[derive(Debug, Clone)]
pub struct RequestUrl {
    base: Url,
    url: Url,
}

impl RequestUrl {
    pub fn new(base: Url, path: &str) -> Self {
        let mut url = base.clone();
        let joined = format!("{}{}", base.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url.set_query(None);
        url.set_fragment(None);
        Self { base, url }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestUrlError {
    #[error("missing or invalid Host header")]
    InvalidHost,
}

impl IntoResponse for RequestUrlError {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, self.to_string())
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for RequestUrl {
    type Rejection = RequestUrlError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        // nested routers strip their prefix from `parts.uri`
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let base = match state.public_url() {
            Some(url) => url.clone(),
            None => {
                let host = parts
                    .headers
                    .get(header::HOST)
                    .and_then(|h| h.to_str().ok())
                    .ok_or(RequestUrlError::InvalidHost)?;
                Url::parse(&format!("http://{}/", host))
                    .map_err(|_| RequestUrlError::InvalidHost)?
            }
        };

        Ok(RequestUrl::new(base, &path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_keeps_base_prefix() {
        let base = Url::parse("https://gw.example.org/awm/").unwrap();
        let url = RequestUrl::new(base, "/deployments");
        assert_eq!(url.url().as_str(), "https://gw.example.org/awm/deployments");
        assert_eq!(url.base().as_str(), "https://gw.example.org/awm/");
    }

    #[test]
    fn test_request_url_from_host() {
        let base = Url::parse("http://testserver/").unwrap();
        let url = RequestUrl::new(base, "/tools");
        assert_eq!(url.url().as_str(), "http://testserver/tools");
    }
}
