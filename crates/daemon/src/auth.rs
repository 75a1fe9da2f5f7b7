use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use common::models::UserInfo;

/// The caller behind a request: the owner key used for local
///  records, plus the bearer token forwarded to remote nodes.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub token: String,
    /// Display name or DN from the `name` claim.
    pub name: Option<String>,
    /// `eduperson_entitlement` values, i.e. virtual organisations.
    pub entitlements: Vec<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            token: token.into(),
            name: None,
            entitlements: Vec::new(),
        }
    }

    pub fn user_info(&self) -> UserInfo {
        UserInfo {
            base_id: self.subject.clone(),
            user_dn: self.name.clone(),
            vos: self.entitlements.clone(),
        }
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &self.subject)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization required")]
    MissingCredentials,
    #[error("invalid access token: {0}")]
    InvalidToken(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Turns a bearer token into an [`Identity`].
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    eduperson_entitlement: Vec<String>,
}

/// Validates tokens against an OIDC userinfo endpoint; the `sub`
///  claim becomes the owner key.
#[derive(Debug, Clone)]
pub struct UserInfoAuthenticator {
    client: Client,
    userinfo_url: Url,
}

impl UserInfoAuthenticator {
    pub fn new(client: Client, userinfo_url: Url) -> Self {
        Self {
            client,
            userinfo_url,
        }
    }
}

#[async_trait]
impl Authenticator for UserInfoAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(self.userinfo_url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidToken(format!("userinfo returned {}", status)));
        }
        if !status.is_success() {
            return Err(AuthError::Unavailable(format!("userinfo returned {}", status)));
        }

        let claims: Claims = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(Identity {
            subject: claims.sub,
            token: token.to_string(),
            name: claims.name,
            entitlements: claims.eduperson_entitlement,
        })
    }
}

/// Development authenticator: any non-empty token is accepted and
///  used verbatim as the subject.
#[derive(Debug, Clone, Default)]
pub struct InsecureAuthenticator;

#[async_trait]
impl Authenticator for InsecureAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok(Identity::new(token, token))
    }
}
