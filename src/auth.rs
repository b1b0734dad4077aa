use crate::errors::AppError;
use crate::models::UserId;
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "mood_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMode {
    #[default]
    Login,
    Signup,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub mode: SignInMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: UserId,
    pub token: String,
}

impl Session {
    pub fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.token)
    }
}

/// Supplies the identity of the requesting user.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn current_user(&self, headers: &HeaderMap) -> Option<UserId>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AppError>;

    async fn sign_out(&self, headers: &HeaderMap);

    /// External page to send signed-out users to, when sign-in is not local.
    fn sign_in_url(&self) -> Option<&str> {
        None
    }
}

pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
}

/// Accepts any non-empty email and password. Sessions are kept in memory, one
/// per user: signing in again invalidates the earlier token.
#[derive(Debug, Default)]
pub struct MockAuth {
    sessions: Mutex<HashMap<String, UserId>>,
}

impl MockAuth {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<UserId> {
        let token = session_token(headers)?;
        self.sessions.lock().await.get(token).cloned()
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AppError> {
        let email = credentials.email.trim();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(AppError::validation("Email and password are required."));
        }

        let session = Session {
            user_id: UserId::new(email),
            token: Uuid::new_v4().to_string(),
        };
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, user| *user != session.user_id);
        if sessions.len() < before {
            debug!(user = %session.user_id, "replaced previous session");
        }
        sessions.insert(session.token.clone(), session.user_id.clone());
        drop(sessions);
        info!(user = %session.user_id, mode = ?credentials.mode, "signed in");
        Ok(session)
    }

    async fn sign_out(&self, headers: &HeaderMap) {
        if let Some(token) = session_token(headers) {
            if let Some(user) = self.sessions.lock().await.remove(token) {
                info!(%user, "signed out");
            }
        }
    }
}

/// Identity comes from an upstream identity proxy that sets a request header.
#[derive(Debug, Clone)]
pub struct HostedAuth {
    identity_header: String,
    sign_in_url: String,
}

impl HostedAuth {
    pub fn new(identity_header: impl Into<String>, sign_in_url: impl Into<String>) -> Self {
        Self {
            identity_header: identity_header.into().to_ascii_lowercase(),
            sign_in_url: sign_in_url.into(),
        }
    }
}

#[async_trait]
impl AuthProvider for HostedAuth {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<UserId> {
        headers
            .get(self.identity_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(UserId::new)
    }

    async fn sign_in(&self, _credentials: &Credentials) -> Result<Session, AppError> {
        Err(AppError::validation(format!(
            "sign-in is handled by the identity provider at {}",
            self.sign_in_url
        )))
    }

    async fn sign_out(&self, _headers: &HeaderMap) {}

    fn sign_in_url(&self) -> Option<&str> {
        Some(&self.sign_in_url)
    }
}
