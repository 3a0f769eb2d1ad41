//! Session credentials and the `auth` event payload

use serde::Serialize;
use thiserror::Error;

/// Environment variable holding the session token
pub const SESSION_TOKEN_ENV: &str = "SESSION_TOKEN";
/// Environment variable holding the user id
pub const USER_ID_ENV: &str = "USER_ID";

/// Credential validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialsError {
    /// Session token missing or empty
    #[error("SESSION_TOKEN is required")]
    MissingSessionToken,
    /// User id missing or empty
    #[error("USER_ID is required")]
    MissingUserId,
}

/// Session credentials, used verbatim in the auth frame
///
/// The `Debug` implementation redacts the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    session_token: String,
    uid: String,
}

impl Credentials {
    /// Create validated credentials
    pub fn new(
        session_token: impl Into<String>,
        uid: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let session_token = session_token.into();
        let uid = uid.into();

        if session_token.trim().is_empty() {
            return Err(CredentialsError::MissingSessionToken);
        }
        if uid.trim().is_empty() {
            return Err(CredentialsError::MissingUserId);
        }

        Ok(Self { session_token, uid })
    }

    /// Read credentials from `SESSION_TOKEN` and `USER_ID`, honoring a `.env` file
    pub fn from_env() -> Result<Self, CredentialsError> {
        let _ = dotenvy::dotenv();
        let token = std::env::var(SESSION_TOKEN_ENV).unwrap_or_default();
        let uid = std::env::var(USER_ID_ENV).unwrap_or_default();
        Self::new(token, uid)
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

/// Source of session credentials, consulted once per connect
pub trait CredentialProvider: Send + Sync {
    fn credentials(&self) -> Result<Credentials, CredentialsError>;
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> Result<Credentials, CredentialsError> {
        Ok(self.clone())
    }
}

/// Reads `SESSION_TOKEN` and `USER_ID` at connect time
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, CredentialsError> {
        Credentials::from_env()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("session_token", &"<redacted>")
            .field("uid", &self.uid)
            .finish()
    }
}

/// Fixed client fields sent alongside the credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    pub lang: String,
    pub current_url: String,
    pub is_chart: u8,
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            current_url: "cabinet".to_string(),
            is_chart: 1,
        }
    }
}

/// Body of the outbound `auth` event
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub session_token: String,
    pub uid: String,
    pub lang: String,
    pub current_url: String,
    pub is_chart: u8,
}

impl AuthPayload {
    pub fn new(credentials: &Credentials, profile: &ClientProfile) -> Self {
        Self {
            session_token: credentials.session_token.clone(),
            uid: credentials.uid.clone(),
            lang: profile.lang.clone(),
            current_url: profile.current_url.clone(),
            is_chart: profile.is_chart,
        }
    }
}
