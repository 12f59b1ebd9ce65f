//! The auth client and the backend's response shapes.

use beamdrop_session::Session;
use serde::Deserialize;

use crate::AuthError;

/// The user object the backend returns alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Avatar URL, when the account has one. Not persisted in the
    /// session record; profile screens fetch it fresh.
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A successful response from `/auth/login` or `/auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

impl AuthResponse {
    /// Converts the backend's response into the session record the
    /// cache persists.
    pub fn into_session(self) -> Session {
        Session::new(self.user.email, self.token)
            .with_id(self.user.id)
            .with_name(self.user.name)
    }
}

/// The shape of the backend's error bodies: `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the Beamdrop authentication backend.
///
/// Thin by design: each method is one request, one JSON body, one
/// response shape. The client is cheap to clone (it shares reqwest's
/// connection pool) and carries no auth state — the bearer token lives
/// in the session cache and is passed in per call where needed.
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
    http: reqwest::Client,
}

impl AuthClient {
    /// Creates a client for the backend at `base_url`
    /// (e.g. `https://api.beamdrop.example/api`). A trailing slash is
    /// tolerated and stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Exchanges credentials for a token and user record.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, AuthError> {
        tracing::debug!(email, "logging in");
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Creates an account and signs it in. The backend checks that
    /// `password` and `repassword` match; we send both rather than
    /// duplicating its validation here.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        repassword: &str,
    ) -> Result<AuthResponse, AuthError> {
        tracing::debug!(email, "registering");
        let response = self
            .http
            .post(format!("{}/auth/register", self.base_url))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "repassword": repassword,
            }))
            .send()
            .await?;
        Self::parse(response).await
    }

    /// Fetches the user record the given bearer token belongs to.
    ///
    /// Used to re-validate a restored session against the backend; a
    /// `Rejected` result here means the token has been revoked and the
    /// caller should sign the user out.
    pub async fn current_user(
        &self,
        token: &str,
    ) -> Result<AuthUser, AuthError> {
        let response = self
            .http
            .get(format!("{}/auth/user", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        #[derive(Deserialize)]
        struct UserEnvelope {
            user: AuthUser,
        }
        let envelope: UserEnvelope = Self::parse(response).await?;
        Ok(envelope.user)
    }

    /// Turns a response into `T`, or a non-2xx status into
    /// [`AuthError::Rejected`] carrying the backend's message.
    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Error bodies are JSON `{ "message": ... }` on the happy-ish
        // path, but a proxy or crash can hand back anything.
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("server error ({status})"));
        tracing::warn!(status = status.as_u16(), %message, "auth request rejected");
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
