//! Login, registration, and the token refresh procedure.

use serde::{Deserialize, Serialize};
use sitedocs_common::User;

use super::ApiClient;
use crate::error::ClientError;
use crate::session::TokenPair;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: User,
}

/// Registration form contents for `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct NewRegistration {
    pub username: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest {
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    // The service does not rotate refresh tokens today, but if it starts
    // returning one we persist it rather than keeping a dead credential.
    #[serde(default)]
    refresh_token: Option<String>,
}

impl ApiClient {
    /// `POST /login`. Both tokens are persisted into the session and the
    /// account is returned; deciding what to do with an unconfirmed email is
    /// the shell's call.
    pub async fn log_in(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let LoginResponse {
            access_token,
            refresh_token,
            user,
        } = self
            .execute(
                self.http
                    .post(self.url("/login"))
                    .json(&LoginRequest { email, password }),
            )
            .await?;

        self.session
            .log_in(&TokenPair {
                access_token,
                refresh_token,
            })
            .await?;

        tracing::info!(user_id = user.id, "logged in");
        Ok(user)
    }

    /// `POST /register`. No tokens are issued; the account must confirm its
    /// email and then log in.
    pub async fn register(&self, registration: &NewRegistration) -> Result<(), ClientError> {
        self.execute_empty(self.http.post(self.url("/register")).json(registration))
            .await
    }

    /// `GET /me`, the app-start probe that validates a restored session.
    pub async fn me(&self) -> Result<User, ClientError> {
        self.authorized(|http| http.get(self.url("/me"))).await
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Serialized behind the session's refresh gate so that concurrent
    /// rejections coalesce into one network call. `stale` is the token the
    /// caller was rejected with; if the stored token already differs, another
    /// task won the race and its result is reused.
    ///
    /// Any failure here is terminal for the session: the caller gets
    /// `SessionExpired` and stored state is left as it was.
    pub(crate) async fn refresh_access_token(&self, stale: &str) -> Result<String, ClientError> {
        let _gate = self.session.refresh_gate().lock().await;

        if let Some(current) = self.session.access_token().await? {
            if current != stale {
                tracing::debug!("reusing access token refreshed by a concurrent call");
                return Ok(current);
            }
        }

        let Some(token) = self.session.refresh_token().await? else {
            tracing::warn!("no refresh token stored");
            return Err(ClientError::SessionExpired);
        };

        let refreshed: RefreshResponse = match self
            .execute(
                self.http
                    .post(self.url("/refresh-token"))
                    .json(&RefreshRequest { token }),
            )
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed");
                return Err(ClientError::SessionExpired);
            }
        };

        self.session
            .store_access_token(&refreshed.access_token)
            .await?;
        if let Some(rotated) = refreshed.refresh_token {
            self.session.store_refresh_token(&rotated).await?;
        }

        tracing::info!("access token refreshed");
        Ok(refreshed.access_token)
    }
}
