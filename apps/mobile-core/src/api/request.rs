//! The authenticated request wrapper: bearer injection plus the single
//! refresh-and-retry cycle every protected call goes through.

use serde::de::DeserializeOwned;

use super::ApiClient;
use crate::error::ClientError;

impl ApiClient {
    /// Run an authenticated request and decode its JSON response.
    ///
    /// The flow is a fixed two-step sequence, never a loop:
    /// 1. read the current access token (absent → `Unauthenticated`),
    /// 2. attempt the request,
    /// 3. if and only if the service rejected the token, refresh once and
    ///    retry once; the retry's outcome is final,
    /// 4. every other failure propagates unchanged.
    pub async fn authorized<T, F>(&self, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let token = self.current_token().await?;

        let first = self
            .execute::<T>(build(&self.http).bearer_auth(&token))
            .await;
        let err = match first {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !err.is_auth_rejected() {
            return Err(err);
        }

        tracing::debug!("access token rejected, refreshing");
        let fresh = self.refresh_access_token(&token).await?;
        self.execute::<T>(build(&self.http).bearer_auth(&fresh))
            .await
    }

    /// `authorized` for endpoints whose response body is discarded.
    pub async fn authorized_empty<F>(&self, build: F) -> Result<(), ClientError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let token = self.current_token().await?;

        let first = self
            .execute_empty(build(&self.http).bearer_auth(&token))
            .await;
        let err = match first {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        if !err.is_auth_rejected() {
            return Err(err);
        }

        tracing::debug!("access token rejected, refreshing");
        let fresh = self.refresh_access_token(&token).await?;
        self.execute_empty(build(&self.http).bearer_auth(&fresh))
            .await
    }

    async fn current_token(&self) -> Result<String, ClientError> {
        self.session
            .access_token()
            .await?
            .ok_or(ClientError::Unauthenticated)
    }
}
