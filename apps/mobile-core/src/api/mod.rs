//! Typed client for the Sitedocs mobile API.
//!
//! One `ApiClient` is shared by every call site; it owns the HTTP connection
//! pool and the session whose tokens authenticate each request.

pub mod auth;
pub mod objects;
pub mod request;
pub mod sharing;
pub mod works;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::ClientError;
use crate::session::Session;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<Session>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode its JSON body. A non-success status is read
    /// as text and mapped into `ClientError::Api`.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::api(status.as_u16(), &body));
        }
        Ok(resp.json::<T>().await?)
    }

    /// `execute` for endpoints whose response body is discarded.
    pub(crate) async fn execute_empty(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<(), ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::api(status.as_u16(), &body));
        }
        Ok(())
    }
}
