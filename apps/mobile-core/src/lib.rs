pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod session;
pub mod store;

use std::sync::Arc;

use api::ApiClient;
use config::Config;
use credentials::CredentialStore;
use error::ClientError;
use gateway::{EventChannel, GatewayEvent};
use session::Session;
use tokio::sync::mpsc;

/// The assembled client core: one session, one API client, and a factory
/// for event channels. A shell builds this once at startup and hands clones
/// to every screen.
#[derive(Clone)]
pub struct Client {
    pub config: Arc<Config>,
    pub session: Arc<Session>,
    pub api: ApiClient,
}

impl Client {
    pub fn new(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self, ClientError> {
        let session = Session::new(store);
        let api = ApiClient::new(&config, session.clone())?;
        Ok(Self {
            config: Arc::new(config),
            session,
            api,
        })
    }

    /// Open a live event channel tied to one consumer's lifetime.
    pub fn open_events(&self) -> (EventChannel, mpsc::Receiver<GatewayEvent>) {
        EventChannel::open(&self.config, self.session.clone())
    }
}
