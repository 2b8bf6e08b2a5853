//! Request coordinator shared by every component of the client.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::{BearerSession, SessionProvider};
use crate::transport::{HttpTransport, Transport, TransportError};
use reqwest::Method;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Verb helpers over the transport, plus the single owner of the
/// react-to-`Unauthorized` policy: a 401 invalidates the session (once,
/// and only while one is present) and the error still propagates to the
/// caller. Nothing here retries.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProvider>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config, Arc::clone(&session))?;
        Ok(Self::with_transport(Arc::new(transport), session))
    }

    /// Load and validate a config file, seed a [`BearerSession`] from its
    /// optional token, and wire both into a ready client. The session is
    /// returned alongside so the credential-acquisition flow can install
    /// fresh tokens later.
    pub fn from_config_file(path: &Path) -> Result<(Self, BearerSession), ClientError> {
        let config = ClientConfig::from_path(path)?;
        config.validate()?;
        let session = BearerSession::new(config.token.clone());
        let api = Self::new(&config, Arc::new(session.clone()))?;
        Ok((api, session))
    }

    /// Build over an arbitrary transport; the seam the tests use.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    pub async fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.execute(Method::GET, path, None, &[]).await
    }

    pub async fn get_text(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        let result = self.transport.request_text(Method::GET, path, query).await;
        self.apply_auth_policy(result)
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.execute(Method::POST, path, Some(body), &[]).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.execute(Method::PUT, path, Some(body), &[]).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.execute(Method::PATCH, path, Some(body), &[]).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, TransportError> {
        self.execute(Method::DELETE, path, None, &[]).await
    }

    pub async fn delete_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        self.execute(Method::DELETE, path, None, query).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        let result = self.transport.request(method, path, body, query).await;
        self.apply_auth_policy(result)
    }

    /// A rejected credential ends the session. When the session is already
    /// gone this is a no-op logout; the error propagates either way.
    fn apply_auth_policy<T>(
        &self,
        result: Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        if let Err(TransportError::Unauthorized) = &result {
            if self.session.current_token().is_some() {
                self.session.invalidate();
            }
        }
        result
    }
}
