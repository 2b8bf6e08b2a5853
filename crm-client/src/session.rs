//! Session credential capability.

use std::sync::{Arc, RwLock};

/// Narrow read/invalidate view of the current bearer credential.
///
/// The transport reads the token on every outbound request. Only the
/// unauthorized-response policy in [`crate::ApiClient`] ever invalidates
/// it; nothing in this crate mutates the token otherwise.
pub trait SessionProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
    fn invalidate(&self);
}

/// Default session holder backed by shared mutable state, so the
/// credential-acquisition flow and the client can hold the same session.
#[derive(Debug, Clone, Default)]
pub struct BearerSession {
    token: Arc<RwLock<Option<String>>>,
}

impl BearerSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token)),
        }
    }

    /// Install a fresh credential after (re-)authentication.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("session lock poisoned") = Some(token.into());
    }
}

impl SessionProvider for BearerSession {
    fn current_token(&self) -> Option<String> {
        self.token.read().expect("session lock poisoned").clone()
    }

    fn invalidate(&self) {
        *self.token.write().expect("session lock poisoned") = None;
    }
}
