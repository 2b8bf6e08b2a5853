//! Client library for a schema-driven entity-management backend.
//!
//! Maps arbitrary model names onto the backend's uniform REST surface,
//! caches fetched collections and instances in memory, derives filtered
//! views without re-fetching, navigates parent/child hierarchies, brokers
//! presigned attachment URLs, and runs stored or ad-hoc SQL.

pub mod api_client;
pub mod attachments;
pub mod config;
pub mod error;
pub mod filter;
pub mod registry;
pub mod session;
mod slot;
pub mod sql;
pub mod store;
pub mod transport;

#[cfg(test)]
mod testutil;

pub use api_client::ApiClient;
pub use attachments::AttachmentBroker;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use filter::OwnerFilter;
pub use registry::ModelRegistry;
pub use session::{BearerSession, SessionProvider};
pub use sql::SqlPassthrough;
pub use store::EntityStore;
pub use transport::{HttpTransport, Transport, TransportError};
