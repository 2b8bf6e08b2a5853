//! Model registry accessor.
//!
//! Models are backend-defined; the client fetches their descriptors and
//! passes them through without interpreting field definitions.

use crate::api_client::ApiClient;
use crate::error::ClientError;
use crate::slot::Slot;
use crate::transport::TransportError;
use crm_core::ModelDescriptor;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct RegistrySlots {
    models: Slot<BTreeMap<String, ModelDescriptor>>,
    schema: Slot<Option<ModelDescriptor>>,
}

pub struct ModelRegistry {
    api: ApiClient,
    state: Mutex<RegistrySlots>,
}

impl ModelRegistry {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Mutex::new(RegistrySlots::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistrySlots> {
        self.state.lock().expect("registry lock poisoned")
    }

    /// GET `/models`: every model descriptor, keyed by model name.
    pub async fn fetch_all(&self) -> Result<(), ClientError> {
        let generation = self.lock().models.begin();
        let value = self.api.get("/models").await?;
        let models: BTreeMap<String, ModelDescriptor> = decode(value)?;
        self.lock().models.commit(generation, models);
        Ok(())
    }

    /// GET `/models/{name}`: one model's schema.
    pub async fn fetch_schema(&self, name: &str) -> Result<(), ClientError> {
        let generation = self.lock().schema.begin();
        let value = self.api.get(&format!("/models/{name}")).await?;
        let schema: ModelDescriptor = decode(value)?;
        self.lock().schema.commit(generation, Some(schema));
        Ok(())
    }

    // Administration. Descriptor payloads pass through verbatim and no
    // cached slot changes; callers re-fetch the registry afterwards.

    /// POST `/models`.
    pub async fn create_model(&self, descriptor: Value) -> Result<ModelDescriptor, ClientError> {
        let value = self.api.post("/models", descriptor).await?;
        Ok(decode(value)?)
    }

    /// PUT `/models`.
    pub async fn update_model(&self, descriptor: Value) -> Result<ModelDescriptor, ClientError> {
        let value = self.api.put("/models", descriptor).await?;
        Ok(decode(value)?)
    }

    /// DELETE `/models/{name}`.
    pub async fn delete_model(&self, name: &str) -> Result<(), ClientError> {
        self.api.delete(&format!("/models/{name}")).await?;
        Ok(())
    }

    pub fn models(&self) -> BTreeMap<String, ModelDescriptor> {
        self.lock().models.get().clone()
    }

    /// Sorted model names, the navigation menu's source of truth.
    pub fn model_names(&self) -> Vec<String> {
        self.lock().models.get().keys().cloned().collect()
    }

    pub fn schema(&self) -> Option<ModelDescriptor> {
        self.lock().schema.get().clone()
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value)
        .map_err(TransportError::from)
        .map_err(ClientError::from)
}
