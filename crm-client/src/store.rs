//! Generic per-model cache and CRUD operations.
//!
//! One working set at a time per concern: the store holds the
//! last-fetched collection, single instance, child map, and parent chain.
//! A slot changes only after the corresponding round-trip succeeds, and
//! every fetch is generation-guarded (see [`crate::slot`]) so a response
//! superseded by a later-issued fetch is discarded rather than applied.

use crate::api_client::ApiClient;
use crate::error::ClientError;
use crate::filter::{self, OwnerFilter};
use crate::slot::Slot;
use crate::transport::TransportError;
use crm_core::Instance;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Slots {
    collection: Slot<Vec<Instance>>,
    instance: Slot<Option<Instance>>,
    children: Slot<BTreeMap<String, Vec<Instance>>>,
    parent_chain: Slot<Vec<Instance>>,
    filter: OwnerFilter,
}

pub struct EntityStore {
    api: ApiClient,
    state: Mutex<Slots>,
}

impl EntityStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Mutex::new(Slots::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.state.lock().expect("store lock poisoned")
    }

    // ------------------------------------------------------------------
    // Fetch operations (each replaces one slot wholesale)
    // ------------------------------------------------------------------

    /// GET `/{model}`. Replaces the collection slot; never merges.
    pub async fn list_all(&self, model: &str) -> Result<(), ClientError> {
        let generation = self.lock().collection.begin();
        let value = self.api.get(&format!("/{model}")).await?;
        let rows: Vec<Instance> = decode(value)?;
        if !self.lock().collection.commit(generation, rows) {
            tracing::debug!(model, "discarding superseded collection fetch");
        }
        Ok(())
    }

    /// GET `/{model}/{id}`. Replaces the instance slot.
    pub async fn get_one(&self, model: &str, id: Uuid) -> Result<(), ClientError> {
        let generation = self.lock().instance.begin();
        let value = self.api.get(&format!("/{model}/{id}")).await?;
        let instance: Instance = decode(value)?;
        self.lock().instance.commit(generation, Some(instance));
        Ok(())
    }

    /// GET `/{model}/{id}/children`: every child, grouped by child model
    /// name. Replaces the children slot.
    pub async fn get_children(&self, model: &str, id: Uuid) -> Result<(), ClientError> {
        let generation = self.lock().children.begin();
        let value = self.api.get(&format!("/{model}/{id}/children")).await?;
        let children: BTreeMap<String, Vec<Instance>> = decode(value)?;
        self.lock().children.commit(generation, children);
        Ok(())
    }

    /// GET `/{model}/{id}/{child_model}`: homogeneous children of one
    /// type. Intentionally replaces the *collection* slot, since a
    /// child-type view and a top-level view are mutually exclusive at
    /// any instant.
    pub async fn get_children_of_type(
        &self,
        model: &str,
        id: Uuid,
        child_model: &str,
    ) -> Result<(), ClientError> {
        let generation = self.lock().collection.begin();
        let value = self.api.get(&format!("/{model}/{id}/{child_model}")).await?;
        let rows: Vec<Instance> = decode(value)?;
        if !self.lock().collection.commit(generation, rows) {
            tracing::debug!(model, child_model, "discarding superseded children fetch");
        }
        Ok(())
    }

    /// GET `/{model}/{id}/parent_chain`. Root-first ordering is a backend
    /// contract; the chain is stored exactly as received.
    pub async fn get_parent_chain(&self, model: &str, id: Uuid) -> Result<(), ClientError> {
        let generation = self.lock().parent_chain.begin();
        let value = self.api.get(&format!("/{model}/{id}/parent_chain")).await?;
        let chain: Vec<Instance> = decode(value)?;
        self.lock().parent_chain.commit(generation, chain);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutations (no optimistic slot updates; callers re-fetch)
    // ------------------------------------------------------------------

    /// POST `/{model}`. Returns the created record; the collection slot
    /// is left alone so server-defaulted fields are never guessed at.
    /// Callers refresh with [`EntityStore::list_all`].
    pub async fn create(&self, model: &str, payload: Value) -> Result<Instance, ClientError> {
        let value = self.api.post(&format!("/{model}"), payload).await?;
        Ok(decode(value)?)
    }

    /// PUT `/{model}` with full-replace semantics; the payload must carry
    /// the identifying key. No slot is touched.
    pub async fn update(&self, model: &str, payload: Value) -> Result<Instance, ClientError> {
        let value = self.api.put(&format!("/{model}"), payload).await?;
        Ok(decode(value)?)
    }

    /// PATCH `/{model}/{id}` with a single-field `{field, value}` patch.
    /// Replaces only the instance slot; the collection slot is unaffected
    /// until an explicit re-fetch.
    pub async fn partial_update(
        &self,
        model: &str,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<(), ClientError> {
        let generation = self.lock().instance.begin();
        let body = json!({ "field": field, "value": value });
        let response = self.api.patch(&format!("/{model}/{id}"), body).await?;
        let instance: Instance = decode(response)?;
        self.lock().instance.commit(generation, Some(instance));
        Ok(())
    }

    /// DELETE `/{model}/{id}`. Callers must refresh any collection view.
    pub async fn delete(&self, model: &str, id: Uuid) -> Result<(), ClientError> {
        self.api.delete(&format!("/{model}/{id}")).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Slot accessors and derived views
    // ------------------------------------------------------------------

    pub fn collection(&self) -> Vec<Instance> {
        self.lock().collection.get().clone()
    }

    /// Empty the collection slot before switching model context; any
    /// fetch still in flight for the old model is discarded on arrival.
    pub fn clear_collection(&self) {
        self.lock().collection.reset();
    }

    pub fn instance(&self) -> Option<Instance> {
        self.lock().instance.get().clone()
    }

    pub fn children(&self) -> BTreeMap<String, Vec<Instance>> {
        self.lock().children.get().clone()
    }

    pub fn parent_chain(&self) -> Vec<Instance> {
        self.lock().parent_chain.get().clone()
    }

    /// Sorted, de-duplicated `owned_by` projection of the cached
    /// collection. Computed locally; no request is issued.
    pub fn unique_owners(&self) -> Vec<String> {
        let state = self.lock();
        filter::unique_owners(state.collection.get())
    }

    /// The cached collection narrowed by the active owner filter, in
    /// original fetch order. The filter deliberately survives model
    /// switches, so a selection persists across navigation; recompute
    /// [`EntityStore::unique_owners`] after a fetch to prune selections
    /// that no longer occur.
    pub fn filtered_collection(&self) -> Vec<Instance> {
        let state = self.lock();
        state.filter.filtered(state.collection.get())
    }

    pub fn set_selected_owners(&self, owners: impl IntoIterator<Item = String>) {
        self.lock().filter.set_selected(owners);
    }

    pub fn selected_owners(&self) -> Vec<String> {
        self.lock().filter.selected().iter().cloned().collect()
    }

    pub fn clear_filters(&self) {
        self.lock().filter.clear();
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value)
        .map_err(TransportError::from)
        .map_err(ClientError::from)
}
