//! SQL passthrough and stored-report management.
//!
//! Statements and bind parameters travel to the backend verbatim; the
//! client never parses, validates, or interpolates SQL. Rows come back
//! as opaque JSON objects since result shape depends entirely on the
//! statement.

use crate::api_client::ApiClient;
use crate::error::ClientError;
use crate::slot::Slot;
use crate::transport::TransportError;
use crm_core::{Report, ResultSet};
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};

pub struct SqlPassthrough {
    api: ApiClient,
    results: Mutex<Slot<ResultSet>>,
}

impl SqlPassthrough {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            results: Mutex::new(Slot::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<ResultSet>> {
        self.results.lock().expect("result slot poisoned")
    }

    /// POST `/sql/report/{name}` with the positional bind list as body.
    /// Replaces the result-set slot.
    pub async fn run_stored_report(
        &self,
        name: &str,
        bind_params: Vec<Value>,
    ) -> Result<(), ClientError> {
        let generation = self.lock().begin();
        let value = self
            .api
            .post(&format!("/sql/report/{name}"), Value::Array(bind_params))
            .await?;
        let rows: ResultSet = decode(value)?;
        if !self.lock().commit(generation, rows) {
            tracing::debug!(name, "discarding superseded report run");
        }
        Ok(())
    }

    /// POST `/sql/select` with `{stmt, bind_params}`. Replaces the
    /// result-set slot.
    pub async fn run_select(
        &self,
        stmt: &str,
        bind_params: Vec<Value>,
    ) -> Result<(), ClientError> {
        let generation = self.lock().begin();
        let body = json!({ "stmt": stmt, "bind_params": bind_params });
        let value = self.api.post("/sql/select", body).await?;
        let rows: ResultSet = decode(value)?;
        if !self.lock().commit(generation, rows) {
            tracing::debug!("discarding superseded select run");
        }
        Ok(())
    }

    /// POST `/sql/dml` with `{stmt, bind_params}`. The backend answers
    /// with a row list (empty without a `RETURNING` clause); like the
    /// other two runners it replaces the result-set slot.
    pub async fn run_dml(&self, stmt: &str, bind_params: Vec<Value>) -> Result<(), ClientError> {
        let generation = self.lock().begin();
        let body = json!({ "stmt": stmt, "bind_params": bind_params });
        let value = self.api.post("/sql/dml", body).await?;
        let rows: ResultSet = decode(value)?;
        if !self.lock().commit(generation, rows) {
            tracing::debug!("discarding superseded dml run");
        }
        Ok(())
    }

    pub fn results(&self) -> ResultSet {
        self.lock().get().clone()
    }

    pub fn clear_results(&self) {
        self.lock().reset();
    }

    // Stored report definitions. Plain passthrough CRUD; nothing is
    // cached because report lists are small and always re-fetched by the
    // surfaces that show them.

    /// GET `/reports`.
    pub async fn list_reports(&self) -> Result<Vec<Report>, ClientError> {
        let value = self.api.get("/reports").await?;
        Ok(decode(value)?)
    }

    /// GET `/reports/{name}`.
    pub async fn get_report(&self, name: &str) -> Result<Report, ClientError> {
        let value = self.api.get(&format!("/reports/{name}")).await?;
        Ok(decode(value)?)
    }

    /// POST `/reports` with `{name, sql_stmt}`.
    pub async fn create_report(&self, name: &str, sql_stmt: &str) -> Result<Report, ClientError> {
        let body = json!({ "name": name, "sql_stmt": sql_stmt });
        let value = self.api.post("/reports", body).await?;
        Ok(decode(value)?)
    }

    /// PUT `/reports/{name}` with the replacement statement.
    pub async fn update_report(&self, name: &str, sql_stmt: &str) -> Result<Report, ClientError> {
        let body = json!({ "name": name, "sql_stmt": sql_stmt });
        let value = self.api.put(&format!("/reports/{name}"), body).await?;
        Ok(decode(value)?)
    }

    /// DELETE `/reports/{name}`.
    pub async fn delete_report(&self, name: &str) -> Result<(), ClientError> {
        self.api.delete(&format!("/reports/{name}")).await?;
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value)
        .map_err(TransportError::from)
        .map_err(ClientError::from)
}
