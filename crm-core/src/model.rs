//! Model registry descriptors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Description of one model known to the backend.
///
/// Field descriptors are display metadata for rendering collaborators;
/// the client passes them through without interpreting them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
