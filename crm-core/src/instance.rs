//! Generic model-instance record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One record of a named model.
///
/// The client only ever inspects a small set of well-known fields: `id`,
/// `owned_by`, the `(parent_type, parent_id)` pair and `attachments`.
/// Everything else a model defines (name, tags, audit columns, custom
/// fields) rides in `fields` untouched and round-trips as-is.
///
/// An instance belongs to exactly one model name, the one whose collection
/// it was fetched under; the record itself does not carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: Uuid,
    #[serde(default)]
    pub owned_by: String,
    #[serde(default)]
    pub parent_type: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Instance {
    /// The `(parent_type, parent_id)` pair, when both halves are present.
    pub fn parent(&self) -> Option<(&str, Uuid)> {
        match (self.parent_type.as_deref(), self.parent_id) {
            (Some(parent_type), Some(parent_id)) => Some((parent_type, parent_id)),
            _ => None,
        }
    }

    /// A model-specific field by name, if the backend sent one.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "id": "018f2b6a-7c1e-7f6a-b3cd-3b7f2c4d5e6f",
            "owned_by": "dario",
            "parent_type": "account",
            "parent_id": "018f2b6a-7c1e-7f6a-b3cd-3b7f2c4d5e70",
            "attachments": ["quote.pdf"],
            "name": "q3 renewal",
            "tags": ["priority", "renewal"],
            "created_at": "2024-02-02T13:58:07Z",
            "amount": 125000.5
        })
    }

    #[test]
    fn deserializes_well_known_fields() {
        let instance: Instance = serde_json::from_value(sample()).unwrap();
        assert_eq!(instance.owned_by, "dario");
        assert_eq!(instance.attachments, vec!["quote.pdf".to_string()]);
        let (parent_type, parent_id) = instance.parent().unwrap();
        assert_eq!(parent_type, "account");
        assert_eq!(
            parent_id.to_string(),
            "018f2b6a-7c1e-7f6a-b3cd-3b7f2c4d5e70"
        );
    }

    #[test]
    fn model_specific_fields_land_in_extension_map() {
        let instance: Instance = serde_json::from_value(sample()).unwrap();
        assert_eq!(instance.field("name"), Some(&json!("q3 renewal")));
        assert_eq!(instance.field("amount"), Some(&json!(125000.5)));
        assert_eq!(instance.field("tags"), Some(&json!(["priority", "renewal"])));
        assert!(instance.field("nonexistent").is_none());
    }

    #[test]
    fn extension_map_round_trips() {
        let original = sample();
        let instance: Instance = serde_json::from_value(original.clone()).unwrap();
        let back = serde_json::to_value(&instance).unwrap();
        for key in ["name", "tags", "created_at", "amount"] {
            assert_eq!(back.get(key), original.get(key), "field {key}");
        }
    }

    #[test]
    fn missing_optionals_default() {
        let instance: Instance = serde_json::from_value(json!({
            "id": "018f2b6a-7c1e-7f6a-b3cd-3b7f2c4d5e6f"
        }))
        .unwrap();
        assert_eq!(instance.owned_by, "");
        assert!(instance.parent().is_none());
        assert!(instance.attachments.is_empty());
        assert!(instance.fields.is_empty());
    }

    #[test]
    fn parent_requires_both_halves() {
        let instance: Instance = serde_json::from_value(json!({
            "id": "018f2b6a-7c1e-7f6a-b3cd-3b7f2c4d5e6f",
            "parent_type": "account"
        }))
        .unwrap();
        assert!(instance.parent().is_none());
    }
}
