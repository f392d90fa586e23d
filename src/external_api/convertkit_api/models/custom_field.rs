use serde_json::Value;

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CustomField {
    pub id: u64,
    pub label: String,
    /// Slug derived from the label by ConvertKit
    #[serde(default)]
    pub key: String,
    /// Internal name, `ck_field_<id>_<key>`
    #[serde(default)]
    pub name: String,
}

impl CustomField {
    #[cfg(test)]
    pub fn new(id: u64, label: &str) -> Self {
        let key = label.to_lowercase().replace(' ', "_");
        Self {
            id,
            label: label.to_string(),
            name: format!("ck_field_{id}_{key}"),
            key,
        }
    }

    /// Pull typed fields out of a list/create response.
    ///
    /// Accepts `{"custom_fields": [..]}`, `{"custom_field": {..}}`, a bare array or a bare object.
    /// Returns `None` when the body has none of these shapes.
    pub fn from_response(body: &Value) -> Option<Vec<CustomField>> {
        let inner = body
            .get("custom_fields")
            .or_else(|| body.get("custom_field"))
            .unwrap_or(body);
        match inner {
            Value::Array(_) => serde_json::from_value(inner.clone()).ok(),
            Value::Object(_) => serde_json::from_value(inner.clone())
                .ok()
                .map(|field| vec![field]),
            _ => None,
        }
    }
}
