//! Host-facing side of the custom field actions.
//!
//! A host runtime invokes an action by name with a JSON property bag. Whatever happens,
//! [`run_action`] answers with an [`ActionOutcome`]; it never returns an error.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::external_api::convertkit_api::ConvertkitApi;
use crate::external_api::{ApiError, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionName {
    ListFields,
    CreateField,
    UpdateField,
    DeleteField,
}

impl ActionName {
    pub const ALL: [ActionName; 4] = [
        ActionName::ListFields,
        ActionName::CreateField,
        ActionName::UpdateField,
        ActionName::DeleteField,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::ListFields => "custom_fields_list_fields",
            ActionName::CreateField => "custom_fields_create_field",
            ActionName::UpdateField => "custom_fields_update_field",
            ActionName::DeleteField => "custom_fields_delete_field",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActionName::ListFields => "Custom Fields: List Fields",
            ActionName::CreateField => "Custom Fields: Create Field",
            ActionName::UpdateField => "Custom Fields: Update Field",
            ActionName::DeleteField => "Custom Fields: Delete Field",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ActionName::ListFields => "Returns a list of all custom fields",
            ActionName::CreateField => "Create a new custom field",
            ActionName::UpdateField => "Update a custom field",
            ActionName::DeleteField => "Delete a custom field",
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionName {
    type Err = ApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ActionName::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| ApiError::UnknownAction(value.to_string()))
    }
}

/// `fields` may be a single label or a list of labels
#[derive(Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum FieldLabels {
    One(String),
    Many(Vec<String>),
}

impl FieldLabels {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            FieldLabels::One(label) => vec![label],
            FieldLabels::Many(labels) => labels,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct CreateFieldProps {
    pub fields: FieldLabels,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct UpdateFieldProps {
    pub label: String,
    pub new_label: String,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct DeleteFieldProps {
    pub label: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ActionSuccess {
    pub success: bool,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ActionFailure {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

/// Result of one action invocation; the `success` flag tells the two apart on the wire
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ActionOutcome {
    Success(ActionSuccess),
    Failure(ActionFailure),
}

impl ActionOutcome {
    pub fn success(status: u16, message: &str, data: Value) -> Self {
        ActionOutcome::Success(ActionSuccess {
            success: true,
            status,
            message: message.to_string(),
            data,
        })
    }

    pub fn failure(error: &ApiError) -> Self {
        ActionOutcome::Failure(ActionFailure {
            success: false,
            status: error.status(),
            message: error.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success(_))
    }
}

fn parse_props<P: serde::de::DeserializeOwned>(
    name: ActionName,
    props: Value,
) -> Result<P, ApiError> {
    // hosts send `null` for actions without props
    let props = if props.is_null() {
        Value::Object(Default::default())
    } else {
        props
    };
    serde_json::from_value(props)
        .map_err(|e| ApiError::InvalidProps(name.to_string(), e.to_string()))
}

async fn dispatch<T: Transport>(
    api: &ConvertkitApi<T>,
    name: ActionName,
    props: Value,
) -> Result<ActionOutcome, ApiError> {
    match name {
        ActionName::ListFields => {
            let data = api.list_fields().await?;
            Ok(ActionOutcome::success(200, "Fields listed", data))
        }
        ActionName::CreateField => {
            let props: CreateFieldProps = parse_props(name, props)?;
            let data = api.create_fields(&props.fields.into_vec()).await?;
            Ok(ActionOutcome::success(201, "Field created", data))
        }
        ActionName::UpdateField => {
            let props: UpdateFieldProps = parse_props(name, props)?;
            let record = api.update_field(&props.label, &props.new_label).await?;
            Ok(ActionOutcome::success(record.status, &record.message, Value::Null))
        }
        ActionName::DeleteField => {
            let props: DeleteFieldProps = parse_props(name, props)?;
            let record = api.delete_field(&props.label).await?;
            Ok(ActionOutcome::success(record.status, &record.message, Value::Null))
        }
    }
}

/// Run the action called `name` with the host's property bag
pub async fn run_action<T: Transport>(
    api: &ConvertkitApi<T>,
    name: &str,
    props: Value,
) -> ActionOutcome {
    let result = match name.parse::<ActionName>() {
        Ok(action) => {
            info!("[Action] running {}", action.display_name());
            dispatch(api, action, props).await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("[Action] {} failed: {}", name, e);
            ActionOutcome::failure(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_api::convertkit_api::testing::{recording_api, TEST_SECRET};
    use crate::external_api::HttpResponse;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("custom_fields_list_fields", ActionName::ListFields)]
    #[case("custom_fields_create_field", ActionName::CreateField)]
    #[case("custom_fields_update_field", ActionName::UpdateField)]
    #[case("custom_fields_delete_field", ActionName::DeleteField)]
    fn test_action_name_round_trip(#[case] value: &str, #[case] exp: ActionName) {
        assert_eq!(value.parse::<ActionName>().unwrap(), exp);
        assert_eq!(exp.to_string(), value);
    }

    #[test]
    fn test_action_metadata() {
        assert_eq!(ActionName::UpdateField.display_name(), "Custom Fields: Update Field");
        assert_eq!(ActionName::ListFields.description(), "Returns a list of all custom fields");
        assert!(ActionName::ALL
            .iter()
            .all(|name| name.as_str().starts_with("custom_fields_")));
    }

    #[test]
    fn test_unknown_action_name() {
        let err = "custom_fields_rename".parse::<ActionName>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown action: custom_fields_rename");
    }

    #[tokio::test]
    async fn test_update_outcome() {
        let api = recording_api(vec![HttpResponse::new(204, "")]);
        let outcome = run_action(
            &api,
            "custom_fields_update_field",
            json!({"label": "Age", "new_label": "Age Group"}),
        )
        .await;

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "status": 204, "message": "Field updated"})
        );
        assert_eq!(
            api.recorded()[0].body,
            Some(json!({"api_secret": TEST_SECRET, "label": "Age Group"}))
        );
    }

    #[tokio::test]
    async fn test_delete_outcome() {
        let api = recording_api(vec![HttpResponse::new(204, "")]);
        let outcome =
            run_action(&api, "custom_fields_delete_field", json!({"label": "Age Group"})).await;

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": true, "status": 204, "message": "Field deleted"})
        );
    }

    #[tokio::test]
    async fn test_create_outcome_carries_body() {
        let body = json!({"custom_field": {"label": "Age", "id": 7}});
        let api = recording_api(vec![HttpResponse::new(201, body.to_string())]);
        let outcome =
            run_action(&api, "custom_fields_create_field", json!({"fields": "Age"})).await;

        assert_eq!(outcome, ActionOutcome::success(201, "Field created", body));
    }

    #[tokio::test]
    async fn test_create_accepts_list_of_labels() {
        let api = recording_api(vec![HttpResponse::new(201, "[]")]);
        let outcome = run_action(
            &api,
            "custom_fields_create_field",
            json!({"fields": ["Age", "City"]}),
        )
        .await;

        assert!(outcome.is_success());
        assert_eq!(
            api.recorded()[0].body,
            Some(json!({"api_secret": TEST_SECRET, "label": ["Age", "City"]}))
        );
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!({}))]
    #[tokio::test]
    async fn test_list_outcome(#[case] props: Value) {
        let api = recording_api(vec![HttpResponse::new(200, r#"{"custom_fields":[]}"#)]);
        let outcome = run_action(&api, "custom_fields_list_fields", props).await;

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "success": true,
                "status": 200,
                "message": "Fields listed",
                "data": {"custom_fields": []}
            })
        );
    }

    #[tokio::test]
    async fn test_status_failure_keeps_status() {
        let api = recording_api(vec![HttpResponse::new(500, "")]);
        let outcome = run_action(
            &api,
            "custom_fields_update_field",
            json!({"label": "Age", "new_label": "Age Group"}),
        )
        .await;

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "status": 500, "message": "Error updating field: 500"})
        );
    }

    #[rstest]
    #[case("custom_fields_update_field", json!({"label": "Age"}))]
    #[case("custom_fields_delete_field", json!({}))]
    #[case("custom_fields_create_field", json!({"fields": 5}))]
    #[case("custom_fields_delete_field", json!({"label": "Age", "extra": true}))]
    #[tokio::test]
    async fn test_invalid_props(#[case] name: &str, #[case] props: Value) {
        let api = recording_api(vec![]);
        let outcome = run_action(&api, name, props).await;

        match outcome {
            ActionOutcome::Failure(failure) => {
                assert!(!failure.success);
                assert_eq!(failure.status, None);
                assert!(failure
                    .message
                    .starts_with(&format!("Invalid properties for action {name}")));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(api.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action_outcome() {
        let api = recording_api(vec![]);
        let outcome = run_action(&api, "custom_fields_rename", json!({})).await;

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "message": "Unknown action: custom_fields_rename"})
        );
    }

    #[tokio::test]
    async fn test_empty_label_outcome() {
        let api = recording_api(vec![]);
        let outcome = run_action(&api, "custom_fields_delete_field", json!({"label": ""})).await;

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"success": false, "message": "The label must not be empty"})
        );
    }
}
