use crate::actions::run_action;
use crate::constants::Message;
use crate::external_api::convertkit_api::models::custom_field::CustomField;
use crate::external_api::convertkit_api::ConvertkitApi;
use crate::external_api::{ApiError, Transport};
use serde_json::Value;
use std::io::{BufRead, Write};

/// Render a list/create body as lines; falls back to pretty JSON for unknown shapes
fn format_fields(body: &Value) -> Result<String, ApiError> {
    match CustomField::from_response(body) {
        Some(fields) if fields.is_empty() => Ok(Message::NoCustomFields.to_formatted_string()),
        Some(fields) => {
            let mut lines = vec![Message::FieldsFound(fields.len()).to_formatted_string()];
            lines.extend(fields.into_iter().map(|field| {
                Message::FieldLine(field.label, field.key, field.id).to_formatted_string()
            }));
            Ok(lines.join("\n"))
        }
        None => Ok(serde_json::to_string_pretty(body)?),
    }
}

/// List all custom fields
pub async fn list_fields<T: Transport>(api: &ConvertkitApi<T>) -> Result<String, ApiError> {
    let body = api.list_fields().await?;
    format_fields(&body)
}

/// Create one or more custom fields
pub async fn create_fields<T: Transport>(
    api: &ConvertkitApi<T>,
    labels: &[String],
) -> Result<String, ApiError> {
    let body = api.create_fields(labels).await?;
    match CustomField::from_response(&body) {
        Some(fields) if !fields.is_empty() => Ok(fields
            .into_iter()
            .map(|field| Message::FieldCreated(field.label).to_formatted_string())
            .collect::<Vec<_>>()
            .join("\n")),
        _ => Ok(labels
            .iter()
            .map(|label| Message::FieldCreated(label.clone()).to_formatted_string())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub async fn update_field<T: Transport>(
    api: &ConvertkitApi<T>,
    label: &str,
    new_label: &str,
) -> Result<String, ApiError> {
    let record = api.update_field(label, new_label).await?;
    Ok(record.message)
}

/// Delete a custom field, asking first unless `skip_confirmation`
pub async fn delete_field<T, R, W>(
    api: &ConvertkitApi<T>,
    label: &str,
    skip_confirmation: bool,
    input: R,
    output: W,
) -> Result<String, ApiError>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    if !skip_confirmation {
        confirm_delete(label, input, output)?;
    }
    let record = api.delete_field(label).await?;
    Ok(record.message)
}

/// Run an action the way a host would, printing the outcome as JSON
pub async fn run_action_by_name<T: Transport>(
    api: &ConvertkitApi<T>,
    name: &str,
    props: Option<&str>,
) -> Result<String, ApiError> {
    let props = match props {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| ApiError::InvalidProps(name.to_string(), e.to_string()))?,
        None => Value::Null,
    };
    let outcome = run_action(api, name, props).await;
    Ok(serde_json::to_string_pretty(&outcome)?)
}

fn confirm_delete<R, W>(label: &str, mut input: R, mut output: W) -> Result<(), ApiError>
where
    R: BufRead,
    W: Write,
{
    output.write_all(
        Message::ApproveDeleteField(label.to_string())
            .to_formatted_string()
            .as_bytes(),
    )?;
    output.flush()?;

    let mut confirmation = String::new();
    input.read_line(&mut confirmation)?;

    let trimmed = confirmation.trim().to_lowercase();
    if !matches!(trimmed.as_str(), "y" | "yes" | "") {
        return Err(ApiError::DeleteCancelledByUser);
    }
    Ok(())
}
