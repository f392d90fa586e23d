pub mod models;

use std::time::Duration;

use log::{debug, warn};
use reqwest::Method;
use serde_json::Value;

use super::{ApiError, BaseApiClient, HttpResponse, Transport};
use crate::config::Config;
use models::field_request::FieldRequestBody;
use models::status_record::StatusRecord;

pub const CUSTOM_FIELDS_ENDPOINT: &str = "custom_fields";

/// The four custom field operations and what each expects back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOperation {
    List,
    Create,
    Update,
    Delete,
}

impl FieldOperation {
    pub fn method(&self) -> Method {
        match self {
            FieldOperation::List => Method::GET,
            FieldOperation::Create => Method::POST,
            FieldOperation::Update => Method::PUT,
            FieldOperation::Delete => Method::DELETE,
        }
    }

    /// The only status treated as success
    pub fn expected_status(&self) -> u16 {
        match self {
            FieldOperation::List => 200,
            FieldOperation::Create => 201,
            FieldOperation::Update | FieldOperation::Delete => 204,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FieldOperation::List => "listing fields",
            FieldOperation::Create => "creating field",
            FieldOperation::Update => "updating field",
            FieldOperation::Delete => "deleting field",
        }
    }
}

/// Custom field actions of the ConvertKit API.
///
/// Holds the base URL and account secret; every call is a single request through `T`.
pub struct ConvertkitApi<T: Transport = BaseApiClient> {
    transport: T,
    base_url: String,
    api_secret: String,
}

impl ConvertkitApi<BaseApiClient> {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let transport = BaseApiClient::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(
            transport,
            &config.api_base_url,
            &config.api_secret,
        ))
    }
}

impl<T: Transport> ConvertkitApi<T> {
    pub fn with_transport(transport: T, base_url: &str, api_secret: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_secret: api_secret.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fields_url(&self) -> String {
        format!("{}/{}", self.base_url, CUSTOM_FIELDS_ENDPOINT)
    }

    // Label goes into the path verbatim, without percent-encoding
    fn field_url(&self, label: &str) -> String {
        format!("{}/{}/{}", self.base_url, CUSTOM_FIELDS_ENDPOINT, label)
    }

    async fn send(
        &self,
        operation: FieldOperation,
        url: &str,
        body: &FieldRequestBody<'_>,
    ) -> Result<HttpResponse, ApiError> {
        let body = serde_json::to_value(body)?;
        debug!("[ConvertkitApi] {} {}", operation.method(), url);
        let response = self.transport.send(operation.method(), url, Some(&body)).await?;
        if response.status != operation.expected_status() {
            warn!(
                "[ConvertkitApi] {} returned {}, expected {}",
                operation.description(),
                response.status,
                operation.expected_status()
            );
            return Err(ApiError::UnexpectedStatus(
                operation.description().to_string(),
                response.status,
            ));
        }
        Ok(response)
    }

    /// All custom fields of the account, decoded body returned as is.
    ///
    /// A body that is not JSON is returned as a string.
    pub async fn list_fields(&self) -> Result<Value, ApiError> {
        let body = FieldRequestBody::secret_only(&self.api_secret);
        let response = self
            .send(FieldOperation::List, &self.fields_url(), &body)
            .await?;
        Ok(response.json_or_text())
    }

    /// Create one field, or several in a single request.
    ///
    /// Returns the decoded body unchanged on 201. The field exists at that point,
    /// so a body that is not JSON is returned as a string instead of failing.
    pub async fn create_fields(&self, labels: &[String]) -> Result<Value, ApiError> {
        if labels.is_empty() {
            return Err(ApiError::NoFieldLabels);
        }
        for label in labels {
            require_label(label, "field label")?;
        }
        let body = FieldRequestBody::with_labels(&self.api_secret, labels);
        let response = self
            .send(FieldOperation::Create, &self.fields_url(), &body)
            .await?;
        Ok(response.json_or_text())
    }

    /// Rename the field currently labelled `label`
    pub async fn update_field(
        &self,
        label: &str,
        new_label: &str,
    ) -> Result<StatusRecord, ApiError> {
        require_label(label, "label")?;
        require_label(new_label, "new label")?;
        let body = FieldRequestBody::with_label(&self.api_secret, new_label);
        let response = self
            .send(FieldOperation::Update, &self.field_url(label), &body)
            .await?;
        Ok(StatusRecord::success(response.status, "Field updated"))
    }

    pub async fn delete_field(&self, label: &str) -> Result<StatusRecord, ApiError> {
        require_label(label, "label")?;
        let body = FieldRequestBody::secret_only(&self.api_secret);
        let response = self
            .send(FieldOperation::Delete, &self.field_url(label), &body)
            .await?;
        Ok(StatusRecord::success(response.status, "Field deleted"))
    }
}

fn require_label(value: &str, what: &'static str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::EmptyLabel(what));
    }
    Ok(())
}


#[cfg(test)]
impl ConvertkitApi<BaseApiClient> {
    pub fn mock(url: &str) -> Self {
        let transport = BaseApiClient::new(Duration::from_secs(5)).unwrap();
        Self::with_transport(transport, url, testing::TEST_SECRET)
    }

    pub async fn mock_list_fields(
        server: &mut mockito::ServerGuard,
        status: usize,
        body: &Value,
    ) -> mockito::Mock {
        server
            .mock("GET", "/custom_fields")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"api_secret": testing::TEST_SECRET}),
            ))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    pub async fn mock_create_field(
        server: &mut mockito::ServerGuard,
        label: &Value,
        status: usize,
        body: &Value,
    ) -> mockito::Mock {
        server
            .mock("POST", "/custom_fields")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"api_secret": testing::TEST_SECRET, "label": label}),
            ))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    pub async fn mock_update_field(
        server: &mut mockito::ServerGuard,
        label: &str,
        new_label: &str,
        status: usize,
    ) -> mockito::Mock {
        server
            .mock("PUT", format!("/custom_fields/{label}").as_str())
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"api_secret": testing::TEST_SECRET, "label": new_label}),
            ))
            .with_status(status)
            .create_async()
            .await
    }

    pub async fn mock_delete_field(
        server: &mut mockito::ServerGuard,
        label: &str,
        status: usize,
    ) -> mockito::Mock {
        server
            .mock("DELETE", format!("/custom_fields/{label}").as_str())
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"api_secret": testing::TEST_SECRET}),
            ))
            .with_status(status)
            .create_async()
            .await
    }
}
