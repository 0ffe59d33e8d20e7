//! Email relay - hands a finished postcard to a transactional email service
//!
//! The relay is optional and never retried. Its failures turn into
//! dismissible [`Notification`]s; the composited image stays valid.

mod notification;

pub use notification::{Notification, NotificationLevel};

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::config::RelayConfig;
use crate::export::PreviewImage;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid recipient address: {0:?}")]
    InvalidRecipient(String),

    #[error("Email relay is not configured")]
    NotConfigured,

    #[error("Relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Relay rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<RelayError> for String {
    fn from(e: RelayError) -> Self {
        e.to_string()
    }
}

/// What the user typed into the send dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub to_email: String,
    pub subject: String,
    pub message: String,
}

impl EmailRequest {
    /// Cheap shape check; the relay does the real validation.
    pub fn validate(&self) -> Result<(), RelayError> {
        let addr = self.to_email.trim();
        let valid = match addr.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !addr.contains(char::is_whitespace)
            }
            None => false,
        };
        if valid {
            Ok(())
        } else {
            Err(RelayError::InvalidRecipient(self.to_email.clone()))
        }
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    subject: &'a str,
    message: &'a str,
    /// Data URL of the composite
    attachment: String,
}

pub struct RelayClient {
    http: reqwest::Client,
    config: RelayConfig,
}

impl RelayClient {
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn from_config(config: Option<&RelayConfig>) -> Result<Self, RelayError> {
        Self::new(config.cloned().ok_or(RelayError::NotConfigured)?)
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Post one message with the image attached. A non-2xx answer is `Rejected`.
    pub async fn send(&self, request: &EmailRequest, image: &PreviewImage) -> Result<(), RelayError> {
        request.validate()?;

        let payload = RelayPayload {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            template_params: TemplateParams {
                to_email: request.to_email.trim(),
                subject: &request.subject,
                message: &request.message,
                attachment: image.data_url(),
            },
        };

        tracing::info!(
            "[Relay] sending {} ({} bytes) to {}",
            image.file_name(),
            image.bytes.len(),
            request.to_email.trim()
        );
        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("[Relay] rejected with {}: {}", status, body);
            return Err(RelayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!("[Relay] accepted ({})", status);
        Ok(())
    }
}
