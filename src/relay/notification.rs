use serde::{Deserialize, Serialize};

use super::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A user-visible, dismissible message about a relay attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub dismissible: bool,
}

impl Notification {
    pub fn sent(to_email: &str) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: "Postcard sent".to_string(),
            message: format!("Your postcard is on its way to {}.", to_email.trim()),
            dismissible: true,
        }
    }

    pub fn from_error(err: &RelayError) -> Self {
        let message = match err {
            RelayError::InvalidRecipient(addr) => {
                format!("\"{}\" doesn't look like an email address.", addr.trim())
            }
            RelayError::NotConfigured => "Sending by email is not set up.".to_string(),
            RelayError::Transport(_) => {
                "Couldn't reach the email service. Your postcard can still be downloaded."
                    .to_string()
            }
            RelayError::Rejected { status, .. } => format!(
                "The email service refused the postcard (HTTP {status}). You can still download it."
            ),
        };
        Self {
            level: NotificationLevel::Error,
            title: "Postcard not sent".to_string(),
            message,
            dismissible: true,
        }
    }
}
