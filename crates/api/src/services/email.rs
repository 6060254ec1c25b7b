//! Email service for delivering stored mails.
//!
//! Supports two providers:
//! - `console`: Logs emails to console (development)
//! - `sendgrid`: Uses the SendGrid v3 mail API

use crate::config::{EmailConfig, EmailProvider};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use validator::ValidateEmail;

/// Errors that can occur during email operations.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email service not configured")]
    NotConfigured,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient email address
    pub to: String,
    /// Recipient name (optional)
    pub to_name: Option<String>,
    /// Email subject
    pub subject: String,
    /// Plain text body
    pub body_text: String,
    /// HTML body (optional)
    pub body_html: Option<String>,
}

impl EmailMessage {
    /// Plain-text message with no recipient name.
    pub fn plain(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            to_name: None,
            subject: subject.into(),
            body_text: body.into(),
            body_html: None,
        }
    }
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
    client: reqwest::Client,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    /// The provider messages are sent through.
    pub fn provider(&self) -> EmailProvider {
        self.config.effective_provider()
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !message.to.validate_email() {
            return Err(EmailError::InvalidAddress(message.to));
        }

        match self.provider() {
            EmailProvider::Console => self.send_console(message).await,
            EmailProvider::Sendgrid => self.send_sendgrid(message).await,
        }
    }

    /// Send a plain-text mail to `to`.
    pub async fn send_mail(&self, to: &str, subject: &str, content: &str) -> Result<(), EmailError> {
        self.send(EmailMessage::plain(to, subject, content)).await
    }

    /// Console provider - logs email to console (for development).
    async fn send_console(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            from_name = ?self.config.sender_name,
            "Email (console provider)"
        );

        info!(body_text = %message.body_text, "Email body (plain text)");

        if let Some(html) = &message.body_html {
            debug!(body_html_length = html.len(), "Email body (HTML)");
        }

        Ok(())
    }

    /// SendGrid provider - sends via SendGrid API.
    async fn send_sendgrid(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.sendgrid_api_key.is_empty() || self.config.sender_email.is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let body = self.sendgrid_body(&message);
        let url = format!(
            "{}/v3/mail/send",
            self.config.sendgrid_api_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(self.config.sendgrid_api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SendGrid request failed: {}", e)))?;

        if response.status().is_success() {
            info!(
                to = %message.to,
                subject = %message.subject,
                "Email sent via SendGrid"
            );
            Ok(())
        } else {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                error = %error_body,
                "SendGrid API error"
            );
            Err(EmailError::ProviderError(format!(
                "SendGrid returned {}: {}",
                status, error_body
            )))
        }
    }

    /// Request body for `POST /v3/mail/send`.
    fn sendgrid_body(&self, message: &EmailMessage) -> serde_json::Value {
        let mut recipient = serde_json::json!({ "email": message.to });
        if let Some(name) = &message.to_name {
            recipient["name"] = serde_json::json!(name);
        }

        let mut from = serde_json::json!({ "email": self.config.sender_email });
        if let Some(name) = &self.config.sender_name {
            from["name"] = serde_json::json!(name);
        }

        let mut content = vec![serde_json::json!({
            "type": "text/plain",
            "value": message.body_text
        })];
        if let Some(html) = &message.body_html {
            content.push(serde_json::json!({
                "type": "text/html",
                "value": html
            }));
        }

        serde_json::json!({
            "personalizations": [{ "to": [recipient] }],
            "from": from,
            "subject": message.subject,
            "content": content
        })
    }
}
