//! Mail domain models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A mail that was sent and recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Mail {
    pub id: i32,
    pub email: String,
    pub subject: String,
    pub content: String,
}

/// Request to send a new mail.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateMailRequest {
    /// Recipient address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_subject"))]
    pub subject: String,

    /// Message body, sent as-is.
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub content: String,
}

impl CreateMailRequest {
    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn normalized(&self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }
}

/// Query parameters for listing mails.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailSearchQuery {
    /// Only mails whose content contains this text.
    pub search: Option<String>,
}

impl MailSearchQuery {
    /// The search term, ignoring empty or whitespace-only input.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Response for the mail listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListMailsResponse {
    pub mails: Vec<Mail>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::lorem::en::{Paragraph, Sentence};
    use fake::Fake;

    fn valid_request() -> CreateMailRequest {
        CreateMailRequest {
            email: SafeEmail().fake(),
            subject: Sentence(2..5).fake(),
            content: Paragraph(1..3).fake(),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let mut request = valid_request();
        request.email = "not-an-address".to_string();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_blank_subject_rejected() {
        let mut request = valid_request();
        request.subject = "   ".to_string();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("subject"));
    }

    #[test]
    fn test_blank_content_rejected() {
        let mut request = valid_request();
        request.content = String::new();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("content"));
    }

    #[test]
    fn test_all_fields_missing_reports_each() {
        let request = CreateMailRequest {
            email: String::new(),
            subject: String::new(),
            content: String::new(),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 3);
    }

    #[test]
    fn test_normalized_trims_fields() {
        let request = CreateMailRequest {
            email: "  user@example.com ".to_string(),
            subject: " Hi ".to_string(),
            content: "\nBody\n".to_string(),
        };
        let normalized = request.normalized();
        assert_eq!(normalized.email, "user@example.com");
        assert_eq!(normalized.subject, "Hi");
        assert_eq!(normalized.content, "Body");
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let query = MailSearchQuery {
            search: Some("  ".to_string()),
        };
        assert_eq!(query.term(), None);
        assert_eq!(MailSearchQuery::default().term(), None);
    }

    #[test]
    fn test_search_term_is_trimmed() {
        let query = MailSearchQuery {
            search: Some(" invoice ".to_string()),
        };
        assert_eq!(query.term(), Some("invoice"));
    }

    #[test]
    fn test_mail_serialization() {
        let mail = Mail {
            id: 7,
            email: "user@example.com".to_string(),
            subject: "Hello".to_string(),
            content: "Body".to_string(),
        };
        let json = serde_json::to_value(&mail).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "user@example.com");
    }
}
