//! Mail entity (database row mapping).

use domain::models::Mail;
use sqlx::FromRow;

/// Database row mapping for the email table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MailEntity {
    pub id: i32,
    pub email: String,
    pub subject: String,
    pub content: String,
}

impl From<MailEntity> for Mail {
    fn from(entity: MailEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            subject: entity.subject,
            content: entity.content,
        }
    }
}
