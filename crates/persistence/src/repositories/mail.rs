//! Mail repository for database operations.

use sqlx::mysql::MySqlConnection;

use crate::entities::MailEntity;
use crate::metrics::QueryTimer;

/// Repository for the email table.
///
/// Borrows the request-scoped connection instead of holding a pool; statements
/// run in autocommit mode, so each insert is committed once it succeeds.
pub struct MailRepository<'c> {
    conn: &'c mut MySqlConnection,
}

impl<'c> MailRepository<'c> {
    /// Creates a new MailRepository over the given connection.
    pub fn new(conn: &'c mut MySqlConnection) -> Self {
        Self { conn }
    }

    /// List mails, newest first.
    ///
    /// With a search term, only mails whose content contains it are returned.
    pub async fn search(&mut self, term: Option<&str>) -> Result<Vec<MailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("search_mails");
        let result = match term {
            Some(term) => {
                sqlx::query_as::<_, MailEntity>(
                    r#"
                    SELECT id, email, subject, content
                    FROM email
                    WHERE content LIKE ?
                    ORDER BY id DESC
                    "#,
                )
                .bind(contains_pattern(term))
                .fetch_all(&mut *self.conn)
                .await
            }
            None => {
                sqlx::query_as::<_, MailEntity>(
                    r#"
                    SELECT id, email, subject, content
                    FROM email
                    ORDER BY id DESC
                    "#,
                )
                .fetch_all(&mut *self.conn)
                .await
            }
        };
        timer.record();
        result
    }

    /// Find a mail by id.
    pub async fn find_by_id(&mut self, id: i32) -> Result<Option<MailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_mail_by_id");
        let result = sqlx::query_as::<_, MailEntity>(
            "SELECT id, email, subject, content FROM email WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await;
        timer.record();
        result
    }

    /// Insert a mail and return the stored row.
    pub async fn insert(
        &mut self,
        email: &str,
        subject: &str,
        content: &str,
    ) -> Result<MailEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_mail");
        let result = sqlx::query("INSERT INTO email (email, subject, content) VALUES (?, ?, ?)")
            .bind(email)
            .bind(subject)
            .bind(content)
            .execute(&mut *self.conn)
            .await;
        timer.record();

        let id = i32::try_from(result?.last_insert_id())
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(MailEntity {
            id,
            email: email.to_string(),
            subject: subject.to_string(),
            content: content.to_string(),
        })
    }
}

/// Builds a `LIKE` pattern matching `term` anywhere, with wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
