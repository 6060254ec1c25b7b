//! Mail endpoint handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use domain::models::{CreateMailRequest, ListMailsResponse, Mail, MailSearchQuery};
use persistence::repositories::MailRepository;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SharedRequestDb;

/// List stored mails, newest first.
///
/// GET /api/v1/mails?search=<text>
pub async fn list_mails(
    Extension(db): Extension<SharedRequestDb>,
    query: Result<Query<MailSearchQuery>, QueryRejection>,
) -> Result<Json<ListMailsResponse>, ApiError> {
    let Query(query) = query?;
    let term = query.term();

    let mut db = db.lock().await;
    let connection = db.get_connection().await?;
    let mails = MailRepository::new(connection).search(term).await?;

    Ok(Json(ListMailsResponse {
        mails: mails.into_iter().map(Mail::from).collect(),
        search: term.map(str::to_string),
    }))
}

/// Get a single mail.
///
/// GET /api/v1/mails/:id
pub async fn get_mail(
    Extension(db): Extension<SharedRequestDb>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Mail>, ApiError> {
    let Path(id) = id?;
    let mut db = db.lock().await;
    let connection = db.get_connection().await?;
    let mail = MailRepository::new(connection)
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Mail {} not found", id)))?;

    Ok(Json(mail.into()))
}

/// Send a mail and record it.
///
/// POST /api/v1/mails
///
/// The record is only inserted after the provider accepted the message.
/// A delivered message that cannot be recorded is logged with its recipient.
pub async fn create_mail(
    State(state): State<AppState>,
    Extension(db): Extension<SharedRequestDb>,
    payload: Result<Json<CreateMailRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Mail>), ApiError> {
    let Json(request) = payload?;
    let request = request.normalized();
    request.validate()?;

    state
        .email
        .send_mail(&request.email, &request.subject, &request.content)
        .await?;

    let mail = match store_mail(&db, &request).await {
        Ok(mail) => mail,
        Err(e) => {
            warn!(
                recipient = %request.email,
                subject = %request.subject,
                error = %e,
                "Mail delivered but not recorded"
            );
            return Err(e.into());
        }
    };

    info!(mail_id = mail.id, "Mail sent and recorded");

    Ok((StatusCode::CREATED, Json(mail)))
}

async fn store_mail(db: &SharedRequestDb, request: &CreateMailRequest) -> Result<Mail, sqlx::Error> {
    let mut db = db.lock().await;
    let connection = db.get_connection().await?;
    let entity = MailRepository::new(connection)
        .insert(&request.email, &request.subject, &request.content)
        .await?;
    Ok(entity.into())
}
