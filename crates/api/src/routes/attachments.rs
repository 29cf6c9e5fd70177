//! Receipt attachments of transactions.
//!
//! The blob is written first and its path recorded second. When recording
//! fails the fresh blob is removed; when it replaces an older attachment the
//! old blob is removed.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{info, warn};

use crate::{AppState, error::ApiError, middleware::AuthUser, response::ApiResponse};
use tally_db::repositories::transaction::{TransactionDetail, TransactionRepository};
use tally_shared::{AppError, types::TransactionId};

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Upper bound on the whole multipart body; the storage service applies the
/// configured per-file limit.
const MULTIPART_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Creates the attachment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions/{transaction_id}/attachments",
            post(upload_attachment).get(download_attachment),
        )
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT))
}

struct Upload {
    filename: String,
    content_type: String,
    data: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("attachment").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        return Ok(Upload {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }
    Err(AppError::Validation(format!("The {FILE_FIELD} field is required")).into())
}

/// POST `/transactions/{transaction_id}/attachments` - Attach a receipt to a draft.
async fn upload_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<TransactionId>,
    multipart: Multipart,
) -> Result<ApiResponse<TransactionDetail>, ApiError> {
    let repo = TransactionRepository::new((*state.db).clone());
    repo.ensure_attachable(transaction_id)
        .await
        .inspect_err(|e| warn!(transaction_id = %transaction_id, error = %e, "Attachment refused"))?;

    let upload = read_upload(multipart).await?;
    let stored = state
        .storage
        .store_attachment(
            transaction_id,
            &upload.filename,
            &upload.content_type,
            upload.data,
        )
        .await?;

    let (detail, previous) = match repo.set_attachment(transaction_id, stored.path.clone()).await {
        Ok(recorded) => recorded,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&stored.path).await {
                warn!(path = %stored.path, error = %cleanup, "Orphaned attachment");
            }
            return Err(e.into());
        }
    };

    if let Some(old) = previous
        && let Err(e) = state.storage.delete(&old).await
    {
        warn!(path = %old, error = %e, "Orphaned attachment");
    }

    info!(
        transaction_id = %transaction_id,
        path = %stored.path,
        size = stored.size,
        user_id = %auth.user_id(),
        "Attachment stored"
    );
    Ok(ApiResponse::ok(detail).with_message("Attachment uploaded successfully"))
}

/// GET `/transactions/{transaction_id}/attachments` - Download the stored receipt.
async fn download_attachment(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, ApiError> {
    let repo = TransactionRepository::new((*state.db).clone());
    let detail = repo.find_transaction(transaction_id).await?;

    let Some(path) = detail.transaction.attachment_path else {
        return Err(AppError::NotFound(format!("attachment of transaction {transaction_id}")).into());
    };
    let data = state.storage.read(&path).await?;
    let filename = path.rsplit('/').next().unwrap_or("attachment");

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        data,
    )
        .into_response())
}
