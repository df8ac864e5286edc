use std::path::Path;
use tracing::{debug, error, warn};

use axum::extract::Query;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use loco_rs::prelude::*;
use mime_guess;
use serde::Deserialize;
use tokio::{fs::File, io::ErrorKind};
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::common::blob_store::{self, FsBlobStore};
use crate::common::settings::Settings;

#[derive(Debug, Deserialize)]
pub struct BlobQuery {
    key: String,
    expires: u64,
    sig: String,
    #[serde(default)]
    dl: u8,
}

/// Serves one blob addressed by a presigned URL. The signature covers key,
/// expiry and disposition, so the link is a self-contained capability and
/// needs no session.
///
/// # Errors
///
/// - **`Error::Unauthorized`**:
///   - The link is expired or the signature does not verify.
///
/// - **`Error::NotFound`**:
///   - The key escapes the blob root (traversal attempt) or no blob
///     exists under it.
///
/// - **`Error::InternalServerError`**:
///   - An unexpected error occurred while opening or streaming the file.
pub async fn get_blob(
    Query(query): Query<BlobQuery>,
    State(ctx): State<AppContext>,
) -> Result<impl IntoResponse, Error> {
    debug!("get_blob called for key: {}", query.key);

    let settings = Settings::from_context(&ctx);
    let force_download = query.dl == 1;

    if query.expires < blob_store::now_unix() {
        warn!("Expired download link for key: {}", query.key);
        return Err(Error::Unauthorized("link expired".to_string()));
    }
    if !blob_store::verify_sig(
        &settings.presign_secret,
        &query.key,
        query.expires,
        force_download,
        &query.sig,
    ) {
        warn!("Bad signature on download link for key: {}", query.key);
        return Err(Error::Unauthorized("invalid signature".to_string()));
    }

    let store = FsBlobStore::from_settings(&settings);
    let path = store.resolve(&query.key).map_err(|e| {
        warn!("Blocked blob key: {}", e);
        Error::NotFound
    })?;

    let file = File::open(&path).await.map_err(|e| {
        error!("File open error: {}", e);
        match e.kind() {
            ErrorKind::NotFound => {
                debug!("Blob not found: {}", path.display());
                Error::NotFound
            }
            ErrorKind::PermissionDenied => {
                warn!("Permission denied: {}", path.display());
                Error::Unauthorized("Can't open file, permission denied.".to_string())
            }
            _ => Error::InternalServerError,
        }
    })?;

    let mime_type = mime_guess::from_path(&path)
        .first()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM);
    let disposition = if force_download {
        "attachment"
    } else {
        "inline"
    };
    let file_name = Path::new(&query.key)
        .file_name()
        .map_or_else(|| query.key.clone(), |n| n.to_string_lossy().to_string());

    let stream = FramedRead::new(file, BytesCodec::new());
    Ok(axum::response::Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{file_name}\""),
        )
        .body(Body::from_stream(stream))?)
}

pub fn routes() -> Routes {
    Routes::new().prefix("/download").add("/blob", get(get_blob))
}
