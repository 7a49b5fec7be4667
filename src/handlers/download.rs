use std::io;

use actix_web::{
    body::SizedStream,
    http::{
        header::{ContentDisposition, DispositionParam, DispositionType},
        Method,
    },
    web, HttpResponse,
};
use futures_util::{stream, StreamExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, ValidationError};

/// Rejects anything that could step outside the download directory.
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty() && !filename.contains("..") && !filename.contains(['/', '\\'])
}

pub async fn download_file(
    filename: web::Path<String>,
    method: Method,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    let filename = filename.into_inner();
    if !is_safe_filename(&filename) {
        warn!(filename = %filename, "rejected download filename");
        return Err(ValidationError::InvalidFilename.into());
    }

    let path = config.download_dir.join(&filename);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(filename));
        }
        Err(e) => return Err(ApiError::Internal(e.to_string())),
    };

    let metadata = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !metadata.is_file() {
        return Err(ApiError::NotFound(filename));
    }
    let file_size = metadata.len();
    debug!(filename = %filename, size = file_size, "serving download");

    let stream = match method {
        // empty stream for HEAD requests
        Method::HEAD => stream::empty::<Result<web::Bytes, io::Error>>().boxed_local(),

        _ => ReaderStream::new(file).boxed_local(),
    };

    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .no_chunking(file_size)
        .body(SizedStream::new(file_size, stream)))
}
