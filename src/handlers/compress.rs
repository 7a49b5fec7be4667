use std::time::Instant;

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_multipart::MultipartError;
use actix_web::{error::PayloadError, http::header, web, HttpRequest, HttpResponse};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ApiError, TranscodeError, ValidationError};
use crate::handlers::upload_limit;
use crate::models::{ApiResponse, CompressResponse, CompressionOptions};
use crate::services::reporter;
use crate::services::transcoder::Transcoder;
use crate::services::validator;

#[derive(MultipartForm)]
pub struct CompressForm {
    #[multipart(rename = "image")]
    image: Option<TempFile>,
    quality: Option<Text<String>>,
    width: Option<Text<String>>,
    height: Option<Text<String>>,
}

/// Maps a failed multipart extraction onto the API's validation errors.
///
/// A body cut off at the upload limit is reported as `FileTooLarge`, sized by
/// `Content-Length` when the client sent one.
pub fn rejected_form(err: &actix_web::Error, req: &HttpRequest, config: &Config) -> ApiError {
    let limit = upload_limit(config) as u64;
    let content_length = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let too_large = matches!(
        err.as_error::<MultipartError>(),
        Some(MultipartError::Payload(PayloadError::Overflow))
    ) || content_length.is_some_and(|len| len > limit);

    if too_large {
        ValidationError::FileTooLarge {
            size: content_length.unwrap_or(limit),
            max: config.max_file_size,
        }
        .into()
    } else {
        ValidationError::MalformedForm(err.to_string()).into()
    }
}

pub async fn compress_image(
    req: HttpRequest,
    config: web::Data<Config>,
    form: Result<MultipartForm<CompressForm>, actix_web::Error>,
) -> Result<HttpResponse, ApiError> {
    let started = Instant::now();
    let MultipartForm(form) = form.map_err(|err| rejected_form(&err, &req, &config))?;

    let image = form.image.ok_or(ValidationError::MissingFile)?;
    let source_name = image
        .file_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .ok_or(ValidationError::InvalidFilename)?;

    validator::validate_upload(&config, image.size as u64, &source_name)?;

    let options = CompressionOptions::from_form(
        &config,
        form.quality.as_deref().map(String::as_str),
        form.width.as_deref().map(String::as_str),
        form.height.as_deref().map(String::as_str),
    );
    info!(
        file = %source_name,
        size = image.size,
        quality = options.quality,
        width = ?options.width,
        height = ?options.height,
        "compressing upload"
    );

    let transcoder = Transcoder::new(config.download_dir.clone());
    let name = source_name.clone();
    let (original_size, output) = web::block(move || {
        let source = std::fs::read(image.file.path()).map_err(TranscodeError::Read)?;
        let output = transcoder.transcode(&source, &name, &options)?;
        Ok::<_, TranscodeError>((source.len() as u64, output))
    })
    .await??;
    debug!(path = %output.path.display(), "output written");

    let result = reporter::report(original_size, output.size, output.filename, started);
    info!(
        original_size = result.original_size,
        compressed_size = result.compressed_size,
        ratio = result.compression_ratio,
        seconds = result.processing_time,
        output = %result.output_filename,
        "compression completed"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(CompressResponse::new(
        source_name,
        result,
        output.width,
        output.height,
    ))))
}
