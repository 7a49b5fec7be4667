use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::config::Config;

pub mod compress;
pub mod download;
pub mod version;

// room for multipart boundaries and the small text fields next to the file
const FORM_OVERHEAD: usize = 1024 * 1024;

/// Largest multipart body accepted before actix-multipart cuts the upload off.
pub fn upload_limit(config: &Config) -> usize {
    usize::try_from(config.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD)
}

pub fn routes(config: web::Data<Config>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(MultipartFormConfig::default().total_limit(upload_limit(&config)))
            .app_data(config)
            .route("/version", web::get().to(version::version))
            .service(
                web::scope("/api")
                    .route("/compress", web::post().to(compress::compress_image))
                    .service(
                        web::resource("/download/{filename:.*}")
                            .route(web::get().to(download::download_file))
                            .route(web::head().to(download::download_file)),
                    ),
            );
    }
}
