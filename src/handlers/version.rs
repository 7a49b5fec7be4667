use actix_web::{HttpResponse, Responder};

use crate::build_info;
use crate::models::VersionInfo;

pub async fn version() -> impl Responder {
    HttpResponse::Ok().json(VersionInfo {
        version: build_info::VERSION,
        commit: build_info::COMMIT,
        date: build_info::BUILD_DATE,
    })
}
