use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use clap::Parser;
use tracing::{error, info};

mod build_info;
mod config;
mod error;
mod handlers;
mod logging;
mod models;
mod services;

use config::Config;

/// Image Compressor - converts uploaded images to WebP over HTTP
#[derive(Parser, Debug)]
#[command(name = "image-compressor")]
struct Args {
    /// Show version information
    #[arg(long)]
    version: bool,
}

fn cors(domains: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(3600);

    if domains.is_empty() {
        cors.allow_any_origin()
    } else {
        domains
            .iter()
            .fold(cors, |cors, domain| cors.allowed_origin(domain))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    if args.version {
        println!("Image Compressor v{}", build_info::VERSION);
        println!("Commit: {}", build_info::COMMIT);
        println!("Build Date: {}", build_info::BUILD_DATE);
        return Ok(());
    }

    logging::init();

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    std::fs::create_dir_all(&config.download_dir)?;

    let bind = (config.host.clone(), config.port);
    let workers = config.workers;
    info!(
        version = build_info::VERSION,
        host = %bind.0,
        port = bind.1,
        download_dir = %config.download_dir.display(),
        max_file_size = config.max_file_size,
        "Image Compressor starting"
    );

    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&config.cors_domains))
            .wrap(Logger::default())
            .configure(handlers::routes(config.clone()))
    })
    .bind(bind)?
    .workers(workers)
    .run()
    .await
}
