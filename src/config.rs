use dotenv::dotenv;
use image::ImageFormat;
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub download_dir: PathBuf,
    pub cors_domains: Vec<String>,

    pub max_file_size: u64,
    pub allowed_formats: Vec<String>,
    pub default_quality: u8,
    pub default_width: Option<u32>,
    pub default_height: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: 2,
            download_dir: PathBuf::from("./downloads"),
            cors_domains: Vec::new(),

            max_file_size: 10 * 1024 * 1024,
            allowed_formats: [".png", ".jpg", ".jpeg", ".gif"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            default_quality: 80,
            default_width: Some(1920),
            default_height: Some(1080),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let default_quality =
            Self::get_env_parsed(&lookup, "DEFAULT_QUALITY", defaults.default_quality)?;
        if !(1..=100).contains(&default_quality) {
            return Err(ConfigError::Invalid {
                key: "DEFAULT_QUALITY",
                message: format!("{} is outside 1-100", default_quality),
            });
        }

        let allowed_formats = match lookup("ALLOWED_FORMATS") {
            Some(raw) => Self::get_allowed_formats(&raw)?,
            None => defaults.allowed_formats,
        };

        Ok(Config {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: Self::get_env_parsed(&lookup, "PORT", defaults.port)?,
            workers: Self::get_env_parsed(&lookup, "WORKERS", defaults.workers)?,
            download_dir: lookup("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
            cors_domains: lookup("CORS_DOMAINS")
                .map(|raw| Self::split_list(&raw))
                .unwrap_or_default(),

            max_file_size: Self::get_env_parsed(&lookup, "MAX_FILE_SIZE", defaults.max_file_size)?,
            allowed_formats,
            default_quality,
            default_width: Self::get_env_dimension(
                &lookup,
                "DEFAULT_WIDTH",
                defaults.default_width,
            )?,
            default_height: Self::get_env_dimension(
                &lookup,
                "DEFAULT_HEIGHT",
                defaults.default_height,
            )?,
        })
    }

    fn get_env_parsed<T>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &'static str,
        default: T,
    ) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match lookup(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                message: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    // 0 disables the bound
    fn get_env_dimension(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &'static str,
        default: Option<u32>,
    ) -> Result<Option<u32>, ConfigError> {
        let value: u32 = Self::get_env_parsed(lookup, key, default.unwrap_or(0))?;
        Ok((value > 0).then_some(value))
    }

    /// Every listed extension must be one this build can decode.
    fn get_allowed_formats(raw: &str) -> Result<Vec<String>, ConfigError> {
        let formats: Vec<String> = Self::split_list(raw)
            .iter()
            .map(|f| normalize_extension(f))
            .collect();
        if formats.is_empty() {
            return Err(ConfigError::Invalid {
                key: "ALLOWED_FORMATS",
                message: "no formats listed".to_string(),
            });
        }

        let undecodable: Vec<&str> = formats
            .iter()
            .map(String::as_str)
            .filter(|ext| {
                !ImageFormat::from_extension(ext.trim_start_matches('.'))
                    .is_some_and(|format| format.reading_enabled())
            })
            .collect();
        if !undecodable.is_empty() {
            return Err(ConfigError::Invalid {
                key: "ALLOWED_FORMATS",
                message: format!("cannot decode {}", undecodable.join(", ")),
            });
        }

        Ok(formats)
    }

    fn split_list(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Lowercases an extension and ensures it carries a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}
