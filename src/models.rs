use serde::Serialize;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    pub quality: u8,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl CompressionOptions {
    /// Resolves raw form values against the configured defaults.
    ///
    /// Values that are missing, unparsable or out of range are ignored and the
    /// default for that field is used instead.
    pub fn from_form(
        config: &Config,
        quality: Option<&str>,
        width: Option<&str>,
        height: Option<&str>,
    ) -> Self {
        CompressionOptions {
            quality: quality
                .and_then(|q| q.trim().parse::<u8>().ok())
                .filter(|q| (1..=100).contains(q))
                .unwrap_or(config.default_quality),
            width: parse_dimension(width).or(config.default_width),
            height: parse_dimension(height).or(config.default_height),
        }
    }
}

fn parse_dimension(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}

#[derive(Debug, Clone, Serialize)]
pub struct CompressionResult {
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub processing_time: f64,
    pub output_filename: String,
}

#[derive(Debug, Serialize)]
pub struct CompressResponse {
    pub original_file: String,
    pub output_file: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression_ratio: f64,
    pub processing_time: f64,
    pub width: u32,
    pub height: u32,
    pub download_url: String,
}

impl CompressResponse {
    pub fn new(
        original_file: impl Into<String>,
        result: CompressionResult,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            original_file: original_file.into(),
            download_url: format!("/api/download/{}", result.output_filename),
            output_file: result.output_filename,
            original_size: result.original_size,
            compressed_size: result.compressed_size,
            compression_ratio: result.compression_ratio,
            processing_time: result.processing_time,
            width,
            height,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
}
