use std::path::Path;

use crate::config::{normalize_extension, Config};
use crate::error::ValidationError;

/// Checks an upload's declared size and extension against the configured limits.
///
/// The size check runs first so oversized uploads are rejected without
/// looking at anything else.
pub fn validate_upload(config: &Config, size: u64, filename: &str) -> Result<(), ValidationError> {
    if size > config.max_file_size {
        return Err(ValidationError::FileTooLarge {
            size,
            max: config.max_file_size,
        });
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(normalize_extension);

    match extension {
        Some(ref ext) if config.allowed_formats.iter().any(|f| f == ext) => Ok(()),
        _ => Err(ValidationError::UnsupportedFormat {
            extension: extension.unwrap_or_default(),
            allowed: config.allowed_formats.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_extensions_case_insensitively() {
        let config = Config::default();
        for name in ["a.png", "b.JPG", "c.jpeg", "d.Gif", "dir.name/e.png"] {
            assert!(validate_upload(&config, 1024, name).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn rejects_oversized_files() {
        let config = Config::default();
        let err = validate_upload(&config, config.max_file_size + 1, "big.png").unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { .. }));
    }

    #[test]
    fn size_at_limit_is_accepted() {
        let config = Config::default();
        assert!(validate_upload(&config, config.max_file_size, "edge.png").is_ok());
    }

    #[test]
    fn size_is_checked_before_format() {
        let config = Config::default();
        let err = validate_upload(&config, u64::MAX, "big.bmp").unwrap_err();
        assert!(matches!(err, ValidationError::FileTooLarge { .. }));
    }

    #[test]
    fn rejects_extensions_outside_allow_list() {
        let config = Config::default();
        for name in ["a.bmp", "b.webp", "c.png.exe", "noext", ".png"] {
            let err = validate_upload(&config, 10, name).unwrap_err();
            assert!(
                matches!(err, ValidationError::UnsupportedFormat { .. }),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn honours_custom_allow_list() {
        let config = Config {
            allowed_formats: vec![".gif".to_string()],
            ..Config::default()
        };
        assert!(validate_upload(&config, 10, "x.gif").is_ok());
        assert!(validate_upload(&config, 10, "x.png").is_err());
    }
}
