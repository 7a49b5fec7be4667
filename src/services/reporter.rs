use std::time::Instant;

use crate::models::CompressionResult;

/// Percentage of the original size that the output retains.
pub fn compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    compressed_size as f64 / original_size as f64 * 100.0
}

pub fn report(
    original_size: u64,
    compressed_size: u64,
    output_filename: impl Into<String>,
    started: Instant,
) -> CompressionResult {
    CompressionResult {
        original_size,
        compressed_size,
        compression_ratio: compression_ratio(original_size, compressed_size),
        processing_time: started.elapsed().as_secs_f64(),
        output_filename: output_filename.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ratio_is_percentage_retained() {
        assert_eq!(compression_ratio(1000, 250), 25.0);
        assert_eq!(compression_ratio(1000, 1000), 100.0);
        assert_eq!(compression_ratio(100, 150), 150.0);
    }

    #[test]
    fn empty_original_has_zero_ratio() {
        assert_eq!(compression_ratio(0, 10), 0.0);
    }

    #[test]
    fn report_measures_elapsed_time() {
        let started = Instant::now() - Duration::from_millis(50);
        let result = report(2000, 500, "out_compressed.webp", started);
        assert_eq!(result.original_size, 2000);
        assert_eq!(result.compressed_size, 500);
        assert_eq!(result.compression_ratio, 25.0);
        assert!(result.processing_time >= 0.05);
        assert_eq!(result.output_filename, "out_compressed.webp");
    }
}
