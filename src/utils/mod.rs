//! Utilities module for error handling and logging
//!
//! This module provides:
//! - The crate-wide error type
//! - Structured logging with tracing
//! - Small numeric helpers shared by the response builders

pub mod error;
pub mod logging;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use logging::{init_logging, LogConfig, LogLevel};

/// Convert a probability in [0, 1] to a percentage rounded to 2 decimals
pub fn to_percentage(probability: f32) -> f64 {
    let percent = f64::from(probability) * 100.0;
    (percent * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_percentage() {
        assert_eq!(to_percentage(0.5), 50.0);
        assert_eq!(to_percentage(1.0), 100.0);
        assert_eq!(to_percentage(0.0), 0.0);
        assert!((to_percentage(0.123456) - 12.35).abs() < 1e-9);
        assert!((to_percentage(0.98766) - 98.77).abs() < 1e-9);
    }
}
