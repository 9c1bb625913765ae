//! Composer configuration.

/// Default ceiling on readiness waves per composition.
pub const DEFAULT_MAX_WAVE_COUNT: usize = 10;

/// Settings consumed by [`ServiceComposer`](crate::ServiceComposer).
///
/// Reads from environment variables:
/// - `COMPOSER_MAX_WAVE_COUNT`: readiness wave ceiling (default: `10`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerConfig {
    pub max_wave_count: usize,
}

impl ComposerConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for missing or unparsable values.
    pub fn from_env() -> Self {
        Self {
            max_wave_count: std::env::var("COMPOSER_MAX_WAVE_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_WAVE_COUNT),
        }
    }

    pub fn with_max_wave_count(mut self, max_wave_count: usize) -> Self {
        self.max_wave_count = max_wave_count;
        self
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_wave_count: DEFAULT_MAX_WAVE_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        assert_eq!(ComposerConfig::default().max_wave_count, 10);
    }

    #[test]
    fn test_with_max_wave_count() {
        let config = ComposerConfig::default().with_max_wave_count(20);
        assert_eq!(config.max_wave_count, 20);
    }
}
