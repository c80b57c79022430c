//! Configuration types.

/// Turn dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Assistant name for identification.
    pub name: String,
    /// Minimum classifier confidence for intent dispatch.
    /// Scores at or below this fall through to the knowledge base.
    pub confidence_threshold: f32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            name: "history-assist".to_string(),
            confidence_threshold: 0.75,
        }
    }
}

impl DispatcherConfig {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let confidence_threshold: f32 = std::env::var("HISTORY_ASSIST_CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.confidence_threshold);

        Self {
            confidence_threshold,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold() {
        let config = DispatcherConfig::default();
        assert!((config.confidence_threshold - 0.75).abs() < f32::EPSILON);
    }
}
