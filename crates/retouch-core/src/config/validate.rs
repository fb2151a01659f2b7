//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_body_mb == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_body_mb must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb > self.server.max_body_mb {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must not exceed server.max_body_mb".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.process_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.process_timeout_ms must be > 0".into(),
            ));
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.denoise.strength) || !positive(self.denoise.color_strength) {
            return Err(ConfigError::ValidationError(
                "denoise.strength and denoise.color_strength must be > 0".into(),
            ));
        }
        let template = self.denoise.template_window;
        let search = self.denoise.search_window;
        if template == 0 || template % 2 == 0 {
            return Err(ConfigError::ValidationError(
                "denoise.template_window must be odd and > 0".into(),
            ));
        }
        if search == 0 || search % 2 == 0 {
            return Err(ConfigError::ValidationError(
                "denoise.search_window must be odd and > 0".into(),
            ));
        }
        if template > search {
            return Err(ConfigError::ValidationError(
                "denoise.template_window must not exceed denoise.search_window".into(),
            ));
        }
        if self.denoise.spatial_radius == 0 || self.denoise.spatial_radius > 16 {
            return Err(ConfigError::ValidationError(
                "denoise.spatial_radius must be between 1 and 16".into(),
            ));
        }
        if !positive(self.denoise.range_sigma) {
            return Err(ConfigError::ValidationError(
                "denoise.range_sigma must be > 0".into(),
            ));
        }
        let unsharp = &self.postprocess.unsharp;
        if !positive(unsharp.amount) || !positive(unsharp.sigma) {
            return Err(ConfigError::ValidationError(
                "postprocess.unsharp.amount and postprocess.unsharp.sigma must be > 0".into(),
            ));
        }
        let clahe = &self.postprocess.clahe;
        if !positive(clahe.clip_limit) {
            return Err(ConfigError::ValidationError(
                "postprocess.clahe.clip_limit must be > 0".into(),
            ));
        }
        if clahe.grid_size == 0 || clahe.grid_size > 64 {
            return Err(ConfigError::ValidationError(
                "postprocess.clahe.grid_size must be between 1 and 64".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_file_size() {
        let mut config = Config::default();
        config.limits.max_file_size_mb = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_file_size_mb"));
    }

    #[test]
    fn test_validate_rejects_file_limit_above_body_limit() {
        let mut config = Config::default();
        config.limits.max_file_size_mb = config.server.max_body_mb + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.max_body_mb"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.process_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("process_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_even_windows() {
        let mut config = Config::default();
        config.denoise.template_window = 6;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("template_window"));

        let mut config = Config::default();
        config.denoise.search_window = 20;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("search_window"));
    }

    #[test]
    fn test_validate_rejects_template_larger_than_search() {
        let mut config = Config::default();
        config.denoise.template_window = 23;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_validate_rejects_non_positive_strength() {
        let mut config = Config::default();
        config.denoise.color_strength = 0.0;
        assert!(config.validate().is_err());

        config.denoise.color_strength = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bilateral_parameters() {
        let mut config = Config::default();
        config.denoise.spatial_radius = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("spatial_radius"));

        let mut config = Config::default();
        config.denoise.range_sigma = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("range_sigma"));
    }

    #[test]
    fn test_validate_rejects_bad_postprocess_parameters() {
        let mut config = Config::default();
        config.postprocess.unsharp.sigma = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("postprocess.unsharp"));

        let mut config = Config::default();
        config.postprocess.clahe.grid_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("grid_size"));

        let mut config = Config::default();
        config.postprocess.clahe.clip_limit = f32::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }
}
