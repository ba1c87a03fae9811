//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{ColumnMap, Config};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error, if any, into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_site(config, &mut result);
        Self::validate_provider(config, &mut result);
        Self::validate_capture(config, &mut result);
        Self::validate_extraction(config, &mut result);
        Self::validate_browser(config, &mut result);

        result
    }

    fn validate_site(config: &Config, result: &mut ValidationResult) {
        let domain = &config.site.domain;
        if domain.is_empty() {
            result.add_error(ValidationError::new("site.domain", "Domain cannot be empty"));
        } else if domain.contains("://") || domain.contains('/') {
            result.add_error(ValidationError::new(
                "site.domain",
                "Domain must be a bare host name, not a URL",
            ));
        }
    }

    fn validate_provider(config: &Config, result: &mut ValidationResult) {
        if config.provider.domain.is_empty() {
            result.add_error(ValidationError::new(
                "provider.domain",
                "Provider domain cannot be empty",
            ));
        }

        if let Some(host) = &config.provider.institution_host {
            let suffix = format!(".{}", config.provider.domain);
            if host != &config.provider.domain && !host.ends_with(&suffix) {
                result.add_warning(ValidationWarning::new(
                    "provider.institution_host",
                    format!(
                        "'{}' is not under '{}' and will never match",
                        host, config.provider.domain
                    ),
                ));
            }
        }

        if config.provider.recording_path_markers.is_empty()
            && config.provider.institution_host.is_none()
        {
            result.add_error(ValidationError::new(
                "provider.recording_path_markers",
                "No path markers and no institution host: no URL can be classified as a recording",
            ));
        }

        for marker in &config.provider.recording_path_markers {
            if !marker.starts_with('/') {
                result.add_error(ValidationError::new(
                    "provider.recording_path_markers",
                    format!("Path marker '{}' must start with '/'", marker),
                ));
            }
        }
    }

    fn validate_capture(config: &Config, result: &mut ValidationResult) {
        if config.capture.retention_secs == 0 {
            result.add_error(ValidationError::new(
                "capture.retention_secs",
                "retention_secs must be greater than 0",
            ));
        }

        if config.capture.expectation_ttl_secs * 1000 < config.extraction.capture_timeout_ms {
            result.add_warning(ValidationWarning::new(
                "capture.expectation_ttl_secs",
                "Expectations expire before the capture timeout; late tabs will not be correlated",
            ));
        }
    }

    fn validate_extraction(config: &Config, result: &mut ValidationResult) {
        let extraction = &config.extraction;

        if extraction.capture_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "extraction.capture_timeout_ms",
                "capture_timeout_ms must be greater than 0",
            ));
        }

        if extraction.click_delay_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "extraction.click_delay_ms",
                "No delay between clicks; many tabs may open at once",
            ));
        }

        if extraction.button_id_prefix.is_empty() {
            result.add_error(ValidationError::new(
                "extraction.button_id_prefix",
                "Button id prefix cannot be empty",
            ));
        }

        if extraction.min_cells == 0 {
            result.add_error(ValidationError::new(
                "extraction.min_cells",
                "min_cells must be greater than 0",
            ));
        }

        if extraction.log_capacity == 0 {
            result.add_error(ValidationError::new(
                "extraction.log_capacity",
                "log_capacity must be greater than 0",
            ));
        }

        for (name, index) in extraction.columns.entries() {
            if index >= 0 && (index as usize) >= extraction.min_cells {
                result.add_warning(ValidationWarning::new(
                    format!("extraction.columns.{}", name),
                    format!(
                        "Column {} is beyond min_cells ({}); short rows will leave it empty",
                        index, extraction.min_cells
                    ),
                ));
            }
            if ColumnMap::resolve(index, extraction.min_cells).is_none() && index < 0 {
                result.add_error(ValidationError::new(
                    format!("extraction.columns.{}", name),
                    format!("Column {} reaches before the start of a minimal row", index),
                ));
            }
        }
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        if config.browser.debug_port == 0 {
            result.add_error(ValidationError::new(
                "browser.debug_port",
                "Port cannot be 0",
            ));
        }

        if let Some(dir) = &config.browser.profile_dir {
            if dir.exists() && !dir.is_dir() {
                result.add_error(ValidationError::new(
                    "browser.profile_dir",
                    format!("Profile path is not a directory: {:?}", dir),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
