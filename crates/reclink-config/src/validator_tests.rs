use super::*;
use crate::schema::Config;

#[test]
fn test_default_config_is_valid() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid(), "{:?}", result.errors);
}

#[test]
fn test_default_config_warns_about_short_rows() {
    // type (5) and status (6) sit beyond the 5-cell minimum
    let result = ConfigValidator::validate(&Config::default());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "extraction.columns.status"));
}

#[test]
fn test_empty_site_domain() {
    let mut config = Config::default();
    config.site.domain = String::new();
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert_eq!(result.errors[0].path, "site.domain");
}

#[test]
fn test_site_domain_with_scheme() {
    let mut config = Config::default();
    config.site.domain = "https://conference.utec.edu.pe".to_string();
    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "site.domain"));
}

#[test]
fn test_institution_host_outside_provider() {
    let mut config = Config::default();
    config.provider.institution_host = Some("utec.example.com".to_string());
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "provider.institution_host"));
}

#[test]
fn test_no_way_to_classify() {
    let mut config = Config::default();
    config.provider.recording_path_markers.clear();
    config.provider.institution_host = None;
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
}

#[test]
fn test_relative_path_marker() {
    let mut config = Config::default();
    config.provider.recording_path_markers = vec!["rec/share".to_string()];
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
}

#[test]
fn test_zero_timeouts() {
    let mut config = Config::default();
    config.extraction.capture_timeout_ms = 0;
    config.capture.retention_secs = 0;
    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_zero_click_delay_is_warning() {
    let mut config = Config::default();
    config.extraction.click_delay_ms = 0;
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "extraction.click_delay_ms"));
}

#[test]
fn test_short_expectation_ttl_warns() {
    let mut config = Config::default();
    config.capture.expectation_ttl_secs = 1;
    config.extraction.capture_timeout_ms = 5000;
    let result = ConfigValidator::validate(&config);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.path == "capture.expectation_ttl_secs"));
}

#[test]
fn test_negative_column_too_far_back() {
    let mut config = Config::default();
    config.extraction.columns.modality = -6;
    let result = ConfigValidator::validate(&config);
    assert!(result
        .errors
        .iter()
        .any(|e| e.path == "extraction.columns.modality"));
}

#[test]
fn test_empty_button_prefix() {
    let mut config = Config::default();
    config.extraction.button_id_prefix = String::new();
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
}

#[test]
fn test_zero_debug_port() {
    let mut config = Config::default();
    config.browser.debug_port = 0;
    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors[0].path, "browser.debug_port");
}

#[test]
fn test_into_result() {
    let mut config = Config::default();
    config.extraction.min_cells = 0;
    let err = ConfigValidator::validate(&config).into_result().unwrap_err();
    assert!(err.to_string().contains("min_cells"));

    let warnings = ConfigValidator::validate(&Config::default()).into_result().unwrap();
    assert!(!warnings.is_empty());
}
