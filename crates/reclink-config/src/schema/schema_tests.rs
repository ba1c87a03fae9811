use super::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.site.domain, "conference.utec.edu.pe");
    assert_eq!(config.provider.domain, "zoom.us");
    assert_eq!(config.capture.retention_secs, 300);
    assert_eq!(config.extraction.button_id_prefix, "ver");
    assert_eq!(config.extraction.min_cells, 5);
    assert_eq!(config.browser.debug_port, 9222);
    assert_eq!(config.export.file_prefix, "recordings");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_site_matches_host_case_insensitive() {
    let site = SiteConfig::default();
    assert!(site.matches_host("conference.utec.edu.pe"));
    assert!(site.matches_host("Conference.UTEC.edu.pe"));
    assert!(!site.matches_host("utec.edu.pe"));
}

#[test]
fn test_column_resolve_forward() {
    assert_eq!(ColumnMap::resolve(0, 11), Some(0));
    assert_eq!(ColumnMap::resolve(6, 11), Some(6));
    assert_eq!(ColumnMap::resolve(6, 5), None);
}

#[test]
fn test_column_resolve_from_end() {
    assert_eq!(ColumnMap::resolve(-1, 11), Some(10));
    assert_eq!(ColumnMap::resolve(-1, 5), Some(4));
    assert_eq!(ColumnMap::resolve(-3, 2), None);
}

#[test]
fn test_column_map_partial_toml() {
    let columns: ColumnMap = toml::from_str("modality = 10\ntype = 7").unwrap();
    assert_eq!(columns.modality, 10);
    assert_eq!(columns.session_type, 7);
    assert_eq!(columns.course, 0);
}

#[test]
fn test_column_entries_cover_all_fields() {
    let names: Vec<&str> = ColumnMap::default().entries().iter().map(|(n, _)| *n).collect();
    assert_eq!(names.len(), 8);
    assert!(names.contains(&"modality"));
}

#[test]
fn test_log_dir_default_under_home() {
    let logging = LoggingConfig::default();
    assert!(logging.log_dir().ends_with(".reclink/logs"));
}

#[test]
fn test_log_dir_override() {
    let logging = LoggingConfig {
        level: "debug".to_string(),
        dir: Some(std::path::PathBuf::from("/tmp/reclink-logs")),
    };
    assert_eq!(logging.log_dir(), std::path::PathBuf::from("/tmp/reclink-logs"));
}
