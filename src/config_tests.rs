//! Unit tests for configuration structures and parsing.

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use crate::config::*;
    use crate::error::ConfigError;

    // ============= ValidationConfig Tests =============

    #[test]
    fn test_validation_config_default() {
        let config = ValidationConfig::default();

        assert!(config.enforce_date_range);
        assert!(!config.enforce_accuracy_bounds);
        assert!(!config.enforce_prediction_counts);
        assert!(!config.enforce_allocation_sum);
        assert_eq!(config.allocation_tolerance, 0.01);
        assert!(!config.reject_unknown_fields);
    }

    #[test]
    fn test_validation_config_strict() {
        let config = ValidationConfig::strict();

        assert!(config.enforce_date_range);
        assert!(config.enforce_accuracy_bounds);
        assert!(config.enforce_prediction_counts);
        assert!(config.enforce_allocation_sum);
        assert!(config.reject_unknown_fields);
    }

    #[test]
    fn test_validation_config_permissive() {
        let config = ValidationConfig::permissive();
        assert!(!config.enforce_date_range);
        assert!(!config.enforce_accuracy_bounds);
    }

    #[test]
    fn test_validation_config_partial_yaml() {
        let yaml = r#"
enforce_allocation_sum: true
allocation_tolerance: 0.001
"#;
        let config: ValidationConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(config.enforce_allocation_sum);
        assert_eq!(config.allocation_tolerance, 0.001);
        // Missing fields should use defaults
        assert!(config.enforce_date_range);
        assert!(!config.reject_unknown_fields);
    }

    // ============= AppConfig Tests =============

    #[test]
    fn test_app_config_from_yaml() {
        let yaml = r#"
log_filter: "mara_schema=debug"
validation:
  enforce_prediction_counts: true
  enforce_date_range: false
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.log_filter.as_deref(), Some("mara_schema=debug"));
        assert!(config.validation.enforce_prediction_counts);
        assert!(!config.validation.enforce_date_range);
    }

    #[test]
    fn test_app_config_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());
        assert_eq!(AppConfig::from_yaml("\u{feff}\n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_app_config_strips_bom() {
        let config = AppConfig::from_yaml("\u{feff}log_filter: warn\n").unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("warn"));
    }

    #[test]
    fn test_app_config_rejects_wrong_types() {
        assert!(AppConfig::from_yaml("validation:\n  enforce_date_range: maybe\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "validation:\n  reject_unknown_fields: true").unwrap();

        let config = AppConfig::load_from(file.path().to_str().unwrap())
            .unwrap()
            .expect("file exists");
        assert!(config.validation.reject_unknown_fields);
    }

    #[test]
    fn test_load_missing_file_reports_absence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let loaded = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        assert!(loaded.is_none());
        assert_eq!(loaded.unwrap_or_default(), AppConfig::default());
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "validation: [unclosed").unwrap();

        let err = AppConfig::load_from(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
