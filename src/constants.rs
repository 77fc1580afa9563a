//! Application-wide constants

/// Configuration loading
pub mod config {
    /// Environment variable naming the YAML config file
    pub const CONFIG_PATH_ENV: &str = "MARA_CONFIG";

    pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

    /// Allowed deviation of an allocation's fraction sum from 1.0
    pub const DEFAULT_ALLOCATION_TOLERANCE: f64 = 0.01;

    pub const DEFAULT_LOG_FILTER: &str = "info";
}

/// Record identifiers
pub mod ids {
    /// Separator in `<user>_<YYYY-MM-DD>` prediction ids
    pub const PREDICTION_ID_SEPARATOR: char = '_';
}

/// Envelope keys read by the `mara-validate` binary
pub mod envelope {
    pub const KIND_KEY: &str = "kind";
    pub const FIELDS_KEY: &str = "fields";
}
