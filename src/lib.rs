//! MARA record schema
//!
//! Validated records shared by the prediction pipeline stages: users,
//! portfolio snapshots, predictions, performance results, agent performance
//! and execution logs. Records are built from named field values, hold
//! monetary and ratio fields as exact decimals, and serialize decimals to
//! floats only at the interchange boundary.

pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod records;
pub mod schema;

// Re-export commonly used types
pub use config::{AppConfig, ValidationConfig};
pub use error::{ConfigError, EnvelopeError, SchemaValidationError, ValidationReason};
pub use records::{
    AgentPerformance, ExecutionLog, PerformanceResult, Portfolio, Prediction, RealizedMetrics,
    Record, RecordKind, StrategyEstimates, User,
};
pub use schema::{new_record_id, ExecutionStatus, FlowType, MarketRegime, PortfolioType};

#[cfg(test)]
mod config_tests;
