use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::error::SchemaValidationError;
use crate::records::RecordKind;
use crate::schema::{clock, invariants, FieldReader};

const FIELDS: &[&str] = &[
    "record_id",
    "user_id",
    "agent_name",
    "total_predictions",
    "accurate_predictions",
    "accuracy_rate",
    "recent_accuracy",
    "current_weight",
    "recommended_weight",
    "updated_at",
];

/// Cumulative correctness of one predicting agent for one user
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentPerformance {
    pub record_id: String,
    pub user_id: String,
    pub agent_name: String,

    pub total_predictions: u64,
    pub accurate_predictions: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub accuracy_rate: Decimal,

    #[serde(with = "rust_decimal::serde::float_option")]
    pub recent_accuracy: Option<Decimal>,

    #[serde(with = "rust_decimal::serde::float")]
    pub current_weight: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub recommended_weight: Option<Decimal>,

    pub updated_at: DateTime<Utc>,
}

impl AgentPerformance {
    /// A fresh record with zeroed counters
    pub fn new(
        record_id: impl Into<String>,
        user_id: impl Into<String>,
        agent_name: impl Into<String>,
        current_weight: Decimal,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            user_id: user_id.into(),
            agent_name: agent_name.into(),
            total_predictions: 0,
            accurate_predictions: 0,
            accuracy_rate: dec!(0.0),
            recent_accuracy: None,
            current_weight,
            recommended_weight: None,
            updated_at: clock::now(),
        }
    }

    pub fn from_fields(
        fields: &Map<String, Value>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        let r = FieldReader::new(RecordKind::AgentPerformance, fields);
        r.check_unknown(FIELDS, config)?;

        let record = Self {
            record_id: r.required_str("record_id")?,
            user_id: r.required_str("user_id")?,
            agent_name: r.required_str("agent_name")?,
            total_predictions: r.count_or_zero("total_predictions")?,
            accurate_predictions: r.count_or_zero("accurate_predictions")?,
            accuracy_rate: r.decimal_or("accuracy_rate", dec!(0.0))?,
            recent_accuracy: r.optional_decimal("recent_accuracy")?,
            current_weight: r.required_decimal("current_weight")?,
            recommended_weight: r.optional_decimal("recommended_weight")?,
            updated_at: r.timestamp_or_now("updated_at")?,
        };
        record.check(config)?;
        Ok(record)
    }

    /// Replace the cumulative statistics as reported by the retrospection stage.
    ///
    /// The rate is taken as given; nothing here derives it from the counts.
    pub fn with_statistics(
        self,
        total_predictions: u64,
        accurate_predictions: u64,
        accuracy_rate: Decimal,
        recent_accuracy: Option<Decimal>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        let record = Self {
            total_predictions,
            accurate_predictions,
            accuracy_rate,
            recent_accuracy,
            updated_at: clock::now(),
            ..self
        };
        record.check(config)?;
        Ok(record)
    }

    pub fn with_recommended_weight(self, recommended_weight: Decimal) -> Self {
        Self {
            recommended_weight: Some(recommended_weight),
            updated_at: clock::now(),
            ..self
        }
    }

    fn check(&self, config: &ValidationConfig) -> Result<(), SchemaValidationError> {
        let entity = RecordKind::AgentPerformance;
        invariants::prediction_counts(config, entity, self.accurate_predictions, self.total_predictions)?;
        invariants::unit_interval(config, entity, "accuracy_rate", Some(self.accuracy_rate))?;
        invariants::unit_interval(config, entity, "recent_accuracy", self.recent_accuracy)
    }
}
