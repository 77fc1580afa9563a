use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::error::SchemaValidationError;
use crate::records::RecordKind;
use crate::schema::{clock, invariants, FieldReader};

const FIELDS: &[&str] = &[
    "result_id",
    "prediction_id",
    "user_id",
    "start_date",
    "end_date",
    "actual_return",
    "actual_volatility",
    "actual_sharpe",
    "actual_max_dd",
    "return_error",
    "prediction_accuracy",
    "sector_performance",
    "agent_attribution",
    "analyzed_at",
];

/// Realized outcome of a prediction over a date range (retrospection)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PerformanceResult {
    pub result_id: String,
    pub prediction_id: String,
    pub user_id: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(with = "rust_decimal::serde::float")]
    pub actual_return: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub actual_volatility: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub actual_sharpe: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub actual_max_dd: Option<Decimal>,

    /// actual - expected, computed by the producer
    #[serde(with = "rust_decimal::serde::float")]
    pub return_error: Decimal,
    /// 0.0 to 1.0
    #[serde(with = "rust_decimal::serde::float")]
    pub prediction_accuracy: Decimal,

    pub sector_performance: Option<BTreeMap<String, f64>>,
    pub agent_attribution: Option<Map<String, Value>>,

    pub analyzed_at: DateTime<Utc>,
}

/// Headline numbers of a retrospection, grouped to keep the constructor readable
#[derive(Clone, Debug, PartialEq)]
pub struct RealizedMetrics {
    pub actual_return: Decimal,
    pub return_error: Decimal,
    pub prediction_accuracy: Decimal,
}

impl PerformanceResult {
    pub fn new(
        result_id: impl Into<String>,
        prediction_id: impl Into<String>,
        user_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        metrics: RealizedMetrics,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        let result = Self {
            result_id: result_id.into(),
            prediction_id: prediction_id.into(),
            user_id: user_id.into(),
            start_date,
            end_date,
            actual_return: metrics.actual_return,
            actual_volatility: None,
            actual_sharpe: None,
            actual_max_dd: None,
            return_error: metrics.return_error,
            prediction_accuracy: metrics.prediction_accuracy,
            sector_performance: None,
            agent_attribution: None,
            analyzed_at: clock::now(),
        };
        result.check(config)?;
        Ok(result)
    }

    pub fn from_fields(
        fields: &Map<String, Value>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        let r = FieldReader::new(RecordKind::PerformanceResult, fields);
        r.check_unknown(FIELDS, config)?;

        let result = Self {
            result_id: r.required_str("result_id")?,
            prediction_id: r.required_str("prediction_id")?,
            user_id: r.required_str("user_id")?,
            start_date: r.required_date("start_date")?,
            end_date: r.required_date("end_date")?,
            actual_return: r.required_decimal("actual_return")?,
            actual_volatility: r.optional_decimal("actual_volatility")?,
            actual_sharpe: r.optional_decimal("actual_sharpe")?,
            actual_max_dd: r.optional_decimal("actual_max_dd")?,
            return_error: r.required_decimal("return_error")?,
            prediction_accuracy: r.required_decimal("prediction_accuracy")?,
            sector_performance: r.optional_number_map("sector_performance")?,
            agent_attribution: r.optional_object("agent_attribution")?,
            analyzed_at: r.timestamp_or_now("analyzed_at")?,
        };
        result.check(config)?;
        Ok(result)
    }

    fn check(&self, config: &ValidationConfig) -> Result<(), SchemaValidationError> {
        invariants::date_range(config, RecordKind::PerformanceResult, self.start_date, self.end_date)?;
        invariants::unit_interval(
            config,
            RecordKind::PerformanceResult,
            "prediction_accuracy",
            Some(self.prediction_accuracy),
        )
    }

    /// Volatility, Sharpe and max drawdown observed over the range
    pub fn with_risk_metrics(
        self,
        actual_volatility: Option<Decimal>,
        actual_sharpe: Option<Decimal>,
        actual_max_dd: Option<Decimal>,
    ) -> Self {
        Self {
            actual_volatility,
            actual_sharpe,
            actual_max_dd,
            ..self
        }
    }

    pub fn with_breakdowns(
        self,
        sector_performance: Option<BTreeMap<String, f64>>,
        agent_attribution: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            sector_performance,
            agent_attribution,
            ..self
        }
    }

    /// Number of calendar days covered, inclusive of both ends
    pub fn period_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
