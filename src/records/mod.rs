//! The six record kinds and a sum type over them.

pub mod agent_performance;
pub mod execution_log;
pub mod performance;
pub mod portfolio;
pub mod prediction;
pub mod user;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::constants::envelope::{FIELDS_KEY, KIND_KEY};
use crate::error::{EnvelopeError, SchemaValidationError};
use crate::schema::UnknownToken;

pub use agent_performance::AgentPerformance;
pub use execution_log::ExecutionLog;
pub use performance::{PerformanceResult, RealizedMetrics};
pub use portfolio::Portfolio;
pub use prediction::{Prediction, StrategyEstimates};
pub use user::User;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Portfolio,
    Prediction,
    PerformanceResult,
    AgentPerformance,
    ExecutionLog,
}

impl RecordKind {
    pub const ALL: &'static [RecordKind] = &[
        RecordKind::User,
        RecordKind::Portfolio,
        RecordKind::Prediction,
        RecordKind::PerformanceResult,
        RecordKind::AgentPerformance,
        RecordKind::ExecutionLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::User => "user",
            RecordKind::Portfolio => "portfolio",
            RecordKind::Prediction => "prediction",
            RecordKind::PerformanceResult => "performance_result",
            RecordKind::AgentPerformance => "agent_performance",
            RecordKind::ExecutionLog => "execution_log",
        }
    }

    /// Name of the identifier field for this kind
    pub fn id_field(&self) -> &'static str {
        match self {
            RecordKind::User => "user_id",
            RecordKind::Portfolio => "portfolio_id",
            RecordKind::Prediction => "prediction_id",
            RecordKind::PerformanceResult => "result_id",
            RecordKind::AgentPerformance => "record_id",
            RecordKind::ExecutionLog => "log_id",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownToken(s.to_string()))
    }
}

/// Any validated record
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    User(User),
    Portfolio(Portfolio),
    Prediction(Prediction),
    PerformanceResult(PerformanceResult),
    AgentPerformance(AgentPerformance),
    ExecutionLog(ExecutionLog),
}

impl Record {
    pub fn from_fields(
        kind: RecordKind,
        fields: &Map<String, Value>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        Ok(match kind {
            RecordKind::User => Record::User(User::from_fields(fields, config)?),
            RecordKind::Portfolio => Record::Portfolio(Portfolio::from_fields(fields, config)?),
            RecordKind::Prediction => Record::Prediction(Prediction::from_fields(fields, config)?),
            RecordKind::PerformanceResult => {
                Record::PerformanceResult(PerformanceResult::from_fields(fields, config)?)
            }
            RecordKind::AgentPerformance => {
                Record::AgentPerformance(AgentPerformance::from_fields(fields, config)?)
            }
            RecordKind::ExecutionLog => Record::ExecutionLog(ExecutionLog::from_fields(fields, config)?),
        })
    }

    /// Validate a `{"kind": "...", "fields": {...}}` envelope
    pub fn from_envelope(envelope: &Value, config: &ValidationConfig) -> Result<Self, EnvelopeError> {
        let envelope = envelope.as_object().ok_or(EnvelopeError::NotAnObject)?;

        let kind = envelope
            .get(KIND_KEY)
            .and_then(Value::as_str)
            .ok_or(EnvelopeError::MissingKey(KIND_KEY))?;
        let kind: RecordKind = kind
            .parse()
            .map_err(|UnknownToken(token)| EnvelopeError::UnknownKind(token))?;

        let fields = envelope
            .get(FIELDS_KEY)
            .and_then(Value::as_object)
            .ok_or(EnvelopeError::MissingKey(FIELDS_KEY))?;

        Ok(Self::from_fields(kind, fields, config)?)
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::User(_) => RecordKind::User,
            Record::Portfolio(_) => RecordKind::Portfolio,
            Record::Prediction(_) => RecordKind::Prediction,
            Record::PerformanceResult(_) => RecordKind::PerformanceResult,
            Record::AgentPerformance(_) => RecordKind::AgentPerformance,
            Record::ExecutionLog(_) => RecordKind::ExecutionLog,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::User(r) => &r.user_id,
            Record::Portfolio(r) => &r.portfolio_id,
            Record::Prediction(r) => &r.prediction_id,
            Record::PerformanceResult(r) => &r.result_id,
            Record::AgentPerformance(r) => &r.record_id,
            Record::ExecutionLog(r) => &r.log_id,
        }
    }

    /// Interchange form; decimal fields are emitted as floats
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

macro_rules! impl_from_record {
    ($($variant:ident),+) => {
        $(
            impl From<$variant> for Record {
                fn from(record: $variant) -> Self {
                    Record::$variant(record)
                }
            }
        )+
    };
}

impl_from_record!(User, Portfolio, Prediction, PerformanceResult, AgentPerformance, ExecutionLog);

#[cfg(test)]
mod record_tests;
