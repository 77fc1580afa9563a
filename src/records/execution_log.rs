use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::ValidationConfig;
use crate::error::{SchemaValidationError, ValidationReason};
use crate::records::RecordKind;
use crate::schema::{clock, ExecutionStatus, FieldReader, FlowType};

const FIELDS: &[&str] = &[
    "log_id",
    "user_id",
    "flow",
    "execution_date",
    "status",
    "layers_completed",
    "error_message",
    "execution_time_seconds",
    "created_at",
];

/// Audit record of one pipeline run.
///
/// Status only moves RUNNING -> COMPLETED or RUNNING -> FAILED, so the
/// lifecycle fields are private and change through [`ExecutionLog::complete`]
/// and [`ExecutionLog::fail`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExecutionLog {
    pub log_id: String,
    pub user_id: String,
    pub flow: FlowType,
    pub execution_date: DateTime<Utc>,

    status: ExecutionStatus,
    layers_completed: Vec<String>,

    error_message: Option<String>,
    execution_time_seconds: Option<u64>,

    pub created_at: DateTime<Utc>,
}

impl ExecutionLog {
    /// Open a RUNNING log for a new run
    pub fn start(log_id: impl Into<String>, user_id: impl Into<String>, flow: FlowType) -> Self {
        let now = clock::now();
        let log = Self {
            log_id: log_id.into(),
            user_id: user_id.into(),
            flow,
            execution_date: now,
            status: ExecutionStatus::Running,
            layers_completed: Vec::new(),
            error_message: None,
            execution_time_seconds: None,
            created_at: now,
        };
        info!("▶️ Execution {} started for {} ({})", log.log_id, log.user_id, log.flow);
        log
    }

    /// Rebuild a log from stored field values; any status is accepted here.
    pub fn from_fields(
        fields: &Map<String, Value>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        let r = FieldReader::new(RecordKind::ExecutionLog, fields);
        r.check_unknown(FIELDS, config)?;

        Ok(Self {
            log_id: r.required_str("log_id")?,
            user_id: r.required_str("user_id")?,
            flow: r.required_token("flow")?,
            execution_date: r.timestamp_or_now("execution_date")?,
            status: r.required_token("status")?,
            layers_completed: r.string_list_or_empty("layers_completed")?,
            error_message: r.optional_str("error_message")?,
            execution_time_seconds: r.optional_count("execution_time_seconds")?,
            created_at: r.timestamp_or_now("created_at")?,
        })
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn layers_completed(&self) -> &[String] {
        &self.layers_completed
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn execution_time_seconds(&self) -> Option<u64> {
        self.execution_time_seconds
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    fn transition(&mut self, to: ExecutionStatus) -> Result<(), SchemaValidationError> {
        if !self.status.can_transition_to(to) {
            warn!(
                "⚠️ Rejected transition {} -> {} for execution {}",
                self.status, to, self.log_id
            );
            return Err(SchemaValidationError::new(
                RecordKind::ExecutionLog,
                "status",
                ValidationReason::IllegalTransition {
                    from: self.status,
                    to,
                },
            ));
        }
        self.status = to;
        Ok(())
    }

    /// Note that a pipeline layer finished. Only allowed while RUNNING.
    pub fn record_layer(&mut self, layer: impl Into<String>) -> Result<(), SchemaValidationError> {
        if self.status.is_terminal() {
            return Err(SchemaValidationError::invariant(
                RecordKind::ExecutionLog,
                "layers_completed",
                format!("execution {} is already {}", self.log_id, self.status),
            ));
        }
        self.layers_completed.push(layer.into());
        Ok(())
    }

    pub fn complete(&mut self, execution_time_seconds: Option<u64>) -> Result<(), SchemaValidationError> {
        self.transition(ExecutionStatus::Completed)?;
        self.execution_time_seconds = execution_time_seconds;
        info!(
            "✅ Execution {} completed ({} layers)",
            self.log_id,
            self.layers_completed.len()
        );
        Ok(())
    }

    pub fn fail(
        &mut self,
        error_message: impl Into<String>,
        execution_time_seconds: Option<u64>,
    ) -> Result<(), SchemaValidationError> {
        self.transition(ExecutionStatus::Failed)?;
        let message = error_message.into();
        info!("❌ Execution {} failed: {}", self.log_id, message);
        self.error_message = Some(message);
        self.execution_time_seconds = execution_time_seconds;
        Ok(())
    }
}
