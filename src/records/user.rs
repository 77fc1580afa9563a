use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::error::SchemaValidationError;
use crate::records::RecordKind;
use crate::schema::{clock, FieldReader, FlowType};

const FIELDS: &[&str] = &["user_id", "name", "profile", "flow", "created_at", "updated_at"];

/// An investor profile
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct User {
    /// e.g. "marv", "parents"
    pub user_id: String,
    pub name: String,
    /// Free-form profile label, usually matching the flow ("growth", "income")
    pub profile: String,
    pub flow: FlowType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        profile: impl Into<String>,
        flow: FlowType,
    ) -> Self {
        let now = clock::now();
        Self {
            user_id: user_id.into(),
            name: name.into(),
            profile: profile.into(),
            flow,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_fields(
        fields: &Map<String, Value>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        let r = FieldReader::new(RecordKind::User, fields);
        r.check_unknown(FIELDS, config)?;

        Ok(Self {
            user_id: r.required_str("user_id")?,
            name: r.required_str("name")?,
            profile: r.required_str("profile")?,
            flow: r.required_token("flow")?,
            created_at: r.timestamp_or_now("created_at")?,
            updated_at: r.timestamp_or_now("updated_at")?,
        })
    }
}
