use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::error::SchemaValidationError;
use crate::records::RecordKind;
use crate::schema::{invariants, FieldReader, PortfolioType};

const FIELDS: &[&str] = &[
    "portfolio_id",
    "user_id",
    "snapshot_date",
    "portfolio_type",
    "total_value",
    "holdings",
    "allocation",
    "metadata",
];

/// A dated snapshot of holdings, either actual or a proposed target
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Portfolio {
    pub portfolio_id: String,
    pub user_id: String,
    pub snapshot_date: NaiveDate,
    pub portfolio_type: PortfolioType,

    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,

    /// `{"SPY": {"shares": 100, "value": 45000}, ...}`; inner shape is not enforced
    pub holdings: Map<String, Value>,

    /// `{"cash": 0.30, "XLK": 0.25, ...}`
    pub allocation: BTreeMap<String, f64>,

    pub metadata: Option<Map<String, Value>>,
}

impl Portfolio {
    /// Applies the same rules as [`Portfolio::from_fields`]: `total_value`
    /// must be non-negative, and `allocation` must sum to 1 when the config
    /// enforces it.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        portfolio_id: impl Into<String>,
        user_id: impl Into<String>,
        snapshot_date: NaiveDate,
        portfolio_type: PortfolioType,
        total_value: Decimal,
        holdings: Map<String, Value>,
        allocation: BTreeMap<String, f64>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        invariants::non_negative(RecordKind::Portfolio, "total_value", total_value)?;
        invariants::allocation_sum(config, RecordKind::Portfolio, "allocation", Some(&allocation))?;
        Ok(Self {
            portfolio_id: portfolio_id.into(),
            user_id: user_id.into(),
            snapshot_date,
            portfolio_type,
            total_value,
            holdings,
            allocation,
            metadata: None,
        })
    }

    pub fn with_metadata(self, metadata: Map<String, Value>) -> Self {
        Self {
            metadata: Some(metadata),
            ..self
        }
    }

    pub fn from_fields(
        fields: &Map<String, Value>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        let r = FieldReader::new(RecordKind::Portfolio, fields);
        r.check_unknown(FIELDS, config)?;

        let portfolio = Self {
            portfolio_id: r.required_str("portfolio_id")?,
            user_id: r.required_str("user_id")?,
            snapshot_date: r.required_date("snapshot_date")?,
            portfolio_type: r.required_token("portfolio_type")?,
            total_value: r.required_decimal("total_value")?,
            holdings: r.required_object("holdings")?,
            allocation: r.required_number_map("allocation")?,
            metadata: r.optional_object("metadata")?,
        };

        invariants::non_negative(RecordKind::Portfolio, "total_value", portfolio.total_value)?;
        invariants::allocation_sum(
            config,
            RecordKind::Portfolio,
            "allocation",
            Some(&portfolio.allocation),
        )?;

        Ok(portfolio)
    }

    pub fn is_recommended(&self) -> bool {
        self.portfolio_type == PortfolioType::Recommended
    }
}
