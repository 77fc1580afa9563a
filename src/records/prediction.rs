use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ValidationConfig;
use crate::constants::ids::PREDICTION_ID_SEPARATOR;
use crate::error::SchemaValidationError;
use crate::records::RecordKind;
use crate::schema::{clock, invariants, FieldReader, FlowType, MarketRegime};

const FIELDS: &[&str] = &[
    "prediction_id",
    "user_id",
    "flow",
    "prediction_date",
    "input_portfolio_id",
    "market_regime",
    "macro_insights",
    "recommended_strategy",
    "target_allocation",
    "expected_return",
    "expected_volatility",
    "expected_sharpe",
    "expected_max_dd",
    "rebalancing_method",
    "rebalancing_actions",
    "report_markdown",
    "report_path",
    "created_at",
];

/// Risk/return estimates produced by the strategy stage
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrategyEstimates {
    pub expected_return: Option<Decimal>,
    pub expected_volatility: Option<Decimal>,
    pub expected_sharpe: Option<Decimal>,
    pub expected_max_dd: Option<Decimal>,
}

/// A forecast for one user on one date, built from one input portfolio.
///
/// Pipeline stages fill the optional sections in order (macro, strategy,
/// rebalancing, report). Each `with_*` method consumes the record and returns
/// the enriched one, so a stage never mutates a value another stage holds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    /// Conventionally `<user>_<YYYY-MM-DD>`, see [`Prediction::default_id`]
    pub prediction_id: String,
    pub user_id: String,
    pub flow: FlowType,
    pub prediction_date: NaiveDate,

    pub input_portfolio_id: String,

    // Macro analysis
    pub market_regime: Option<MarketRegime>,
    pub macro_insights: Option<Map<String, Value>>,

    // Strategy
    pub recommended_strategy: Option<String>,
    pub target_allocation: Option<BTreeMap<String, f64>>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub expected_return: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub expected_volatility: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub expected_sharpe: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub expected_max_dd: Option<Decimal>,

    // Rebalancing
    pub rebalancing_method: Option<String>,
    pub rebalancing_actions: Option<Vec<Map<String, Value>>>,

    // Report
    pub report_markdown: Option<String>,
    pub report_path: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Prediction {
    pub fn default_id(user_id: &str, prediction_date: NaiveDate) -> String {
        format!(
            "{user_id}{PREDICTION_ID_SEPARATOR}{}",
            prediction_date.format("%Y-%m-%d")
        )
    }

    pub fn new(
        prediction_id: impl Into<String>,
        user_id: impl Into<String>,
        flow: FlowType,
        prediction_date: NaiveDate,
        input_portfolio_id: impl Into<String>,
    ) -> Self {
        Self {
            prediction_id: prediction_id.into(),
            user_id: user_id.into(),
            flow,
            prediction_date,
            input_portfolio_id: input_portfolio_id.into(),
            market_regime: None,
            macro_insights: None,
            recommended_strategy: None,
            target_allocation: None,
            expected_return: None,
            expected_volatility: None,
            expected_sharpe: None,
            expected_max_dd: None,
            rebalancing_method: None,
            rebalancing_actions: None,
            report_markdown: None,
            report_path: None,
            created_at: clock::now(),
        }
    }

    pub fn from_fields(
        fields: &Map<String, Value>,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        let r = FieldReader::new(RecordKind::Prediction, fields);
        r.check_unknown(FIELDS, config)?;

        let prediction = Self {
            prediction_id: r.required_str("prediction_id")?,
            user_id: r.required_str("user_id")?,
            flow: r.required_token("flow")?,
            prediction_date: r.required_date("prediction_date")?,
            input_portfolio_id: r.required_str("input_portfolio_id")?,
            market_regime: r.optional_token("market_regime")?,
            macro_insights: r.optional_object("macro_insights")?,
            recommended_strategy: r.optional_str("recommended_strategy")?,
            target_allocation: r.optional_number_map("target_allocation")?,
            expected_return: r.optional_decimal("expected_return")?,
            expected_volatility: r.optional_decimal("expected_volatility")?,
            expected_sharpe: r.optional_decimal("expected_sharpe")?,
            expected_max_dd: r.optional_decimal("expected_max_dd")?,
            rebalancing_method: r.optional_str("rebalancing_method")?,
            rebalancing_actions: r.optional_object_list("rebalancing_actions")?,
            report_markdown: r.optional_str("report_markdown")?,
            report_path: r.optional_str("report_path")?,
            created_at: r.timestamp_or_now("created_at")?,
        };

        invariants::allocation_sum(
            config,
            RecordKind::Prediction,
            "target_allocation",
            prediction.target_allocation.as_ref(),
        )?;

        Ok(prediction)
    }

    pub fn with_macro_analysis(
        self,
        market_regime: MarketRegime,
        macro_insights: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            market_regime: Some(market_regime),
            macro_insights,
            ..self
        }
    }

    /// Fails when `target_allocation` does not sum to 1 and the config
    /// enforces it.
    pub fn with_strategy(
        self,
        recommended_strategy: impl Into<String>,
        target_allocation: BTreeMap<String, f64>,
        estimates: StrategyEstimates,
        config: &ValidationConfig,
    ) -> Result<Self, SchemaValidationError> {
        invariants::allocation_sum(
            config,
            RecordKind::Prediction,
            "target_allocation",
            Some(&target_allocation),
        )?;
        Ok(Self {
            recommended_strategy: Some(recommended_strategy.into()),
            target_allocation: Some(target_allocation),
            expected_return: estimates.expected_return,
            expected_volatility: estimates.expected_volatility,
            expected_sharpe: estimates.expected_sharpe,
            expected_max_dd: estimates.expected_max_dd,
            ..self
        })
    }

    pub fn with_rebalancing(
        self,
        rebalancing_method: impl Into<String>,
        rebalancing_actions: Vec<Map<String, Value>>,
    ) -> Self {
        Self {
            rebalancing_method: Some(rebalancing_method.into()),
            rebalancing_actions: Some(rebalancing_actions),
            ..self
        }
    }

    pub fn with_report(self, report_markdown: impl Into<String>, report_path: Option<String>) -> Self {
        Self {
            report_markdown: Some(report_markdown.into()),
            report_path,
            ..self
        }
    }

    pub fn estimates(&self) -> StrategyEstimates {
        StrategyEstimates {
            expected_return: self.expected_return,
            expected_volatility: self.expected_volatility,
            expected_sharpe: self.expected_sharpe,
            expected_max_dd: self.expected_max_dd,
        }
    }

    pub fn has_report(&self) -> bool {
        self.report_markdown.is_some()
    }
}
