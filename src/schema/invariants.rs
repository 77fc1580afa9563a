//! Cross-field rules. Only `non_negative` is unconditional; the rest are
//! gated by `ValidationConfig` flags.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::ValidationConfig;
use crate::error::SchemaValidationError;
use crate::records::RecordKind;

type Result<T> = std::result::Result<T, SchemaValidationError>;

pub fn non_negative(entity: RecordKind, field: &str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(SchemaValidationError::invariant(
            entity,
            field,
            format!("{field} must be >= 0 (got {value})"),
        ));
    }
    Ok(())
}

pub fn date_range(
    config: &ValidationConfig,
    entity: RecordKind,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<()> {
    if config.enforce_date_range && end < start {
        return Err(SchemaValidationError::invariant(
            entity,
            "end_date",
            format!("end_date {end} precedes start_date {start}"),
        ));
    }
    Ok(())
}

pub fn unit_interval(
    config: &ValidationConfig,
    entity: RecordKind,
    field: &str,
    value: Option<Decimal>,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if config.enforce_accuracy_bounds && (value < Decimal::ZERO || value > Decimal::ONE) {
        return Err(SchemaValidationError::invariant(
            entity,
            field,
            format!("{field} must lie in [0, 1] (got {value})"),
        ));
    }
    Ok(())
}

pub fn prediction_counts(
    config: &ValidationConfig,
    entity: RecordKind,
    accurate: u64,
    total: u64,
) -> Result<()> {
    if config.enforce_prediction_counts && accurate > total {
        return Err(SchemaValidationError::invariant(
            entity,
            "accurate_predictions",
            format!("accurate_predictions {accurate} exceeds total_predictions {total}"),
        ));
    }
    Ok(())
}

/// Empty allocations are accepted; they carry no weights to sum.
pub fn allocation_sum(
    config: &ValidationConfig,
    entity: RecordKind,
    field: &str,
    allocation: Option<&BTreeMap<String, f64>>,
) -> Result<()> {
    let Some(allocation) = allocation.filter(|a| !a.is_empty()) else {
        return Ok(());
    };
    if !config.enforce_allocation_sum {
        return Ok(());
    }
    let sum: f64 = allocation.values().sum();
    if (sum - 1.0).abs() > config.allocation_tolerance {
        return Err(SchemaValidationError::invariant(
            entity,
            field,
            format!(
                "{field} fractions sum to {sum} (expected 1 +/- {})",
                config.allocation_tolerance
            ),
        ));
    }
    Ok(())
}
