//! Unit tests for FieldReader - typed field access and presence rules.

#[cfg(test)]
mod fields_tests {
    use chrono::{Datelike, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::{json, Map, Value};

    use crate::config::ValidationConfig;
    use crate::error::ValidationReason;
    use crate::records::RecordKind;
    use crate::schema::fields::*;
    use crate::schema::FlowType;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    // ============= Decimal Parsing Tests =============

    #[test]
    fn test_parse_decimal_from_string_is_exact() {
        assert_eq!(parse_decimal(&json!("100000")), Ok(dec!(100000)));
        assert_eq!(parse_decimal(&json!("0.1")), Ok(dec!(0.1)));
        assert_eq!(parse_decimal(&json!(" 12.50 ")), Ok(dec!(12.50)));
    }

    #[test]
    fn test_parse_decimal_from_numbers() {
        assert_eq!(parse_decimal(&json!(42)), Ok(dec!(42)));
        assert_eq!(parse_decimal(&json!(-7)), Ok(dec!(-7)));
        assert_eq!(parse_decimal(&json!(0.45)), Ok(dec!(0.45)));
    }

    #[test]
    fn test_parse_decimal_scientific() {
        assert_eq!(parse_decimal(&json!("1e3")), Ok(dec!(1000)));
        assert_eq!(parse_decimal(&json!("2.5E-3")), Ok(dec!(0.0025)));
        assert_eq!(parse_decimal(&json!("0e99")), Ok(dec!(0)));
    }

    #[test]
    fn test_parse_decimal_rejects_non_numeric() {
        assert_eq!(parse_decimal(&json!("abc")), Err(DecimalParseError::NotNumeric));
        assert_eq!(parse_decimal(&json!(true)), Err(DecimalParseError::NotNumeric));
        assert_eq!(parse_decimal(&json!(null)), Err(DecimalParseError::NotNumeric));
        assert_eq!(parse_decimal(&json!([1])), Err(DecimalParseError::NotNumeric));
        assert_eq!(parse_decimal(&json!("NaN")), Err(DecimalParseError::NotNumeric));
    }

    #[test]
    fn test_parse_decimal_never_rounds() {
        let too_precise = json!("0.12345678901234567890123456789012345");
        assert_eq!(parse_decimal(&too_precise), Err(DecimalParseError::Inexact));
    }

    #[test]
    fn test_parse_decimal_out_of_range() {
        assert_eq!(parse_decimal(&json!(1e30)), Err(DecimalParseError::OutOfRange));
        assert_eq!(parse_decimal(&json!("1e-40")), Err(DecimalParseError::OutOfRange));
        assert_eq!(
            parse_decimal(&json!("100000000000000000000000000000000")),
            Err(DecimalParseError::OutOfRange)
        );
    }

    #[test]
    fn test_decimal_field_with_too_many_digits_is_wrong_type() {
        let fields = map(json!({"total_value": "0.12345678901234567890123456789012345"}));
        let r = FieldReader::new(RecordKind::Portfolio, &fields);

        let err = r.required_decimal("total_value").unwrap_err();
        assert_eq!(err.field, "total_value");
        assert_eq!(
            err.reason,
            ValidationReason::WrongType {
                expected: "decimal with at most 28 significant digits",
                found: "string"
            }
        );
    }

    #[test]
    fn test_decimal_field_out_of_range_names_reason() {
        let fields = map(json!({"big": 1e30, "tiny": "1e-40"}));
        let r = FieldReader::new(RecordKind::PerformanceResult, &fields);

        for field in ["big", "tiny"] {
            let err = r.required_decimal(field).unwrap_err();
            assert_eq!(
                err.reason,
                ValidationReason::InvariantViolated("outside representable decimal range".to_string())
            );
        }
    }

    // ============= Timestamp Parsing Tests =============

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2025-01-17T09:30:00+09:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 17, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_naive_is_utc() {
        let ts = parse_timestamp("2025-01-17T09:30:00.250").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);
        assert_eq!(ts.day(), 17);

        assert!(parse_timestamp("2025-01-17 09:30:00").is_some());
        assert!(parse_timestamp("2025-01-17").is_none());
    }

    // ============= Presence Rule Tests =============

    #[test]
    fn test_required_missing() {
        let fields = map(json!({}));
        let r = FieldReader::new(RecordKind::User, &fields);

        let err = r.required_str("name").unwrap_err();
        assert_eq!(err.entity, RecordKind::User);
        assert_eq!(err.field, "name");
        assert_eq!(err.reason, ValidationReason::Missing);
    }

    #[test]
    fn test_required_null_is_wrong_type() {
        let fields = map(json!({"name": null}));
        let r = FieldReader::new(RecordKind::User, &fields);

        let err = r.required_str("name").unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::WrongType {
                expected: "string",
                found: "null"
            }
        );
    }

    #[test]
    fn test_optional_absent_or_null() {
        let fields = map(json!({"report_path": null}));
        let r = FieldReader::new(RecordKind::Prediction, &fields);

        assert_eq!(r.optional_str("report_path").unwrap(), None);
        assert_eq!(r.optional_str("report_markdown").unwrap(), None);
        assert_eq!(r.optional_decimal("expected_return").unwrap(), None);
    }

    #[test]
    fn test_defaulted_values() {
        let fields = map(json!({}));
        let r = FieldReader::new(RecordKind::AgentPerformance, &fields);

        assert_eq!(r.count_or_zero("total_predictions").unwrap(), 0);
        assert_eq!(r.decimal_or("accuracy_rate", dec!(0.0)).unwrap(), dec!(0.0));
        assert!(r.string_list_or_empty("layers_completed").unwrap().is_empty());
    }

    #[test]
    fn test_defaulted_null_is_wrong_type() {
        let fields = map(json!({"created_at": null, "total_predictions": null}));
        let r = FieldReader::new(RecordKind::User, &fields);

        assert!(r.timestamp_or_now("created_at").is_err());
        assert!(r.count_or_zero("total_predictions").is_err());
    }

    // ============= Typed Field Tests =============

    #[test]
    fn test_string_rejects_number() {
        let fields = map(json!({"user_id": 7}));
        let r = FieldReader::new(RecordKind::User, &fields);

        let err = r.required_str("user_id").unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::WrongType {
                expected: "string",
                found: "integer"
            }
        );
    }

    #[test]
    fn test_token_parsing() {
        let fields = map(json!({"flow": "income", "bad": "GROWTH", "num": 1}));
        let r = FieldReader::new(RecordKind::User, &fields);

        assert_eq!(r.required_token::<FlowType>("flow").unwrap(), FlowType::Income);

        let err = r.required_token::<FlowType>("bad").unwrap_err();
        assert_eq!(
            err.reason,
            ValidationReason::UnknownToken {
                token: "GROWTH".to_string(),
                allowed: &["growth", "income"],
            }
        );

        assert!(matches!(
            r.required_token::<FlowType>("num").unwrap_err().reason,
            ValidationReason::WrongType { .. }
        ));
    }

    #[test]
    fn test_date_parsing() {
        let fields = map(json!({"d": "2025-01-17", "bad": "17/01/2025"}));
        let r = FieldReader::new(RecordKind::Portfolio, &fields);

        let d = r.required_date("d").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2025, 1, 17));
        assert!(r.required_date("bad").is_err());
    }

    #[test]
    fn test_count_rejects_negative_and_fraction() {
        let fields = map(json!({"neg": -1, "frac": 2.5, "ok": 12}));
        let r = FieldReader::new(RecordKind::AgentPerformance, &fields);

        assert!(r.count_or_zero("neg").is_err());
        assert!(r.count_or_zero("frac").is_err());
        assert_eq!(r.count_or_zero("ok").unwrap(), 12);
    }

    #[test]
    fn test_number_map_names_offending_key() {
        let fields = map(json!({"allocation": {"SPY": 0.45, "cash": "lots"}}));
        let r = FieldReader::new(RecordKind::Portfolio, &fields);

        let err = r.required_number_map("allocation").unwrap_err();
        assert_eq!(err.field, "allocation.cash");
    }

    #[test]
    fn test_object_list_names_offending_index() {
        let fields = map(json!({"rebalancing_actions": [{"symbol": "SPY"}, "sell"]}));
        let r = FieldReader::new(RecordKind::Prediction, &fields);

        let err = r.optional_object_list("rebalancing_actions").unwrap_err();
        assert_eq!(err.field, "rebalancing_actions[1]");
    }

    #[test]
    fn test_string_list() {
        let fields = map(json!({"layers": ["macro", "strategy"], "mixed": ["macro", 3]}));
        let r = FieldReader::new(RecordKind::ExecutionLog, &fields);

        assert_eq!(r.string_list_or_empty("layers").unwrap(), vec!["macro", "strategy"]);
        assert_eq!(r.string_list_or_empty("mixed").unwrap_err().field, "mixed[1]");
    }

    // ============= Unknown Field Tests =============

    #[test]
    fn test_unknown_fields_ignored_by_default() {
        let fields = map(json!({"user_id": "marv", "nickname": "m"}));
        let r = FieldReader::new(RecordKind::User, &fields);

        assert!(r.check_unknown(&["user_id"], &ValidationConfig::default()).is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected_when_configured() {
        let fields = map(json!({"user_id": "marv", "nickname": "m"}));
        let r = FieldReader::new(RecordKind::User, &fields);

        let err = r.check_unknown(&["user_id"], &ValidationConfig::strict()).unwrap_err();
        assert_eq!(err.field, "nickname");
        assert_eq!(err.reason, ValidationReason::UnknownField);
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type(&json!(1)), "integer");
        assert_eq!(json_type(&json!(1.5)), "float");
        assert_eq!(json_type(&json!({})), "object");
        assert_eq!(json_type(&json!("x")), "string");
    }
}
