//! Unit tests for RecordKind and the Record envelope.

#[cfg(test)]
mod record_tests {
    use serde_json::json;

    use crate::config::ValidationConfig;
    use crate::error::EnvelopeError;
    use crate::records::{Record, RecordKind, User};
    use crate::schema::FlowType;

    #[test]
    fn test_record_kind_tokens() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), *kind);
        }
        assert!("users".parse::<RecordKind>().is_err());
        assert_eq!(RecordKind::PerformanceResult.to_string(), "performance_result");
    }

    #[test]
    fn test_record_kind_id_fields() {
        assert_eq!(RecordKind::User.id_field(), "user_id");
        assert_eq!(RecordKind::AgentPerformance.id_field(), "record_id");
        assert_eq!(RecordKind::ExecutionLog.id_field(), "log_id");
    }

    #[test]
    fn test_from_envelope() {
        let envelope = json!({
            "kind": "user",
            "fields": {"user_id": "marv", "name": "Marv", "profile": "growth", "flow": "growth"},
        });
        let record = Record::from_envelope(&envelope, &ValidationConfig::default()).unwrap();

        assert_eq!(record.kind(), RecordKind::User);
        assert_eq!(record.id(), "marv");
    }

    #[test]
    fn test_envelope_errors() {
        let config = ValidationConfig::default();

        assert!(matches!(
            Record::from_envelope(&json!([]), &config),
            Err(EnvelopeError::NotAnObject)
        ));
        assert!(matches!(
            Record::from_envelope(&json!({"fields": {}}), &config),
            Err(EnvelopeError::MissingKey("kind"))
        ));
        assert!(matches!(
            Record::from_envelope(&json!({"kind": "user"}), &config),
            Err(EnvelopeError::MissingKey("fields"))
        ));
        assert!(matches!(
            Record::from_envelope(&json!({"kind": "trade", "fields": {}}), &config),
            Err(EnvelopeError::UnknownKind(k)) if k == "trade"
        ));
        assert!(matches!(
            Record::from_envelope(&json!({"kind": "user", "fields": {}}), &config),
            Err(EnvelopeError::Schema(e)) if e.field == "user_id"
        ));
    }

    #[test]
    fn test_to_json_is_flat() {
        let record = Record::from(User::new("marv", "Marv", "growth", FlowType::Growth));
        let value = record.to_json().unwrap();

        assert_eq!(value["user_id"], "marv");
        assert!(value.get("User").is_none());
    }
}
