//! Input checks at the operator boundary: prompt gating and form-field coercion.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{OperatorError, Result};

/// A prompt is only submitted when it carries non-whitespace text
pub fn is_submittable(prompt: &str) -> bool {
    !prompt.trim().is_empty()
}

/// Return a copy of `record` with `field` set from the raw string `raw`.
///
/// Field names are the camelCase names the record serializes with. Numeric
/// fields must parse as finite numbers; enumerated fields must match one of
/// their labels exactly. The original record is never modified, so a rejected
/// edit leaves state untouched.
pub fn coerce_field<T>(record: &T, field: &str, raw: &str) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(record)?;
    let object = value
        .as_object_mut()
        .ok_or_else(|| OperatorError::Internal("record did not serialize to an object".into()))?;

    let current = object.get(field).ok_or_else(|| {
        let mut known: Vec<&str> = object.keys().map(String::as_str).collect();
        known.sort_unstable();
        OperatorError::Validation(format!(
            "unknown field '{field}'. Known fields: {}",
            known.join(", ")
        ))
    })?;

    let raw = raw.trim();
    let replacement = match current {
        Value::Number(_) => {
            let number: f64 = raw.parse().map_err(|_| {
                OperatorError::Validation(format!("field '{field}' expects a number, got '{raw}'"))
            })?;
            let number = serde_json::Number::from_f64(number).ok_or_else(|| {
                OperatorError::Validation(format!("field '{field}' must be a finite number"))
            })?;
            Value::Number(number)
        }
        _ => Value::String(raw.to_string()),
    };
    object.insert(field.to_string(), replacement);

    serde_json::from_value(value)
        .map_err(|e| OperatorError::Validation(format!("invalid value '{raw}' for '{field}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MachineConstants, PaperGrade, ProductionTelemetry, UnitCosts};

    #[test]
    fn test_blank_prompts_are_not_submittable() {
        assert!(!is_submittable(""));
        assert!(!is_submittable("   \n\t "));
        assert!(is_submittable(" test "));
    }

    #[test]
    fn test_numeric_field_is_coerced() {
        let telemetry = ProductionTelemetry::default();
        let updated = coerce_field(&telemetry, "wasteContent", " 6.25 ").unwrap();
        assert_eq!(updated.waste_content, 6.25);
        assert_eq!(updated.grammage, telemetry.grammage);
    }

    #[test]
    fn test_enumerated_field_accepts_known_label() {
        let telemetry = ProductionTelemetry::default();
        let updated = coerce_field(&telemetry, "grade", "Testliner").unwrap();
        assert_eq!(updated.grade, PaperGrade::Testliner);
    }

    #[test]
    fn test_enumerated_field_rejects_unknown_label() {
        let telemetry = ProductionTelemetry::default();
        let err = coerce_field(&telemetry, "starchType", "Mısır").unwrap_err();
        assert!(matches!(err, OperatorError::Validation(_)));
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let costs = UnitCosts::default();
        let err = coerce_field(&costs, "occPrice", "cheap").unwrap_err();
        assert!(err.to_string().contains("expects a number"));
    }

    #[test]
    fn test_unknown_field_lists_known_fields() {
        let machine = MachineConstants::default();
        let err = coerce_field(&machine, "width", "300").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown field 'width'"));
        assert!(msg.contains("trimWidth"));
    }
}
