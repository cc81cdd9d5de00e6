use super::{optional_str, required_str, stable_id};
use crate::error::{AdapterError, Result};
use serde_json::{json, Value};

pub(super) fn invoke(action: &str, params: &Value) -> Result<Value> {
    match action {
        "check_name_availability" => {
            let name = required_str(params, "business_name")?;
            let state = optional_str(params, "state").unwrap_or("DE");
            Ok(json!({
                "business_name": name,
                "state": state,
                "available": true,
                "normalized_name": name.trim().to_uppercase(),
            }))
        }
        "submit_formation" => {
            let name = required_str(params, "business_name")?;
            Ok(json!({
                "filing_id": stable_id("fil", action, params),
                "business_name": name,
                "entity_type": optional_str(params, "entity_type").unwrap_or("llc"),
                "state": optional_str(params, "state").unwrap_or("DE"),
                "status": "submitted",
                "estimated_completion_days": 10,
            }))
        }
        "obtain_ein" => {
            let name = required_str(params, "business_name")?;
            Ok(json!({
                "business_name": name,
                "ein": mock_ein(action, params),
                "status": "issued",
            }))
        }
        "register_state_tax" => {
            let state = required_str(params, "state")?;
            Ok(json!({
                "registration_id": stable_id("tax", action, params),
                "state": state,
                "status": "registered",
            }))
        }
        "get_filing_status" => {
            let filing_id = required_str(params, "filing_id")?;
            Ok(json!({ "filing_id": filing_id, "status": "approved" }))
        }
        _ => Err(AdapterError::unsupported("formation", action)),
    }
}

/// Nine digits taken from the request digest, formatted `NN-NNNNNNN`.
fn mock_ein(action: &str, params: &Value) -> String {
    let id = stable_id("ein", action, params);
    let digits: String = id
        .bytes()
        .skip("ein_".len())
        .map(|b| char::from(b'0' + b % 10))
        .chain(std::iter::repeat('0'))
        .take(9)
        .collect();
    format!("{}-{}", &digits[..2], &digits[2..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_formation_defaults() {
        let result = invoke("submit_formation", &json!({ "business_name": "Acme" })).unwrap();
        assert_eq!(result["status"], "submitted");
        assert_eq!(result["entity_type"], "llc");
        assert!(result["filing_id"].as_str().unwrap().starts_with("fil_"));
    }

    #[test]
    fn test_ein_shape() {
        let result = invoke("obtain_ein", &json!({ "business_name": "Acme" })).unwrap();
        let ein = result["ein"].as_str().unwrap();
        assert_eq!(ein.len(), 10);
        assert_eq!(&ein[2..3], "-");
        assert!(ein.chars().filter(|c| *c != '-').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_missing_business_name() {
        let err = invoke("check_name_availability", &json!({})).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidParameters(_)));
    }
}
