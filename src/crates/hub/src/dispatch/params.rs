use super::DispatchError;
use crate::Result;
use serde_json::Value;

/// Fail with `MissingParameter` unless every name is present and non-null.
pub(crate) fn require(action: &str, parameters: &Value, names: &[&str]) -> Result<()> {
    for name in names {
        let present = match parameters.get(*name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(DispatchError::MissingParameter {
                action: action.to_string(),
                name: name.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// A required string parameter.
pub(crate) fn require_str<'a>(action: &str, parameters: &'a Value, name: &str) -> Result<&'a str> {
    require(action, parameters, &[name])?;
    parameters.get(name).and_then(Value::as_str).ok_or_else(|| {
        DispatchError::MissingParameter {
            action: action.to_string(),
            name: name.to_string(),
        }
        .into()
    })
}

pub(crate) fn optional_str<'a>(parameters: &'a Value, name: &str) -> Option<&'a str> {
    parameters.get(name).and_then(Value::as_str)
}
