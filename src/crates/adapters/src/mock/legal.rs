use super::{optional_str, required_str, stable_id};
use crate::error::{AdapterError, Result};
use serde_json::{json, Value};

pub(super) fn invoke(action: &str, params: &Value) -> Result<Value> {
    match action {
        "schedule_consultation" => {
            let topic = required_str(params, "topic")?;
            let consultation_id = stable_id("cons", action, params);
            Ok(json!({
                "meeting_url": format!("https://meet.mock-legal.test/{}", consultation_id),
                "consultation_id": consultation_id,
                "topic": topic,
                "attorney": "Assigned Attorney",
                "scheduled_for": optional_str(params, "preferred_date").unwrap_or("next_available"),
                "status": "scheduled",
            }))
        }
        "conduct_consultation" => {
            let topic = required_str(params, "topic")?;
            Ok(json!({
                "topic": topic,
                "notes_id": stable_id("notes", action, params),
                "status": "completed",
            }))
        }
        "prepare_documents" => {
            let document_type = required_str(params, "document_type")?;
            let document_id = stable_id("doc", action, params);
            Ok(json!({
                "download_url": format!("https://docs.mock-legal.test/{}.pdf", document_id),
                "document_id": document_id,
                "document_type": document_type,
                "status": "draft_ready",
            }))
        }
        "generate_summary" => {
            let topic = required_str(params, "topic")?;
            Ok(json!({
                "summary_id": stable_id("sum", action, params),
                "summary": format!("Consultation summary: {}", topic),
                "language": optional_str(params, "language").unwrap_or("English"),
            }))
        }
        _ => Err(AdapterError::unsupported("legal", action)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_consultation() {
        let result = invoke(
            "schedule_consultation",
            &json!({ "topic": "operating agreement", "preferred_date": "2026-11-02" }),
        )
        .unwrap();

        assert_eq!(result["status"], "scheduled");
        assert_eq!(result["scheduled_for"], "2026-11-02");
        let id = result["consultation_id"].as_str().unwrap();
        assert!(result["meeting_url"].as_str().unwrap().ends_with(id));
    }

    #[test]
    fn test_summary_language_default() {
        let result = invoke("generate_summary", &json!({ "topic": "leases" })).unwrap();
        assert_eq!(result["language"], "English");
        assert_eq!(result["summary"], "Consultation summary: leases");
    }
}
