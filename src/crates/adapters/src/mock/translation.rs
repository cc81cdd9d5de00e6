use super::{optional_str, required_str, stable_id};
use crate::error::{AdapterError, Result};
use serde_json::{json, Value};

pub(super) fn invoke(action: &str, params: &Value) -> Result<Value> {
    match action {
        "translate" => translate(action, params),
        "schedule_interpreter" => {
            let language = required_str(params, "language")?;
            Ok(json!({
                "session_id": stable_id("interp", action, params),
                "language": language,
                "session_type": optional_str(params, "session_type").unwrap_or("video_remote"),
                "scheduled_for": optional_str(params, "scheduled_for").unwrap_or("next_available"),
                "interpreter": format!("Certified {} interpreter", language),
                "status": "confirmed",
            }))
        }
        "generate_asl_video" => {
            let source = required_str(params, "source")?;
            let asl_video_id = stable_id("asl", action, params);
            Ok(json!({
                "url": format!("https://media.mock-translate.test/asl/{}.mp4", asl_video_id),
                "asl_video_id": asl_video_id,
                "source": source,
                "status": "rendered",
            }))
        }
        _ => Err(AdapterError::unsupported("translation", action)),
    }
}

fn translate(action: &str, params: &Value) -> Result<Value> {
    let content = required_str(params, "content")?;
    let target = required_str(params, "target_language")?;
    let content_type = optional_str(params, "content_type").unwrap_or("text");

    match content_type {
        "text" => {
            let translated = if is_sign_language(target) {
                asl_gloss(content)
            } else {
                format!("[{}] {}", target, content)
            };
            Ok(json!({
                "translated_content": translated,
                "target_language": target,
                "format": "text",
            }))
        }
        "video" | "audio" => {
            let extension = if content_type == "video" { "mp4" } else { "mp3" };
            let id = stable_id("tr", action, params);
            Ok(json!({
                "url": format!("https://media.mock-translate.test/{}.{}", id, extension),
                "target_language": target,
                "format": content_type,
            }))
        }
        other => Err(AdapterError::InvalidParameters(format!(
            "unsupported content_type '{}'",
            other
        ))),
    }
}

fn is_sign_language(language: &str) -> bool {
    matches!(
        language.to_ascii_lowercase().as_str(),
        "asl" | "american sign language"
    )
}

/// Uppercase gloss with punctuation dropped, the usual written form of ASL.
/// Text with no words to sign passes through trimmed.
fn asl_gloss(text: &str) -> String {
    let gloss = text
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .collect::<String>()
                .to_uppercase()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if gloss.is_empty() {
        text.trim().to_string()
    } else {
        gloss
    }
}
