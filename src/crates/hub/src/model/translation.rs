use super::workflow::default_language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of content being translated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Text,
    Video,
    Audio,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Video => "video",
            ContentType::Audio => "audio",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    Pending,
    Completed,
    Failed,
}

/// A request to translate one content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub content: String,
    #[serde(default = "default_language")]
    pub source_language: String,
    pub target_language: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub content_id: Option<String>,
}

impl TranslationRequest {
    pub fn new(
        content: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        content_type: ContentType,
    ) -> Self {
        Self {
            content: content.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            content_type,
            content_id: None,
        }
    }

    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

/// The content a translation was made from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalContent {
    pub content_type: ContentType,
    pub content_id: String,
    pub language: String,
    pub content: String,
}

/// One translated rendition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub language: String,
    pub format: ContentType,
    /// Inline translated text (text content)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reference to rendered media (video and audio content)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: TranslationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub id: Uuid,
    pub original: OriginalContent,
    pub translations: Vec<TranslationEntry>,
    pub status: TranslationStatus,
    pub requested_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let req: TranslationRequest = serde_json::from_value(json!({
            "content": "Hello",
            "target_language": "ASL"
        }))
        .unwrap();

        assert_eq!(req.source_language, "English");
        assert_eq!(req.content_type, ContentType::Text);
        assert!(req.content_id.is_none());
    }
}
