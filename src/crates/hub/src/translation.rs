//! Translation facility.
//!
//! Translates one content unit per call through the translation adapter's
//! `translate` action and returns a fully resolved [`Translation`]. Text comes
//! back inline; video and audio come back as a reference URL to the rendered
//! media.

use crate::model::{
    ContentType, OriginalContent, Translation, TranslationEntry, TranslationRequest,
    TranslationStatus,
};
use crate::{HubError, Result};
use adapters::{AdapterError, ServiceAdapter};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Synchronous request/response translation
pub struct TranslationService {
    adapter: Arc<dyn ServiceAdapter>,
}

impl TranslationService {
    pub fn new(adapter: Arc<dyn ServiceAdapter>) -> Self {
        Self { adapter }
    }

    /// Translate `request.content` into `request.target_language`.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for empty content or an empty target language, `Adapter`
    /// when the translation service fails or answers without the expected
    /// field.
    pub async fn translate(&self, request: TranslationRequest) -> Result<Translation> {
        if request.content.trim().is_empty() {
            return Err(HubError::InvalidInput(
                "Cannot translate empty content".to_string(),
            ));
        }
        if request.target_language.trim().is_empty() {
            return Err(HubError::InvalidInput(
                "Target language is required".to_string(),
            ));
        }

        let requested_at = Utc::now();
        let content_id = request
            .content_id
            .clone()
            .unwrap_or_else(|| format!("content_{}", Uuid::new_v4().simple()));

        let parameters = json!({
            "content": request.content,
            "source_language": request.source_language,
            "target_language": request.target_language,
            "content_type": request.content_type,
            "content_id": content_id,
        });

        tracing::debug!(
            content_type = %request.content_type,
            source = %request.source_language,
            target = %request.target_language,
            "Translating content"
        );
        let result = self.adapter.invoke("translate", &parameters).await?;

        let entry = Self::entry_from_result(&request, &result)?;
        let completed_at = Utc::now();

        tracing::info!(
            content_id = %content_id,
            target = %request.target_language,
            "Translation completed"
        );

        Ok(Translation {
            id: Uuid::new_v4(),
            original: OriginalContent {
                content_type: request.content_type,
                content_id,
                language: request.source_language,
                content: request.content,
            },
            translations: vec![entry],
            status: TranslationStatus::Completed,
            requested_at,
            completed_at: Some(completed_at),
        })
    }

    fn entry_from_result(request: &TranslationRequest, result: &Value) -> Result<TranslationEntry> {
        // Translated text may legitimately be empty; a media URL may not.
        let field = |name: &str, allow_empty: bool| {
            result
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| allow_empty || !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    HubError::Adapter(AdapterError::InvalidResponse(format!(
                        "translation result is missing '{}'",
                        name
                    )))
                })
        };

        let (content, url) = match request.content_type {
            ContentType::Text => (Some(field("translated_content", true)?), None),
            ContentType::Video | ContentType::Audio => (None, Some(field("url", false)?)),
        };

        Ok(TranslationEntry {
            language: request.target_language.clone(),
            format: request.content_type,
            content,
            url,
            status: TranslationStatus::Completed,
            created_at: Utc::now(),
        })
    }
}
