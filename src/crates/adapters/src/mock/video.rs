use super::{optional_str, required_str, stable_id};
use crate::error::{AdapterError, Result};
use serde_json::{json, Value};

pub(super) fn invoke(action: &str, params: &Value) -> Result<Value> {
    match action {
        "upload_video" => {
            let video_id = required_str(params, "video_id")?;
            Ok(json!({
                "video_id": video_id,
                "asset_id": stable_id("asset", action, params),
                "title": optional_str(params, "title").unwrap_or(video_id),
                "playback_url": format!("https://media.mock-video.test/{}/play", video_id),
                "status": "uploaded",
            }))
        }
        "generate_captions" => {
            let video_id = required_str(params, "video_id")?;
            let language = optional_str(params, "language").unwrap_or("English");
            Ok(json!({
                "caption_id": stable_id("cap", action, params),
                "video_id": video_id,
                "language": language,
                "format": "vtt",
                "url": format!("https://media.mock-video.test/{}/captions.vtt", video_id),
            }))
        }
        "deliver_video" => {
            let video_id = required_str(params, "video_id")?;
            Ok(json!({
                "video_id": video_id,
                "share_url": format!("https://watch.mock-video.test/{}", video_id),
                "status": "published",
            }))
        }
        "get_video_status" => {
            let video_id = required_str(params, "video_id")?;
            Ok(json!({ "video_id": video_id, "status": "ready" }))
        }
        _ => Err(AdapterError::unsupported("video", action)),
    }
}
