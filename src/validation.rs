/// Inbound request validation for the detection endpoints
use crate::domain::{Payload, VideoSource};
use crate::errors::{ApiError, ApiResult};
use serde_json::Value;

pub const MAX_TEXT_CHARS: usize = 10_000;

const IMAGE_FORMATS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const VIDEO_FORMATS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "webm"];

/// Fetch a required string field. Absent, null and "" all count as missing.
fn required_str<'a>(
    body: &'a Value,
    field: &str,
    label: &str,
    type_hint: &str,
) -> ApiResult<&'a str> {
    let value = match body.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    };

    let value = value.ok_or_else(|| {
        ApiError::invalid(
            "Missing required field",
            format!("{} field is required in request body", label),
        )
    })?;

    value.as_str().ok_or_else(|| {
        ApiError::invalid(
            "Invalid data type",
            format!("{} field must be {}", label, type_hint),
        )
    })
}

/// `data:<media>/<format>;base64,` with a format from the allow list
fn is_data_uri(input: &str, media: &str, formats: &[&str]) -> bool {
    let Some(rest) = input
        .strip_prefix("data:")
        .and_then(|r| r.strip_prefix(media))
        .and_then(|r| r.strip_prefix('/'))
    else {
        return false;
    };
    formats.iter().any(|f| {
        rest.strip_prefix(f)
            .is_some_and(|r| r.starts_with(";base64,"))
    })
}

fn is_http_url(input: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        input
            .strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty())
    })
}

pub fn text_payload(body: &Value) -> ApiResult<Payload> {
    let text = required_str(body, "text", "Text", "a string")?;

    if text.trim().is_empty() {
        return Err(ApiError::invalid("Empty text", "Text field cannot be empty"));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::invalid(
            "Text too long",
            "Text field cannot exceed 10,000 characters",
        ));
    }

    Ok(Payload::Text(text.to_string()))
}

pub fn image_payload(body: &Value) -> ApiResult<Payload> {
    let image = required_str(body, "image", "Image", "a base64-encoded string")?;

    if !is_data_uri(image, "image", IMAGE_FORMATS) {
        return Err(ApiError::invalid(
            "Invalid image format",
            "Image must be a valid base64-encoded image with proper data URI format",
        ));
    }

    Ok(Payload::Image(image.to_string()))
}

pub fn video_payload(body: &Value) -> ApiResult<Payload> {
    let video = required_str(body, "video", "Video", "a base64-encoded string or URL")?;

    if !is_http_url(video) && !is_data_uri(video, "video", VIDEO_FORMATS) {
        return Err(ApiError::invalid(
            "Invalid video format",
            "Video must be either a valid URL or base64-encoded video with proper data URI format",
        ));
    }

    Ok(Payload::Video(VideoSource::sniff(video)))
}
