//! Product image lists.
//!
//! Older records and clients send a single image string instead of a list.
//! That shape is still accepted and wrapped into a one-element list; it is a
//! compatibility shim, new clients should always send an array.

use catalog_core::FieldError;
use serde_json::Value;
use url::Url;

/// `true` for absolute `http://` or `https://` URLs with a host.
pub fn is_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Validate and normalize an `images` input value.
///
/// Reports one error per offending entry so the caller sees every bad URL at once.
pub fn coerce_images(value: Option<&Value>) -> Result<Vec<String>, Vec<FieldError>> {
    let entries: Vec<&Value> = match value {
        None | Some(Value::Null) => {
            return Err(vec![FieldError::new("images", "at least one image is required")]);
        }
        Some(single) if single.is_string() => vec![single],
        Some(Value::Array(items)) => items.iter().collect(),
        Some(_) => {
            return Err(vec![FieldError::new(
                "images",
                "must be an image URL or a list of image URLs",
            )]);
        }
    };

    if entries.is_empty() {
        return Err(vec![FieldError::new("images", "at least one image is required")]);
    }

    let mut images = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        match entry {
            Value::String(s) if s.trim().is_empty() => {
                errors.push(FieldError::new(format!("images[{idx}]"), "must not be empty"));
            }
            Value::String(s) if is_http_url(s.trim()) => images.push(s.trim().to_string()),
            Value::String(_) => {
                errors.push(FieldError::new(format!("images[{idx}]"), "must be an http(s) URL"));
            }
            _ => errors.push(FieldError::new(format!("images[{idx}]"), "must be a string")),
        }
    }

    if errors.is_empty() { Ok(images) } else { Err(errors) }
}

/// Read a persisted `images` value, which may be a legacy bare string.
///
/// Never fails: anything that is not a string is dropped.
pub fn images_from_document(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.is_empty() => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
