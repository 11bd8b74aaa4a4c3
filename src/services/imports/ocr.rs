//! AI-vision invoice OCR.
//!
//! The extractor is a trait so the vision provider can be swapped (or mocked
//! in tests) without touching the handlers. The stock implementation talks to
//! an OpenAI-compatible chat-completions endpoint and asks, in Hebrew, for a
//! JSON item list.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{ImportItem, ImportPreview};
use crate::config::AppConfig;

pub const SUPPORTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

const SYSTEM_PROMPT: &str = "אתה מנתח חשבוניות בעברית.";

const EXTRACTION_PROMPT: &str = "\
חלץ מהחשבונית רשימת מוצרים בפורמט JSON בלבד.
החזר מערך של אובייקטים במבנה:
[{ \"name\": \"שם מוצר\", \"quantity\": 1, \"price\": 9.9 }]
אם אין מידע, החזר מערך ריק.";

#[async_trait]
pub trait VisionExtractor: Send + Sync {
    /// Reads invoice line items out of an image. Failures are reported inside
    /// the preview, never as an Err; the operator sees the message verbatim.
    async fn extract_items(&self, image: &[u8], mime: &str) -> ImportPreview;
}

pub struct OpenAiVision {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    max_upload_bytes: usize,
}

impl OpenAiVision {
    pub fn from_config(config: &AppConfig) -> Self {
        OpenAiVision {
            client: Client::new(),
            api_key: config.vision_api_key.clone(),
            api_url: config.vision_api_url.clone(),
            model: config.vision_model.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// What the model is asked to emit per line. Numbers come back as JSON
/// numbers but nothing is guaranteed, so every field is optional.
#[derive(Debug, Deserialize)]
struct RawCandidate {
    name: Option<String>,
    quantity: Option<f64>,
    price: Option<f64>,
    sku: Option<String>,
}

/// Cuts the first `[` .. last `]` span out of the model reply; vision models
/// like to wrap the JSON in prose or code fences.
pub fn extract_json_array(text: &str) -> &str {
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => "[]",
    }
}

/// Parses candidate lines, keeping only those with a name and a positive
/// quantity. `None` means the span was not valid JSON at all.
pub fn parse_candidates(raw: &str) -> Option<Vec<ImportItem>> {
    let candidates: Vec<RawCandidate> = serde_json::from_str(raw).ok()?;
    Some(
        candidates
            .into_iter()
            .filter_map(|candidate| {
                let name = candidate.name?.trim().to_string();
                let quantity = candidate
                    .quantity
                    .filter(|q| q.is_finite())
                    .map(|q| q.floor() as i32)
                    .unwrap_or(0);
                if name.is_empty() || quantity <= 0 {
                    return None;
                }
                Some(ImportItem {
                    name,
                    sku: candidate.sku.filter(|s| !s.trim().is_empty()),
                    quantity,
                    price: candidate.price.and_then(Decimal::from_f64),
                    max_stock: None,
                    department: None,
                    model: None,
                    size: None,
                    barcode: None,
                })
            })
            .collect(),
    )
}

#[async_trait]
impl VisionExtractor for OpenAiVision {
    async fn extract_items(&self, image: &[u8], mime: &str) -> ImportPreview {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => return ImportPreview::failed("Vision API key is not configured"),
        };
        if !SUPPORTED_IMAGE_TYPES.contains(&mime) {
            return ImportPreview::failed(format!("Unsupported image type: {mime}"));
        }
        if image.len() > self.max_upload_bytes {
            return ImportPreview::failed("Invoice image is too large");
        }

        let data_uri = format!("data:{};base64,{}", mime, BASE64.encode(image));
        let body = json!({
            "model": self.model,
            "temperature": 0.1,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": EXTRACTION_PROMPT },
                        { "type": "image_url", "image_url": { "url": data_uri } }
                    ]
                }
            ]
        });

        let response = match self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "vision request failed");
                return ImportPreview::failed("Vision service request failed");
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "vision service rejected the request");
            return ImportPreview::failed(format!("Vision service returned {status}"));
        }

        let reply: ChatResponse = match response.json().await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "vision reply was not valid JSON");
                return ImportPreview::failed("Could not decode the vision service reply");
            }
        };

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| "[]".to_string());

        match parse_candidates(extract_json_array(&content)) {
            Some(items) => ImportPreview { items, error: None },
            None => ImportPreview::failed("Could not read item data from the invoice"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn json_span_is_first_open_to_last_close_bracket() {
        let reply = "Here you go:\n```json\n[{\"name\": \"shirt\", \"quantity\": 2}]\n```";
        assert_eq!(
            extract_json_array(reply),
            "[{\"name\": \"shirt\", \"quantity\": 2}]"
        );
    }

    #[test]
    fn missing_brackets_fall_back_to_an_empty_array() {
        assert_eq!(extract_json_array("no items found"), "[]");
        assert_eq!(extract_json_array("]["), "[]");
        assert_eq!(extract_json_array(""), "[]");
    }

    #[test]
    fn candidates_without_a_name_or_positive_quantity_are_dropped() {
        let raw = r#"[
            {"name": "חולצה", "quantity": 2, "price": 49.9},
            {"quantity": 5},
            {"name": "גרביים", "quantity": 0},
            {"name": "  ", "quantity": 3},
            {"name": "מכנסיים", "quantity": 1.8}
        ]"#;
        let items = parse_candidates(raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "חולצה");
        assert_eq!(items[0].price, Some(dec!(49.9)));
        // fractional quantities are floored
        assert_eq!(items[1].name, "מכנסיים");
        assert_eq!(items[1].quantity, 1);
    }

    #[test]
    fn invalid_json_is_reported_as_unparsable() {
        assert!(parse_candidates("[{not json").is_none());
    }
}
