//! Provider prompt construction and response sanitization.

use serde_json::Value;
use smart_tagging_core::{normalize_confidence, AnalysisResult, SentimentLevel, SmartTag};

/// System prompt listing the only legal output values.
pub fn system_prompt() -> String {
    let tags = SmartTag::ALL
        .iter()
        .map(|t| format!("\"{}\"", t.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    let sentiments = [
        SentimentLevel::Neutral,
        SentimentLevel::Positive,
        SentimentLevel::Negative,
        SentimentLevel::Urgent,
    ]
    .iter()
    .map(|s| format!("\"{}\"", s.as_str()))
    .collect::<Vec<_>>()
    .join(", ");

    format!(
        "You analyze restaurant reservation notes for a CRM.\n\
         Respond with a single JSON object and nothing else:\n\
         {{\"tags\": [..], \"sentiment\": \"..\", \"confidence\": 0.0, \"summary\": \"..\", \"urgent_reason\": null}}\n\n\
         Rules:\n\
         - \"tags\" may only contain values from: [{tags}]. Use an empty list when none apply.\n\
         - \"sentiment\" must be exactly one of: [{sentiments}].\n\
         - Use \"Urgent\" for severe allergies or medical risks (anaphylaxis, EpiPen, life-threatening reactions) and explain why in \"urgent_reason\". Otherwise \"urgent_reason\" is null.\n\
         - \"confidence\" is a number between 0 and 1.\n\
         - \"summary\" is one short sentence for restaurant staff."
    )
}

/// User message carrying both text fields.
pub fn user_message(special_request_text: &str, dietary_preferences: &str) -> String {
    format!(
        "Special Request: {}\nDietary Preferences: {}",
        or_none(special_request_text),
        or_none(dietary_preferences)
    )
}

fn or_none(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "(none)"
    } else {
        trimmed
    }
}

/// Parse and sanitize a provider answer.
///
/// Unknown tags are dropped, sentiment is coerced, confidence is clamped and
/// text fields are bounded. Fails when no JSON object with `tags` or
/// `sentiment` can be found.
pub fn parse_provider_output(content: &str) -> Result<AnalysisResult, String> {
    let json = extract_json_object(content).ok_or("no JSON object in response")?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| format!("invalid JSON: {}", e))?;
    let object = value.as_object().ok_or("response is not a JSON object")?;

    if !object.contains_key("tags") && !object.contains_key("sentiment") {
        return Err("response has neither tags nor sentiment".to_string());
    }

    let tags = match object.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(sanitize_tag)
            .collect::<Vec<_>>(),
        Some(Value::String(list)) => list.split(',').filter_map(sanitize_tag).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => return Err(format!("unexpected tags value: {}", other)),
    };

    let sentiment = object
        .get("sentiment")
        .and_then(Value::as_str)
        .map(SentimentLevel::coerce)
        .unwrap_or_default();

    let confidence = match object.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let urgent_reason = object
        .get("urgent_reason")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(AnalysisResult::new(
        tags,
        sentiment,
        normalize_confidence(confidence),
        summary,
        urgent_reason,
    ))
}

fn sanitize_tag(label: &str) -> Option<SmartTag> {
    let tag = SmartTag::from_label(label);
    if tag.is_none() {
        tracing::debug!(label = %label.trim(), "Dropping tag outside vocabulary");
    }
    tag
}

/// Slice from the first `{` to the last `}`, tolerating code fences and prose.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}
