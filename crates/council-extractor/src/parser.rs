//! Parse LLM output into meeting decisions

use crate::error::ExtractorError;
use council_domain::MeetingDecision;
use serde_json::Value;
use tracing::warn;

/// Parse an LLM JSON response into decisions
///
/// Entries missing a required field are skipped. A malformed or
/// out-of-range location is dropped rather than failing the entry.
pub fn parse_llm_response(response: &str) -> Result<Vec<MeetingDecision>, ExtractorError> {
    // LLMs sometimes wrap JSON in markdown code blocks
    let json_str = extract_json(response)?;

    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let entries = json
        .as_array()
        .ok_or_else(|| ExtractorError::InvalidFormat("Expected JSON array".to_string()))?;

    let mut decisions = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        match parse_decision_json(entry) {
            Ok(decision) => decisions.push(decision),
            Err(e) => warn!("Skipping decision {}: {}", idx, e),
        }
    }

    Ok(decisions)
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip the opening fence line and a closing fence if present
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn required_str(obj: &serde_json::Map<String, Value>, field: &str) -> Result<String, String> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing or invalid '{}'", field))
}

/// Parse a single decision from JSON
fn parse_decision_json(json: &Value) -> Result<MeetingDecision, String> {
    let obj = json
        .as_object()
        .ok_or_else(|| "Decision is not a JSON object".to_string())?;

    let title = required_str(obj, "title")?;
    let content = required_str(obj, "content")?;
    let summary = required_str(obj, "summary")?;

    Ok(MeetingDecision {
        title,
        content,
        location: parse_location(obj.get("location")),
        summary,
    })
}

fn parse_location(value: Option<&Value>) -> Option<[f64; 2]> {
    let pair = match value {
        None | Some(Value::Null) => return None,
        Some(Value::Array(pair)) if pair.len() == 2 => pair,
        Some(other) => {
            warn!("Ignoring malformed location: {}", other);
            return None;
        }
    };

    let location = [pair[0].as_f64()?, pair[1].as_f64()?];
    if MeetingDecision::is_valid_location(location) {
        Some(location)
    } else {
        warn!("Ignoring out-of-range location: {:?}", location);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_DECISION: &str = r#"[
        {
            "title": "New bike lanes on Main Street",
            "content": "THAT Council approve protected bike lanes on Main Street",
            "location": [49.2606, -123.1009],
            "summary": "Council approved bike lanes on Main Street."
        }
    ]"#;

    #[test]
    fn test_parse_valid_json() {
        let decisions = parse_llm_response(ONE_DECISION).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].title, "New bike lanes on Main Street");
        assert_eq!(decisions[0].location, Some([49.2606, -123.1009]));
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = format!("```json\n{}\n```", ONE_DECISION);
        let decisions = parse_llm_response(&response).unwrap();
        assert_eq!(decisions.len(), 1);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_llm_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_llm_response("This is not JSON");
        assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_json_not_array() {
        let result = parse_llm_response(r#"{"title": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_null_location() {
        let response = r#"[{"title": "t", "content": "c", "location": null, "summary": "s"}]"#;
        let decisions = parse_llm_response(response).unwrap();
        assert_eq!(decisions[0].location, None);
    }

    #[test]
    fn test_missing_location_is_null() {
        let response = r#"[{"title": "t", "content": "c", "summary": "s"}]"#;
        let decisions = parse_llm_response(response).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].location, None);
    }

    #[test]
    fn test_bad_locations_are_dropped() {
        let response = r#"[
            {"title": "a", "content": "c", "location": [200.0, 10.0], "summary": "s"},
            {"title": "b", "content": "c", "location": [49.0], "summary": "s"},
            {"title": "c", "content": "c", "location": "Main St", "summary": "s"}
        ]"#;
        let decisions = parse_llm_response(response).unwrap();
        assert_eq!(decisions.len(), 3);
        assert!(decisions.iter().all(|d| d.location.is_none()));
    }

    #[test]
    fn test_partial_success() {
        let response = r#"[
            {"title": "first", "content": "c", "location": null, "summary": "s"},
            {"title": "missing content", "summary": "s"},
            {"title": "  ", "content": "c", "location": null, "summary": "s"},
            {"title": "third", "content": "c", "location": null, "summary": "s"}
        ]"#;
        let decisions = parse_llm_response(response).unwrap();
        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].title, "first");
        assert_eq!(decisions[1].title, "third");
    }

    #[test]
    fn test_extract_json_from_markdown_without_language() {
        let response = "```\n[]\n```";
        assert_eq!(extract_json(response).unwrap(), "[]");
    }

    #[test]
    fn test_extract_json_unterminated_fence() {
        let response = "```json\n[]";
        assert_eq!(extract_json(response).unwrap(), "[]");
    }
}
