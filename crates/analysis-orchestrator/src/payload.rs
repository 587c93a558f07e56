//! Boundary between free-form model output and the metrics record.

use analysis_core::AnalysisError;
use serde_json::{Map, Value};

/// Pull the JSON object out of a model response.
///
/// Takes everything from the first `{` to the last `}`, drops `//` line
/// comments (but not the `//` of a `scheme://` URL) and parses the rest. Anything
/// that is not a JSON object is rejected.
pub fn extract_json_payload(raw: &str) -> Result<Map<String, Value>, AnalysisError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(AnalysisError::MalformedPayload(
            "no JSON object in model output".to_string(),
        ));
    };
    if end < start {
        return Err(AnalysisError::MalformedPayload(
            "no JSON object in model output".to_string(),
        ));
    }

    let body = strip_line_comments(&raw[start..=end]);
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AnalysisError::MalformedPayload(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(AnalysisError::MalformedPayload(e.to_string())),
    }
}

fn strip_line_comments(json: &str) -> String {
    json.lines().map(strip_comment).collect::<Vec<_>>().join("\n")
}

fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut from = 0;
    while let Some(pos) = line[from..].find("//") {
        let at = from + pos;
        if at == 0 || bytes[at - 1] != b':' {
            return &line[..at];
        }
        from = at + 1;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_surrounding_chatter_is_ignored() {
        let raw = "Sure! Here are the metrics:\n```json\n{\"eps\": 2.45, \"roe\": \"18%\"}\n```\nLet me know.";
        let payload = extract_json_payload(raw).unwrap();
        assert_eq!(payload["eps"], json!(2.45));
        assert_eq!(payload["roe"], json!("18%"));
    }

    #[test]
    fn test_comments_stripped_urls_kept() {
        let raw = r#"{
            "eps": 2.45, // diluted
            "source": "https://example.com/filing",
            // whole-line comment
            "beta": 1.1
        }"#;
        let payload = extract_json_payload(raw).unwrap();
        assert_eq!(payload["source"], json!("https://example.com/filing"));
        assert_eq!(payload["beta"], json!(1.1));
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            extract_json_payload("no json here"),
            Err(AnalysisError::MalformedPayload(_))
        ));
        assert!(matches!(
            extract_json_payload("} backwards {"),
            Err(AnalysisError::MalformedPayload(_))
        ));
        assert!(matches!(
            extract_json_payload("{\"eps\": }"),
            Err(AnalysisError::MalformedPayload(_))
        ));
    }
}
