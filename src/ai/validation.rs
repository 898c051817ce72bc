//! Response Validation
//!
//! Extracts and validates the structured JSON the model was asked to emit.
//!
//! The whole response is parsed strictly first; only when that fails does the
//! validator fall back to the greedy brace heuristic (first `{` to last `}`)
//! for providers that wrap their JSON in prose. If the response contains
//! multiple JSON-like fragments, only the greedy outermost span is attempted.

use serde_json::Value;
use tracing::debug;

use crate::types::error::{MAX_EXPLANATION_WORDS, MIN_EXPLANATION_WORDS};
use crate::types::{ParsedExplanation, TestCase, ValidationError};

const REQUIRED_TEST_CASE_FIELDS: [&str; 3] = ["input", "expected_output", "description"];

/// Validate raw provider text and extract the explanation and test case.
///
/// Checks, in order:
/// 1. a JSON object can be extracted from the text;
/// 2. the object has `explanation` and `test_case`;
/// 3. `test_case` has `input`, `expected_output`, and `description`;
/// 4. the explanation's whitespace word count is within [20, 1000].
///
/// Each failure maps to its own [`ValidationError`] variant. Well-formed
/// input round-trips unchanged.
pub fn parse_explanation(raw: &str) -> Result<ParsedExplanation, ValidationError> {
    let value = extract_json(raw)?;

    let explanation = value
        .get("explanation")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField("explanation"))?
        .to_string();

    let test_case_value = value
        .get("test_case")
        .filter(|v| v.is_object())
        .ok_or(ValidationError::MissingField("test_case"))?;

    for field in REQUIRED_TEST_CASE_FIELDS {
        if test_case_value.get(field).and_then(Value::as_str).is_none() {
            return Err(ValidationError::MissingTestCaseField(field));
        }
    }

    let words = explanation.split_whitespace().count();
    if words < MIN_EXPLANATION_WORDS {
        return Err(ValidationError::ExplanationTooShort { words });
    }
    if words > MAX_EXPLANATION_WORDS {
        return Err(ValidationError::ExplanationTooLong { words });
    }

    let test_case = TestCase {
        input: field_string(test_case_value, "input"),
        expected_output: field_string(test_case_value, "expected_output"),
        description: field_string(test_case_value, "description"),
    };

    Ok(ParsedExplanation {
        explanation,
        test_case,
    })
}

fn field_string(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Extract a JSON object from raw provider text.
///
/// Tries a strict parse of the whole (trimmed) text first. On failure, falls
/// back to slicing from the first `{` to the last `}` - a documented last
/// resort for JSON wrapped in explanatory prose.
fn extract_json(raw: &str) -> Result<Value, ValidationError> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed)
        && value.is_object()
    {
        return Ok(value);
    }

    debug!("Strict parse failed, falling back to greedy brace extraction");

    let start = trimmed.find('{').ok_or(ValidationError::JsonNotFound)?;
    let end = trimmed.rfind('}').ok_or(ValidationError::JsonNotFound)?;
    if end <= start {
        return Err(ValidationError::JsonNotFound);
    }

    serde_json::from_str(&trimmed[start..=end])
        .map_err(|e| ValidationError::JsonSyntax(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_EXPLANATION: &str = "Machine learning is a subset of artificial intelligence \
        that enables computers to learn and make decisions from data without being explicitly \
        programmed for every single task.";

    fn valid_response() -> String {
        serde_json::json!({
            "explanation": VALID_EXPLANATION,
            "test_case": {
                "input": "A dataset of house prices",
                "expected_output": "A price prediction model",
                "description": "Tests understanding of supervised learning"
            }
        })
        .to_string()
    }

    #[test]
    fn test_valid_response_round_trips() {
        let parsed = parse_explanation(&valid_response()).unwrap();
        assert_eq!(parsed.explanation, VALID_EXPLANATION);
        assert_eq!(parsed.test_case.input, "A dataset of house prices");
        assert_eq!(parsed.test_case.expected_output, "A price prediction model");
        assert_eq!(
            parsed.test_case.description,
            "Tests understanding of supervised learning"
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let first = parse_explanation(&valid_response()).unwrap();
        let second = parse_explanation(&valid_response()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_json_wrapped_in_prose() {
        let wrapped = format!("Sure! Here is the answer:\n{}\nHope that helps.", valid_response());
        let parsed = parse_explanation(&wrapped).unwrap();
        assert_eq!(parsed.explanation, VALID_EXPLANATION);
    }

    #[test]
    fn test_markdown_fenced_json() {
        let fenced = format!("```json\n{}\n```", valid_response());
        let parsed = parse_explanation(&fenced).unwrap();
        assert_eq!(parsed.explanation, VALID_EXPLANATION);
    }

    #[test]
    fn test_no_braces_at_all() {
        let err = parse_explanation("This is not a JSON response").unwrap_err();
        assert_eq!(err, ValidationError::JsonNotFound);
    }

    #[test]
    fn test_lone_opening_brace() {
        let err = parse_explanation("here you go: {").unwrap_err();
        assert_eq!(err, ValidationError::JsonNotFound);
    }

    #[test]
    fn test_invalid_json_span() {
        let err = parse_explanation("{not valid json}").unwrap_err();
        assert!(matches!(err, ValidationError::JsonSyntax(_)));
    }

    #[test]
    fn test_missing_explanation() {
        let raw = r#"{"test_case": {"input": "a", "expected_output": "b", "description": "c"}}"#;
        let err = parse_explanation(raw).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("explanation"));
    }

    #[test]
    fn test_missing_test_case() {
        let raw = format!(r#"{{"explanation": "{}"}}"#, VALID_EXPLANATION);
        let err = parse_explanation(&raw).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("test_case"));
    }

    #[test]
    fn test_missing_test_case_field() {
        let raw = format!(
            r#"{{"explanation": "{}", "test_case": {{"input": "a", "description": "c"}}}}"#,
            VALID_EXPLANATION
        );
        let err = parse_explanation(&raw).unwrap_err();
        assert_eq!(err, ValidationError::MissingTestCaseField("expected_output"));
    }

    #[test]
    fn test_explanation_with_five_words_rejected() {
        let raw = r#"{
            "explanation": "only five words right here",
            "test_case": {"input": "a", "expected_output": "b", "description": "c"}
        }"#;
        let err = parse_explanation(raw).unwrap_err();
        assert_eq!(err, ValidationError::ExplanationTooShort { words: 5 });
    }

    #[test]
    fn test_explanation_with_1200_words_rejected() {
        let long = vec!["word"; 1200].join(" ");
        let raw = serde_json::json!({
            "explanation": long,
            "test_case": {"input": "a", "expected_output": "b", "description": "c"}
        })
        .to_string();
        let err = parse_explanation(&raw).unwrap_err();
        assert_eq!(err, ValidationError::ExplanationTooLong { words: 1200 });
    }

    #[test]
    fn test_exactly_twenty_words_accepted() {
        let exact = vec!["word"; 20].join(" ");
        let raw = serde_json::json!({
            "explanation": exact,
            "test_case": {"input": "a", "expected_output": "b", "description": "c"}
        })
        .to_string();
        assert!(parse_explanation(&raw).is_ok());
    }

    #[test]
    fn test_exactly_thousand_words_accepted() {
        let exact = vec!["word"; 1000].join(" ");
        let raw = serde_json::json!({
            "explanation": exact,
            "test_case": {"input": "a", "expected_output": "b", "description": "c"}
        })
        .to_string();
        assert!(parse_explanation(&raw).is_ok());
    }

    #[test]
    fn test_top_level_array_is_not_an_object() {
        let err = parse_explanation("[1, 2, 3]").unwrap_err();
        assert_eq!(err, ValidationError::JsonNotFound);
    }
}
