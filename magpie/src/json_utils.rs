//! Helpers for JSON produced at the LLM boundary.
//!
//! Models return JSON wrapped in Markdown fences and booleans as strings
//! often enough that both quirks are handled in exactly one place: all plan
//! parsing goes through [`strip_code_fence`] and all boolean-like fields
//! through [`truthy`].

use serde_json::Value;

/// Strip a surrounding Markdown code fence from `text`, if present.
///
/// Handles ```` ``` ```` and ```` ```json ```` (any language tag) fences with
/// arbitrary surrounding whitespace. Text without a fence is returned
/// trimmed.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag up to the first newline.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Coerce a boolean-like JSON value.
///
/// `true`/`false` booleans pass through; `"true"`/`"false"` strings are
/// compared case-insensitively. Anything else (including absence, numbers,
/// and unrelated strings) is `false`.
#[must_use]
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_json_fence() {
        let fenced = "```json\n{\"use_tools\": true}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"use_tools\": true}");
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"a\": 1}");
    }

    #[test]
    fn passes_unfenced_text_through() {
        assert_eq!(strip_code_fence("  {\"a\": 1} \n"), "{\"a\": 1}");
    }

    #[test]
    fn truthy_accepts_bools_and_strings() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!("true"))));
        assert!(truthy(Some(&json!("True"))));
        assert!(truthy(Some(&json!("TRUE"))));
        assert!(!truthy(Some(&json!(false))));
        assert!(!truthy(Some(&json!("false"))));
        assert!(!truthy(Some(&json!("fAlSe"))));
    }

    #[test]
    fn truthy_rejects_everything_else() {
        assert!(!truthy(None));
        assert!(!truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!("yes"))));
        assert!(!truthy(Some(&json!(null))));
        assert!(!truthy(Some(&json!({"nested": true}))));
    }
}
