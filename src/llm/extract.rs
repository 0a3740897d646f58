use serde_json::Value;

/// Why a JSON value could not be pulled out of a model completion.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("no opening `{0}` found in completion text")]
    NoOpeningDelimiter(char),
    #[error("no matching `{0}` found before end of completion text")]
    UnbalancedDelimiters(char),
    #[error("extracted candidate is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// Extract the first balanced `{`/`}` region of `text` and parse it as JSON.
pub fn extract_object(text: &str) -> Result<Value, ExtractError> {
    extract(text, '{', '}')
}

/// Extract the first balanced `[`/`]` region of `text` and parse it as JSON.
pub fn extract_array(text: &str) -> Result<Value, ExtractError> {
    extract(text, '[', ']')
}

/// Pull the first balanced delimiter region out of free-form completion text
/// and parse it as JSON.
///
/// Models wrap their JSON in prose, markdown fences, or trailing commentary;
/// everything before the first `open` and after its matching `close` is
/// ignored. Delimiters inside double-quoted JSON strings (including escaped
/// quotes) do not count toward nesting, so a string value like
/// `"sketch of a { brace"` cannot close the region early.
pub fn extract(text: &str, open: char, close: char) -> Result<Value, ExtractError> {
    let start = text
        .find(open)
        .ok_or(ExtractError::NoOpeningDelimiter(open))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + close.len_utf8();
                return Ok(serde_json::from_str(&text[start..end])?);
            }
        }
    }

    Err(ExtractError::UnbalancedDelimiters(close))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_object_wrapped_in_prose() {
        let text = "Sure! Here's the answer: {\"style\": \"casual\"} Hope that helps.";
        assert_eq!(extract_object(text).unwrap(), json!({"style": "casual"}));
    }

    #[test]
    fn extracts_object_from_markdown_fence() {
        let text = "```json\n{\"style\": \"formal\", \"confidence\": 0.9}\n```";
        assert_eq!(
            extract_object(text).unwrap(),
            json!({"style": "formal", "confidence": 0.9})
        );
    }

    #[test]
    fn returns_outer_object_for_nested_input() {
        let text = "{\"a\": {\"b\": 1}}";
        assert_eq!(extract_object(text).unwrap(), json!({"a": {"b": 1}}));
    }

    #[test]
    fn ignores_trailing_text_after_match() {
        let text = "{\"a\": 1} and then some {\"b\": 2}";
        assert_eq!(extract_object(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn fails_without_opening_delimiter() {
        assert!(matches!(
            extract_object("no json here"),
            Err(ExtractError::NoOpeningDelimiter('{'))
        ));
    }

    #[test]
    fn fails_on_unbalanced_delimiters() {
        assert!(matches!(
            extract_object("{\"a\": 1"),
            Err(ExtractError::UnbalancedDelimiters('}'))
        ));
    }

    #[test]
    fn fails_on_malformed_candidate() {
        assert!(matches!(
            extract_object("{not json}"),
            Err(ExtractError::MalformedJson(_))
        ));
    }

    #[test]
    fn extracts_array_with_bracket_delimiters() {
        let text = "Here: [\"a\", \"b\"] done";
        assert_eq!(extract_array(text).unwrap(), json!(["a", "b"]));
    }

    #[test]
    fn array_extraction_ignores_object_braces() {
        let text = "Context {irrelevant}: [{\"q\": \"linen shirt\"}] trailing";
        assert_eq!(extract_array(text).unwrap(), json!([{"q": "linen shirt"}]));
    }

    #[test]
    fn delimiters_inside_string_values_do_not_close_early() {
        let text = "{\"note\": \"a } inside\", \"n\": 1}";
        assert_eq!(
            extract_object(text).unwrap(),
            json!({"note": "a } inside", "n": 1})
        );
    }

    #[test]
    fn escaped_quotes_inside_strings_are_handled() {
        let text = "{\"quote\": \"she said \\\"hi }\\\" loudly\"}";
        assert_eq!(
            extract_object(text).unwrap(),
            json!({"quote": "she said \"hi }\" loudly"})
        );
    }
}
