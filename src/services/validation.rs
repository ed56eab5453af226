//! Flattening of server-reported validation errors into display text.
//!
//! The API reports create/update failures either as a bare list of
//! messages, as `{"detail": "..."}`, or as a field-keyed object whose
//! values are lists of messages or of nested per-field objects. The
//! flattener renders any of these into newline-separated lines for the
//! notification layer; it never fails.

use serde_json::Value;

/// Flatten a field-error payload into newline-separated messages.
pub fn flatten_error_messages(value: &Value) -> String {
    let mut messages: Vec<String> = Vec::new();
    match value {
        Value::String(message) => messages.push(message.clone()),
        Value::Array(errors) => {
            for error in errors {
                if let Some(message) = error.as_str() {
                    messages.push(message.to_string());
                }
            }
        }
        Value::Object(map) => {
            if let Some(detail) = map.get("detail").and_then(Value::as_str) {
                messages.push(detail.to_string());
            } else {
                for (field, errors) in map {
                    let Some(errors) = errors.as_array() else {
                        continue;
                    };
                    for error in errors {
                        flatten_field_error(field, error, &mut messages);
                    }
                }
            }
        }
        _ => {}
    }
    messages.join("\n")
}

fn flatten_field_error(field: &str, error: &Value, messages: &mut Vec<String>) {
    match error {
        Value::String(message) => {
            messages.push(format!("{}: {}", field.replace('_', " "), message));
        }
        Value::Object(nested) => {
            for (nested_field, nested_errors) in nested {
                match nested_errors {
                    Value::String(message) => {
                        messages.push(format!("{field} ({nested_field}): {message}"));
                    }
                    Value::Array(list) => {
                        for nested_error in list {
                            if let Some(message) = nested_error.as_str() {
                                messages.push(format!("{field} ({nested_field}): {message}"));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_of_messages() {
        let value = json!(["first problem", "second problem"]);
        assert_eq!(
            flatten_error_messages(&value),
            "first problem\nsecond problem"
        );
    }

    #[test]
    fn detail_takes_precedence() {
        let value = json!({"detail": "not found", "title": ["ignored"]});
        assert_eq!(flatten_error_messages(&value), "not found");
    }

    #[test]
    fn field_errors_replace_underscores() {
        let value = json!({"short_description": ["This field is required."]});
        assert_eq!(
            flatten_error_messages(&value),
            "short description: This field is required."
        );
    }

    #[test]
    fn nested_field_errors_recurse_one_level() {
        let value = json!({
            "authors": [
                {"email": ["Enter a valid email address."]},
                {"full_name": "This field may not be blank."}
            ]
        });
        let flattened = flatten_error_messages(&value);
        assert!(flattened.contains("authors (email): Enter a valid email address."));
        assert!(flattened.contains("authors (full_name): This field may not be blank."));
    }

    #[test]
    fn plain_string_passes_through() {
        let value = json!("something went wrong");
        assert_eq!(flatten_error_messages(&value), "something went wrong");
    }

    #[test]
    fn unrecognized_shapes_flatten_to_empty() {
        assert_eq!(flatten_error_messages(&json!(42)), "");
        assert_eq!(flatten_error_messages(&json!({"field": "not a list"})), "");
    }
}
