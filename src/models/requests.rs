//! Request DTOs for the key-value server API
//!
//! Parameters arrive as form fields or query strings. Fields are optional
//! at the deserialization layer so that absence can be reported with the
//! exact 400 bodies the endpoints promise, rather than a generic rejection.

use serde::Deserialize;

/// Form body for `POST /create`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl CreateForm {
    /// Returns both fields, or `None` when either is missing.
    pub fn fields(self) -> Option<(String, String)> {
        self.key.zip(self.value)
    }
}

/// Query string for `GET /read` and `DELETE /delete`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyQuery {
    #[serde(default)]
    pub key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_form_complete() {
        let form = CreateForm {
            key: Some("a".to_string()),
            value: Some("1".to_string()),
        };
        assert_eq!(form.fields(), Some(("a".to_string(), "1".to_string())));
    }

    #[test]
    fn test_create_form_missing_field() {
        let form = CreateForm {
            key: Some("a".to_string()),
            value: None,
        };
        assert_eq!(form.fields(), None);

        let form = CreateForm {
            key: None,
            value: Some("1".to_string()),
        };
        assert_eq!(form.fields(), None);
    }

    #[test]
    fn test_key_query_deserialize() {
        let query: KeyQuery = serde_json::from_str(r#"{"key": "a"}"#).expect("deserialize");
        assert_eq!(query.key.as_deref(), Some("a"));

        let query: KeyQuery = serde_json::from_str("{}").expect("deserialize");
        assert!(query.key.is_none());
    }
}
