#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Structured code the server may attach to an expired or unknown access token
pub const INVALID_TOKEN_CODE: &str = "invalid_token";

/// Error body returned with non-success responses.
///
/// The server is not consistent about which field carries the text, so both
/// `message` and `error` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ApiErrorBody {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub message: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub code: Option<String>,
}

impl ApiErrorBody {
    /// The human-readable text, preferring `message` over `error`
    ///
    /// Blank fields count as absent, so an empty `message` does not hide
    /// `error`.
    pub fn text(&self) -> Option<&str> {
        non_blank(self.message.as_deref()).or_else(|| non_blank(self.error.as_deref()))
    }

    /// Whether `code` carries the invalid-token marker
    pub fn has_invalid_token_code(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case(INVALID_TOKEN_CODE))
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn message_wins_over_error() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message": "Bad", "error": "Worse"}"#).unwrap();
        assert_eq!(body.text(), Some("Bad"));
    }

    #[test]
    fn blank_text_is_treated_as_missing() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"message": "  "}"#).unwrap();
        assert_eq!(body.text(), None);
    }

    #[test]
    fn invalid_token_code_is_case_insensitive() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"code": "INVALID_TOKEN"}"#).unwrap();
        assert!(body.has_invalid_token_code());
    }

    #[test]
    fn blank_message_falls_back_to_error() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message": "  ", "error": "Insufficient balance"}"#)
                .unwrap();
        assert_eq!(body.text(), Some("Insufficient balance"));
    }
}
