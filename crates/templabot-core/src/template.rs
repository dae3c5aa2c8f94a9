//! Display-side view of a predicted template.
//!
//! The prediction pipeline returns the decoded label verbatim. Parsing it as
//! JSON and pulling out the `name` happens here, at the display boundary.

use serde_json::Value;
use thiserror::Error;

/// File name offered when a template is downloaded.
pub const DOWNLOAD_FILE_NAME: &str = "template.json";

/// MIME type of the downloaded template.
pub const DOWNLOAD_MIME: &str = "application/json";

#[derive(Debug, Error)]
pub enum DisplayFormatError {
    #[error("template is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("template JSON is not an object")]
    NotAnObject,

    #[error("template has no `name` field")]
    MissingName,

    #[error("template `name` is not a string")]
    NameNotString,
}

/// A decoded template ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateView {
    /// Value of the template's `name` field, shown as the title.
    pub name: String,
    /// The label exactly as decoded; this is what gets downloaded.
    pub raw: String,
    /// Parsed body, kept for callers that want to pretty-print it.
    pub body: Value,
}

impl TemplateView {
    /// Parse a decoded label into a displayable template.
    pub fn parse(raw: &str) -> Result<Self, DisplayFormatError> {
        let body: Value = serde_json::from_str(raw)?;
        let object = body.as_object().ok_or(DisplayFormatError::NotAnObject)?;
        let name = match object.get("name") {
            None | Some(Value::Null) => return Err(DisplayFormatError::MissingName),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(DisplayFormatError::NameNotString),
        };
        Ok(Self {
            name,
            raw: raw.to_string(),
            body,
        })
    }

    /// Indented rendering of the body.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| self.raw.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER: &str = r#"{"name":"order_confirmation","language":"en","components":[{"type":"BODY","text":"Hi {{1}}, your order {{2}} is confirmed."}]}"#;

    #[test]
    fn parses_name_and_keeps_raw() {
        let view = TemplateView::parse(ORDER).unwrap();
        assert_eq!(view.name, "order_confirmation");
        assert_eq!(view.raw, ORDER);
        assert_eq!(view.body["language"], "en");
    }

    #[test]
    fn invalid_json() {
        let err = TemplateView::parse("{not json").unwrap_err();
        assert!(matches!(err, DisplayFormatError::InvalidJson(_)));
    }

    #[test]
    fn array_is_not_an_object() {
        let err = TemplateView::parse(r#"[{"name":"x"}]"#).unwrap_err();
        assert!(matches!(err, DisplayFormatError::NotAnObject));
    }

    #[test]
    fn missing_or_null_name() {
        assert!(matches!(
            TemplateView::parse(r#"{"language":"en"}"#).unwrap_err(),
            DisplayFormatError::MissingName
        ));
        assert!(matches!(
            TemplateView::parse(r#"{"name":null}"#).unwrap_err(),
            DisplayFormatError::MissingName
        ));
    }

    #[test]
    fn numeric_name_rejected() {
        assert!(matches!(
            TemplateView::parse(r#"{"name":42}"#).unwrap_err(),
            DisplayFormatError::NameNotString
        ));
    }

    #[test]
    fn pretty_is_valid_json() {
        let view = TemplateView::parse(ORDER).unwrap();
        let reparsed: Value = serde_json::from_str(&view.pretty()).unwrap();
        assert_eq!(reparsed, view.body);
    }
}
