//! Normalization of raised values into exception reports
//!
//! Anything can be raised: a proper error or an arbitrary value. The sink only
//! ever receives the error-shaped form.

use serde_json::Value;

use super::record::{ErrorInfo, Extra, into_extra};

/// A raised value, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum Thrown {
    ErrorShaped(ErrorInfo),
    OpaqueValue(Value),
}

impl Thrown {
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Thrown::ErrorShaped(ErrorInfo::new(kind, message))
    }

    /// Produce an error reference plus the extra data it carried
    pub fn normalize(self) -> (ErrorInfo, Extra) {
        match self {
            Thrown::ErrorShaped(info) => (info, Extra::new()),
            Thrown::OpaqueValue(value) => {
                let message = describe_opaque(&value);
                (ErrorInfo::new("Error", message), into_extra(value))
            }
        }
    }

    /// Normalize a caught rejection; opaque values become a generic rejection error
    pub fn normalize_rejection(self) -> (ErrorInfo, Extra) {
        match self {
            Thrown::ErrorShaped(info) => (info, Extra::new()),
            Thrown::OpaqueValue(value) => (ErrorInfo::new("Error", "Non-error promise rejection"), into_extra(value)),
        }
    }
}

impl From<ErrorInfo> for Thrown {
    fn from(info: ErrorInfo) -> Self {
        Thrown::ErrorShaped(info)
    }
}

impl From<Value> for Thrown {
    fn from(value: Value) -> Self {
        Thrown::OpaqueValue(value)
    }
}

fn describe_opaque(value: &Value) -> String {
    match value {
        Value::Object(map) if map.is_empty() => "Object captured as exception with no keys".to_string(),
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("Object captured as exception with keys: {}", keys.join(", "))
        }
        other => format!("Non-error value captured as exception: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_shaped_passes_through() {
        let (info, extra) = Thrown::error("URIError", "This is a URI error").normalize();
        assert_eq!(info.kind, "URIError");
        assert_eq!(info.message, "This is a URI error");
        assert!(extra.is_empty());
    }

    #[test]
    fn test_object_is_wrapped_with_keys() {
        let (info, extra) = Thrown::from(json!({"error": "foo"})).normalize();
        assert_eq!(info.kind, "Error");
        assert_eq!(info.message, "Object captured as exception with keys: error");
        assert_eq!(extra["error"], json!("foo"));
    }

    #[test]
    fn test_scalar_is_wrapped_under_value() {
        let (info, extra) = Thrown::from(json!("just a string")).normalize();
        assert!(info.message.contains("just a string"));
        assert_eq!(extra["value"], json!("just a string"));
    }

    #[test]
    fn test_rejection_normalization() {
        let reason = json!({"message": "This is a non-error rejection", "code": 500});
        let (info, extra) = Thrown::from(reason).normalize_rejection();
        assert_eq!(info.message, "Non-error promise rejection");
        assert_eq!(extra["code"], json!(500));
        assert_eq!(extra["message"], json!("This is a non-error rejection"));
    }
}
