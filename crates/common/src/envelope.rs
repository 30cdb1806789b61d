//! Uniform response envelope shared by every resource endpoint.

use serde::Serialize;

/// Success wrapper: `{"success": true, "data": …}`.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

/// Error wrapper: `{"success": false, "error": {"code", "message"}}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail { code: code.into(), message: message.into() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let v = serde_json::to_value(Envelope::ok(serde_json::json!({"id": 1}))).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["id"], 1);
    }

    #[test]
    fn error_envelope_shape() {
        let v = serde_json::to_value(ErrorEnvelope::new("not_found", "invoice not found")).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "not_found");
        assert_eq!(v["error"]["message"], "invoice not found");
    }
}
