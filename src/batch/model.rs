use serde::Serialize;
use serde_json::Value;

/// One entry of the input array, tagged with its position.
///
/// Fields hold the JSON values exactly as loaded so the echo in each result
/// matches the input. Nothing here has been checked for being a valid method
/// or URL; the runner reports bad values as a failed request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(index: usize, method: &str, url: &str) -> Self {
        Self {
            index,
            method: Some(Value::String(method.to_string())),
            url: Some(Value::String(url.to_string())),
            body: None,
            token: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_token(mut self, token: impl Into<Value>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn method_str(&self) -> Option<&str> {
        self.method.as_ref().and_then(Value::as_str)
    }

    pub fn url_str(&self) -> Option<&str> {
        self.url.as_ref().and_then(Value::as_str)
    }

    /// Token to send as a bearer credential.
    ///
    /// Falsy values (`null`, `false`, `0`, `""`) send nothing. Arrays and
    /// objects are not usable as a credential and send nothing either.
    pub fn bearer_token(&self) -> Option<String> {
        match self.token.as_ref()? {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}
