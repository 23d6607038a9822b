//! Inbound request data handed to a verifier.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Case-insensitive, multi-valued header map.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    values: HashMap<String, Vec<String>>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value; repeated names keep every value in arrival order.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.values
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Builder form of [`Headers::append`].
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// First value for `name`, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `name`, ignoring case.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First non-blank value for `name`. Blank headers count as absent.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get_all(name)
            .iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name.as_ref(), value);
        }
        headers
    }
}

/// Immutable input to one verification call.
///
/// `body` must be the exact bytes received on the wire, captured before any JSON or form
/// parsing. A re-serialized payload does not reproduce the signed bytes.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    body: Vec<u8>,
    headers: Headers,
    query: Vec<(String, String)>,
    received_at: DateTime<Utc>,
}

impl VerificationRequest {
    /// Create a request received now.
    pub fn new(body: impl Into<Vec<u8>>, headers: Headers) -> Self {
        Self {
            body: body.into(),
            headers,
            query: Vec::new(),
            received_at: Utc::now(),
        }
    }

    /// Attach the raw (still percent-encoded) query string, without the leading `?`.
    pub fn with_query(mut self, raw_query: &str) -> Self {
        let raw_query = raw_query.strip_prefix('?').unwrap_or(raw_query);
        self.query = url::form_urlencoded::parse(raw_query.as_bytes())
            .into_owned()
            .collect();
        self
    }

    /// Override the receive time that replay windows are measured against.
    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// First value of query parameter `name` (case-sensitive, as URLs are).
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_query_param(&self, name: &str) -> bool {
        self.query.iter().any(|(key, _)| key == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let headers = Headers::new().with("Stripe-Signature", "t=1,v1=abc");

        assert_eq!(headers.get("stripe-signature"), Some("t=1,v1=abc"));
        assert_eq!(headers.get("STRIPE-SIGNATURE"), Some("t=1,v1=abc"));
    }

    #[test]
    fn test_header_keeps_multiple_values() {
        let headers: Headers = vec![("X-Token", "a"), ("x-token", "b")].into_iter().collect();

        assert_eq!(headers.get_all("x-token"), &["a".to_string(), "b".to_string()]);
        assert_eq!(headers.get("X-TOKEN"), Some("a"));
    }

    #[test]
    fn test_blank_header_counts_as_absent() {
        let headers = Headers::new().with("dg-token", "   ");
        assert_eq!(headers.get_non_empty("dg-token"), None);
    }

    #[test]
    fn test_query_is_decoded() {
        let request = VerificationRequest::new(b"{}".to_vec(), Headers::new())
            .with_query("?token=abc%20123&other=1");

        assert_eq!(request.query_param("token"), Some("abc 123"));
        assert!(request.has_query_param("other"));
        assert!(!request.has_query_param("missing"));
    }
}
