//! Request descriptions and retry bookkeeping.

use reqwest::Method;
use serde_json::Value;

/// Everything needed to (re)send a request; the credential is added at send time.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/auth/update-profile`.
    pub path: String,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// One send of a [`RequestSpec`].
///
/// Attempts are immutable: a replay is a new value with `retried` set, and a
/// replayed attempt cannot be retried again.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestAttempt {
    request: RequestSpec,
    retried: bool,
}

impl RequestAttempt {
    pub fn new(request: RequestSpec) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    pub fn request(&self) -> &RequestSpec {
        &self.request
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// The replay of this attempt, or `None` if it is already a replay.
    pub fn retry(&self) -> Option<RequestAttempt> {
        if self.retried {
            return None;
        }
        Some(RequestAttempt {
            request: self.request.clone(),
            retried: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn retry_is_allowed_once() {
        let spec = RequestSpec::new(Method::PUT, "/auth/update-profile")
            .with_body(json!({ "profilePic": "https://img/x.jpg" }));
        let first = RequestAttempt::new(spec.clone());
        assert!(!first.is_retried());

        let second = first.retry().unwrap();
        assert!(second.is_retried());
        assert_eq!(second.request(), &spec);
        assert!(second.retry().is_none());

        // the original is untouched
        assert!(!first.is_retried());
    }
}
