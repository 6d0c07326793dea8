//! Per-request envelope handed through the pipeline.
//!
//! # Responsibilities
//! - Carry method, path and raw body bytes of one request
//! - Expose trailing path segments beyond the route prefix (note ids, pipeline ids)
//! - Hold the payload bound by the payload validator, retrievable by type
//!
//! # Design Decisions
//! - The payload is type-erased so one pipeline type serves every route
//! - Dropped as soon as the response is produced

use std::any::Any;

use axum::body::Bytes;
use axum::http::Method;

use crate::http::envelope::Failure;

type BoundPayload = Box<dyn Any + Send + Sync>;

/// One incoming request, as seen by pipeline stages and services.
pub struct RequestEnvelope {
    route: &'static str,
    method: Method,
    path: String,
    body: Bytes,
    payload: Option<BoundPayload>,
}

impl RequestEnvelope {
    pub fn new(route: &'static str, method: Method, path: impl Into<String>, body: Bytes) -> Self {
        Self {
            route,
            method,
            path: path.into(),
            body,
            payload: None,
        }
    }

    /// Route pattern this request was dispatched on (e.g. `/mr/draft_notes/`).
    pub fn route(&self) -> &'static str {
        self.route
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Non-empty path segments after the route prefix.
    ///
    /// `/mr/awardable/note/12/7` on route `/mr/awardable/note/` yields `["12", "7"]`.
    pub fn trailing_segments(&self) -> Vec<&str> {
        self.path
            .strip_prefix(self.route)
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub(crate) fn bind_payload(&mut self, payload: BoundPayload) {
        self.payload = Some(payload);
    }

    /// The payload decoded by the payload validator.
    ///
    /// A missing or differently typed payload means the route was declared
    /// without the matching shape.
    pub fn payload<T: Any>(&self) -> Result<&T, Failure> {
        self.payload
            .as_ref()
            .and_then(|p| p.downcast_ref::<T>())
            .ok_or_else(|| {
                Failure::internal(
                    "Invalid payload",
                    format!("No {} payload bound for {}", self.method, self.route),
                )
            })
    }
}

impl std::fmt::Debug for RequestEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestEnvelope")
            .field("route", &self.route)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body_len", &self.body.len())
            .field("payload_bound", &self.payload.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_segments() {
        let req = RequestEnvelope::new(
            "/mr/awardable/note/",
            Method::DELETE,
            "/mr/awardable/note/12/7",
            Bytes::new(),
        );
        assert_eq!(req.trailing_segments(), vec!["12", "7"]);

        let req = RequestEnvelope::new("/mr/draft_notes/", Method::GET, "/mr/draft_notes/", Bytes::new());
        assert!(req.trailing_segments().is_empty());
    }

    #[test]
    fn test_payload_lookup_by_type() {
        let mut req = RequestEnvelope::new("/job", Method::POST, "/job", Bytes::new());
        assert!(req.payload::<u64>().is_err());

        req.bind_payload(Box::new(42u64));
        assert_eq!(*req.payload::<u64>().unwrap(), 42);
        assert!(req.payload::<String>().is_err());
    }
}
