//! Stateless request checks that run before any service.

use std::any::Any;
use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::http::envelope::Failure;
use crate::http::request::RequestEnvelope;
use crate::pipeline::{Stage, StageOutcome};
use crate::session::Session;

type Decoder = fn(&[u8]) -> Result<Box<dyn Any + Send + Sync>, serde_json::Error>;

/// Expected JSON body type for a method.
#[derive(Clone, Copy)]
pub struct Shape {
    name: &'static str,
    decode: Decoder,
}

impl Shape {
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self {
            name: std::any::type_name::<T>(),
            decode: decode_into::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Shape").field(&self.name).finish()
    }
}

fn decode_into<T>(body: &[u8]) -> Result<Box<dyn Any + Send + Sync>, serde_json::Error>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let value: T = serde_json::from_slice(body)?;
    Ok(Box::new(value))
}

/// Rejects methods outside the allowed set with a 405.
pub struct MethodValidator {
    allowed: Vec<Method>,
}

impl MethodValidator {
    pub fn new(allowed: Vec<Method>) -> Self {
        Self { allowed }
    }

    fn expected(&self) -> String {
        match self.allowed.as_slice() {
            [only] => format!("Expected {}", only),
            many => {
                let names: Vec<&str> = many.iter().map(Method::as_str).collect();
                format!("Expected one of {}", names.join(", "))
            }
        }
    }
}

#[async_trait]
impl Stage for MethodValidator {
    fn name(&self) -> &'static str {
        "validate_methods"
    }

    async fn process(&self, req: &mut RequestEnvelope, _session: &Session) -> StageOutcome {
        if self.allowed.contains(req.method()) {
            return StageOutcome::Continue;
        }
        StageOutcome::Respond(Failure::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "Invalid request type",
            self.expected(),
        ))
    }
}

/// Decodes the body into the shape declared for the request's method.
///
/// Methods without a declared shape pass through untouched. Field-level
/// rules are left to the service.
pub struct PayloadValidator {
    by_method: HashMap<Method, Shape>,
}

impl PayloadValidator {
    pub fn new(shapes: impl IntoIterator<Item = (Method, Shape)>) -> Self {
        Self {
            by_method: shapes.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Stage for PayloadValidator {
    fn name(&self) -> &'static str {
        "validate_payloads"
    }

    async fn process(&self, req: &mut RequestEnvelope, _session: &Session) -> StageOutcome {
        let Some(shape) = self.by_method.get(req.method()) else {
            return StageOutcome::Continue;
        };

        match (shape.decode)(req.body()) {
            Ok(payload) => {
                req.bind_payload(payload);
                StageOutcome::Continue
            }
            Err(e) => {
                tracing::debug!(shape = shape.name(), error = %e, "Payload rejected");
                StageOutcome::Respond(Failure::bad_request("Invalid payload", e.to_string()))
            }
        }
    }
}
