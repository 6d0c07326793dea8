//! Per-route request pipeline.
//!
//! # Data Flow
//! ```text
//! RequestEnvelope
//!     → MethodValidator      (405 on a method outside the allowed set)
//!     → PayloadValidator     (400 when the body does not match the shape)
//!     → MergeRequestResolver (only on merge-request scoped routes)
//!     → Service              (endpoint logic, upstream calls)
//!     → ApiResponse
//! ```
//!
//! # Design Decisions
//! - Stages are an explicit ordered list, not nested handler wrappers
//! - Stage order is fixed by `PipelineBuilder::build`, not by call order
//! - The first stage that responds ends the chain

pub mod context;
pub mod validators;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::http::Method;

use crate::gitlab::GitlabApi;
use crate::http::envelope::{ApiResponse, Failure, Success};
use crate::http::request::RequestEnvelope;
use crate::observability::metrics;
use crate::session::Session;

pub use context::MergeRequestResolver;
pub use validators::{MethodValidator, PayloadValidator, Shape};

/// Result of one stage.
#[derive(Debug)]
pub enum StageOutcome {
    /// Hand the request to the next stage.
    Continue,
    /// Stop here and answer with this failure.
    Respond(Failure),
}

/// A check or enrichment step ahead of the service.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process(&self, req: &mut RequestEnvelope, session: &Session) -> StageOutcome;
}

/// Endpoint logic at the end of a pipeline.
#[async_trait]
pub trait Service: Send + Sync {
    async fn serve(&self, req: &RequestEnvelope, session: &Session) -> Result<Success, Failure>;
}

/// Composed chain for one route.
pub struct Pipeline {
    route: &'static str,
    stages: Vec<Box<dyn Stage>>,
    service: Arc<dyn Service>,
    session: Arc<Session>,
}

impl Pipeline {
    pub fn builder(route: &'static str) -> PipelineBuilder {
        PipelineBuilder {
            route,
            methods: Vec::new(),
            payloads: Vec::new(),
            resolver: None,
        }
    }

    pub fn route(&self) -> &'static str {
        self.route
    }

    /// Names of the stages in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage, then the service.
    pub async fn handle(&self, mut req: RequestEnvelope) -> ApiResponse {
        let start = Instant::now();
        let method = req.method().clone();

        let response = self.run(&mut req).await;

        metrics::record_request(self.route, &method, response.status(), start);
        if let ApiResponse::Failure(failure) = &response {
            tracing::warn!(
                route = self.route,
                method = %method,
                status = failure.status.as_u16(),
                message = %failure.message,
                details = %failure.details,
                "Request failed"
            );
        } else {
            tracing::debug!(route = self.route, method = %method, "Request served");
        }
        response
    }

    async fn run(&self, req: &mut RequestEnvelope) -> ApiResponse {
        for stage in &self.stages {
            match stage.process(req, &self.session).await {
                StageOutcome::Continue => {}
                StageOutcome::Respond(failure) => {
                    tracing::debug!(route = self.route, stage = stage.name(), "Stage short-circuited");
                    return failure.into();
                }
            }
        }
        self.service.serve(req, &self.session).await.into()
    }
}

/// Declarative route description turned into a `Pipeline`.
pub struct PipelineBuilder {
    route: &'static str,
    methods: Vec<Method>,
    payloads: Vec<(Method, Shape)>,
    resolver: Option<MergeRequestResolver>,
}

impl PipelineBuilder {
    /// Allowed methods; an empty set skips method validation.
    pub fn methods(mut self, methods: &[Method]) -> Self {
        self.methods = methods.to_vec();
        self
    }

    /// Body shape decoded for `method`.
    pub fn payload(mut self, method: Method, shape: Shape) -> Self {
        self.payloads.push((method, shape));
        self
    }

    /// Resolve the branch's merge request before the service runs.
    pub fn with_merge_request(mut self, gitlab: Arc<dyn GitlabApi>) -> Self {
        self.resolver = Some(MergeRequestResolver::new(gitlab));
        self
    }

    pub fn build(self, service: Arc<dyn Service>, session: Arc<Session>) -> Pipeline {
        let mut stages: Vec<Box<dyn Stage>> = Vec::new();
        if !self.methods.is_empty() {
            stages.push(Box::new(MethodValidator::new(self.methods)));
        }
        if !self.payloads.is_empty() {
            stages.push(Box::new(PayloadValidator::new(self.payloads)));
        }
        if let Some(resolver) = self.resolver {
            stages.push(Box::new(resolver));
        }

        Pipeline {
            route: self.route,
            stages,
            service,
            session,
        }
    }
}
