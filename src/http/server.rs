//! HTTP dispatcher setup.
//!
//! # Responsibilities
//! - Declare every route with its pipeline (methods, payload shapes, context)
//! - Create the Axum Router, one handler per pipeline
//! - Wire up middleware (tracing, request ID, panic catching)
//!
//! # Design Decisions
//! - Built once at startup; routes are immutable afterwards
//! - Method gating happens in the pipeline so 405s use the envelope
//! - Anything that does not reach a pipeline still answers with a `Failure`

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::gitlab::GitlabApi;
use crate::http::envelope::{ApiResponse, Failure};
use crate::http::request::RequestEnvelope;
use crate::lifecycle::shutdown::Shutdown;
use crate::pipeline::{Pipeline, PipelineBuilder, Service, Shape};
use crate::services::{
    attachment::AttachmentRequest, create_mr::CreateMrRequest, draft_notes::CreateDraftNoteRequest,
    draft_notes::DraftNotePublishRequest, draft_notes::UpdateDraftNoteRequest, emoji::EmojiRequest,
    job::JobTraceRequest, merge_requests::ListMergeRequestRequest, shutdown::ShutdownRequest,
    AttachmentService, CreateMrService, CurrentUserService, DraftNotePublisherService,
    DraftNoteService, EmojiService, FileReader, JobTraceService, MergeRequestListService,
    PipelineService, PipelineTriggerService, ProjectMembersService, ShutdownService,
};
use crate::session::Session;

/// Collaborators injected into every route.
#[derive(Clone)]
pub struct Dependencies {
    pub session: Arc<Session>,
    pub gitlab: Arc<dyn GitlabApi>,
    pub files: Arc<dyn FileReader>,
    pub shutdown: Shutdown,
}

/// A pipeline plus the parameterised sub-paths it also answers on.
struct Route {
    pipeline: Pipeline,
    sub_paths: &'static [&'static str],
}

/// Maps route paths to composed pipelines.
pub struct Dispatcher {
    routes: Vec<Route>,
    body_limit: usize,
}

impl Dispatcher {
    pub fn new(deps: Dependencies) -> Self {
        let Dependencies {
            session,
            gitlab,
            files,
            shutdown,
        } = deps;

        let route = |builder: PipelineBuilder,
                     service: Arc<dyn Service>,
                     sub_paths: &'static [&'static str]| Route {
            pipeline: builder.build(service, session.clone()),
            sub_paths,
        };

        let routes = vec![
            route(
                Pipeline::builder("/shutdown")
                    .methods(&[Method::POST])
                    .payload(Method::POST, Shape::of::<ShutdownRequest>()),
                Arc::new(ShutdownService::new(shutdown)),
                &[],
            ),
            route(
                Pipeline::builder("/create_mr")
                    .methods(&[Method::POST])
                    .payload(Method::POST, Shape::of::<CreateMrRequest>()),
                Arc::new(CreateMrService::new(gitlab.clone())),
                &[],
            ),
            route(
                Pipeline::builder("/merge_requests")
                    .methods(&[Method::POST])
                    .payload(Method::POST, Shape::of::<ListMergeRequestRequest>()),
                Arc::new(MergeRequestListService::new(gitlab.clone())),
                &[],
            ),
            route(
                Pipeline::builder("/project/members").methods(&[Method::GET]),
                Arc::new(ProjectMembersService::new(gitlab.clone())),
                &[],
            ),
            route(
                Pipeline::builder("/users/me").methods(&[Method::GET]),
                Arc::new(CurrentUserService::new(gitlab.clone())),
                &[],
            ),
            route(
                Pipeline::builder("/pipeline").methods(&[Method::GET]),
                Arc::new(PipelineService::new(gitlab.clone())),
                &[],
            ),
            route(
                Pipeline::builder("/pipeline/trigger/").methods(&[Method::POST]),
                Arc::new(PipelineTriggerService::new(gitlab.clone())),
                &["{pipeline_id}"],
            ),
            route(
                Pipeline::builder("/job")
                    .methods(&[Method::POST])
                    .payload(Method::POST, Shape::of::<JobTraceRequest>()),
                Arc::new(JobTraceService::new(gitlab.clone())),
                &[],
            ),
            route(
                Pipeline::builder("/attachment")
                    .methods(&[Method::POST])
                    .payload(Method::POST, Shape::of::<AttachmentRequest>()),
                Arc::new(AttachmentService::new(gitlab.clone(), files)),
                &[],
            ),
            route(
                Pipeline::builder("/mr/awardable/note/")
                    .methods(&[Method::POST, Method::DELETE])
                    .payload(Method::POST, Shape::of::<EmojiRequest>())
                    .with_merge_request(gitlab.clone()),
                Arc::new(EmojiService::new(gitlab.clone())),
                &["{note_id}", "{note_id}/{award_id}"],
            ),
            route(
                Pipeline::builder("/mr/draft_notes/")
                    .methods(&[Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                    .payload(Method::POST, Shape::of::<CreateDraftNoteRequest>())
                    .payload(Method::PATCH, Shape::of::<UpdateDraftNoteRequest>())
                    .with_merge_request(gitlab.clone()),
                Arc::new(DraftNoteService::new(gitlab.clone())),
                &["{draft_note_id}"],
            ),
            route(
                Pipeline::builder("/mr/draft_notes/publish")
                    .methods(&[Method::POST])
                    .payload(Method::POST, Shape::of::<DraftNotePublishRequest>())
                    .with_merge_request(gitlab.clone()),
                Arc::new(DraftNotePublisherService::new(gitlab)),
                &[],
            ),
        ];

        Self {
            routes,
            body_limit: ListenerConfig::default().body_limit_bytes,
        }
    }

    /// Maximum request body accepted by any pipeline.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Route paths served through a pipeline.
    pub fn paths(&self) -> Vec<&'static str> {
        self.routes.iter().map(|r| r.pipeline.route()).collect()
    }

    /// Build the Axum router with all middleware layers.
    pub fn into_router(self) -> Router {
        let mut router = Router::new().route("/ping", any(ping));

        for route in self.routes {
            let path = route.pipeline.route();
            let pipeline = Arc::new(route.pipeline);
            let body_limit = self.body_limit;
            let handler = move |request: Request| {
                let pipeline = Arc::clone(&pipeline);
                async move { dispatch(&pipeline, request, body_limit).await }
            };

            router = router.route(path, any(handler.clone()));
            // `/mr/draft_notes` answers like `/mr/draft_notes/`.
            if let Some(bare) = path.strip_suffix('/').filter(|p| !p.is_empty()) {
                router = router.route(bare, any(handler.clone()));
            }
            for sub_path in route.sub_paths {
                router = router.route(&format!("{}{}", path, sub_path), any(handler.clone()));
            }
        }

        router
            .fallback(not_found)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }
}

async fn dispatch(pipeline: &Pipeline, request: Request, body_limit: usize) -> ApiResponse {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, body_limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return Failure::bad_request("Could not read request body", e.to_string()).into();
        }
    };

    let envelope = RequestEnvelope::new(pipeline.route(), parts.method, parts.uri.path(), body);
    pipeline.handle(envelope).await
}

/// Liveness probe used by the startup readiness check.
async fn ping() -> &'static str {
    "pong\n"
}

async fn not_found(uri: Uri) -> Failure {
    Failure::new(
        StatusCode::NOT_FOUND,
        "Not found",
        format!("No route for {}", uri.path()),
    )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };
    tracing::error!(details = %details, "Handler panicked");
    Failure::internal("Internal server error", details).into_response()
}
