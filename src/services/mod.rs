//! Endpoint services.
//!
//! # Responsibilities
//! - Check endpoint-specific fields of the bound payload
//! - Call the GitLab facade
//! - Turn the outcome into a `Success` or `Failure`
//!
//! # Design Decisions
//! - Upstream outcomes are classified in exactly one place (`classify`)
//! - Services never touch the session's merge request slot; they only read it

pub mod attachment;
pub mod create_mr;
pub mod draft_notes;
pub mod emoji;
pub mod job;
pub mod members;
pub mod merge_requests;
pub mod pipeline;
pub mod shutdown;
pub mod user;

use axum::http::StatusCode;

use crate::gitlab::UpstreamResult;
use crate::http::envelope::Failure;
use crate::http::request::RequestEnvelope;
use crate::session::Session;

pub use attachment::{AttachmentService, DiskFileReader, FileReader};
pub use create_mr::CreateMrService;
pub use draft_notes::{DraftNotePublisherService, DraftNoteService};
pub use emoji::EmojiService;
pub use job::JobTraceService;
pub use members::ProjectMembersService;
pub use merge_requests::MergeRequestListService;
pub use pipeline::{PipelineService, PipelineTriggerService};
pub use shutdown::ShutdownService;
pub use user::CurrentUserService;

/// Three-way classification of an upstream outcome.
///
/// - transport error: 500 with the error text
/// - non-2xx status: that status with a generic detail naming the route
/// - 2xx: the decoded body
pub fn classify<T>(result: UpstreamResult<T>, route: &str, message: &str) -> Result<T, Failure> {
    let response = result.map_err(|e| Failure::internal(message, e.to_string()))?;

    if !response.status.is_success() {
        return Err(Failure::new(
            response.status,
            message,
            format!("An error occurred on the {} endpoint", route),
        ));
    }

    response.body.ok_or_else(|| {
        Failure::internal(message, format!("Empty response on the {} endpoint", route))
    })
}

/// IID resolved by the merge request stage.
pub(crate) fn merge_iid(session: &Session, message: &str) -> Result<u64, Failure> {
    session
        .merge_iid()
        .ok_or_else(|| Failure::internal(message, "Merge request has not been resolved"))
}

/// Numeric id in trailing path segment `index`.
pub(crate) fn path_id(
    req: &RequestEnvelope,
    index: usize,
    what: &str,
    message: &str,
) -> Result<u64, Failure> {
    let segments = req.trailing_segments();
    let raw = segments
        .get(index)
        .ok_or_else(|| Failure::bad_request(message, format!("Missing {} in path", what)))?;
    raw.parse::<u64>()
        .map_err(|_| Failure::bad_request(message, format!("Invalid {} '{}'", what, raw)))
}

/// Answer for a method that passed validation but has no handler.
pub(crate) fn unsupported(req: &RequestEnvelope) -> Failure {
    Failure::new(
        StatusCode::METHOD_NOT_ALLOWED,
        "Invalid request type",
        format!("{} is not supported on {}", req.method(), req.route()),
    )
}
