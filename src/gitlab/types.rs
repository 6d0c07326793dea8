//! GitLab REST v4 entities and request options.
//!
//! Only the fields the editor extension consumes are modelled; unknown
//! fields are ignored on decode.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BasicUser {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub state: String,
    pub avatar_url: Option<String>,
    pub web_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub state: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub web_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub state: String,
    pub source_branch: String,
    pub target_branch: String,
    pub labels: Vec<String>,
    pub draft: bool,
    pub author: Option<BasicUser>,
    pub web_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProjectMember {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub state: String,
    pub access_level: u32,
    pub web_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Pipeline {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub status: String,
    pub source: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    pub web_url: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub stage: String,
    pub status: String,
    pub web_url: String,
    pub duration: Option<f64>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

/// Result of uploading a file to the project.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProjectFile {
    pub alt: String,
    pub url: String,
    pub full_path: String,
    pub markdown: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AwardEmoji {
    pub id: u64,
    pub name: String,
    pub user: BasicUser,
    pub awardable_id: u64,
    pub awardable_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DraftNote {
    pub id: u64,
    pub author_id: u64,
    pub merge_request_id: u64,
    pub note: String,
    pub discussion_id: Option<String>,
    pub commit_id: Option<String>,
    pub position: Option<Value>,
    pub resolve_discussion: bool,
}

/// Filters for listing project merge requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListMergeRequestsOptions {
    pub scope: Option<String>,
    pub state: Option<String>,
    pub source_branch: Option<String>,
    pub labels: Vec<String>,
    pub not_labels: Vec<String>,
}

impl ListMergeRequestsOptions {
    /// Open merge requests whose source is `branch`.
    pub fn open_for_branch(branch: &str) -> Self {
        Self {
            scope: Some("all".to_string()),
            state: Some("opened".to_string()),
            source_branch: Some(branch.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(scope) = &self.scope {
            query.push(("scope", scope.clone()));
        }
        if let Some(state) = &self.state {
            query.push(("state", state.clone()));
        }
        if let Some(branch) = &self.source_branch {
            query.push(("source_branch", branch.clone()));
        }
        if !self.labels.is_empty() {
            query.push(("labels", self.labels.join(",")));
        }
        if !self.not_labels.is_empty() {
            query.push(("not[labels]", self.not_labels.join(",")));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CreateMergeRequestOptions {
    pub title: String,
    pub description: String,
    pub source_branch: String,
    pub target_branch: String,
    pub remove_source_branch: bool,
    pub squash: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_project_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineFilter {
    pub ref_name: Option<String>,
    pub sha: Option<String>,
}

impl PipelineFilter {
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(ref_name) = &self.ref_name {
            query.push(("ref", ref_name.clone()));
        }
        if let Some(sha) = &self.sha {
            query.push(("sha", sha.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CreateDraftNoteOptions {
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_reply_to_discussion_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UpdateDraftNoteOptions {
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
}
