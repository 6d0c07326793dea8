//! Process-wide session state.
//!
//! # Responsibilities
//! - Hold the project, branch and instance the bridge was launched for
//! - Hold the merge request IID for the checked-out branch, once known
//!
//! # Design Decisions
//! - Built once at startup and shared via `Arc` with every pipeline
//! - Everything except the merge request IID is immutable
//! - The IID lives in a `OnceCell`: set at most once, never reset, and
//!   concurrent first resolutions collapse into a single lookup

use std::future::Future;

use tokio::sync::OnceCell;

/// Shared per-process context.
#[derive(Debug)]
pub struct Session {
    project_id: String,
    branch: String,
    gitlab_url: String,
    merge_iid: OnceCell<u64>,
}

impl Session {
    pub fn new(
        project_id: impl Into<String>,
        branch: impl Into<String>,
        gitlab_url: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            branch: branch.into(),
            gitlab_url: gitlab_url.into(),
            merge_iid: OnceCell::new(),
        }
    }

    /// Session whose merge request is already known.
    pub fn with_merge_iid(mut self, iid: u64) -> Self {
        self.merge_iid = OnceCell::new_with(Some(iid));
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn gitlab_url(&self) -> &str {
        &self.gitlab_url
    }

    /// The resolved merge request IID, `None` while unresolved.
    pub fn merge_iid(&self) -> Option<u64> {
        self.merge_iid.get().copied()
    }

    /// Returns the IID, running `lookup` if it is not yet known.
    ///
    /// Only one lookup runs at a time; callers arriving meanwhile wait for
    /// it and observe its value. A failed lookup leaves the IID unresolved.
    pub(crate) async fn merge_iid_or_resolve<F, Fut, E>(&self, lookup: F) -> Result<u64, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64, E>>,
    {
        self.merge_iid.get_or_try_init(lookup).await.copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_once() {
        let session = Session::new("1", "main", "https://gitlab.com");
        assert_eq!(session.merge_iid(), None);

        let iid = session
            .merge_iid_or_resolve(|| async { Ok::<_, ()>(12) })
            .await
            .unwrap();
        assert_eq!(iid, 12);

        // A second resolution never runs the lookup.
        let iid = session
            .merge_iid_or_resolve(|| async { Ok::<_, ()>(99) })
            .await
            .unwrap();
        assert_eq!(iid, 12);
        assert_eq!(session.merge_iid(), Some(12));
    }

    #[tokio::test]
    async fn test_failed_lookup_leaves_unresolved() {
        let session = Session::new("1", "main", "https://gitlab.com");
        let result = session
            .merge_iid_or_resolve(|| async { Err::<u64, _>("down") })
            .await;
        assert_eq!(result, Err("down"));
        assert_eq!(session.merge_iid(), None);
    }

    #[test]
    fn test_preset_iid() {
        let session = Session::new("1", "main", "https://gitlab.com").with_merge_iid(4);
        assert_eq!(session.merge_iid(), Some(4));
    }
}
