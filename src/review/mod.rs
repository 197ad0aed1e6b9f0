//! Human review of generated posts.
//!
//! A [`ReviewHandler`] asks a person for a verdict on one post; [`review_pending`]
//! walks the pending list once and submits every verdict through the coordinator.

mod handler;
mod types;

pub use handler::ConsoleReviewHandler;
pub use types::{parse_verdict, ReviewHandler, ReviewOutcome, ReviewRequest};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::coordinator::{ApproveRequest, RequestCoordinator};
use crate::error::ErrorKind;
use crate::workflow::WorkflowStatus;

/// Tally of a review pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    /// Posts approved and published
    pub published: usize,
    /// Posts approved whose publish attempt failed
    pub failed: usize,
    /// Posts rejected
    pub rejected: usize,
    /// Posts left pending
    pub skipped: usize,
    /// Posts decided by someone else while under review
    pub already_decided: usize,
}

impl ReviewSummary {
    /// Number of posts the pass looked at
    pub fn total(&self) -> usize {
        self.published + self.failed + self.rejected + self.skipped + self.already_decided
    }
}

/// Present every pending post to `handler` and submit the verdicts
pub async fn review_pending(
    coordinator: &RequestCoordinator,
    handler: &dyn ReviewHandler,
) -> Result<ReviewSummary> {
    let pending = coordinator.pending().await?;
    let mut summary = ReviewSummary::default();

    for view in pending.posts.values() {
        let outcome = handler.review(ReviewRequest::from(view)).await?;
        let Some(approved) = outcome.approved() else {
            summary.skipped += 1;
            continue;
        };

        match coordinator
            .approve(ApproveRequest::new(&view.workflow_id, approved))
            .await
        {
            Ok(response) => match response.status {
                WorkflowStatus::Published => summary.published += 1,
                WorkflowStatus::Failed => summary.failed += 1,
                WorkflowStatus::Rejected => summary.rejected += 1,
                WorkflowStatus::PendingApproval | WorkflowStatus::Publishing => {}
            },
            Err(err) if err.kind == ErrorKind::AlreadyDecided => {
                warn!(workflow_id = %view.workflow_id, "Decided elsewhere during review");
                summary.already_decided += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(?summary, "Review pass finished");
    Ok(summary)
}
