use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use super::state::{Stage, WorkflowState};
use crate::error::Result;
use crate::generator::{ContentGenerator, GenerationError};
use crate::publisher::{PublishResult, Publisher};
use crate::telemetry::{add_metric, span_duration};

/// Configuration for the workflow engine
#[derive(Debug, Clone)]
pub struct WorkflowEngineConfig {
    /// Deadline for the generate step
    pub generate_timeout_secs: u64,

    /// Deadline for the publish step
    pub publish_timeout_secs: u64,
}

impl Default for WorkflowEngineConfig {
    fn default() -> Self {
        Self {
            generate_timeout_secs: 60,
            publish_timeout_secs: 30,
        }
    }
}

/// Drives a [`WorkflowState`] through the approval state machine.
///
/// The engine holds no per-workflow state: it receives a state value and
/// returns its successor. A run stops at the first suspend point
/// ([`Stage::WaitApproval`] with no decision) or at a terminal stage, so the
/// same state can be handed back later to resume.
#[derive(Debug, Clone)]
pub struct WorkflowEngine {
    generator: Arc<dyn ContentGenerator>,
    publisher: Arc<dyn Publisher>,
    config: Arc<WorkflowEngineConfig>,
}

impl WorkflowEngine {
    /// Create a new workflow engine
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        publisher: Arc<dyn Publisher>,
        config: Option<WorkflowEngineConfig>,
    ) -> Self {
        Self {
            generator,
            publisher,
            config: Arc::new(config.unwrap_or_default()),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &WorkflowEngineConfig {
        &self.config
    }

    /// Start a workflow for `topic` and run it to the approval suspend point.
    ///
    /// A generator failure aborts the run and no state is returned.
    pub async fn start(&self, topic: &str) -> Result<WorkflowState> {
        self.run(WorkflowState::new(topic)).await
    }

    /// Advance `state` until it suspends or terminates
    #[instrument(skip(self, state), fields(stage = ?state.stage()))]
    pub async fn run(&self, mut state: WorkflowState) -> Result<WorkflowState> {
        loop {
            match state.stage() {
                Stage::Generate => self.generate(&mut state).await?,
                Stage::WaitApproval => match state.approval_route() {
                    Stage::WaitApproval => {
                        debug!("No decision yet, suspending");
                        return Ok(state);
                    }
                    Stage::Publish => state.enter(Stage::Publish, "approved by reviewer"),
                    next => state.enter(next, "rejected by reviewer"),
                },
                Stage::Publish => self.publish(&mut state).await,
                Stage::Done | Stage::Rejected => return Ok(state),
            }
        }
    }

    async fn generate(&self, state: &mut WorkflowState) -> Result<()> {
        let _timer = span_duration("workflow_generate");
        let deadline = self.config.generate_timeout_secs;

        let content = match timeout(
            Duration::from_secs(deadline),
            self.generator.generate(state.topic()),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(GenerationError::Timeout(deadline).into()),
        };

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyContent.into());
        }

        let note = format!("generated content: {}", content);
        state.set_content(content);
        state.note(note);
        state.enter(Stage::WaitApproval, "waiting for approval");
        Ok(())
    }

    async fn publish(&self, state: &mut WorkflowState) {
        let _timer = span_duration("workflow_publish");
        let deadline = self.config.publish_timeout_secs;

        let result = match timeout(
            Duration::from_secs(deadline),
            self.publisher.publish(state.content()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => PublishResult::failure(
                self.publisher.platform(),
                format!("publish timed out after {}s", deadline),
            ),
        };

        add_metric(
            "workflow_published",
            1.0,
            &[
                ("platform", result.platform.clone()),
                ("success", result.success.to_string()),
            ],
        );

        let note = if result.success {
            info!("Published: {}", result.summary());
            format!("published: {}", result.summary())
        } else {
            warn!("Publish failed: {}", result.summary());
            format!("publish failed: {}", result.summary())
        };

        state.set_publish_result(result);
        state.enter(Stage::Done, note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TemplateGenerator;
    use crate::publisher::DryRunPublisher;
    use crate::workflow::state::{ApprovalStatus, Decision};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct FailingGenerator;

    #[async_trait]
    impl ContentGenerator for FailingGenerator {
        async fn generate(&self, _topic: &str) -> std::result::Result<String, GenerationError> {
            Err(GenerationError::Provider("model unavailable".to_string()))
        }
    }

    #[derive(Debug)]
    struct SleepyGenerator;

    #[async_trait]
    impl ContentGenerator for SleepyGenerator {
        async fn generate(&self, _topic: &str) -> std::result::Result<String, GenerationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }
    }

    #[derive(Debug)]
    struct SlowPublisher;

    #[async_trait]
    impl Publisher for SlowPublisher {
        async fn publish(&self, _content: &str) -> PublishResult {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            PublishResult::success("twitter", "late", "https://example.invalid/late")
        }

        fn platform(&self) -> &str {
            "twitter"
        }
    }

    fn engine() -> WorkflowEngine {
        WorkflowEngine::new(
            Arc::new(TemplateGenerator::default()),
            Arc::new(DryRunPublisher::default()),
            None,
        )
    }

    #[tokio::test]
    async fn test_start_suspends_at_approval() {
        let state = engine().start("electric vehicles").await.unwrap();

        assert_eq!(state.stage(), Stage::WaitApproval);
        assert_eq!(state.approval_status(), ApprovalStatus::Pending);
        assert!(!state.content().is_empty());
        assert!(state.publish_result().is_none());
        assert_eq!(state.history().len(), 2);
        assert!(state.history()[0].starts_with("generated content: "));
        assert_eq!(state.history()[1], "waiting for approval");
    }

    #[tokio::test]
    async fn test_rerun_while_pending_is_noop() {
        let engine = engine();
        let state = engine.start("rust").await.unwrap();
        let resumed = engine.run(state.clone()).await.unwrap();
        assert_eq!(resumed, state);
    }

    #[tokio::test]
    async fn test_approved_run_publishes() {
        let engine = engine();
        let mut state = engine.start("rust").await.unwrap();
        state.apply_decision(Decision::Approve).unwrap();

        let done = engine.run(state).await.unwrap();
        assert_eq!(done.stage(), Stage::Done);
        assert!(done.publish_result().unwrap().success);
        assert_eq!(done.history()[2], "approved by reviewer");
        assert!(done.history()[3].starts_with("published: "));

        // terminal states are left alone
        assert_eq!(engine.run(done.clone()).await.unwrap(), done);
    }

    #[tokio::test]
    async fn test_rejected_run_skips_publish() {
        let engine = engine();
        let mut state = engine.start("rust").await.unwrap();
        state.apply_decision(Decision::Reject).unwrap();

        let done = engine.run(state).await.unwrap();
        assert_eq!(done.stage(), Stage::Rejected);
        assert!(done.publish_result().is_none());
        assert_eq!(done.history().last().unwrap(), "rejected by reviewer");
    }

    #[tokio::test]
    async fn test_generator_failure_aborts() {
        let engine = WorkflowEngine::new(
            Arc::new(FailingGenerator),
            Arc::new(DryRunPublisher::default()),
            None,
        );
        let err = engine.start("rust").await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::GenerationFailed(GenerationError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_publisher_failure_still_reaches_done() {
        let engine = WorkflowEngine::new(
            Arc::new(TemplateGenerator::default()),
            Arc::new(DryRunPublisher::failing("account suspended")),
            None,
        );
        let mut state = engine.start("rust").await.unwrap();
        state.apply_decision(Decision::Approve).unwrap();

        let done = engine.run(state).await.unwrap();
        assert_eq!(done.stage(), Stage::Done);
        let result = done.publish_result().unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("account suspended"));
        assert!(done.history().last().unwrap().starts_with("publish failed: "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_publish_timeout_is_captured() {
        let engine = WorkflowEngine::new(
            Arc::new(TemplateGenerator::default()),
            Arc::new(SlowPublisher),
            Some(WorkflowEngineConfig {
                generate_timeout_secs: 5,
                publish_timeout_secs: 1,
            }),
        );
        let mut state = engine.start("rust").await.unwrap();
        state.apply_decision(Decision::Approve).unwrap();

        let done = engine.run(state).await.unwrap();
        let result = done.publish_result().unwrap();
        assert!(!result.success);
        assert!(result.error.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_timeout_fails_creation() {
        let engine = WorkflowEngine::new(
            Arc::new(SleepyGenerator),
            Arc::new(DryRunPublisher::default()),
            Some(WorkflowEngineConfig {
                generate_timeout_secs: 2,
                publish_timeout_secs: 1,
            }),
        );

        let err = engine.start("rust").await.unwrap_err();
        assert_eq!(
            err,
            crate::Error::GenerationFailed(GenerationError::Timeout(2))
        );
    }
}
