use async_trait::async_trait;
use content_approval::generator::{ContentGenerator, GenerationError, MAX_POST_CHARS};
use content_approval::publisher::{DryRunPublisher, PublishResult, Publisher};
use content_approval::workflow::{
    ApprovalStatus, Stage, WorkflowEngine, WorkflowId, WorkflowStatus, WorkflowStore,
};
use content_approval::{Error, ErrorKind, TemplateGenerator};
use std::collections::HashSet;
use std::sync::Arc;

fn store_with(publisher: Arc<dyn Publisher>) -> WorkflowStore {
    WorkflowStore::in_memory(WorkflowEngine::new(
        Arc::new(TemplateGenerator::default()),
        publisher,
        None,
    ))
}

fn store() -> WorkflowStore {
    store_with(Arc::new(DryRunPublisher::default()))
}

#[derive(Debug)]
struct BrokenGenerator;

#[async_trait]
impl ContentGenerator for BrokenGenerator {
    async fn generate(&self, _topic: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Provider("model unavailable".to_string()))
    }
}

#[derive(Debug)]
struct ExplodingPublisher;

#[async_trait]
impl Publisher for ExplodingPublisher {
    async fn publish(&self, _content: &str) -> PublishResult {
        PublishResult::failure("twitter", "rate limited")
    }

    fn platform(&self) -> &str {
        "twitter"
    }
}

#[tokio::test]
async fn test_create_yields_pending_state_with_fresh_ids() {
    let store = store();
    let mut seen = HashSet::new();

    for topic in ["rust", "electric vehicles", "quantum computing", "🚀 launch", "x"] {
        let (id, state) = store.create(topic).await.unwrap();
        assert_eq!(state.approval_status(), ApprovalStatus::Pending);
        assert_eq!(state.stage(), Stage::WaitApproval);
        assert!(!state.content().is_empty());
        assert!(state.publish_result().is_none());
        assert!(seen.insert(id), "identifier issued twice");
    }
}

#[tokio::test]
async fn test_history_records_transitions_in_order() {
    let store = store();
    let (id, created) = store.create("rust").await.unwrap();
    assert_eq!(created.history().len(), 2);
    assert!(created.history()[0].starts_with("generated content: "));
    assert!(created.history()[1].starts_with("waiting for approval"));

    let done = store.decide(&id, true).await.unwrap();
    assert_eq!(&done.history()[..2], created.history());
    assert!(done.history().iter().any(|h| h.starts_with("published: ")));
    assert!(done.decided_at().is_some());
}

#[tokio::test]
async fn test_approve_sets_publish_result() {
    let store = store();
    let (id, _) = store.create("rust").await.unwrap();

    let done = store.decide(&id, true).await.unwrap();
    assert_eq!(done.approval_status(), ApprovalStatus::Approved);
    let result = done.publish_result().expect("approved workflows carry a result");
    assert!(result.success);
    assert!(result.post_id.is_some());
    assert!(result.url.is_some());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_reject_leaves_publish_result_absent() {
    let store = store();
    let (id, _) = store.create("rust").await.unwrap();

    let done = store.decide(&id, false).await.unwrap();
    assert_eq!(done.approval_status(), ApprovalStatus::Rejected);
    assert_eq!(done.stage(), Stage::Rejected);
    assert!(done.publish_result().is_none());
    assert_eq!(done.status(), WorkflowStatus::Rejected);
}

#[tokio::test]
async fn test_second_decision_is_rejected_and_state_unchanged() {
    for (first, second) in [(true, true), (true, false), (false, true), (false, false)] {
        let store = store();
        let (id, _) = store.create("rust").await.unwrap();
        store.decide(&id, first).await.unwrap();
        let before = store.get(&id).await.unwrap();

        let err = store.decide(&id, second).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyDecided);
        assert_eq!(store.get(&id).await.unwrap(), before);
    }
}

#[tokio::test]
async fn test_generation_failure_persists_nothing() {
    let store = WorkflowStore::in_memory(WorkflowEngine::new(
        Arc::new(BrokenGenerator),
        Arc::new(DryRunPublisher::default()),
        None,
    ));

    let err = store.create("rust").await.unwrap_err();
    assert!(matches!(err, Error::GenerationFailed(GenerationError::Provider(_))));
    assert_eq!(err.kind(), ErrorKind::GenerationFailed);
    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_publish_failure_is_absorbed_into_terminal_state() {
    let store = store_with(Arc::new(ExplodingPublisher));
    let (id, _) = store.create("rust").await.unwrap();

    let done = store.decide(&id, true).await.unwrap();
    assert_eq!(done.stage(), Stage::Done);
    assert_eq!(done.status(), WorkflowStatus::Failed);
    let result = done.publish_result().unwrap();
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("rate limited"));
    assert!(result.post_id.is_none());
}

#[tokio::test]
async fn test_unknown_and_restarted_store_report_not_found() {
    let store = store();
    let (id, _) = store.create("rust").await.unwrap();

    // a fresh store stands in for a process restart
    let restarted = store_with(Arc::new(DryRunPublisher::default()));
    assert!(matches!(restarted.get(&id).await, Err(Error::NotFound(_))));
    assert!(matches!(
        store.get(&WorkflowId::new()).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_pending_excludes_decided() {
    let store = store();
    let (approved, _) = store.create("a").await.unwrap();
    let (rejected, _) = store.create("b").await.unwrap();
    let (waiting, _) = store.create("c").await.unwrap();

    store.decide(&approved, true).await.unwrap();
    store.decide(&rejected, false).await.unwrap();

    let pending = store.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending.contains_key(&waiting));
    assert!(pending.values().all(|s| s.approval_status() == ApprovalStatus::Pending));
    assert_eq!(store.len().await.unwrap(), 3);
}

#[tokio::test]
async fn test_scenario_electric_vehicles_published() {
    let store = store();
    let (id, created) = store.create("electric vehicles").await.unwrap();
    assert_eq!(created.status().as_str(), "pending_approval");
    assert!(created.content().chars().count() <= MAX_POST_CHARS);

    let done = store.decide(&id, true).await.unwrap();
    assert_eq!(done.status().as_str(), "published");
    assert_eq!(done.publish_result().unwrap().platform, "twitter");
}

#[tokio::test]
async fn test_scenario_quantum_computing_rejected() {
    let store = store();
    let (id, _) = store.create("quantum computing").await.unwrap();

    let done = store.decide(&id, false).await.unwrap();
    assert_eq!(done.status().as_str(), "rejected");

    let err = store.decide(&id, true).await.unwrap_err();
    assert!(matches!(
        err,
        Error::AlreadyDecided {
            status: ApprovalStatus::Rejected,
            ..
        }
    ));
}
