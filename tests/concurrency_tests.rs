use async_trait::async_trait;
use content_approval::publisher::{PublishResult, Publisher};
use content_approval::workflow::{ApprovalStatus, WorkflowEngine, WorkflowStore};
use content_approval::{ErrorKind, TemplateGenerator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts deliveries and yields mid-publish so racing callers get scheduled
#[derive(Debug, Default)]
struct CountingPublisher {
    calls: AtomicUsize,
}

#[async_trait]
impl Publisher for CountingPublisher {
    async fn publish(&self, _content: &str) -> PublishResult {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        PublishResult::success("twitter", format!("post_{}", n), format!("https://example.com/{}", n))
    }

    fn platform(&self) -> &str {
        "twitter"
    }
}

fn store(publisher: Arc<CountingPublisher>) -> Arc<WorkflowStore> {
    Arc::new(WorkflowStore::in_memory(WorkflowEngine::new(
        Arc::new(TemplateGenerator::default()),
        publisher,
        None,
    )))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_decides_single_winner() {
    for n in [1usize, 2, 8, 32] {
        let publisher = Arc::new(CountingPublisher::default());
        let store = store(publisher.clone());
        let (id, _) = store.create("electric vehicles").await.unwrap();

        let handles: Vec<_> = (0..n)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.decide(&id, i % 2 == 0).await })
            })
            .collect();

        let mut successes = 0;
        let mut replays = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => {
                    assert_eq!(err.kind(), ErrorKind::AlreadyDecided);
                    replays += 1;
                }
            }
        }

        assert_eq!(successes, 1, "exactly one decision wins for n={}", n);
        assert_eq!(replays, n - 1);
        assert!(publisher.calls.load(Ordering::SeqCst) <= 1);
        assert_ne!(
            store.get(&id).await.unwrap().approval_status(),
            ApprovalStatus::Pending
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_publish_once() {
    let publisher = Arc::new(CountingPublisher::default());
    let store = store(publisher.clone());
    let (id, _) = store.create("rust").await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.decide(&id, true).await })
        })
        .collect();
    for handle in handles {
        let _ = handle.await.unwrap();
    }

    assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    let state = store.get(&id).await.unwrap();
    assert_eq!(state.publish_result().unwrap().post_id.as_deref(), Some("post_0"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_workflows_progress_concurrently() {
    let publisher = Arc::new(CountingPublisher::default());
    let store = store(publisher.clone());

    let mut ids = Vec::new();
    for i in 0..10 {
        let (id, _) = store.create(&format!("topic {}", i)).await.unwrap();
        ids.push(id);
    }

    let handles: Vec<_> = ids
        .iter()
        .copied()
        .map(|id| {
            let store = store.clone();
            tokio::spawn(async move { store.decide(&id, true).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(publisher.calls.load(Ordering::SeqCst), 10);
    assert!(store.list_pending().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reads_during_decisions() {
    let publisher = Arc::new(CountingPublisher::default());
    let store = store(publisher);
    let (id, _) = store.create("rust").await.unwrap();

    let reader = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                store.get(&id).await.unwrap();
                store.list_pending().await.unwrap();
            }
        })
    };
    let decider = {
        let store = store.clone();
        tokio::spawn(async move { store.decide(&id, true).await })
    };

    reader.await.unwrap();
    assert!(decider.await.unwrap().is_ok());
}
