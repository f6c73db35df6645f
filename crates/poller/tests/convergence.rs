//! End-to-end waits driven by a small polling loop.
//!
//! The loop below plays the part of the external retry driver: it feeds the
//! predicate its own last-seen snapshot on every tick and gives up after a
//! fixed number of ticks.

use std::sync::Arc;
use std::time::Duration;

use converge_core::{Image, ImageStatus, NodeMetadata, NodeStatus, PredicateConfig, Snapshot};
use converge_poller::{
    Decision, InMemoryRefresher, SnapshotRefresher, StatusConvergencePredicate, TracingRefresher,
};
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(5);
const MAX_TICKS: usize = 200;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll until a terminal decision or the tick limit is reached.
async fn drive<S, R>(
    predicate: &mut StatusConvergencePredicate<S, R>,
    initial: S,
) -> (Decision, usize)
where
    S: Snapshot,
    R: SnapshotRefresher<S>,
{
    let mut seen = Some(initial);
    for tick in 1..=MAX_TICKS {
        let decision = predicate.evaluate(seen.as_ref()).await;
        if decision.is_terminal() {
            return (decision, tick);
        }
        seen = predicate.last_seen().cloned();
        tokio::time::sleep(TICK).await;
    }
    (Decision::Retry, MAX_TICKS)
}

#[tokio::test]
async fn node_boot_converges_to_running() -> Result<(), String> {
    init_tracing();
    let source = InMemoryRefresher::new_arc();
    source
        .upsert(NodeMetadata::new("node-1", NodeStatus::Pending).with_name("web"))
        .await;

    let updater = Arc::clone(&source);
    let boot = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        updater
            .upsert(NodeMetadata::new("node-1", NodeStatus::Running).with_name("web"))
            .await;
    });

    let mut predicate = StatusConvergencePredicate::<NodeMetadata, _>::builder()
        .with_target(NodeStatus::Running)
        .with_refresher(TracingRefresher::new(Arc::clone(&source)))
        .build()
        .map_err(|e| e.to_string())?;

    let (decision, ticks) = drive(
        &mut predicate,
        NodeMetadata::new("node-1", NodeStatus::Pending),
    )
    .await;
    boot.await.map_err(|e| e.to_string())?;

    assert_eq!(decision, Decision::Pass);
    assert!(ticks > 1);
    assert_eq!(
        predicate.last_seen().and_then(NodeMetadata::name),
        Some("web")
    );
    // One refresh per non-terminal tick plus the one that observed RUNNING.
    assert_eq!(source.calls(), ticks);
    Ok(())
}

#[tokio::test]
async fn image_error_stops_the_wait() -> Result<(), String> {
    init_tracing();
    let source = InMemoryRefresher::new_arc();
    source
        .upsert(Image::new("img-1", ImageStatus::Pending))
        .await;

    let updater = Arc::clone(&source);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        updater
            .upsert(Image::new("img-1", ImageStatus::Error))
            .await;
    });

    let config = PredicateConfig::<ImageStatus>::from_toml_str(
        r#"
        target = "AVAILABLE"
        invalid = ["ERROR", "DELETED"]
        "#,
    )
    .map_err(|e| e.to_string())?;
    let mut predicate: StatusConvergencePredicate<Image, _> =
        StatusConvergencePredicate::new(config, Arc::clone(&source));

    let (decision, _) = drive(&mut predicate, Image::new("img-1", ImageStatus::Pending)).await;

    assert_eq!(decision, Decision::Fail);
    assert_eq!(
        predicate.into_last_seen().map(|i| i.status()),
        Some(ImageStatus::Error)
    );
    Ok(())
}

#[tokio::test]
async fn deleted_node_fails_after_one_retry() -> Result<(), String> {
    init_tracing();
    let source: Arc<InMemoryRefresher<NodeMetadata>> = InMemoryRefresher::new_arc();

    let mut predicate = StatusConvergencePredicate::<NodeMetadata, _>::builder()
        .with_target(NodeStatus::Running)
        .with_refresher(Arc::clone(&source))
        .build()
        .map_err(|e| e.to_string())?;

    let (decision, ticks) = drive(
        &mut predicate,
        NodeMetadata::new("node-9", NodeStatus::Pending),
    )
    .await;

    assert_eq!(decision, Decision::Fail);
    assert_eq!(ticks, 2);
    assert_eq!(source.calls(), 1);
    assert!(predicate.last_seen().is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_waits_run_concurrently() -> Result<(), String> {
    init_tracing();
    let source = InMemoryRefresher::new_arc();
    let ids: Vec<String> = (0..8).map(|i| format!("node-{i}")).collect();

    for id in &ids {
        source
            .upsert(NodeMetadata::new(id.clone(), NodeStatus::Pending))
            .await;
    }

    let mut waits = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        let final_status = if matches!(i, 3 | 7) {
            NodeStatus::Error
        } else {
            NodeStatus::Running
        };

        let updater = Arc::clone(&source);
        let flip_id = id.clone();
        let step = u64::try_from(i).map_err(|e| e.to_string())?;
        let delay = Duration::from_millis(step.saturating_mul(10));
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            updater
                .upsert(NodeMetadata::new(flip_id, final_status))
                .await;
        });

        let refresher = Arc::clone(&source);
        let initial = NodeMetadata::new(id.clone(), NodeStatus::Pending);
        waits.push(tokio::spawn(async move {
            let predicate = StatusConvergencePredicate::<NodeMetadata, _>::builder()
                .with_target(NodeStatus::Running)
                .with_refresher(refresher)
                .build();
            match predicate {
                Ok(mut predicate) => Ok((drive(&mut predicate, initial).await.0, final_status)),
                Err(e) => Err(e.to_string()),
            }
        }));
    }

    for wait in waits {
        let (decision, final_status) = wait.await.map_err(|e| e.to_string())??;
        let expected = if final_status == NodeStatus::Running {
            Decision::Pass
        } else {
            Decision::Fail
        };
        assert_eq!(decision, expected);
    }
    Ok(())
}
