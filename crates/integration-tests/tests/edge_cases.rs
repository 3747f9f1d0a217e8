//! Edge cases - persistence, value conversion, repository failures

use std::sync::Arc;

use activation_core::application::{
    ActivationConfig, ActivationCoordinator, ActivationOutcome, ActivationState, ResolutionMode,
    SkipReason,
};
use activation_core::domain::{
    MetadataValue, PayloadRef, PropertyValue, Task, DEFAULT_CONTENT_NODE,
};
use activation_core::port::{FixedTimeProvider, ReadError, TaskMetadataStore};
use activation_core::CoordinationError;
use activation_infra_sqlite::{create_pool, run_migrations, SqliteContentRepository, SqliteTaskStore};
use chrono::DateTime;

const NOW: &str = "2025-01-01T00:00:00Z";

fn coordinator(pool: &sqlx::SqlitePool, config: ActivationConfig) -> ActivationCoordinator {
    coordinator_reading(pool, config, DEFAULT_CONTENT_NODE)
}

fn coordinator_reading(
    pool: &sqlx::SqlitePool,
    config: ActivationConfig,
    content_node: &str,
) -> ActivationCoordinator {
    let clock = Arc::new(FixedTimeProvider::at(NOW));
    ActivationCoordinator::new(
        Arc::new(SqliteContentRepository::with_content_node(
            pool.clone(),
            clock.clone(),
            content_node,
        )),
        Arc::new(SqliteTaskStore::new(pool.clone(), clock.clone())),
        clock,
        config,
    )
}

async fn seed_task(pool: &sqlx::SqlitePool, id: &str, payload: &str) -> Task {
    let store = SqliteTaskStore::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));
    let payload = PayloadRef::new(payload).unwrap();
    store.insert_workflow(&format!("wf-{}", id), &payload).await.unwrap();

    let task = Task::new(id, payload).unwrap().with_workflow(format!("wf-{}", id));
    store.insert_task(&task).await.unwrap();
    task
}

/// Reference example: 2025-03-01T10:00:00Z scheduled, now 2025-01-01
#[tokio::test]
async fn test_reference_example() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let config = ActivationConfig {
        metadata_key: "activation-delay".to_string(),
        ..ActivationConfig::default()
    };
    let task = seed_task(&pool, "example", "/content/example").await;

    let content = SqliteContentRepository::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));
    content
        .set_property(
            &task.payload,
            "scheduledPublishDate",
            &PropertyValue::String("2025-03-01T10:00:00Z".to_string()),
        )
        .await
        .unwrap();

    coordinator(&pool, config).activate(&task).await.unwrap();

    let store = SqliteTaskStore::new(pool, Arc::new(FixedTimeProvider::at(NOW)));
    let value = store.get_attribute("example", "activation-delay").await.unwrap();
    assert_eq!(
        value.and_then(|v| v.as_instant()).map(|i| i.to_rfc3339()),
        Some("2025-03-01T10:00:00+00:00".to_string())
    );
}

/// Relative mode writes a clamped millisecond delay
#[tokio::test]
async fn test_relative_mode_delay() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let config = ActivationConfig {
        mode: ResolutionMode::RelativeDelay,
        ..ActivationConfig::default()
    };

    let content = SqliteContentRepository::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));
    let future = seed_task(&pool, "future", "/content/future").await;
    let past = seed_task(&pool, "past", "/content/past").await;
    let one_hour_ms = DateTime::parse_from_rfc3339("2025-01-01T01:00:00Z")
        .unwrap()
        .timestamp_millis();
    content
        .set_property(&future.payload, "scheduledPublishDate", &PropertyValue::Long(one_hour_ms))
        .await
        .unwrap();
    content
        .set_property(&past.payload, "scheduledPublishDate", &PropertyValue::Long(0))
        .await
        .unwrap();

    let report = coordinator(&pool, config).activate_all(&[future, past]).await;
    assert!(report.is_complete());
    let outcomes = report.completed;

    assert_eq!(
        outcomes[0].written_value(),
        Some(&MetadataValue::Duration { millis: 3_600_000 })
    );
    assert_eq!(
        outcomes[1].written_value(),
        Some(&MetadataValue::Duration { millis: 0 })
    );
}

/// Custom content node name is honored end to end
#[tokio::test]
async fn test_custom_content_node() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let task = seed_task(&pool, "custom", "/content/custom").await;

    // Node under the default name is invisible to a "body" reader
    let default_content =
        SqliteContentRepository::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));
    default_content
        .set_property(&task.payload, "scheduledPublishDate", &PropertyValue::Boolean(true))
        .await
        .unwrap();

    let body_reader = coordinator_reading(&pool, ActivationConfig::default(), "body");
    let outcome = body_reader.activate(&task).await.unwrap();
    assert_eq!(
        outcome,
        ActivationOutcome::Skipped {
            task_id: "custom".to_string(),
            reason: SkipReason::ContentNodeMissing {
                path: "/content/custom/body".to_string()
            },
        }
    );

    // The default reader sees the boolean and names its own node in the error
    let err = coordinator(&pool, ActivationConfig::default())
        .activate(&task)
        .await
        .unwrap_err();
    match err {
        CoordinationError::InvalidProperty { path, .. } => {
            assert_eq!(path, "/content/custom/jcr:content")
        }
        other => panic!("expected InvalidProperty, got {:?}", other),
    }
}

/// A failing task stops the batch; earlier outcomes are still reported
#[tokio::test]
async fn test_batch_keeps_outcomes_before_failure() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let first = seed_task(&pool, "first", "/content/first").await;
    let missing = seed_task(&pool, "missing", "/content/missing").await;

    let store = SqliteTaskStore::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));
    let loose = Task::new("loose", PayloadRef::new("/content/loose").unwrap()).unwrap();
    store.insert_task(&loose).await.unwrap();
    let last = seed_task(&pool, "last", "/content/last").await;

    let content = SqliteContentRepository::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));
    for task in [&first, &loose, &last] {
        content.create_node(&task.payload).await.unwrap();
    }

    let report = coordinator(&pool, ActivationConfig::default())
        .activate_all(&[first, missing, loose, last])
        .await;

    let done: Vec<&str> = report.completed.iter().map(|o| o.task_id()).collect();
    assert_eq!(done, vec!["first", "missing"]);
    assert_eq!(report.completed[1].state(), ActivationState::ResolvePayload);

    let (failed_task, err) = report.failure.expect("batch should stop at loose");
    assert_eq!(failed_task, "loose");
    assert_eq!(err.failed_at(), ActivationState::WriteMetadata);
    assert!(store.metadata_of("last").await.unwrap().is_empty());
    assert_eq!(store.metadata_of("first").await.unwrap().len(), 1);
}

/// Non-date property is fatal and leaves metadata untouched
#[tokio::test]
async fn test_non_date_property_fatal() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let task = seed_task(&pool, "bad", "/content/bad").await;

    let content = SqliteContentRepository::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));
    content
        .set_property(&task.payload, "scheduledPublishDate", &PropertyValue::Boolean(false))
        .await
        .unwrap();

    let err = coordinator(&pool, ActivationConfig::default())
        .activate(&task)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::InvalidProperty { .. }));

    let store = SqliteTaskStore::new(pool, Arc::new(FixedTimeProvider::at(NOW)));
    assert!(store.metadata_of("bad").await.unwrap().is_empty());
}

/// Closed pool: repository access error surfaces to the host
#[tokio::test]
async fn test_repository_unreachable() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();
    let task = seed_task(&pool, "down", "/content/down").await;
    let coordinator = coordinator(&pool, ActivationConfig::default());

    pool.close().await;

    let err = coordinator.activate(&task).await.unwrap_err();
    assert!(matches!(
        err,
        CoordinationError::Read {
            source: ReadError::Access(_),
            ..
        }
    ));
}

/// Written metadata survives reopening the database
#[tokio::test]
async fn test_metadata_persists_after_reopen() {
    let dir = std::env::temp_dir().join(format!("activation-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let db_path = dir.join("content.db");
    let _ = std::fs::remove_file(&db_path);
    let db_path = db_path.to_string_lossy().into_owned();

    {
        let pool = create_pool(&db_path).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let task = seed_task(&pool, "durable", "/content/durable").await;
        let content =
            SqliteContentRepository::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));
        content.create_node(&task.payload).await.unwrap();

        coordinator(&pool, ActivationConfig::default())
            .activate(&task)
            .await
            .unwrap();
        pool.close().await;
    }

    {
        let pool = create_pool(&db_path).await.unwrap();
        run_migrations(&pool).await.unwrap();
        let store = SqliteTaskStore::new(pool.clone(), Arc::new(FixedTimeProvider::at(NOW)));

        let task = store.find_task("durable").await.unwrap().unwrap();
        assert_eq!(task.workflow_id.as_deref(), Some("wf-durable"));

        let value = store.get_attribute("durable", "absoluteTime").await.unwrap();
        assert_eq!(
            value,
            Some(MetadataValue::Instant(
                DateTime::parse_from_rfc3339(NOW).unwrap()
            ))
        );
        pool.close().await;
    }

    std::fs::remove_dir_all(&dir).unwrap();
}
