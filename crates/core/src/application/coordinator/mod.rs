//! Activation Coordinator - Annotates a task with its activation value
//!
//! One invocation walks `ResolvePayload -> ResolveTimeout -> WriteMetadata -> Done`
//! with no retries:
//! - missing content node: logged, nothing written, `Skipped` returned
//! - missing scheduled date: activation is immediate (`now`)
//! - scheduled date present: forwarded through the resolver
//! - repository or store failure: logged and returned as `CoordinationError`

pub mod config;
pub mod constants;
pub mod outcome;

pub use config::ActivationConfig;
pub use outcome::{ActivationOutcome, ActivationSource, ActivationState, BatchReport, SkipReason};

use crate::application::timeout_resolver::{ResolutionMode, TimeoutResolver};
use crate::domain::{Instant, Task};
use crate::error::{CoordinationError, Result};
use crate::port::{PayloadReader, ReadError, TaskMetadataStore, TimeProvider};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

pub struct ActivationCoordinator {
    payload_reader: Arc<dyn PayloadReader>,
    metadata_store: Arc<dyn TaskMetadataStore>,
    time_provider: Arc<dyn TimeProvider>,
    resolver: TimeoutResolver,
    config: ActivationConfig,
}

impl ActivationCoordinator {
    pub fn new(
        payload_reader: Arc<dyn PayloadReader>,
        metadata_store: Arc<dyn TaskMetadataStore>,
        time_provider: Arc<dyn TimeProvider>,
        config: ActivationConfig,
    ) -> Self {
        Self {
            payload_reader,
            metadata_store,
            time_provider,
            resolver: TimeoutResolver::new(config.mode),
            config,
        }
    }

    pub fn config(&self) -> &ActivationConfig {
        &self.config
    }

    pub fn mode(&self) -> ResolutionMode {
        self.resolver.mode()
    }

    /// Run one activation cycle for `task` using the injected clock
    pub async fn activate(&self, task: &Task) -> Result<ActivationOutcome> {
        let now = self.time_provider.now_instant();
        self.activate_at(task, now).await
    }

    /// Run one activation cycle for `task` with an explicit `now`
    ///
    /// # Errors
    /// - `CoordinationError::Read` if the content repository fails
    /// - `CoordinationError::InvalidProperty` if the scheduled date is unreadable
    /// - `CoordinationError::Write` if the metadata store rejects the write
    pub async fn activate_at(&self, task: &Task, now: Instant) -> Result<ActivationOutcome> {
        trace!(
            task_id = %task.id,
            workflow_id = ?task.workflow_id,
            payload = %task.payload,
            "Activation invoked"
        );

        // 1. ResolvePayload
        let content_path = self.payload_reader.content_path(&task.payload);
        debug!(task_id = %task.id, content_path = %content_path, "Resolving payload");

        let property = match self
            .payload_reader
            .read_property(&task.payload, &self.config.property)
            .await
        {
            Ok(property) => property,
            Err(ReadError::NodeNotFound(path)) => {
                error!(
                    task_id = %task.id,
                    path = %path,
                    "Content node does not exist, leaving task metadata untouched"
                );
                return Ok(ActivationOutcome::Skipped {
                    task_id: task.id.clone(),
                    reason: SkipReason::ContentNodeMissing { path },
                });
            }
            Err(ReadError::InvalidValue { property, reason }) => {
                error!(task_id = %task.id, property = %property, reason = %reason, "Unreadable payload property");
                return Err(CoordinationError::InvalidProperty {
                    path: content_path,
                    property,
                    reason,
                });
            }
            Err(source) => {
                error!(task_id = %task.id, error = %source, "Repository access failed");
                return Err(CoordinationError::Read {
                    payload: task.payload.to_string(),
                    source,
                });
            }
        };

        // 2. ResolveTimeout
        let (scheduled, source) = match property {
            None => {
                warn!(
                    task_id = %task.id,
                    property = %self.config.property,
                    path = %content_path,
                    "No scheduled date on content node, activating immediately"
                );
                (None, ActivationSource::Immediate)
            }
            Some(value) => {
                let instant = value.to_instant().map_err(|e| {
                    error!(task_id = %task.id, error = %e, "Scheduled date is not a date");
                    CoordinationError::InvalidProperty {
                        path: content_path.clone(),
                        property: self.config.property.clone(),
                        reason: e.to_string(),
                    }
                })?;
                debug!(task_id = %task.id, scheduled = %instant.to_rfc3339(), "Got scheduled date");
                (Some(instant), ActivationSource::Scheduled)
            }
        };

        let value = self.resolver.resolve_value(scheduled, now);
        trace!(
            task_id = %task.id,
            mode = %self.resolver.mode(),
            value = %value,
            "Timeout resolved"
        );

        // 3. WriteMetadata
        self.metadata_store
            .set_attribute(&task.id, &self.config.metadata_key, value.clone())
            .await
            .map_err(|source| {
                error!(task_id = %task.id, error = %source, "Failed to write activation metadata");
                CoordinationError::Write {
                    task_id: task.id.clone(),
                    source,
                }
            })?;

        debug!(
            task_id = %task.id,
            key = %self.config.metadata_key,
            value = %value,
            "Activation metadata written"
        );

        Ok(ActivationOutcome::Written {
            task_id: task.id.clone(),
            key: self.config.metadata_key.clone(),
            value,
            source,
        })
    }

    /// Activate tasks one after another, stopping at the first failure
    ///
    /// Outcomes of tasks that completed before the failure stay in the report.
    pub async fn activate_all(&self, tasks: &[Task]) -> BatchReport {
        let mut completed = Vec::with_capacity(tasks.len());
        for task in tasks {
            match self.activate(task).await {
                Ok(outcome) => completed.push(outcome),
                Err(e) => {
                    return BatchReport {
                        completed,
                        failure: Some((task.id.clone(), e)),
                    }
                }
            }
        }
        BatchReport {
            completed,
            failure: None,
        }
    }
}
