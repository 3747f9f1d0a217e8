// Application Layer - Use Cases

pub mod coordinator;
pub mod timeout_resolver;

// Re-exports
pub use coordinator::{
    ActivationConfig, ActivationCoordinator, ActivationOutcome, ActivationSource,
    ActivationState, BatchReport, SkipReason,
};
pub use timeout_resolver::{ResolutionMode, TimeoutResolver};
