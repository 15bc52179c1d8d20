use thiserror::Error;

/// Invalid overlay setup, reported synchronously from [`crate::Director::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("no container given")]
    MissingContainer,
    #[error("container not found: {0}")]
    ContainerNotFound(String),
    #[error("lane count must be at least 1")]
    NoLanes,
    #[error("speed must be a positive number of px/ms, got {0}")]
    InvalidSpeed(f64),
    #[error("delay must be a non-negative number of ms, got {0}")]
    InvalidDelay(f64),
    #[error("safety margin must be a non-negative number of ms, got {0}")]
    InvalidMargin(f64),
}
