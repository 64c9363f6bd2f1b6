use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnnError {
    /// Invalid knob or schema, raised at configure time and never clamped.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A centroid was requested for a class with no tracked instances.
    /// Recoverable: the class simply carries no information right now.
    #[error("no instances tracked for class {0}")]
    EmptyClass(usize),

    /// The window and the class aggregates disagree. This cannot happen while
    /// the invariants hold, so it is treated as an assertion failure.
    #[error("window and class aggregates out of sync: {0}")]
    StateCorruption(String),

    /// The instance does not match the configured schema. Recoverable at the
    /// prediction boundary: one bad example must not halt the stream.
    #[error("instance has {got} attributes, model expects {expected}")]
    MalformedInstance { expected: usize, got: usize },

    #[error("no model context has been set")]
    Unconfigured,
}

impl KnnError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KnnError::Configuration(_) | KnnError::StateCorruption(_)
        )
    }
}
