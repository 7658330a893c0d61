//! Scene error types.

/// Errors raised while wiring HLOD nodes to their collaborators.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    /// No controller factory is registered under the configured key.
    #[error("unknown streaming strategy '{0}'")]
    UnknownStrategy(String),
}
