use thiserror::Error;

/// Errors surfaced by the parametric scene core.
///
/// Disposal and asset failures are non-fatal by contract: callers log and
/// continue (disposal) or substitute a placeholder (assets). Parameter
/// rejection leaves the store untouched.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A control value fell outside its declared domain. The store keeps
    /// the prior value.
    #[error("parameter '{path}' rejected: {reason}")]
    InvalidParameterDomain { path: String, reason: String },

    /// Releasing a geometry or material resource failed.
    #[error("failed to dispose resource {handle}: {reason}")]
    ResourceDisposalFailure { handle: u64, reason: String },

    /// A texture asset could not be loaded; callers fall back to a
    /// placeholder.
    #[error("asset load failed for '{path}': {reason}")]
    AssetLoadFailure { path: String, reason: String },

    /// Registering a parameter path that already exists.
    #[error("parameter '{0}' is already registered")]
    DuplicateParameter(String),

    /// A lookup on an unregistered parameter path.
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// A scene object id that does not exist in the scene.
    #[error("unknown scene object {0}")]
    UnknownObject(u64),
}

pub type Result<T> = std::result::Result<T, SceneError>;
