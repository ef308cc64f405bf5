use thiserror::Error;

/// Errors produced by a [`PermissionHost`](crate::PermissionHost)
/// implementation.
///
/// The coordinator itself never surfaces these to callers; it logs them and
/// carries on, keeping the fail-silent contract of the public operations.
#[derive(Error, Debug, Clone)]
pub enum HostError {
    /// Runtime permission prompts do not exist on this platform.
    #[error("runtime permission prompts not supported on this platform")]
    Unsupported,

    /// An error occurred in the underlying platform implementation.
    #[error("platform error: {0}")]
    Platform(String),
}
